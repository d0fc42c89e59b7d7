//! Set of active segmentation labels.

use std::collections::BTreeSet;

use crate::palette::SegmentationPalette;
use crate::{Error, Result};

/// The labels the user has toggled on.
///
/// Members are stored as palette positions, so every member is a valid
/// palette label and iteration follows palette display order. Only the
/// controllers mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active: BTreeSet<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `label` as active or inactive.
    ///
    /// Returns whether the state changed. On error the state is untouched.
    pub(crate) fn set_active(
        &mut self,
        palette: &SegmentationPalette,
        label: &str,
        is_active: bool,
    ) -> Result<bool> {
        let index = palette
            .index_of(label)
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))?;
        Ok(if is_active {
            self.active.insert(index)
        } else {
            self.active.remove(&index)
        })
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }

    /// Palette positions of active labels, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.iter().copied()
    }

    /// Active labels in palette order.
    pub fn labels<'p>(&self, palette: &'p SegmentationPalette) -> Vec<&'p str> {
        self.indices()
            .filter_map(|i| palette.get(i))
            .map(|e| e.label.as_str())
            .collect()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.active.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_active() {
        let palette = SegmentationPalette::reference();
        let mut state = SelectionState::new();

        assert!(state.set_active(&palette, "Skin", true).unwrap());
        assert!(state.set_active(&palette, "Csf", true).unwrap());
        assert!(!state.set_active(&palette, "Skin", true).unwrap());
        assert_eq!(state.labels(&palette), ["Csf", "Skin"]);

        assert!(state.set_active(&palette, "Csf", false).unwrap());
        assert!(!state.set_active(&palette, "Csf", false).unwrap());
        assert_eq!(state.labels(&palette), ["Skin"]);
    }

    #[test]
    fn test_unknown_label_leaves_state() {
        let palette = SegmentationPalette::reference();
        let mut state = SelectionState::new();
        state.set_active(&palette, "Skull", true).unwrap();
        let before = state.clone();

        assert!(matches!(
            state.set_active(&palette, "Nonexistent", true),
            Err(Error::UnknownLabel(_))
        ));
        assert_eq!(state, before);
    }
}
