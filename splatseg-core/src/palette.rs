//! Segmentation palette: label to color/threshold lookup.

use std::fmt;

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Color match threshold used by every entry of the reference palette.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

/// An 8-bit RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[u8; 3]", into = "[u8; 3]"))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `[0, 1]`.
    pub fn normalized(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Euclidean distance between two colors in normalized RGB space.
    pub fn distance(self, other: Rgb) -> f32 {
        let a = self.normalized();
        let b = other.normalized();
        let dr = a[0] - b[0];
        let dg = a[1] - b[1];
        let db = a[2] - b[2];
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.r, self.g, self.b)
    }
}

/// One segmentation region: label, representative color and match threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaletteEntry {
    pub label: String,
    pub color: Rgb,
    #[cfg_attr(feature = "serde", serde(default = "default_threshold"))]
    pub threshold: f32,
}

#[cfg(feature = "serde")]
fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl PaletteEntry {
    pub fn new(label: impl Into<String>, color: Rgb, threshold: f32) -> Self {
        Self {
            label: label.into(),
            color,
            threshold,
        }
    }
}

/// Fixed, ordered mapping from region label to color and threshold.
///
/// Insertion order is the display order and the order in which active
/// labels are emitted during recomputation. The palette is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationPalette {
    entries: Vec<PaletteEntry>,
}

impl SegmentationPalette {
    /// Builds a palette, validating that it is non-empty, labels are unique
    /// and thresholds are finite and non-negative.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPalette`], [`Error::DuplicateLabel`] or
    /// [`Error::InvalidThreshold`].
    pub fn from_entries(entries: Vec<PaletteEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::EmptyPalette);
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.label == entry.label) {
                return Err(Error::DuplicateLabel(entry.label.clone()));
            }
            if !entry.threshold.is_finite() || entry.threshold < 0.0 {
                return Err(Error::InvalidThreshold {
                    label: entry.label.clone(),
                    threshold: entry.threshold,
                });
            }
        }
        Ok(Self { entries })
    }

    /// The reference brain/head segmentation palette.
    pub fn reference() -> Self {
        let entries = [
            ("Csf", Rgb::new(0, 255, 255)),
            ("Fat", Rgb::new(255, 255, 0)),
            ("Gli", Rgb::new(0, 255, 0)),
            ("Grey", Rgb::new(128, 128, 128)),
            ("Muscle + Skin", Rgb::new(255, 0, 255)),
            ("Mit", Rgb::new(255, 128, 0)),
            ("Skull", Rgb::new(255, 0, 0)),
            ("Skin", Rgb::new(0, 128, 255)),
            ("White", Rgb::new(255, 255, 255)),
        ]
        .into_iter()
        .map(|(label, color)| PaletteEntry::new(label, color, DEFAULT_THRESHOLD))
        .collect();
        Self { entries }
    }

    /// Loads a palette from a JSON array of entries.
    ///
    /// # Errors
    /// Returns a JSON error for malformed input, or any validation error
    /// from [`SegmentationPalette::from_entries`].
    #[cfg(feature = "serde")]
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let entries: Vec<PaletteEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    /// Loads a palette from a JSON file.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be opened, otherwise as
    /// [`SegmentationPalette::from_json_reader`].
    #[cfg(feature = "serde")]
    pub fn load_json(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Color of `label`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownLabel`] if the label is not in the palette.
    pub fn color_of(&self, label: &str) -> Result<Rgb> {
        self.entry(label).map(|e| e.color)
    }

    /// Match threshold of `label`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownLabel`] if the label is not in the palette.
    pub fn threshold_of(&self, label: &str) -> Result<f32> {
        self.entry(label).map(|e| e.threshold)
    }

    /// Labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Entry for `label`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownLabel`] if the label is not in the palette.
    pub fn entry(&self, label: &str) -> Result<&PaletteEntry> {
        self.index_of(label)
            .map(|i| &self.entries[i])
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))
    }

    /// Position of `label` in display order.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.label == label)
    }

    /// Entry at display position `index`.
    pub fn get(&self, index: usize) -> Option<&PaletteEntry> {
        self.entries.get(index)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index_of(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }
}

impl Default for SegmentationPalette {
    fn default() -> Self {
        Self::reference()
    }
}
