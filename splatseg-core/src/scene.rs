//! Splat scene model and synthetic phantom generation.

use crate::palette::{Rgb, SegmentationPalette};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single colored splat center.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplatPoint {
    pub position: [f32; 3],
    pub color: Rgb,
}

impl SplatPoint {
    pub fn new(position: [f32; 3], color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Axis-aligned bounds of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl SceneBounds {
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Largest edge length.
    pub fn extent(&self) -> f32 {
        (0..3)
            .map(|i| self.max[i] - self.min[i])
            .fold(0.0, f32::max)
    }
}

/// Point set of a volumetric splat scene.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplatScene {
    pub points: Vec<SplatPoint>,
}

impl SplatScene {
    pub fn new(points: Vec<SplatPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SplatPoint> {
        self.points.iter()
    }

    /// Bounds of all points, or `None` for an empty scene.
    pub fn bounds(&self) -> Option<SceneBounds> {
        let first = self.points.first()?;
        let mut bounds = SceneBounds {
            min: first.position,
            max: first.position,
        };
        for p in &self.points[1..] {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(p.position[axis]);
                bounds.max[axis] = bounds.max[axis].max(p.position[axis]);
            }
        }
        Some(bounds)
    }

    /// Synthetic head phantom: one spherical shell per palette label.
    ///
    /// Shells follow palette order from the center outwards and share the
    /// radius evenly. Points are sampled on a regular grid spanning
    /// `[-1, 1]` on each axis, so the result is deterministic.
    pub fn phantom(palette: &SegmentationPalette, config: &PhantomConfig) -> Self {
        let n = config.resolution.max(2);
        let shells = palette.len().max(1);
        #[allow(clippy::cast_precision_loss)]
        let step = 2.0 / (n - 1) as f32;
        #[allow(clippy::cast_precision_loss)]
        let shell_width = config.radius / shells as f32;

        let mut points = Vec::new();
        for iz in 0..n {
            for iy in 0..n {
                for ix in 0..n {
                    #[allow(clippy::cast_precision_loss)]
                    let p = [
                        -1.0 + ix as f32 * step,
                        -1.0 + iy as f32 * step,
                        -1.0 + iz as f32 * step,
                    ];
                    let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
                    if r > config.radius {
                        continue;
                    }
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let shell = ((r / shell_width) as usize).min(shells - 1);
                    if let Some(entry) = palette.get(shell) {
                        points.push(SplatPoint::new(p, entry.color));
                    }
                }
            }
        }
        log::info!(
            "generated phantom with {} points ({} shells, resolution {n})",
            points.len(),
            shells
        );
        Self { points }
    }

    /// Loads a scene from JSON.
    ///
    /// # Errors
    /// Returns a JSON error for malformed input.
    #[cfg(feature = "serde")]
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> crate::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a scene from a JSON file.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be opened, or a JSON error.
    #[cfg(feature = "serde")]
    pub fn load_json(path: &std::path::Path) -> crate::Result<Self> {
        let file = std::fs::File::open(path)?;
        let scene = Self::from_json_reader(std::io::BufReader::new(file))?;
        log::info!("loaded {} points from {}", scene.len(), path.display());
        Ok(scene)
    }

    /// Writes the scene as JSON.
    ///
    /// # Errors
    /// Returns an I/O or JSON error.
    #[cfg(feature = "serde")]
    pub fn save_json(&self, path: &std::path::Path) -> crate::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Parameters of [`SplatScene::phantom`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhantomConfig {
    /// Grid samples per axis.
    pub resolution: usize,
    /// Outer radius of the outermost shell, in grid units (grid spans `[-1, 1]`).
    pub radius: f32,
}

impl Default for PhantomConfig {
    fn default() -> Self {
        Self {
            resolution: 32,
            radius: 1.0,
        }
    }
}

impl PhantomConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grid resolution.
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the outer radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}
