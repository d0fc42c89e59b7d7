//! Scene transform applied to the preview.

/// Position, rotation about the vertical axis and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub position: [f32; 3],
    /// Rotation about Y in degrees.
    pub rotation_y: f32,
    pub scale: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation_y: 0.0,
            scale: 1.0,
        }
    }
}

impl TransformState {
    /// Rotates about Y, scales, then translates `p`.
    pub fn apply(&self, p: [f32; 3]) -> [f32; 3] {
        let (sin, cos) = self.rotation_y.to_radians().sin_cos();
        let x = p[0] * cos + p[2] * sin;
        let z = -p[0] * sin + p[2] * cos;
        [
            x * self.scale + self.position[0],
            p[1] * self.scale + self.position[1],
            z * self.scale + self.position[2],
        ]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_identity() {
        let t = TransformState::default();
        assert!(t.is_identity());
        assert!(close(t.apply([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_rotate_scale_translate() {
        let t = TransformState {
            position: [0.0, 1.0, 0.0],
            rotation_y: 90.0,
            scale: 2.0,
        };
        assert!(close(t.apply([1.0, 0.0, 0.0]), [0.0, 1.0, -2.0]));
    }
}
