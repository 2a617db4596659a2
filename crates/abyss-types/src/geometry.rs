//! Arena geometry: positions, bounds, and movement vectors.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point in the 2D arena.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Construct a position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Arena extent. Positions are clamped to `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Bounds {
    /// Arena width.
    pub width: f64,
    /// Arena height.
    pub height: f64,
}

impl Bounds {
    /// Construct bounds. Negative extents collapse to zero.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Clamp a position into the arena.
    pub const fn clamp(self, position: Position) -> Position {
        Position {
            x: position.x.clamp(0.0, self.width),
            y: position.y.clamp(0.0, self.height),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// A movement bias returned by the decision oracle. Each axis is in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveDirection {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl MoveDirection {
    /// Construct a direction, clamping each axis to `[-1, 1]`. Non-finite
    /// components become 0.
    pub const fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }
}

const fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bounds_clamp_both_axes() {
        let bounds = Bounds::new(100.0, 50.0);
        let clamped = bounds.clamp(Position::new(-5.0, 70.0));
        assert!(clamped.x.abs() < f64::EPSILON);
        assert!((clamped.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn move_direction_clamps_and_rejects_nan() {
        let dir = MoveDirection::clamped(3.0, f64::NAN);
        assert!((dir.x - 1.0).abs() < f64::EPSILON);
        assert!(dir.y.abs() < f64::EPSILON);
    }
}
