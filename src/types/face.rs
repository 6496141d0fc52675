//! Box face and axis types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The six faces of an axis-aligned box, in the fixed cube order
/// (right, left, top, bottom, front, back).
///
/// The model faces +Z, so `Front` is the face the viewer sees first and
/// `Left`/`Right` are named after world X, not after the character's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Right,
    Left,
    Top,
    Bottom,
    Front,
    Back,
}

impl Face {
    /// All six faces in cube order.
    pub const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
    ];

    /// Outward unit normal.
    pub fn normal(&self) -> Vec3 {
        match self {
            Face::Right => Vec3::X,
            Face::Left => Vec3::NEG_X,
            Face::Top => Vec3::Y,
            Face::Bottom => Vec3::NEG_Y,
            Face::Front => Vec3::Z,
            Face::Back => Vec3::NEG_Z,
        }
    }

    /// Tangent frame `(right, up)` as seen from outside the face.
    ///
    /// `right x up == normal` for every face, so corners listed as
    /// `-r-u, +r-u, +r+u, -r+u` wind counter-clockwise from outside.
    pub fn tangents(&self) -> (Vec3, Vec3) {
        match self {
            Face::Right => (Vec3::NEG_Z, Vec3::Y),
            Face::Left => (Vec3::Z, Vec3::Y),
            Face::Top => (Vec3::X, Vec3::NEG_Z),
            Face::Bottom => (Vec3::X, Vec3::Z),
            Face::Front => (Vec3::X, Vec3::Y),
            Face::Back => (Vec3::NEG_X, Vec3::Y),
        }
    }

    /// Axis the face normal lies on.
    pub fn axis(&self) -> Axis {
        match self {
            Face::Right | Face::Left => Axis::X,
            Face::Top | Face::Bottom => Axis::Y,
            Face::Front | Face::Back => Axis::Z,
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Right => write!(f, "right"),
            Face::Left => write!(f, "left"),
            Face::Top => write!(f, "top"),
            Face::Bottom => write!(f, "bottom"),
            Face::Front => write!(f, "front"),
            Face::Back => write!(f, "back"),
        }
    }
}

/// The three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in a `[f32; 3]`.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Get the unit vector for this axis.
    pub fn unit_vector(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}
