//! Translation between UI-facing Euler angles and joint quaternions
//!
//! Joints in the avatar skeleton are not all oriented the same way, so a
//! "yaw" dragged on the UI may have to land on the joint's local X, Y or Z
//! axis, possibly with its sign flipped. Each joint therefore carries an
//! [`AxisMapping`]: a bit set of negations and one of six axis swaps.
//!
//! Going to the joint, the UI triple is negated first and then swapped into
//! the X, Y and Z matrix angles. Coming back, the Euler angles are extracted
//! in the same order, un-swapped and negated again.
//!
//! # Examples
//!
//! ```rust
//! use avatar_poser::axis::{AxisNegation, AxisSwap, to_internal_rotation, to_ui_rotation};
//! use glam::DVec3;
//!
//! let ui = DVec3::new(0.2, -0.1, 0.05);
//! let rotation = to_internal_rotation(ui, AxisSwap::YawAndRoll, AxisNegation::PITCH);
//! let back = to_ui_rotation(rotation, AxisSwap::YawAndRoll, AxisNegation::PITCH);
//!
//! assert!((back - ui).abs().max_element() < 1e-9);
//! ```
//!
//! Round trips only hold away from ±90° on the middle axis, where the Euler
//! decomposition is not unique.

use bitflags::bitflags;
use glam::{DMat3, DQuat, DVec3, EulerRot};

bitflags! {
    /// Which UI axes have their sign flipped before reaching the joint
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AxisNegation: u8 {
        /// Negate the first UI component (x)
        const YAW = 1;
        /// Negate the second UI component (y)
        const PITCH = 2;
        /// Negate the third UI component (z)
        const ROLL = 4;
        /// Negate all three, whatever the other bits say
        const ALL = 8;
    }
}

impl AxisNegation {
    /// Apply the negation to a UI triple
    pub fn apply(self, mut v: DVec3) -> DVec3 {
        if self.contains(Self::ALL) {
            return -v;
        }

        if self.contains(Self::YAW) {
            v.x = -v.x;
        }
        if self.contains(Self::PITCH) {
            v.y = -v.y;
        }
        if self.contains(Self::ROLL) {
            v.z = -v.z;
        }
        v
    }
}

/// How the UI components are permuted onto the joint's X, Y and Z angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisSwap {
    /// UI (x, y, z) drives joint (X, Y, Z)
    #[default]
    Nothing,
    /// Exchange yaw and roll
    YawAndRoll,
    /// Exchange yaw and pitch
    YawAndPitch,
    /// Exchange roll and pitch
    RollAndPitch,
    /// Rotate the axes x→y→z→x
    X2YY2ZZ2X,
    /// Rotate the axes x→z→y→x
    X2ZY2XZ2Y,
}

impl AxisSwap {
    /// All swap modes
    pub const ALL: [Self; 6] = [
        Self::Nothing,
        Self::YawAndRoll,
        Self::YawAndPitch,
        Self::RollAndPitch,
        Self::X2YY2ZZ2X,
        Self::X2ZY2XZ2Y,
    ];

    /// For each joint axis (X, Y, Z), the index of the UI component feeding it
    pub fn source_indices(self) -> [usize; 3] {
        match self {
            Self::Nothing => [0, 1, 2],
            Self::YawAndRoll => [2, 1, 0],
            Self::YawAndPitch => [1, 0, 2],
            Self::RollAndPitch => [0, 2, 1],
            Self::X2YY2ZZ2X => [2, 0, 1],
            Self::X2ZY2XZ2Y => [1, 2, 0],
        }
    }

    fn swap(self, ui: DVec3) -> [f64; 3] {
        let ui = ui.to_array();
        self.source_indices().map(|index| ui[index])
    }

    fn unswap(self, angles: [f64; 3]) -> DVec3 {
        let mut ui = [0.0; 3];
        for (angle, index) in angles.into_iter().zip(self.source_indices()) {
            ui[index] = angle;
        }
        DVec3::from_array(ui)
    }
}

/// The axis swap and negation configured for a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisMapping {
    pub swap: AxisSwap,
    pub negation: AxisNegation,
}

impl AxisMapping {
    /// Identity mapping, used where a canonical axis order is required
    pub const CANONICAL: Self = Self {
        swap: AxisSwap::Nothing,
        negation: AxisNegation::empty(),
    };

    pub const fn new(swap: AxisSwap, negation: AxisNegation) -> Self {
        Self { swap, negation }
    }

    /// UI Euler angles to joint rotation
    pub fn to_internal(self, ui_euler: DVec3) -> DQuat {
        to_internal_rotation(ui_euler, self.swap, self.negation)
    }

    /// Joint rotation to UI Euler angles
    pub fn to_ui(self, rotation: DQuat) -> DVec3 {
        to_ui_rotation(rotation, self.swap, self.negation)
    }
}

/// Convert UI Euler angles (radians) to the joint's internal rotation
pub fn to_internal_rotation(ui_euler: DVec3, swap: AxisSwap, negation: AxisNegation) -> DQuat {
    let [x, y, z] = swap.swap(negation.apply(ui_euler));
    let matrix = DMat3::from_euler(EulerRot::XYZ, x, y, z);
    DQuat::from_mat3(&matrix).normalize()
}

/// Convert the joint's internal rotation back to UI Euler angles (radians)
pub fn to_ui_rotation(rotation: DQuat, swap: AxisSwap, negation: AxisNegation) -> DVec3 {
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    negation.apply(swap.unswap([x, y, z]))
}

/// The axis-inverted rotation used for bilateral mirroring
///
/// Negates the vector part and keeps the scalar part.
pub fn mirror_rotation(rotation: DQuat) -> DQuat {
    DQuat::from_xyzw(-rotation.x, -rotation.y, -rotation.z, rotation.w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(
            (a - b).abs().max_element() < EPSILON,
            "expected {b:?}, got {a:?}"
        );
    }

    #[test]
    fn test_negate_all_overrides_individual_bits() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(AxisNegation::ALL.apply(v), -v);
        assert_eq!((AxisNegation::ALL | AxisNegation::YAW).apply(v), -v);
    }

    #[test]
    fn test_negate_individual_axes() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(AxisNegation::YAW.apply(v), DVec3::new(-1.0, 2.0, 3.0));
        assert_eq!(AxisNegation::PITCH.apply(v), DVec3::new(1.0, -2.0, 3.0));
        assert_eq!(
            (AxisNegation::PITCH | AxisNegation::ROLL).apply(v),
            DVec3::new(1.0, -2.0, -3.0)
        );
        assert_eq!(AxisNegation::empty().apply(v), v);
    }

    #[test_case(AxisSwap::Nothing, [0.1, 0.2, 0.3] ; "nothing")]
    #[test_case(AxisSwap::YawAndRoll, [0.3, 0.2, 0.1] ; "yaw and roll")]
    #[test_case(AxisSwap::YawAndPitch, [0.2, 0.1, 0.3] ; "yaw and pitch")]
    #[test_case(AxisSwap::RollAndPitch, [0.1, 0.3, 0.2] ; "roll and pitch")]
    #[test_case(AxisSwap::X2YY2ZZ2X, [0.3, 0.1, 0.2] ; "x to y to z")]
    #[test_case(AxisSwap::X2ZY2XZ2Y, [0.2, 0.3, 0.1] ; "x to z to y")]
    fn test_swap_feeds_joint_axes(swap: AxisSwap, expected: [f64; 3]) {
        let angles = swap.swap(DVec3::new(0.1, 0.2, 0.3));
        assert_eq!(angles, expected);
        assert_eq!(swap.unswap(angles), DVec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_chest_round_trip_without_mapping() {
        let ui = DVec3::new(0.2, -0.1, 0.05);
        let rotation = to_internal_rotation(ui, AxisSwap::Nothing, AxisNegation::empty());
        let back = to_ui_rotation(rotation, AxisSwap::Nothing, AxisNegation::empty());
        assert!((back - ui).abs().max_element() < 1e-5);
    }

    #[test]
    fn test_single_axis_lands_on_swapped_joint_axis() {
        // Yaw only, swapped with roll, must rotate about the joint's Z axis
        let rotation = to_internal_rotation(
            DVec3::new(0.5, 0.0, 0.0),
            AxisSwap::YawAndRoll,
            AxisNegation::empty(),
        );
        let expected = DQuat::from_rotation_z(0.5);
        assert!(rotation.dot(expected).abs() > 1.0 - EPSILON);
    }

    #[test]
    fn test_zero_is_identity() {
        for swap in AxisSwap::ALL {
            let rotation = to_internal_rotation(DVec3::ZERO, swap, AxisNegation::ALL);
            assert!(rotation.dot(DQuat::IDENTITY).abs() > 1.0 - EPSILON);
            assert_close(to_ui_rotation(rotation, swap, AxisNegation::ALL), DVec3::ZERO);
        }
    }

    #[test]
    fn test_mirror_rotation_keeps_scalar() {
        let q = DQuat::from_xyzw(0.1, 0.2, 0.3, 0.927_361_849_549_570_4);
        let m = mirror_rotation(q);
        assert_eq!(m, DQuat::from_xyzw(-0.1, -0.2, -0.3, q.w));
        assert_eq!(mirror_rotation(m), q);
    }
}
