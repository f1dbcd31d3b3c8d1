//! Property tests for the UI axis conversions.

use avatar_poser::axis::{mirror_rotation, to_internal_rotation, to_ui_rotation};
use avatar_poser::{AxisMapping, AxisNegation, AxisSwap};
use glam::{DQuat, DVec3};
use proptest::prelude::*;

// Keeps the middle Euler angle away from the gimbal singularity at ±90°
const LIMIT: f64 = 1.2;

fn mapping() -> impl Strategy<Value = AxisMapping> {
    (0..AxisSwap::ALL.len(), 0u8..16).prop_map(|(swap, bits)| {
        AxisMapping::new(AxisSwap::ALL[swap], AxisNegation::from_bits_truncate(bits))
    })
}

fn ui_angles() -> impl Strategy<Value = DVec3> {
    (-LIMIT..LIMIT, -LIMIT..LIMIT, -LIMIT..LIMIT).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

proptest! {
    #[test]
    fn round_trip_through_internal_rotation(mapping in mapping(), ui in ui_angles()) {
        let back = mapping.to_ui(mapping.to_internal(ui));
        prop_assert!(
            (back - ui).abs().max_element() < 1e-9,
            "{:?} came back as {:?} through {:?}",
            ui,
            back,
            mapping
        );
    }

    #[test]
    fn internal_rotation_is_unit(mapping in mapping(), ui in ui_angles()) {
        let rotation = mapping.to_internal(ui);
        prop_assert!((rotation.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mirror_is_an_involution(x in -1.0f64..1.0, y in -1.0f64..1.0, z in -1.0f64..1.0, w in 0.1f64..1.0) {
        let rotation = DQuat::from_xyzw(x, y, z, w).normalize();
        prop_assert_eq!(mirror_rotation(mirror_rotation(rotation)), rotation);
    }
}

#[test]
fn chest_round_trip() {
    let ui = DVec3::new(0.2, -0.1, 0.05);
    let rotation = to_internal_rotation(ui, AxisSwap::Nothing, AxisNegation::empty());
    let back = to_ui_rotation(rotation, AxisSwap::Nothing, AxisNegation::empty());
    assert!((back - ui).abs().max_element() < 1e-5);
}
