//! Shared fixtures for the animator integration tests

#![allow(dead_code)]

use avatar_poser::prelude::*;
use avatar_poser::JointPose;
use glam::{DQuat, DVec3};

/// A default-skeleton avatar that is already being posed
pub fn posed_avatar() -> (PoseAnimator, StandaloneCharacter) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut animator = PoseAnimator::default();
    let mut avatar = StandaloneCharacter::with_default_skeleton(CharacterId(1), RegionId(0));
    assert!(animator.try_start_posing(&mut avatar));
    (animator, avatar)
}

pub fn target_rotation(animator: &PoseAnimator, avatar: &StandaloneCharacter, joint: &str) -> DQuat {
    animator
        .joint_pose(avatar, joint)
        .map(JointPose::target_rotation)
        .expect("joint is posed")
}

pub fn assert_vec_near(actual: DVec3, expected: DVec3) {
    assert!(
        (actual - expected).abs().max_element() < 1e-9,
        "{actual:?} != {expected:?}"
    );
}

pub fn assert_quat_near(actual: DQuat, expected: DQuat) {
    // q and -q are the same rotation
    let same = actual.dot(expected).abs();
    assert!((same - 1.0).abs() < 1e-9, "{actual:?} != {expected:?}");
}
