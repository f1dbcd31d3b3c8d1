//! Avatar pose editing.
//!
//! This crate edits the joint transforms of an animated avatar: rotations,
//! positions and scales, with per-joint undo history, mirrored edit styles
//! for left/right joint pairs, whole-pose flipping and single-frame BVH
//! export.
//!
//! # Examples
//!
//! ```rust
//! use avatar_poser::prelude::*;
//! use glam::DVec3;
//!
//! let mut animator = PoseAnimator::default();
//! let mut avatar = StandaloneCharacter::with_default_skeleton(CharacterId(1), RegionId(0));
//! animator.try_start_posing(&mut avatar);
//!
//! animator.set_joint_rotation(
//!     &avatar,
//!     "mElbowLeft",
//!     DVec3::new(0.0, 0.3, 0.0),
//!     DeflectionStyle::Sympathetic,
//!     AxisMapping::CANONICAL,
//! );
//! animator.flip_entire_pose(&avatar);
//! animator.update(&mut avatar);
//!
//! let mut bvh = Vec::new();
//! assert!(animator.write_pose_as_bvh(&mut bvh, &avatar));
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod animator;
pub mod axis;
pub mod bvh;
pub mod character;
pub mod config;
pub mod document;
pub mod error;
pub mod joint;
pub mod joint_pose;
pub mod style;

// Re-export common types
pub use animator::{PoseAnimator, PoseSession};
pub use axis::{AxisMapping, AxisNegation, AxisSwap};
pub use bvh::BvhWriter;
pub use character::{Character, CharacterId, JointTransform, MotionId, RegionId, StandaloneCharacter};
pub use config::PoserConfig;
pub use document::{JointEntry, PoseDocument};
pub use error::{PoserError, Result};
pub use joint::{BoneType, JointCatalog, PoserJoint};
pub use joint_pose::{JointPose, TransformAttribute};
pub use style::DeflectionStyle;

/// Everything needed to pose a character
pub mod prelude {
    pub use crate::animator::PoseAnimator;
    pub use crate::axis::{AxisMapping, AxisNegation, AxisSwap};
    pub use crate::character::{Character, CharacterId, RegionId, StandaloneCharacter};
    pub use crate::config::PoserConfig;
    pub use crate::document::PoseDocument;
    pub use crate::joint::{BoneType, JointCatalog};
    pub use crate::joint_pose::TransformAttribute;
    pub use crate::style::DeflectionStyle;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
