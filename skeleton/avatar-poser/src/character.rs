//! The seam to the external animation system
//!
//! The poser never owns characters. Every entry point of the
//! [`PoseAnimator`](crate::animator::PoseAnimator) receives the character it
//! works on and looks joints and motions up through the [`Character`] trait.
//! [`StandaloneCharacter`] is an in-memory implementation used for offline
//! export and for tests.

use std::collections::{HashMap, HashSet};
use std::fmt;

use glam::{DQuat, DVec3};

/// Stable identity of a character across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character#{}", self.0)
    }
}

/// The simulation region a character is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegionId(pub u64);

/// Opaque identifier of a motion registered with a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionId(pub u64);

impl fmt::Display for MotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "motion#{:016x}", self.0)
    }
}

/// Position, rotation and scale of a joint relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl JointTransform {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// A transform at `position` with no rotation and unit scale
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What the poser needs from a live, animated character
pub trait Character {
    fn id(&self) -> CharacterId;

    /// Whether the character has been destroyed
    fn is_dead(&self) -> bool;

    fn region(&self) -> RegionId;

    /// The live transform of a joint, looked up by its symbolic name
    fn joint(&self, name: &str) -> Option<JointTransform>;

    /// Mutable access to the live transform of a joint
    fn joint_mut(&mut self, name: &str) -> Option<&mut JointTransform>;

    /// Register a motion; returns false if the id is already taken
    fn register_motion(&mut self, motion: MotionId) -> bool;

    /// Start a registered motion; returns false if it is unknown
    fn start_motion(&mut self, motion: MotionId) -> bool;

    fn stop_motion(&mut self, motion: MotionId);

    fn is_motion_active(&self, motion: MotionId) -> bool;
}

/// In-memory character with a plain joint table and motion registry
#[derive(Debug, Clone)]
pub struct StandaloneCharacter {
    id: CharacterId,
    region: RegionId,
    dead: bool,
    joints: HashMap<String, JointTransform>,
    motions: HashSet<MotionId>,
    active_motions: HashSet<MotionId>,
}

impl StandaloneCharacter {
    /// A character with no joints
    pub fn new(id: CharacterId, region: RegionId) -> Self {
        Self {
            id,
            region,
            dead: false,
            joints: HashMap::new(),
            motions: HashSet::new(),
            active_motions: HashSet::new(),
        }
    }

    /// A character carrying the default avatar rest skeleton
    pub fn with_default_skeleton(id: CharacterId, region: RegionId) -> Self {
        let mut character = Self::new(id, region);
        for &(name, offset) in DEFAULT_REST_OFFSETS {
            character.insert_joint(name, JointTransform::from_position(DVec3::from_array(offset)));
        }
        character
    }

    /// Add or replace a joint
    pub fn insert_joint(&mut self, name: impl Into<String>, transform: JointTransform) {
        self.joints.insert(name.into(), transform);
    }

    /// Mark the character destroyed
    pub fn kill(&mut self) {
        self.dead = true;
        self.active_motions.clear();
    }

    /// Move the character to another region
    pub fn teleport(&mut self, region: RegionId) {
        self.region = region;
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

impl Character for StandaloneCharacter {
    fn id(&self) -> CharacterId {
        self.id
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn region(&self) -> RegionId {
        self.region
    }

    fn joint(&self, name: &str) -> Option<JointTransform> {
        self.joints.get(name).copied()
    }

    fn joint_mut(&mut self, name: &str) -> Option<&mut JointTransform> {
        self.joints.get_mut(name)
    }

    fn register_motion(&mut self, motion: MotionId) -> bool {
        self.motions.insert(motion)
    }

    fn start_motion(&mut self, motion: MotionId) -> bool {
        if self.dead || !self.motions.contains(&motion) {
            return false;
        }
        self.active_motions.insert(motion);
        true
    }

    fn stop_motion(&mut self, motion: MotionId) {
        self.active_motions.remove(&motion);
    }

    fn is_motion_active(&self, motion: MotionId) -> bool {
        self.active_motions.contains(&motion)
    }
}

/// Rest offsets of the default avatar skeleton, relative to the parent joint
const DEFAULT_REST_OFFSETS: &[(&str, [f64; 3])] = &[
    ("mPelvis", [0.0, 0.0, 1.067]),
    ("mTorso", [0.0, 0.0, 0.084]),
    ("mChest", [-0.015, 0.0, 0.205]),
    ("mNeck", [-0.01, 0.0, 0.251]),
    ("mHead", [0.0, 0.0, 0.076]),
    ("mEyeLeft", [0.098, 0.036, 0.079]),
    ("mEyeRight", [0.098, -0.036, 0.079]),
    ("mCollarLeft", [-0.021, 0.085, 0.165]),
    ("mShoulderLeft", [0.0, 0.079, 0.0]),
    ("mElbowLeft", [0.0, 0.248, 0.0]),
    ("mWristLeft", [0.0, 0.205, 0.0]),
    ("mCollarRight", [-0.021, -0.085, 0.165]),
    ("mShoulderRight", [0.0, -0.079, 0.0]),
    ("mElbowRight", [0.0, -0.248, 0.0]),
    ("mWristRight", [0.0, -0.205, 0.0]),
    ("mHipLeft", [0.034, 0.127, -0.041]),
    ("mKneeLeft", [-0.001, -0.046, -0.491]),
    ("mAnkleLeft", [-0.029, 0.001, -0.468]),
    ("mFootLeft", [0.112, 0.0, -0.061]),
    ("mToeLeft", [0.109, 0.0, 0.0]),
    ("mHipRight", [0.034, -0.129, -0.041]),
    ("mKneeRight", [-0.001, 0.049, -0.491]),
    ("mAnkleRight", [-0.029, 0.0, -0.468]),
    ("mFootRight", [0.112, 0.0, -0.061]),
    ("mToeRight", [0.109, 0.0, 0.0]),
    ("mFaceJaw", [-0.001, 0.0, -0.015]),
    ("mFaceEyebrowOuterLeft", [0.074, 0.049, 0.029]),
    ("mFaceEyebrowOuterRight", [0.074, -0.049, 0.029]),
    ("mFaceEyeLidUpperLeft", [0.073, 0.036, 0.034]),
    ("mFaceEyeLidUpperRight", [0.073, -0.036, 0.034]),
    ("mFaceLipCornerLeft", [0.074, 0.022, -0.059]),
    ("mFaceLipCornerRight", [0.074, -0.022, -0.059]),
    ("BELLY", [0.028, 0.0, 0.04]),
    ("BUTT", [-0.065, 0.0, -0.1]),
    ("LEFT_PEC", [0.082, 0.042, 0.119]),
    ("RIGHT_PEC", [0.082, -0.042, 0.119]),
    ("L_HAND", [0.033, 0.061, -0.005]),
    ("R_HAND", [0.033, -0.061, -0.005]),
];
