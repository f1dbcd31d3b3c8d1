//! Pose editing across all joints of a character
//!
//! The [`PoseAnimator`] keeps one [`PoseSession`] per character it has
//! posed, in a side table keyed by [`CharacterId`]. A session holds the
//! motion registered with the character's animation system and the
//! [`JointPose`] of every catalog joint the character had when posing began.
//!
//! Every entry point takes the character and re-checks that it is usable: not
//! dead and in the agent's region. UI state can run ahead of world state, so
//! an unusable character, an unknown joint name or a missing mirror partner
//! turns the call into a no-op returning a default value, never an error.
//!
//! # Examples
//!
//! ```rust
//! use avatar_poser::prelude::*;
//! use glam::DVec3;
//!
//! let mut animator = PoseAnimator::default();
//! let mut avatar = StandaloneCharacter::with_default_skeleton(CharacterId(1), RegionId(0));
//!
//! assert!(animator.try_start_posing(&mut avatar));
//! animator.set_joint_rotation(
//!     &avatar,
//!     "mShoulderLeft",
//!     DVec3::new(0.0, 0.0, 0.4),
//!     DeflectionStyle::Mirror,
//!     AxisMapping::CANONICAL,
//! );
//! animator.update(&mut avatar);
//!
//! let right = animator.joint_rotation(&avatar, "mShoulderRight", AxisMapping::CANONICAL, true);
//! assert!((right.z + 0.4).abs() < 1e-9);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use glam::{DQuat, DVec3};
use log::{debug, trace, warn};

use crate::axis::{AxisMapping, mirror_rotation};
use crate::bvh::BvhWriter;
use crate::character::{Character, CharacterId, JointTransform, MotionId, RegionId};
use crate::config::PoserConfig;
use crate::joint::JointCatalog;
use crate::joint_pose::{JointPose, TransformAttribute};
use crate::style::{DeflectionStyle, PartnerEdit};

/// The posing state of one character
#[derive(Debug, Clone)]
pub struct PoseSession {
    motion: MotionId,
    poses: HashMap<usize, JointPose>,
    posed: BTreeSet<usize>,
}

impl PoseSession {
    /// Motion registered with the character's animation system
    pub fn motion(&self) -> MotionId {
        self.motion
    }

    /// Number of joints captured when posing began
    pub fn joint_count(&self) -> usize {
        self.poses.len()
    }

    fn is_posing(&self, index: usize) -> bool {
        self.posed.contains(&index)
    }

    fn pose_mut(&mut self, index: Option<usize>) -> Option<&mut JointPose> {
        index.and_then(|index| self.poses.get_mut(&index))
    }

    fn reflect(&mut self, index: usize, partner: Option<usize>) {
        let partner = partner.filter(|partner| self.poses.contains_key(partner));

        let Some(partner) = partner else {
            if let Some(pose) = self.poses.get_mut(&index) {
                pose.set_target_rotation(mirror_rotation(pose.target_rotation()));
            }
            return;
        };

        let (Some(first), Some(second)) = (
            self.poses.get(&index).map(JointPose::target_rotation),
            self.poses.get(&partner).map(JointPose::target_rotation),
        ) else {
            return;
        };

        if let Some(pose) = self.poses.get_mut(&index) {
            pose.set_target_rotation(mirror_rotation(second));
        }
        if let Some(pose) = self.poses.get_mut(&partner) {
            pose.set_target_rotation(mirror_rotation(first));
        }
    }
}

/// Edits joint poses of the characters it is given
#[derive(Debug)]
pub struct PoseAnimator {
    catalog: JointCatalog,
    config: PoserConfig,
    sessions: HashMap<CharacterId, PoseSession>,
    next_motion: u64,
}

impl Default for PoseAnimator {
    fn default() -> Self {
        Self::new(PoserConfig::default(), JointCatalog::second_life())
    }
}

impl PoseAnimator {
    pub fn new(config: PoserConfig, catalog: JointCatalog) -> Self {
        Self {
            catalog,
            config,
            sessions: HashMap::new(),
            next_motion: 1,
        }
    }

    pub fn catalog(&self) -> &JointCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PoserConfig {
        &self.config
    }

    /// Move the controlling agent to another region
    pub fn set_agent_region(&mut self, region: RegionId) {
        self.config.agent_region = region.0;
    }

    /// Whether the character may be edited right now
    pub fn is_character_safe_to_use<C: Character + ?Sized>(&self, character: &C) -> bool {
        !character.is_dead() && character.region() == self.config.agent_region()
    }

    /// The session of a character, whether or not its motion is running
    pub fn session<C: Character + ?Sized>(&self, character: &C) -> Option<&PoseSession> {
        if !self.is_character_safe_to_use(character) {
            return None;
        }
        self.sessions.get(&character.id())
    }

    /// The pose record of one joint
    pub fn joint_pose<C: Character + ?Sized>(
        &self,
        character: &C,
        joint: &str,
    ) -> Option<&JointPose> {
        let index = self.catalog.index_of(joint)?;
        self.session(character)?.poses.get(&index)
    }

    pub fn is_posing<C: Character + ?Sized>(&self, character: &C) -> bool {
        self.session(character)
            .is_some_and(|session| character.is_motion_active(session.motion))
    }

    /// Start the posing motion, creating the session on first use
    ///
    /// A character that no longer knows its session's motion (it was
    /// recreated under the same id) gets a fresh session built from its
    /// current skeleton. Returns true only if the motion was started by this
    /// call.
    pub fn try_start_posing<C: Character + ?Sized>(&mut self, character: &mut C) -> bool {
        if !self.is_character_safe_to_use(&*character) {
            trace!("not posing {}: character is not usable", character.id());
            return false;
        }

        let existing = self.sessions.get(&character.id()).map(|session| session.motion);
        let motion = match existing {
            Some(motion) => motion,
            None => match self.create_session(character) {
                Some(motion) => motion,
                None => return false,
            },
        };

        if character.is_motion_active(motion) {
            return false;
        }

        let mut started = character.start_motion(motion);
        if !started && existing.is_some() {
            debug!(
                "{} does not know {motion}, replacing its pose session",
                character.id()
            );
            started = self
                .create_session(character)
                .is_some_and(|motion| character.start_motion(motion));
        }
        if started {
            debug!("started posing {} with its pose motion", character.id());
        }
        started
    }

    /// Stop the posing motion; the recorded joint poses are kept
    pub fn stop_posing<C: Character + ?Sized>(&mut self, character: &mut C) {
        if character.is_dead() {
            return;
        }

        if let Some(session) = self.sessions.get(&character.id()) {
            character.stop_motion(session.motion);
            debug!("stopped posing {}", character.id());
        }
    }

    /// Forget everything recorded for a character
    pub fn release_character(&mut self, id: CharacterId) -> bool {
        let released = self.sessions.remove(&id).is_some();
        if released {
            debug!("released pose session of {id}");
        }
        released
    }

    pub fn is_posing_joint<C: Character + ?Sized>(&self, character: &C, joint: &str) -> bool {
        let Some(index) = self.catalog.index_of(joint) else {
            return false;
        };

        self.session(character)
            .filter(|session| character.is_motion_active(session.motion))
            .is_some_and(|session| session.is_posing(index))
    }

    /// Hand a joint to the posing motion or back to the animation system
    pub fn set_posing_joint<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        should_pose: bool,
    ) {
        let Some(index) = self.catalog.index_of(joint) else {
            return;
        };
        let Some(session) = self.session_mut(character, true) else {
            return;
        };
        if !session.poses.contains_key(&index) {
            return;
        }

        if should_pose {
            session.posed.insert(index);
        } else {
            session.posed.remove(&index);
        }
    }

    /// Return position and rotation of a joint to where posing began
    pub fn reset_joint<C: Character + ?Sized>(&mut self, character: &C, joint: &str) {
        self.with_joint_and_partner(character, joint, true, false, |pose| {
            pose.reset(TransformAttribute::Position);
            pose.reset(TransformAttribute::Rotation);
        });
    }

    /// Return one attribute to where posing began, on the partner too unless
    /// the style is [`DeflectionStyle::None`]
    pub fn reset_joint_attribute<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        attribute: TransformAttribute,
        style: DeflectionStyle,
    ) {
        self.with_joint_and_partner(character, joint, true, style.propagates(), |pose| {
            pose.reset(attribute);
        });
    }

    pub fn undo_joint<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        attribute: TransformAttribute,
        style: DeflectionStyle,
    ) {
        self.with_joint_and_partner(character, joint, true, style.propagates(), |pose| {
            pose.undo(attribute);
        });
    }

    pub fn redo_joint<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        attribute: TransformAttribute,
        style: DeflectionStyle,
    ) {
        self.with_joint_and_partner(character, joint, true, style.propagates(), |pose| {
            pose.redo(attribute);
        });
    }

    pub fn can_undo_joint<C: Character + ?Sized>(
        &self,
        character: &C,
        joint: &str,
        attribute: TransformAttribute,
    ) -> bool {
        self.is_posing(character)
            && self
                .joint_pose(character, joint)
                .is_some_and(|pose| pose.can_undo(attribute))
    }

    pub fn can_redo_joint<C: Character + ?Sized>(
        &self,
        character: &C,
        joint: &str,
        attribute: TransformAttribute,
    ) -> bool {
        self.is_posing(character)
            && self
                .joint_pose(character, joint)
                .is_some_and(|pose| pose.can_redo(attribute))
    }

    /// Rotation of a joint as UI Euler angles
    ///
    /// `for_recapture` reads the value applied to the live character instead
    /// of the pending target.
    pub fn joint_rotation<C: Character + ?Sized>(
        &self,
        character: &C,
        joint: &str,
        mapping: AxisMapping,
        for_recapture: bool,
    ) -> DVec3 {
        self.joint_pose(character, joint)
            .map_or(DVec3::ZERO, |pose| {
                let rotation = if for_recapture {
                    pose.current_rotation()
                } else {
                    pose.target_rotation()
                };
                mapping.to_ui(rotation)
            })
    }

    pub fn joint_position<C: Character + ?Sized>(
        &self,
        character: &C,
        joint: &str,
        for_recapture: bool,
    ) -> DVec3 {
        self.joint_pose(character, joint)
            .map_or(DVec3::ZERO, |pose| {
                if for_recapture {
                    pose.current_position()
                } else {
                    pose.target_position()
                }
            })
    }

    pub fn joint_scale<C: Character + ?Sized>(
        &self,
        character: &C,
        joint: &str,
        for_recapture: bool,
    ) -> DVec3 {
        self.joint_pose(character, joint)
            .map_or(DVec3::ZERO, |pose| {
                if for_recapture {
                    pose.current_scale()
                } else {
                    pose.target_scale()
                }
            })
    }

    /// Rotate a joint from UI Euler angles (radians)
    pub fn set_joint_rotation<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        ui_euler: DVec3,
        style: DeflectionStyle,
        mapping: AxisMapping,
    ) {
        let rotation = mapping.to_internal(ui_euler);
        let Some((index, partner)) = self.resolve(joint) else {
            return;
        };
        let Some(session) = self.session_mut(character, false) else {
            return;
        };
        let Some(pose) = session.poses.get_mut(&index) else {
            return;
        };

        if style == DeflectionStyle::Delta {
            pose.apply_delta_rotation(rotation);
            return;
        }
        pose.set_target_rotation(rotation);

        if let PartnerEdit::Set(partner_rotation) = style.partner_rotation(rotation)
            && let Some(partner) = session.pose_mut(partner)
        {
            partner.set_target_rotation(partner_rotation);
        }
    }

    pub fn set_joint_position<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        position: DVec3,
        style: DeflectionStyle,
    ) {
        let Some((index, partner)) = self.resolve(joint) else {
            return;
        };
        let Some(session) = self.session_mut(character, false) else {
            return;
        };
        let Some(previous) = session.poses.get(&index).map(JointPose::target_position) else {
            return;
        };

        if style == DeflectionStyle::None {
            if let Some(pose) = session.poses.get_mut(&index) {
                pose.set_target_position(position);
            }
            return;
        }

        // the paired styles move both joints or neither
        let Some(partner_pose) = session.pose_mut(partner) else {
            trace!("not moving {joint}: no posed mirror partner");
            return;
        };
        let PartnerEdit::Set(partner_position) =
            style.partner_position(previous, position, partner_pose.target_position())
        else {
            trace!("{style:?} does not move positions");
            return;
        };
        partner_pose.set_target_position(partner_position);

        if let Some(pose) = session.poses.get_mut(&index) {
            pose.set_target_position(position);
        }
    }

    pub fn set_joint_scale<C: Character + ?Sized>(
        &mut self,
        character: &C,
        joint: &str,
        scale: DVec3,
        style: DeflectionStyle,
    ) {
        let Some((index, partner)) = self.resolve(joint) else {
            return;
        };
        let Some(session) = self.session_mut(character, false) else {
            return;
        };
        let Some(pose) = session.poses.get_mut(&index) else {
            return;
        };

        pose.set_target_scale(scale);

        if let PartnerEdit::Set(partner_scale) = style.partner_scale(scale)
            && let Some(partner) = session.pose_mut(partner)
        {
            partner.set_target_scale(partner_scale);
        }
    }

    /// Swap mirrored rotations between a joint and its partner
    ///
    /// A joint without a partner has its own rotation mirrored in place.
    pub fn reflect_joint<C: Character + ?Sized>(&mut self, character: &C, joint: &str) {
        let Some((index, partner)) = self.resolve(joint) else {
            return;
        };
        let Some(session) = self.session_mut(character, false) else {
            return;
        };
        if !session.poses.contains_key(&index) {
            return;
        }

        session.reflect(index, partner);
    }

    /// Reflect the whole pose left to right
    ///
    /// Each mirrored pair is reflected once, and only when both sides are
    /// currently posed.
    pub fn flip_entire_pose<C: Character + ?Sized>(&mut self, character: &C) {
        let candidates: Vec<(usize, Option<usize>)> = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, joint)| !joint.dont_flip_on_mirror())
            .map(|(index, _)| (index, self.catalog.mirror_index(index)))
            .collect();

        let Some(session) = self.session_mut(character, true) else {
            return;
        };

        for (index, partner) in candidates {
            if !session.is_posing(index) {
                continue;
            }
            if let Some(partner) = partner
                && !session.is_posing(partner)
            {
                continue;
            }

            session.reflect(index, partner);
        }
    }

    /// Drive the posed joints of the live character toward their targets
    ///
    /// This is the posing motion's frame step. Each posed joint covers
    /// `frame_blend` of the remaining distance and the applied value becomes
    /// the joint's current transform.
    pub fn update<C: Character + ?Sized>(&mut self, character: &mut C) {
        let blend = self.config.frame_blend;
        let Some(session) = self.session_mut(&*character, true) else {
            return;
        };

        for index in &session.posed {
            let Some(pose) = session.poses.get_mut(index) else {
                continue;
            };
            let Some(live) = character.joint_mut(pose.name()) else {
                continue;
            };

            *live = blend_toward(*live, *pose.target(), blend);
            pose.refresh_current(*live);
        }
    }

    /// Write the pose as a single-frame BVH file
    ///
    /// Returns false if writing failed; the cause is logged.
    pub fn write_pose_as_bvh<W: Write, C: Character + ?Sized>(
        &self,
        writer: &mut W,
        character: &C,
    ) -> bool {
        match BvhWriter::new(self, character).write(writer) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to write BVH for {}: {err}", character.id());
                false
            }
        }
    }

    fn create_session<C: Character + ?Sized>(&mut self, character: &mut C) -> Option<MotionId> {
        let motion = MotionId(self.next_motion);
        self.next_motion += 1;

        if !character.register_motion(motion) {
            warn!("{} refused to register {motion}", character.id());
            return None;
        }

        let mut poses = HashMap::new();
        let mut posed = BTreeSet::new();
        for (index, joint) in self.catalog.iter().enumerate() {
            if let Some(rest) = character.joint(joint.name()) {
                poses.insert(
                    index,
                    JointPose::new(joint.name(), rest, self.config.history_limit),
                );
                posed.insert(index);
            }
        }

        debug!(
            "created pose session for {} with {motion}, {} joints",
            character.id(),
            poses.len()
        );
        self.sessions.insert(
            character.id(),
            PoseSession {
                motion,
                poses,
                posed,
            },
        );
        Some(motion)
    }

    fn resolve(&self, joint: &str) -> Option<(usize, Option<usize>)> {
        let Some(index) = self.catalog.index_of(joint) else {
            trace!("ignoring unknown joint {joint}");
            return None;
        };
        let partner = self.catalog.mirror_index(index);
        Some((index, partner))
    }

    fn session_mut<C: Character + ?Sized>(
        &mut self,
        character: &C,
        require_active: bool,
    ) -> Option<&mut PoseSession> {
        if !self.is_character_safe_to_use(character) {
            trace!("ignoring edit of {}: character is not usable", character.id());
            return None;
        }

        let session = self.sessions.get_mut(&character.id())?;
        if require_active && !character.is_motion_active(session.motion) {
            return None;
        }
        Some(session)
    }

    fn with_joint_and_partner<C, F>(
        &mut self,
        character: &C,
        joint: &str,
        require_active: bool,
        propagate: bool,
        mut edit: F,
    ) where
        C: Character + ?Sized,
        F: FnMut(&mut JointPose),
    {
        let Some((index, partner)) = self.resolve(joint) else {
            return;
        };
        let Some(session) = self.session_mut(character, require_active) else {
            return;
        };
        let Some(pose) = session.poses.get_mut(&index) else {
            return;
        };

        edit(pose);

        if propagate && let Some(partner) = session.pose_mut(partner) {
            edit(partner);
        }
    }
}

fn blend_toward(live: JointTransform, target: JointTransform, blend: f64) -> JointTransform {
    if blend >= 1.0 {
        return target;
    }

    JointTransform {
        position: live.position.lerp(target.position, blend),
        rotation: slerp(live.rotation, target.rotation, blend),
        scale: live.scale.lerp(target.scale, blend),
    }
}

fn slerp(from: DQuat, to: DQuat, t: f64) -> DQuat {
    from.slerp(to, t).normalize()
}
