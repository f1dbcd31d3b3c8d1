//! Per-joint pose record with bounded undo/redo history
//!
//! A [`JointPose`] keeps three transforms for one joint:
//!
//! - the *beginning* transform, captured from the skeleton when posing
//!   started and never changed afterwards;
//! - the *current* transform, the value last applied to the live character;
//! - the *target* transform, the goal the editing layer sets and the posing
//!   motion drives the joint toward each frame.
//!
//! Every target edit goes through an [`EditHistory`] for its attribute
//! family, so rotation, position and scale undo independently.

use std::collections::VecDeque;
use std::fmt;

use glam::{DQuat, DVec3};

use crate::character::JointTransform;

/// Default bound on each undo and redo stack
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// The attribute families that carry their own history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformAttribute {
    Rotation,
    Position,
    Scale,
}

impl TransformAttribute {
    pub const ALL: [Self; 3] = [Self::Rotation, Self::Position, Self::Scale];
}

impl fmt::Display for TransformAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotation => f.write_str("rotation"),
            Self::Position => f.write_str("position"),
            Self::Scale => f.write_str("scale"),
        }
    }
}

/// Bounded undo and redo stacks of earlier target values
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    undo: VecDeque<T>,
    redo: VecDeque<T>,
    limit: usize,
}

impl<T: Copy + PartialEq> EditHistory<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Replace `*target` with `value`, recording the previous value
    ///
    /// Every call records the previous value, even when it equals `value`.
    /// Setting the most recently undone value consumes that redo entry
    /// instead of discarding the redo stack.
    pub fn set(&mut self, target: &mut T, value: T) {
        if self.redo.back() == Some(&value) {
            self.redo.pop_back();
        } else {
            self.redo.clear();
        }

        Self::push_bounded(&mut self.undo, *target, self.limit);
        *target = value;
    }

    /// Step `*target` back; false when there is nothing to undo
    pub fn undo(&mut self, target: &mut T) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };

        Self::push_bounded(&mut self.redo, *target, self.limit);
        *target = previous;
        true
    }

    /// Step `*target` forward again; false when there is nothing to redo
    pub fn redo(&mut self, target: &mut T) -> bool {
        let Some(next) = self.redo.pop_back() else {
            return false;
        };

        Self::push_bounded(&mut self.undo, *target, self.limit);
        *target = next;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    fn push_bounded(stack: &mut VecDeque<T>, value: T, limit: usize) {
        stack.push_back(value);
        while stack.len() > limit {
            stack.pop_front();
        }
    }
}

/// Beginning, current and target transforms of one posed joint
#[derive(Debug, Clone)]
pub struct JointPose {
    name: String,
    beginning: JointTransform,
    current: JointTransform,
    target: JointTransform,
    rotations: EditHistory<DQuat>,
    positions: EditHistory<DVec3>,
    scales: EditHistory<DVec3>,
}

impl JointPose {
    /// Start posing a joint from its rest transform
    pub fn new(name: impl Into<String>, beginning: JointTransform, history_limit: usize) -> Self {
        Self {
            name: name.into(),
            beginning,
            current: beginning,
            target: beginning,
            rotations: EditHistory::new(history_limit),
            positions: EditHistory::new(history_limit),
            scales: EditHistory::new(history_limit),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn beginning(&self) -> &JointTransform {
        &self.beginning
    }

    pub fn current(&self) -> &JointTransform {
        &self.current
    }

    pub fn target(&self) -> &JointTransform {
        &self.target
    }

    pub fn beginning_rotation(&self) -> DQuat {
        self.beginning.rotation
    }

    pub fn beginning_position(&self) -> DVec3 {
        self.beginning.position
    }

    pub fn beginning_scale(&self) -> DVec3 {
        self.beginning.scale
    }

    pub fn current_rotation(&self) -> DQuat {
        self.current.rotation
    }

    pub fn current_position(&self) -> DVec3 {
        self.current.position
    }

    pub fn current_scale(&self) -> DVec3 {
        self.current.scale
    }

    pub fn target_rotation(&self) -> DQuat {
        self.target.rotation
    }

    pub fn target_position(&self) -> DVec3 {
        self.target.position
    }

    pub fn target_scale(&self) -> DVec3 {
        self.target.scale
    }

    pub fn set_target_rotation(&mut self, rotation: DQuat) {
        self.rotations.set(&mut self.target.rotation, rotation);
    }

    pub fn set_target_position(&mut self, position: DVec3) {
        self.positions.set(&mut self.target.position, position);
    }

    pub fn set_target_scale(&mut self, scale: DVec3) {
        self.scales.set(&mut self.target.scale, scale);
    }

    /// Compose `delta` onto the target rotation without recording history
    pub fn apply_delta_rotation(&mut self, delta: DQuat) {
        self.target.rotation = (self.target.rotation * delta).normalize();
    }

    /// Undo the last edit of one attribute; false if there was none
    pub fn undo(&mut self, attribute: TransformAttribute) -> bool {
        match attribute {
            TransformAttribute::Rotation => self.rotations.undo(&mut self.target.rotation),
            TransformAttribute::Position => self.positions.undo(&mut self.target.position),
            TransformAttribute::Scale => self.scales.undo(&mut self.target.scale),
        }
    }

    /// Redo the last undone edit of one attribute; false if there was none
    pub fn redo(&mut self, attribute: TransformAttribute) -> bool {
        match attribute {
            TransformAttribute::Rotation => self.rotations.redo(&mut self.target.rotation),
            TransformAttribute::Position => self.positions.redo(&mut self.target.position),
            TransformAttribute::Scale => self.scales.redo(&mut self.target.scale),
        }
    }

    pub fn can_undo(&self, attribute: TransformAttribute) -> bool {
        match attribute {
            TransformAttribute::Rotation => self.rotations.can_undo(),
            TransformAttribute::Position => self.positions.can_undo(),
            TransformAttribute::Scale => self.scales.can_undo(),
        }
    }

    pub fn can_redo(&self, attribute: TransformAttribute) -> bool {
        match attribute {
            TransformAttribute::Rotation => self.rotations.can_redo(),
            TransformAttribute::Position => self.positions.can_redo(),
            TransformAttribute::Scale => self.scales.can_redo(),
        }
    }

    /// Set one attribute of the target back to its beginning value
    pub fn reset(&mut self, attribute: TransformAttribute) {
        match attribute {
            TransformAttribute::Rotation => self.set_target_rotation(self.beginning.rotation),
            TransformAttribute::Position => self.set_target_position(self.beginning.position),
            TransformAttribute::Scale => self.set_target_scale(self.beginning.scale),
        }
    }

    /// Record the value the animation system applied this frame
    pub fn refresh_current(&mut self, current: JointTransform) {
        self.current = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pose() -> JointPose {
        JointPose::new(
            "mChest",
            JointTransform::from_position(DVec3::new(-0.015, 0.0, 0.205)),
            DEFAULT_HISTORY_LIMIT,
        )
    }

    #[test]
    fn test_new_pose_starts_at_beginning() {
        let pose = pose();
        assert_eq!(pose.target(), pose.beginning());
        assert_eq!(pose.current(), pose.beginning());
        for attribute in TransformAttribute::ALL {
            assert!(!pose.can_undo(attribute));
            assert!(!pose.can_redo(attribute));
        }
    }

    #[test]
    fn test_undo_then_redo_rotation() {
        let mut pose = pose();
        let v1 = DQuat::from_rotation_x(0.3);
        let v2 = DQuat::from_rotation_y(0.6);

        pose.set_target_rotation(v1);
        pose.set_target_rotation(v2);
        assert!(!pose.can_redo(TransformAttribute::Rotation));

        assert!(pose.undo(TransformAttribute::Rotation));
        assert_eq!(pose.target_rotation(), v1);
        assert!(pose.can_redo(TransformAttribute::Rotation));

        assert!(pose.redo(TransformAttribute::Rotation));
        assert_eq!(pose.target_rotation(), v2);
        assert!(!pose.can_redo(TransformAttribute::Rotation));
    }

    #[test]
    fn test_fresh_edit_clears_redo() {
        let mut pose = pose();
        pose.set_target_rotation(DQuat::from_rotation_x(0.1));
        pose.set_target_rotation(DQuat::from_rotation_x(0.2));
        pose.undo(TransformAttribute::Rotation);
        assert!(pose.can_redo(TransformAttribute::Rotation));

        pose.set_target_rotation(DQuat::from_rotation_z(0.9));
        assert!(!pose.can_redo(TransformAttribute::Rotation));
    }

    #[test]
    fn test_setting_undone_value_acts_as_redo() {
        let mut pose = pose();
        let v1 = DVec3::new(0.1, 0.0, 0.0);
        let v2 = DVec3::new(0.2, 0.0, 0.0);
        let v3 = DVec3::new(0.3, 0.0, 0.0);
        pose.set_target_position(v1);
        pose.set_target_position(v2);
        pose.set_target_position(v3);
        pose.undo(TransformAttribute::Position);
        pose.undo(TransformAttribute::Position);

        pose.set_target_position(v2);
        assert!(pose.can_redo(TransformAttribute::Position));
        assert!(pose.redo(TransformAttribute::Position));
        assert_eq!(pose.target_position(), v3);
    }

    #[test]
    fn test_setting_same_value_is_still_recorded() {
        let mut pose = pose();
        let scale = DVec3::splat(1.5);
        pose.set_target_scale(scale);
        pose.set_target_scale(scale);

        assert!(pose.undo(TransformAttribute::Scale));
        assert_eq!(pose.target_scale(), scale);
        assert!(pose.undo(TransformAttribute::Scale));
        assert_eq!(pose.target_scale(), DVec3::ONE);
        assert!(!pose.can_undo(TransformAttribute::Scale));
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut pose = pose();
        let before = *pose.target();
        assert!(!pose.undo(TransformAttribute::Position));
        assert!(!pose.redo(TransformAttribute::Position));
        assert_eq!(*pose.target(), before);
    }

    #[test]
    fn test_attributes_keep_separate_histories() {
        let mut pose = pose();
        pose.set_target_rotation(DQuat::from_rotation_x(0.4));
        pose.set_target_scale(DVec3::splat(2.0));

        assert!(pose.undo(TransformAttribute::Scale));
        assert_eq!(pose.target_rotation(), DQuat::from_rotation_x(0.4));
        assert!(!pose.can_undo(TransformAttribute::Scale));
        assert!(pose.can_undo(TransformAttribute::Rotation));
    }

    #[test]
    fn test_delta_rotation_skips_history() {
        let mut pose = pose();
        pose.apply_delta_rotation(DQuat::from_rotation_z(0.25));
        pose.apply_delta_rotation(DQuat::from_rotation_z(0.25));

        let expected = DQuat::from_rotation_z(0.5);
        assert!(pose.target_rotation().dot(expected).abs() > 1.0 - 1e-12);
        assert!(!pose.can_undo(TransformAttribute::Rotation));
    }

    #[test]
    fn test_reset_is_undoable() {
        let mut pose = pose();
        let moved = DVec3::new(0.5, 0.5, 0.5);
        pose.set_target_position(moved);
        pose.reset(TransformAttribute::Position);
        assert_eq!(pose.target_position(), pose.beginning_position());

        pose.undo(TransformAttribute::Position);
        assert_eq!(pose.target_position(), moved);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = EditHistory::new(3);
        let mut value = 0_i32;
        for next in 1..=10 {
            history.set(&mut value, next);
        }
        assert_eq!(history.undo_len(), 3);

        while history.undo(&mut value) {}
        assert_eq!(value, 7);
        assert_eq!(history.redo_len(), 3);
    }

    #[test]
    fn test_refresh_current_leaves_target() {
        let mut pose = pose();
        let live = JointTransform::from_position(DVec3::new(1.0, 2.0, 3.0));
        pose.refresh_current(live);
        assert_eq!(*pose.current(), live);
        assert_eq!(pose.target(), pose.beginning());
    }
}
