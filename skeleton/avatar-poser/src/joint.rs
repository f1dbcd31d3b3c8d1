//! Poseable joint identities and the catalog that indexes them
//!
//! A [`PoserJoint`] names a joint of the avatar skeleton (`mChest`,
//! `mShoulderLeft`, ...) together with its mirror partner, its bone
//! category, the default UI axis mapping and its children in the exported
//! BVH hierarchy. The [`JointCatalog`] owns the full set and answers
//! case-insensitive lookups; names are lower-cased into the index once, when
//! the catalog is built.

use std::collections::HashMap;
use std::fmt;

use crate::axis::{AxisMapping, AxisNegation, AxisSwap};
use crate::error::{PoserError, Result};

/// Category of a poseable bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneType {
    /// The joint that moves the whole avatar; the BVH root
    WholeAvatar,
    /// Regular body joint
    Body,
    /// Finger joints
    Hands,
    /// Face-only joints
    Face,
    /// Collision volumes, scaled and moved rather than rotated
    CollisionVolume,
}

impl fmt::Display for BoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WholeAvatar => "whole avatar",
            Self::Body => "body",
            Self::Hands => "hands",
            Self::Face => "face",
            Self::CollisionVolume => "collision volume",
        };
        f.write_str(name)
    }
}

/// A joint the poser knows how to edit
#[derive(Debug, Clone, PartialEq)]
pub struct PoserJoint {
    name: String,
    mirror_name: Option<String>,
    bone_type: BoneType,
    dont_flip_on_mirror: bool,
    bvh_children: Vec<String>,
    axis_mapping: AxisMapping,
}

impl PoserJoint {
    /// Create a joint with no mirror partner and no BVH children
    pub fn new(name: impl Into<String>, bone_type: BoneType) -> Self {
        Self {
            name: name.into(),
            mirror_name: None,
            bone_type,
            dont_flip_on_mirror: false,
            bvh_children: Vec::new(),
            axis_mapping: AxisMapping::CANONICAL,
        }
    }

    /// Set the mirror partner
    ///
    /// When `dont_flip_on_mirror` is set this joint is skipped by whole-pose
    /// flips, so that each pair is reflected once from its other side.
    pub fn with_mirror(mut self, mirror_name: impl Into<String>, dont_flip_on_mirror: bool) -> Self {
        self.mirror_name = Some(mirror_name.into());
        self.dont_flip_on_mirror = dont_flip_on_mirror;
        self
    }

    /// Set the ordered BVH children
    pub fn with_bvh_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bvh_children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default UI axis mapping
    pub fn with_axis_mapping(mut self, axis_mapping: AxisMapping) -> Self {
        self.axis_mapping = axis_mapping;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the mirror partner, if the joint has one
    pub fn mirror_name(&self) -> Option<&str> {
        self.mirror_name.as_deref()
    }

    pub fn bone_type(&self) -> BoneType {
        self.bone_type
    }

    pub fn dont_flip_on_mirror(&self) -> bool {
        self.dont_flip_on_mirror
    }

    pub fn bvh_children(&self) -> &[String] {
        &self.bvh_children
    }

    pub fn axis_mapping(&self) -> AxisMapping {
        self.axis_mapping
    }
}

/// Every joint has at most one BVH parent and following parents always ends
fn check_bvh_forest(joints: &[PoserJoint], index: &HashMap<String, usize>) -> Result<()> {
    let mut parents: Vec<Option<usize>> = vec![None; joints.len()];

    for (position, joint) in joints.iter().enumerate() {
        for child in &joint.bvh_children {
            let Some(&child_index) = index.get(&child.to_lowercase()) else {
                continue;
            };
            if let Some(existing) = parents[child_index]
                && existing != position
            {
                return Err(PoserError::Catalog(format!(
                    "joint {} is a BVH child of both {} and {}",
                    joints[child_index].name, joints[existing].name, joint.name
                )));
            }
            parents[child_index] = Some(position);
        }
    }

    for (position, joint) in joints.iter().enumerate() {
        let mut steps = 0;
        let mut current = parents[position];
        while let Some(parent) = current {
            if parent == position || steps > joints.len() {
                return Err(PoserError::Catalog(format!(
                    "joint {} is its own BVH ancestor",
                    joint.name
                )));
            }
            steps += 1;
            current = parents[parent];
        }
    }

    Ok(())
}

/// Validated set of poseable joints with case-insensitive lookup
#[derive(Debug, Clone)]
pub struct JointCatalog {
    joints: Vec<PoserJoint>,
    index: HashMap<String, usize>,
    root: Option<usize>,
}

impl JointCatalog {
    /// Build and validate a catalog
    ///
    /// Rejects duplicate names (ignoring case), mirror partners or BVH
    /// children that are not in the catalog and more than one whole-avatar
    /// joint. The BVH links must form a forest: no joint may have two
    /// parents and no joint may be its own ancestor.
    pub fn new(joints: Vec<PoserJoint>) -> Result<Self> {
        let mut index = HashMap::with_capacity(joints.len());
        let mut root: Option<usize> = None;

        for (position, joint) in joints.iter().enumerate() {
            if index.insert(joint.name.to_lowercase(), position).is_some() {
                return Err(PoserError::Catalog(format!(
                    "duplicate joint name: {}",
                    joint.name
                )));
            }

            if joint.bone_type == BoneType::WholeAvatar {
                if let Some(existing) = root {
                    return Err(PoserError::Catalog(format!(
                        "more than one whole-avatar joint: {} and {}",
                        joints[existing].name, joint.name
                    )));
                }
                root = Some(position);
            }
        }

        for joint in &joints {
            if let Some(mirror) = &joint.mirror_name
                && !index.contains_key(&mirror.to_lowercase())
            {
                return Err(PoserError::Catalog(format!(
                    "joint {} mirrors unknown joint {}",
                    joint.name, mirror
                )));
            }

            for child in &joint.bvh_children {
                if !index.contains_key(&child.to_lowercase()) {
                    return Err(PoserError::Catalog(format!(
                        "joint {} has unknown BVH child {}",
                        joint.name, child
                    )));
                }
            }
        }

        check_bvh_forest(&joints, &index)?;

        Ok(Self {
            joints,
            index,
            root,
        })
    }

    /// The standard avatar skeleton
    pub fn second_life() -> Self {
        Self::from_validated(second_life_joints())
    }

    fn from_validated(joints: Vec<PoserJoint>) -> Self {
        let index = joints
            .iter()
            .enumerate()
            .map(|(position, joint)| (joint.name.to_lowercase(), position))
            .collect();
        let root = joints
            .iter()
            .position(|joint| joint.bone_type == BoneType::WholeAvatar);

        Self {
            joints,
            index,
            root,
        }
    }

    /// Look a joint up by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&PoserJoint> {
        self.index_of(name).map(|position| &self.joints[position])
    }

    /// Position of a joint in the catalog, ignoring case
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    /// The mirror partner of `joint`, if it has one
    pub fn mirror_of(&self, joint: &PoserJoint) -> Option<&PoserJoint> {
        joint.mirror_name().and_then(|name| self.get(name))
    }

    /// Catalog position of the mirror partner of the joint at `index`
    pub fn mirror_index(&self, index: usize) -> Option<usize> {
        self.joints
            .get(index)
            .and_then(PoserJoint::mirror_name)
            .and_then(|name| self.index_of(name))
    }

    /// Whole-avatar joint the BVH hierarchy starts from
    pub fn bvh_root(&self) -> Option<&PoserJoint> {
        self.root.map(|position| &self.joints[position])
    }

    /// Joints of one category, in catalog order
    pub fn of_type(&self, bone_type: BoneType) -> impl Iterator<Item = &PoserJoint> {
        self.joints
            .iter()
            .filter(move |joint| joint.bone_type == bone_type)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoserJoint> {
        self.joints.iter()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

impl Default for JointCatalog {
    fn default() -> Self {
        Self::second_life()
    }
}

impl<'a> IntoIterator for &'a JointCatalog {
    type Item = &'a PoserJoint;
    type IntoIter = std::slice::Iter<'a, PoserJoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.joints.iter()
    }
}

/// A left/right pair; the right side is the one skipped by whole-pose flips
fn pair(
    left: &str,
    right: &str,
    bone_type: BoneType,
    left_children: &[&str],
    right_children: &[&str],
    mapping: AxisMapping,
) -> [PoserJoint; 2] {
    [
        PoserJoint::new(left, bone_type)
            .with_mirror(right, false)
            .with_bvh_children(left_children.iter().copied())
            .with_axis_mapping(mapping),
        PoserJoint::new(right, bone_type)
            .with_mirror(left, true)
            .with_bvh_children(right_children.iter().copied())
            .with_axis_mapping(mapping),
    ]
}

fn second_life_joints() -> Vec<PoserJoint> {
    use BoneType::{Body, CollisionVolume, Face, Hands, WholeAvatar};

    let spine = AxisMapping::new(AxisSwap::YawAndRoll, AxisNegation::PITCH);
    let arm = AxisMapping::new(AxisSwap::YawAndPitch, AxisNegation::empty());
    let leg = AxisMapping::new(AxisSwap::YawAndRoll, AxisNegation::PITCH);
    let finger = AxisMapping::new(AxisSwap::YawAndPitch, AxisNegation::ROLL);
    let face = AxisMapping::new(AxisSwap::YawAndRoll, AxisNegation::empty());

    let mut joints = vec![
        PoserJoint::new("mPelvis", WholeAvatar)
            .with_bvh_children(["mTorso", "mHipLeft", "mHipRight"])
            .with_axis_mapping(spine),
        PoserJoint::new("mTorso", Body)
            .with_bvh_children(["mChest"])
            .with_axis_mapping(spine),
        PoserJoint::new("mChest", Body)
            .with_bvh_children(["mNeck", "mCollarLeft", "mCollarRight"])
            .with_axis_mapping(spine),
        PoserJoint::new("mNeck", Body)
            .with_bvh_children(["mHead"])
            .with_axis_mapping(spine),
        PoserJoint::new("mHead", Body).with_axis_mapping(spine),
    ];

    joints.extend(pair(
        "mCollarLeft",
        "mCollarRight",
        Body,
        &["mShoulderLeft"],
        &["mShoulderRight"],
        arm,
    ));
    joints.extend(pair(
        "mShoulderLeft",
        "mShoulderRight",
        Body,
        &["mElbowLeft"],
        &["mElbowRight"],
        arm,
    ));
    joints.extend(pair(
        "mElbowLeft",
        "mElbowRight",
        Body,
        &["mWristLeft"],
        &["mWristRight"],
        arm,
    ));
    joints.extend(pair("mWristLeft", "mWristRight", Body, &[], &[], arm));
    joints.extend(pair(
        "mHipLeft",
        "mHipRight",
        Body,
        &["mKneeLeft"],
        &["mKneeRight"],
        leg,
    ));
    joints.extend(pair(
        "mKneeLeft",
        "mKneeRight",
        Body,
        &["mAnkleLeft"],
        &["mAnkleRight"],
        leg,
    ));
    joints.extend(pair(
        "mAnkleLeft",
        "mAnkleRight",
        Body,
        &["mFootLeft"],
        &["mFootRight"],
        leg,
    ));
    joints.extend(pair(
        "mFootLeft",
        "mFootRight",
        Body,
        &["mToeLeft"],
        &["mToeRight"],
        leg,
    ));
    joints.extend(pair("mToeLeft", "mToeRight", Body, &[], &[], leg));
    joints.extend(pair("mEyeLeft", "mEyeRight", Body, &[], &[], face));

    for finger_name in ["Thumb", "Index", "Middle", "Ring", "Pinky"] {
        for segment in 1..=3 {
            joints.extend(pair(
                &format!("mHand{finger_name}{segment}Left"),
                &format!("mHand{finger_name}{segment}Right"),
                Hands,
                &[],
                &[],
                finger,
            ));
        }
    }

    joints.push(PoserJoint::new("mFaceJaw", Face).with_axis_mapping(face));
    joints.extend(pair(
        "mFaceEyebrowOuterLeft",
        "mFaceEyebrowOuterRight",
        Face,
        &[],
        &[],
        face,
    ));
    joints.extend(pair(
        "mFaceEyeLidUpperLeft",
        "mFaceEyeLidUpperRight",
        Face,
        &[],
        &[],
        face,
    ));
    joints.extend(pair(
        "mFaceLipCornerLeft",
        "mFaceLipCornerRight",
        Face,
        &[],
        &[],
        face,
    ));

    joints.push(PoserJoint::new("BELLY", CollisionVolume));
    joints.push(PoserJoint::new("BUTT", CollisionVolume));
    joints.extend(pair(
        "LEFT_PEC",
        "RIGHT_PEC",
        CollisionVolume,
        &[],
        &[],
        AxisMapping::CANONICAL,
    ));
    joints.extend(pair(
        "L_HAND",
        "R_HAND",
        CollisionVolume,
        &[],
        &[],
        AxisMapping::CANONICAL,
    ));

    joints
}
