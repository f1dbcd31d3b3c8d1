//! Single-frame BVH export of a posed character
//!
//! The hierarchy starts at the catalog's whole-avatar joint and follows each
//! joint's BVH children depth first. Offsets are the joints' target
//! positions. The one motion frame carries the root's recaptured position and
//! every joint's recaptured rotation, always extracted in the canonical axis
//! order and written as Y, Z, X degrees, whatever UI mapping the joint uses.
//!
//! Field order, tab indentation and six-decimal rounding are fixed; external
//! BVH tools read this exact layout.

use std::io::Write;

use crate::animator::PoseAnimator;
use crate::axis::AxisMapping;
use crate::character::Character;
use crate::error::{PoserError, Result};
use crate::joint::{BoneType, PoserJoint};

use glam::DVec3;

const ROOT_CHANNELS: &str = "CHANNELS 6 Xposition Yposition Zposition Xrotation Yrotation Zrotation";
const JOINT_CHANNELS: &str = "CHANNELS 3 Xrotation Yrotation Zrotation";

/// Writes the pose of one character as BVH
pub struct BvhWriter<'a, C: Character + ?Sized> {
    animator: &'a PoseAnimator,
    character: &'a C,
}

impl<'a, C: Character + ?Sized> BvhWriter<'a, C> {
    pub fn new(animator: &'a PoseAnimator, character: &'a C) -> Self {
        Self {
            animator,
            character,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let root = self
            .animator
            .catalog()
            .bvh_root()
            .ok_or_else(|| PoserError::UnknownJoint("whole-avatar root".to_string()))?;

        writeln!(writer, "HIERARCHY")?;
        self.write_fragment(writer, root, 0)?;
        writeln!(writer, "MOTION")?;
        writeln!(writer, "Frames:    1")?;
        writeln!(writer, "Frame Time: 1")?;
        self.write_motion(writer, root)?;
        writeln!(writer)?;
        writer.flush()?;

        Ok(())
    }

    /// Render into a string
    pub fn to_bvh_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|err| PoserError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
    }

    fn write_fragment<W: Write>(&self, writer: &mut W, joint: &PoserJoint, depth: usize) -> Result<()> {
        let offset = xyz(self.position(joint, false));
        let indent = tabs(depth);
        let inner = tabs(depth + 1);

        if joint.bone_type() == BoneType::WholeAvatar {
            writeln!(writer, "ROOT {}", joint.name())?;
            writeln!(writer, "{{")?;
            writeln!(writer, "{inner}OFFSET {offset}")?;
            writeln!(writer, "{inner}{ROOT_CHANNELS}")?;
        } else {
            writeln!(writer, "{indent}JOINT {}", joint.name())?;
            writeln!(writer, "{indent}{{")?;
            writeln!(writer, "{inner}OFFSET {offset}")?;
            writeln!(writer, "{inner}{JOINT_CHANNELS}")?;
        }

        if joint.bvh_children().is_empty() {
            writeln!(writer, "{inner}End Site")?;
            writeln!(writer, "{inner}{{")?;
            writeln!(writer, "{}OFFSET {offset}", tabs(depth + 2))?;
            writeln!(writer, "{inner}}}")?;
        } else {
            for child in self.children(joint) {
                self.write_fragment(writer, child, depth + 1)?;
            }
        }

        writeln!(writer, "{indent}}}")?;
        Ok(())
    }

    fn write_motion<W: Write>(&self, writer: &mut W, joint: &PoserJoint) -> Result<()> {
        let rotation = self.animator.joint_rotation(
            self.character,
            joint.name(),
            AxisMapping::CANONICAL,
            true,
        );

        if joint.bone_type() == BoneType::WholeAvatar {
            write!(writer, "{} {}", xyz(self.position(joint, true)), yzx_degrees(rotation))?;
        } else {
            write!(writer, " {}", yzx_degrees(rotation))?;
        }

        for child in self.children(joint) {
            self.write_motion(writer, child)?;
        }
        Ok(())
    }

    fn position(&self, joint: &PoserJoint, for_recapture: bool) -> DVec3 {
        self.animator
            .joint_position(self.character, joint.name(), for_recapture)
    }

    fn children<'j>(&'j self, joint: &'j PoserJoint) -> impl Iterator<Item = &'j PoserJoint> {
        let catalog = self.animator.catalog();
        joint
            .bvh_children()
            .iter()
            .filter_map(move |name| catalog.get(name))
    }
}

fn tabs(count: usize) -> String {
    "\t".repeat(count)
}

fn fixed(value: f64) -> String {
    format!("{value:.6}")
}

fn xyz(v: DVec3) -> String {
    format!("{} {} {}", fixed(v.x), fixed(v.y), fixed(v.z))
}

fn yzx_degrees(radians: DVec3) -> String {
    format!(
        "{} {} {}",
        fixed(radians.y.to_degrees()),
        fixed(radians.z.to_degrees()),
        fixed(radians.x.to_degrees())
    )
}
