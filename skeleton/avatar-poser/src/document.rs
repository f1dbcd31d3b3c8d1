//! JSON pose documents
//!
//! A [`PoseDocument`] lists joints by name with any of a rotation, a
//! position and a scale. Rotations are UI Euler angles in degrees, read with
//! the canonical axis mapping; positions and scales are joint-local.
//!
//! ```json
//! {
//!   "description": "wave",
//!   "joints": {
//!     "mShoulderLeft": { "rotation": [0.0, 0.0, 45.0] },
//!     "mPelvis": { "position": [0.0, 0.0, 1.1] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glam::DVec3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::animator::PoseAnimator;
use crate::axis::AxisMapping;
use crate::character::{Character, JointTransform};
use crate::error::Result;
use crate::style::DeflectionStyle;

/// What a document says about one joint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointEntry {
    /// Euler angles in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,
}

impl JointEntry {
    pub fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.position.is_none() && self.scale.is_none()
    }
}

/// A named set of joint edits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub joints: BTreeMap<String, JointEntry>,
}

impl PoseDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut json = self.to_json_string()?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }

    /// Set every listed joint on a posed character
    ///
    /// Edits use [`DeflectionStyle::None`], so each joint gets exactly the
    /// listed values. Names the catalog does not know are skipped with a
    /// warning. Returns the number of joints that were applied.
    pub fn apply<C: Character + ?Sized>(&self, animator: &mut PoseAnimator, character: &C) -> usize {
        if animator.session(character).is_none() {
            debug!("{} has no pose session, nothing applied", character.id());
            return 0;
        }

        let mut applied = 0;
        for (name, entry) in &self.joints {
            if animator.catalog().get(name).is_none() {
                warn!("skipping unknown joint {name}");
                continue;
            }
            if animator.joint_pose(character, name).is_none() {
                debug!("{} has no joint {name}", character.id());
                continue;
            }

            if let Some(degrees) = entry.rotation {
                animator.set_joint_rotation(
                    character,
                    name,
                    degrees_to_radians(degrees),
                    DeflectionStyle::None,
                    AxisMapping::CANONICAL,
                );
            }
            if let Some(position) = entry.position {
                animator.set_joint_position(
                    character,
                    name,
                    DVec3::from_array(position),
                    DeflectionStyle::None,
                );
            }
            if let Some(scale) = entry.scale {
                animator.set_joint_scale(
                    character,
                    name,
                    DVec3::from_array(scale),
                    DeflectionStyle::None,
                );
            }
            applied += 1;
        }
        applied
    }

    /// Build a document from the session of a character
    ///
    /// Only attributes that differ from the skeleton's rest transform are
    /// listed. `for_recapture` reads the applied values instead of the
    /// pending targets.
    pub fn capture<C: Character + ?Sized>(
        animator: &PoseAnimator,
        character: &C,
        for_recapture: bool,
    ) -> Self {
        let mut joints = BTreeMap::new();

        for joint in animator.catalog() {
            let Some(pose) = animator.joint_pose(character, joint.name()) else {
                continue;
            };
            let rest = pose.beginning();
            let posed: &JointTransform = if for_recapture {
                pose.current()
            } else {
                pose.target()
            };

            let entry = JointEntry {
                rotation: (posed.rotation != rest.rotation).then(|| {
                    radians_to_degrees(AxisMapping::CANONICAL.to_ui(posed.rotation))
                }),
                position: (posed.position != rest.position).then(|| posed.position.to_array()),
                scale: (posed.scale != rest.scale).then(|| posed.scale.to_array()),
            };
            if !entry.is_empty() {
                joints.insert(joint.name().to_string(), entry);
            }
        }

        Self {
            description: None,
            joints,
        }
    }
}

fn degrees_to_radians(degrees: [f64; 3]) -> DVec3 {
    DVec3::new(
        degrees[0].to_radians(),
        degrees[1].to_radians(),
        degrees[2].to_radians(),
    )
}

fn radians_to_degrees(radians: DVec3) -> [f64; 3] {
    [
        radians.x.to_degrees(),
        radians.y.to_degrees(),
        radians.z.to_degrees(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterId, RegionId, StandaloneCharacter};
    use pretty_assertions::assert_eq;

    const WAVE: &str = r#"{
        "description": "wave",
        "joints": {
            "mShoulderLeft": { "rotation": [0.0, 0.0, 45.0] },
            "mpelvis": { "position": [0.0, 0.0, 1.1] },
            "mTail": { "rotation": [10.0, 0.0, 0.0] }
        }
    }"#;

    fn posing() -> (PoseAnimator, StandaloneCharacter) {
        let mut animator = PoseAnimator::default();
        let mut avatar = StandaloneCharacter::with_default_skeleton(CharacterId(1), RegionId(0));
        assert!(animator.try_start_posing(&mut avatar));
        (animator, avatar)
    }

    fn assert_close(actual: [f64; 3], expected: [f64; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_parse_optional_fields() {
        let document = PoseDocument::from_json_str(WAVE).expect("document parses");
        assert_eq!(document.description.as_deref(), Some("wave"));
        assert_eq!(document.joints.len(), 3);

        let pelvis = document.joints["mpelvis"];
        assert_eq!(pelvis.rotation, None);
        assert_eq!(pelvis.position, Some([0.0, 0.0, 1.1]));

        let empty = PoseDocument::from_json_str("{}").expect("empty document parses");
        assert!(empty.joints.is_empty());
    }

    #[test]
    fn test_apply_skips_unknown_joints() {
        let (mut animator, avatar) = posing();
        let document = PoseDocument::from_json_str(WAVE).expect("document parses");

        assert_eq!(document.apply(&mut animator, &avatar), 2);

        let shoulder = animator.joint_rotation(&avatar, "mShoulderLeft", AxisMapping::CANONICAL, false);
        assert!((shoulder.z - 45.0_f64.to_radians()).abs() < 1e-9);
        assert_eq!(
            animator.joint_position(&avatar, "mPelvis", false),
            DVec3::new(0.0, 0.0, 1.1)
        );
        // style None leaves the partner alone
        let partner = animator.joint_rotation(&avatar, "mShoulderRight", AxisMapping::CANONICAL, false);
        assert_eq!(partner, DVec3::ZERO);
    }

    #[test]
    fn test_apply_without_session_does_nothing() {
        let mut animator = PoseAnimator::default();
        let avatar = StandaloneCharacter::with_default_skeleton(CharacterId(1), RegionId(0));
        let document = PoseDocument::from_json_str(WAVE).expect("document parses");

        assert_eq!(document.apply(&mut animator, &avatar), 0);
    }

    #[test]
    fn test_capture_lists_changed_attributes() {
        let (mut animator, avatar) = posing();
        let document = PoseDocument::from_json_str(WAVE).expect("document parses");
        document.apply(&mut animator, &avatar);

        let captured = PoseDocument::capture(&animator, &avatar, false);
        assert_eq!(captured.joints.len(), 2);

        let shoulder = captured.joints["mShoulderLeft"];
        assert_close(shoulder.rotation.expect("rotation"), [0.0, 0.0, 45.0]);
        assert_eq!(shoulder.position, None);
        assert_eq!(shoulder.scale, None);

        let pelvis = captured.joints["mPelvis"];
        assert_eq!(pelvis.rotation, None);
        assert_eq!(pelvis.position, Some([0.0, 0.0, 1.1]));

        // nothing applied to the live character yet
        let recaptured = PoseDocument::capture(&animator, &avatar, true);
        assert!(recaptured.joints.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let mut document = PoseDocument::default();
        document.joints.insert(
            "mHead".to_string(),
            JointEntry {
                scale: Some([1.2, 1.2, 1.2]),
                ..JointEntry::default()
            },
        );

        let file = tempfile::NamedTempFile::new().expect("temp file");
        document.save(file.path()).expect("document saves");

        let json = fs::read_to_string(file.path()).expect("read back");
        assert!(!json.contains("rotation"));
        assert_eq!(PoseDocument::load(file.path()).expect("document loads"), document);
    }
}
