//! Integration tests for pose documents and BVH export.

mod common;

use std::fs::{self, File};
use std::io::BufWriter;

use avatar_poser::prelude::*;
use common::posed_avatar;
use pretty_assertions::assert_eq;

const POSE: &str = r#"{
    "joints": {
        "mElbowLeft": { "rotation": [0.0, 30.0, 0.0] },
        "mKneeRight": { "rotation": [0.0, 45.0, 0.0] }
    }
}"#;

fn frame_line(bvh: &str) -> &str {
    bvh.lines().last().expect("bvh has a motion frame")
}

#[test]
fn test_export_applied_document() {
    let (mut animator, mut avatar) = posed_avatar();
    let document = PoseDocument::from_json_str(POSE).expect("pose parses");
    assert_eq!(document.apply(&mut animator, &avatar), 2);
    animator.update(&mut avatar);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pose.bvh");
    {
        let mut writer = BufWriter::new(File::create(&path).expect("bvh file"));
        assert!(animator.write_pose_as_bvh(&mut writer, &avatar));
    }

    let bvh = fs::read_to_string(&path).expect("bvh reads back");
    assert!(bvh.starts_with("HIERARCHY\nROOT mPelvis\n"));
    assert!(bvh.contains("\tJOINT mTorso\n\t{\n\t\tOFFSET 0.000000 0.000000 0.084000\n"));
    assert!(bvh.contains("MOTION\nFrames:    1\nFrame Time: 1\n"));
    assert!(bvh.ends_with('\n'));

    let values: Vec<&str> = frame_line(&bvh).split(' ').collect();
    assert_eq!(&values[..3], ["0.000000", "0.000000", "1.067000"]);
    assert_eq!(values.len(), 72);
    assert!(values.contains(&"30.000000"));
    assert!(values.contains(&"45.000000"));
}

#[test]
fn test_flipped_export_moves_rotations_across() {
    let (mut animator, mut avatar) = posed_avatar();
    PoseDocument::from_json_str(POSE)
        .expect("pose parses")
        .apply(&mut animator, &avatar);

    animator.flip_entire_pose(&avatar);
    animator.update(&mut avatar);

    let flipped = PoseDocument::capture(&animator, &avatar, true);
    let names: Vec<&str> = flipped.joints.keys().map(String::as_str).collect();
    assert_eq!(names, ["mElbowRight", "mKneeLeft"]);

    let elbow = flipped.joints["mElbowRight"].rotation.expect("elbow rotation");
    assert!((elbow[1] + 30.0).abs() < 1e-9);

    let mut bvh = Vec::new();
    assert!(animator.write_pose_as_bvh(&mut bvh, &avatar));
    let bvh = String::from_utf8(bvh).expect("utf8");
    let frame = frame_line(&bvh);
    assert!(frame.contains(" -30.000000 "));
    assert!(frame.contains(" -45.000000 "));
}

#[test]
fn test_bvh_is_stable_across_exports() {
    let (animator, avatar) = posed_avatar();

    let mut first = Vec::new();
    let mut second = Vec::new();
    assert!(animator.write_pose_as_bvh(&mut first, &avatar));
    assert!(animator.write_pose_as_bvh(&mut second, &avatar));
    assert_eq!(first, second);
}
