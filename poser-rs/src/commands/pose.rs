//! Pose document command implementations

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use log::{info, warn};

use avatar_poser::{
    BvhWriter, CharacterId, JointCatalog, PoseAnimator, PoseDocument, PoserConfig,
    StandaloneCharacter,
};

use crate::utils::{add_table_row, create_table, format_triple};

#[derive(Subcommand)]
pub enum PoseCommands {
    /// Display the joints set by a pose document
    Info {
        /// Path to the pose document (JSON)
        file: PathBuf,
    },

    /// Export a pose document as a single-frame BVH file
    Bvh {
        /// Path to the pose document (JSON)
        file: PathBuf,

        /// Path to write the BVH file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Flip the pose left to right before exporting
        #[arg(long)]
        flip: bool,
    },

    /// Mirror a pose document left to right
    Flip {
        /// Path to the pose document (JSON)
        file: PathBuf,

        /// Path to write the flipped document (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn execute(command: PoseCommands, config: &PoserConfig) -> Result<()> {
    match command {
        PoseCommands::Info { file } => execute_info(&file),
        PoseCommands::Bvh { file, output, flip } => {
            execute_bvh(&file, output.as_deref(), flip, config)
        }
        PoseCommands::Flip { file, output } => execute_flip(&file, output.as_deref(), config),
    }
}

fn load_document(path: &Path) -> Result<PoseDocument> {
    PoseDocument::load(path)
        .with_context(|| format!("Failed to load pose document {}", path.display()))
}

/// Apply a document to a default avatar and leave it posing
fn pose_default_avatar(
    document: &PoseDocument,
    config: &PoserConfig,
) -> Result<(PoseAnimator, StandaloneCharacter)> {
    let mut animator = PoseAnimator::new(config.clone(), JointCatalog::second_life());
    let mut avatar =
        StandaloneCharacter::with_default_skeleton(CharacterId(1), config.agent_region());

    if !animator.try_start_posing(&mut avatar) {
        anyhow::bail!("Could not start posing the default avatar");
    }

    let applied = document.apply(&mut animator, &avatar);
    info!("Applied {applied} of {} document joints", document.joints.len());
    if applied < document.joints.len() {
        warn!(
            "{} document joints were not applied",
            document.joints.len() - applied
        );
    }

    Ok((animator, avatar))
}

fn execute_info(path: &Path) -> Result<()> {
    let document = load_document(path)?;
    let catalog = JointCatalog::second_life();

    if let Some(description) = &document.description {
        println!("Description: {description}");
    }
    println!("Joints: {}", document.joints.len());

    let mut table = create_table(&["Joint", "Known", "Rotation (deg)", "Position", "Scale"]);
    for (name, entry) in &document.joints {
        add_table_row(
            &mut table,
            vec![
                name.clone(),
                if catalog.get(name).is_some() { "yes" } else { "no" }.to_string(),
                format_triple(entry.rotation),
                format_triple(entry.position),
                format_triple(entry.scale),
            ],
        );
    }
    table.printstd();

    Ok(())
}

fn execute_bvh(path: &Path, output: Option<&Path>, flip: bool, config: &PoserConfig) -> Result<()> {
    let document = load_document(path)?;
    let (mut animator, mut avatar) = pose_default_avatar(&document, config)?;

    if flip {
        animator.flip_entire_pose(&avatar);
    }
    // Settle every posed joint so the motion frame carries the targets
    for _ in 0..settle_frames(config.frame_blend) {
        animator.update(&mut avatar);
    }

    let writer = BvhWriter::new(&animator, &avatar);
    match output {
        Some(out) => {
            let file = File::create(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let mut file = BufWriter::new(file);
            writer
                .write(&mut file)
                .with_context(|| format!("Failed to write BVH to {}", out.display()))?;
            info!("Wrote BVH to {}", out.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            writer.write(&mut lock).context("Failed to write BVH")?;
        }
    }

    Ok(())
}

fn execute_flip(path: &Path, output: Option<&Path>, config: &PoserConfig) -> Result<()> {
    let document = load_document(path)?;
    let (mut animator, avatar) = pose_default_avatar(&document, config)?;

    animator.flip_entire_pose(&avatar);

    let mut flipped = PoseDocument::capture(&animator, &avatar, false);
    flipped.description.clone_from(&document.description);

    match output {
        Some(out) => {
            flipped
                .save(out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Wrote flipped pose to {}", out.display());
        }
        None => {
            let json = flipped.to_json_string()?;
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            writeln!(lock, "{json}")?;
        }
    }

    Ok(())
}

/// Frames needed to bring every joint within rounding distance of its target
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn settle_frames(frame_blend: f64) -> usize {
    if frame_blend >= 1.0 {
        1
    } else {
        // remaining distance shrinks by (1 - blend) each frame
        let frames = (1e-9_f64).ln() / (1.0 - frame_blend).ln();
        frames.ceil().clamp(1.0, 10_000.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_frames() {
        assert_eq!(settle_frames(1.0), 1);
        assert_eq!(settle_frames(0.5), 30);
        assert!(settle_frames(0.01) > 1000);
    }
}
