//! Joint catalog command implementations

use anyhow::{Context, Result};
use avatar_poser::{BoneType, JointCatalog, PoserConfig, PoserJoint};
use clap::{Subcommand, ValueEnum};

use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_table, format_mapping, render_tree,
};

#[derive(Subcommand)]
pub enum JointCommands {
    /// List the poseable joints
    List {
        /// Only list joints of this kind
        #[arg(long, value_enum)]
        kind: Option<JointKind>,
    },

    /// Show the exported BVH hierarchy
    Tree {
        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Show mirror partner and axis mapping of each joint
        #[arg(long)]
        details: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show details inline
        #[arg(long)]
        compact: bool,
    },
}

/// Joint categories selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JointKind {
    Root,
    Body,
    Hands,
    Face,
    Collision,
}

impl From<JointKind> for BoneType {
    fn from(kind: JointKind) -> Self {
        match kind {
            JointKind::Root => Self::WholeAvatar,
            JointKind::Body => Self::Body,
            JointKind::Hands => Self::Hands,
            JointKind::Face => Self::Face,
            JointKind::Collision => Self::CollisionVolume,
        }
    }
}

pub fn execute(command: JointCommands, _config: &PoserConfig) -> Result<()> {
    let catalog = JointCatalog::second_life();

    match command {
        JointCommands::List { kind } => execute_list(&catalog, kind),
        JointCommands::Tree {
            depth,
            details,
            no_color,
            compact,
        } => execute_tree(&catalog, depth, details, no_color, compact),
    }
}

fn execute_list(catalog: &JointCatalog, kind: Option<JointKind>) -> Result<()> {
    let joints: Vec<&PoserJoint> = match kind {
        Some(kind) => catalog.of_type(kind.into()).collect(),
        None => catalog.iter().collect(),
    };

    let mut table = create_table(&["Joint", "Type", "Mirror", "Flips", "Axis mapping"]);
    for joint in &joints {
        add_table_row(
            &mut table,
            vec![
                joint.name().to_string(),
                joint.bone_type().to_string(),
                joint.mirror_name().unwrap_or("-").to_string(),
                if joint.dont_flip_on_mirror() { "no" } else { "yes" }.to_string(),
                format_mapping(joint.axis_mapping()),
            ],
        );
    }

    println!("{} joints", joints.len());
    table.printstd();
    Ok(())
}

fn execute_tree(
    catalog: &JointCatalog,
    depth: Option<usize>,
    details: bool,
    no_color: bool,
    compact: bool,
) -> Result<()> {
    let root = catalog
        .bvh_root()
        .context("Joint catalog has no whole-avatar joint")?;

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        show_metadata: details,
        compact,
    };
    print!("{}", render_tree(&joint_node(catalog, root), &options));
    Ok(())
}

fn joint_node(catalog: &JointCatalog, joint: &PoserJoint) -> TreeNode {
    let node_type = if joint.bone_type() == BoneType::WholeAvatar {
        NodeType::Root
    } else if joint.mirror_name().is_some() {
        NodeType::Paired
    } else {
        NodeType::Joint
    };

    let mut node = TreeNode::new(joint.name(), node_type);
    if let Some(mirror) = joint.mirror_name() {
        node = node.with_metadata("mirror", mirror);
    }
    node = node.with_metadata("axes", &format_mapping(joint.axis_mapping()));

    joint
        .bvh_children()
        .iter()
        .filter_map(|name| catalog.get(name))
        .fold(node, |node, child| node.add_child(joint_node(catalog, child)))
}
