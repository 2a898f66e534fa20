//! Rig and node tests
//!
//! Tests for:
//! - Rig construction from source nodes (defaults, validation errors)
//! - Skin-flagged child exclusion
//! - Blend pose setters and factor clamping
//! - Hierarchical world-matrix propagation (full tree and subtree)
//! - Additive split masks
//! - Skeleton line output and graceful decomposition fallbacks

use glam::{Affine3A, Quat, Vec3};
use marionette::errors::MarionetteError;
use marionette::rig::{NodeMask, Rig};
use marionette::assets::NodeSource;
use std::f32::consts::FRAC_PI_2;

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn approx_quat(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

/// A four-node chain: root -> spine -> arm -> hand, each one unit up.
fn chain_sources() -> Vec<NodeSource> {
    let joint = |name: &str, children: Vec<usize>| NodeSource {
        name: name.to_string(),
        translation: Some(Vec3::new(0.0, 1.0, 0.0)),
        children,
        ..Default::default()
    };
    let mut nodes = vec![
        joint("Root", vec![1]),
        joint("Spine", vec![2]),
        joint("Arm", vec![3]),
        joint("Hand", vec![]),
    ];
    nodes[0].translation = Some(Vec3::ZERO);
    nodes
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn from_nodes_applies_defaults() {
    let sources = vec![NodeSource {
        name: "Solo".to_string(),
        ..Default::default()
    }];
    let rig = Rig::from_nodes(&sources, 0).unwrap();
    let node = rig.node(0);
    assert!(approx_vec3(node.rest_scale(), Vec3::ONE));
    assert!(approx_quat(node.rest_rotation(), Quat::IDENTITY));
    assert!(approx_vec3(node.rest_translation(), Vec3::ZERO));
}

#[test]
fn from_nodes_wires_parents_and_children() {
    let rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    assert_eq!(rig.root(), 0);
    assert_eq!(rig.node(0).parent(), None);
    assert_eq!(rig.node(1).parent(), Some(0));
    assert_eq!(rig.node(2).parent(), Some(1));
    assert_eq!(rig.node(0).children(), &[1]);
    assert_eq!(rig.node(3).children(), &[] as &[usize]);
}

#[test]
fn from_nodes_rejects_bad_root() {
    let err = Rig::from_nodes(&chain_sources(), 99).unwrap_err();
    assert!(matches!(err, MarionetteError::InvalidRootNode { index: 99, count: 4 }));
}

#[test]
fn from_nodes_rejects_out_of_range_child() {
    let mut sources = chain_sources();
    sources[2].children.push(42);
    let err = Rig::from_nodes(&sources, 0).unwrap_err();
    assert!(matches!(err, MarionetteError::NodeIndexOutOfBounds { index: 42, .. }));
}

#[test]
fn from_nodes_rejects_revisited_node() {
    let mut sources = chain_sources();
    // Node 3 reached from both 2 and 0: not a tree.
    sources[0].children.push(3);
    let err = Rig::from_nodes(&sources, 0).unwrap_err();
    assert!(matches!(err, MarionetteError::CyclicHierarchy { index: 3 }));
}

#[test]
fn from_nodes_skips_skinned_children() {
    let mut sources = chain_sources();
    sources[2].skin = Some(0);
    let rig = Rig::from_nodes(&sources, 0).unwrap();
    // Node 2 keeps its arena slot but is not wired into the tree.
    assert_eq!(rig.len(), 4);
    assert_eq!(rig.node(1).children(), &[] as &[usize]);
    assert_eq!(rig.node(2).parent(), None);
}

#[test]
fn find_node_by_name() {
    let rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    assert_eq!(rig.find_node("Arm"), Some(2));
    assert_eq!(rig.find_node("Tail"), None);
}

// ============================================================================
// Blend pose setters
// ============================================================================

#[test]
fn set_rest_resets_blend() {
    let sources = chain_sources();
    let mut rig = Rig::from_nodes(&sources, 0).unwrap();
    let node = rig.node_mut(1);
    node.blend_translation(Vec3::new(5.0, 0.0, 0.0), 1.0);
    node.set_rest_translation(Vec3::new(0.0, 2.0, 0.0));
    assert!(approx_vec3(node.blend_translation_value(), Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn blend_factor_above_one_equals_full_override() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    let target = Quat::from_rotation_z(1.0);

    rig.node_mut(1).blend_rotation(target, 5.0);
    let clamped = rig.node(1).blend_rotation_value();
    rig.node_mut(1).blend_rotation(target, 1.0);
    let full = rig.node(1).blend_rotation_value();

    assert!(approx_quat(clamped, full), "factor > 1 must clamp to 1");
    assert!(approx_quat(full, target));
}

#[test]
fn blend_factor_below_zero_keeps_rest() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    let rest = rig.node(1).rest_rotation();
    rig.node_mut(1).blend_rotation(Quat::from_rotation_x(1.0), -2.0);
    assert!(approx_quat(rig.node(1).blend_rotation_value(), rest));

    rig.node_mut(1).blend_translation(Vec3::splat(9.0), -0.5);
    assert!(approx_vec3(rig.node(1).blend_translation_value(), Vec3::new(0.0, 1.0, 0.0)));
}

#[test]
fn blend_halfway_mixes_toward_rest() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    rig.node_mut(1).blend_translation(Vec3::new(0.0, 3.0, 0.0), 0.5);
    // rest (0,1,0) mixed halfway to (0,3,0).
    assert!(approx_vec3(rig.node(1).blend_translation_value(), Vec3::new(0.0, 2.0, 0.0)));

    rig.node_mut(1).blend_scale(Vec3::splat(3.0), 0.5);
    assert!(approx_vec3(rig.node(1).blend_scale_value(), Vec3::splat(2.0)));
}

#[test]
fn reset_blend_restores_rest_pose() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    rig.node_mut(2).blend_rotation(Quat::from_rotation_y(0.5), 1.0);
    rig.node_mut(2).blend_translation(Vec3::splat(7.0), 1.0);
    rig.node_mut(2).reset_blend();
    assert!(approx_quat(rig.node(2).blend_rotation_value(), Quat::IDENTITY));
    assert!(approx_vec3(rig.node(2).blend_translation_value(), Vec3::new(0.0, 1.0, 0.0)));
}

// ============================================================================
// World-matrix propagation
// ============================================================================

#[test]
fn world_matrix_is_parent_times_local_at_depth_three() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    rig.node_mut(1).blend_rotation(Quat::from_rotation_z(FRAC_PI_2), 1.0);
    rig.update_local_matrices();
    rig.update_world_matrices();

    for index in 1..rig.len() {
        let parent = rig.node(index).parent().unwrap();
        let expected = *rig.node(parent).world_matrix() * *rig.node(index).local_matrix();
        let actual = *rig.node(index).world_matrix();
        assert!(
            (actual.translation - expected.translation).length() < EPSILON,
            "node {index}: world != parent world * local"
        );
    }
}

#[test]
fn rotated_spine_moves_descendants() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    // Rest pose: straight up, hand at (0, 3, 0).
    assert!(approx_vec3(rig.node(3).global_position(), Vec3::new(0.0, 3.0, 0.0)));

    // Rotate the spine 90 degrees to the right; arm and hand swing to +x.
    rig.node_mut(1).blend_rotation(Quat::from_rotation_z(-FRAC_PI_2), 1.0);
    rig.update_local_matrices();
    rig.update_world_matrices();
    assert!(approx_vec3(rig.node(3).global_position(), Vec3::new(2.0, 1.0, 0.0)));
}

#[test]
fn subtree_update_leaves_ancestors_alone() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    let root_world_before = *rig.node(0).world_matrix();

    rig.node_mut(2).blend_rotation(Quat::from_rotation_z(-FRAC_PI_2), 1.0);
    rig.update_subtree(2);

    let root_world_after = *rig.node(0).world_matrix();
    assert!(
        (root_world_before.translation - root_world_after.translation).length() < EPSILON,
        "subtree update must not touch the root"
    );
    // Hand swings around the arm joint at (0, 2, 0).
    assert!(approx_vec3(rig.node(3).global_position(), Vec3::new(1.0, 2.0, 0.0)));
}

#[test]
fn global_position_of_degenerate_matrix_defaults_to_zero() {
    let mut sources = chain_sources();
    sources[1].scale = Some(Vec3::ZERO);
    let rig = Rig::from_nodes(&sources, 0).unwrap();
    // Zero scale collapses the subtree; decomposition fails and callers
    // get defined defaults instead of NaNs.
    assert!(approx_vec3(rig.node(2).global_position(), Vec3::ZERO));
    assert!(approx_quat(rig.node(2).global_rotation(), Quat::IDENTITY));
}

// ============================================================================
// Masks
// ============================================================================

#[test]
fn split_masks_cover_exactly_the_subtree() {
    let sources = vec![
        NodeSource {
            name: "Hips".to_string(),
            children: vec![1, 3],
            ..Default::default()
        },
        NodeSource {
            name: "Spine".to_string(),
            children: vec![2],
            ..Default::default()
        },
        NodeSource {
            name: "Head".to_string(),
            ..Default::default()
        },
        NodeSource {
            name: "Leg".to_string(),
            children: vec![4],
            ..Default::default()
        },
        NodeSource {
            name: "Foot".to_string(),
            ..Default::default()
        },
    ];
    let rig = Rig::from_nodes(&sources, 0).unwrap();
    let (primary, inverted) = rig.split_masks(1);

    // Subtree of Spine (nodes 1, 2) excluded from primary, owned by inverted.
    for index in [1, 2] {
        assert!(!primary.contains(index), "node {index} must leave the primary mask");
        assert!(inverted.contains(index), "node {index} must join the inverted mask");
    }
    for index in [0, 3, 4] {
        assert!(primary.contains(index), "node {index} must stay in the primary mask");
        assert!(!inverted.contains(index));
    }
}

#[test]
fn split_at_root_empties_primary_mask() {
    let rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    let (primary, inverted) = rig.split_masks(0);
    assert_eq!(primary.included_count(), 0);
    assert_eq!(inverted.included_count(), rig.len());
}

#[test]
fn masked_reset_skips_excluded_nodes() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    rig.node_mut(1).blend_translation(Vec3::splat(5.0), 1.0);
    rig.node_mut(2).blend_translation(Vec3::splat(5.0), 1.0);

    let mut mask = NodeMask::all(rig.len());
    mask.set(2, false);
    rig.reset_blend_poses(&mask);

    assert!(approx_vec3(rig.node(1).blend_translation_value(), Vec3::new(0.0, 1.0, 0.0)));
    assert!(approx_vec3(rig.node(2).blend_translation_value(), Vec3::splat(5.0)));
}

// ============================================================================
// Chain walking and skeleton lines
// ============================================================================

#[test]
fn path_to_ancestor_walks_parent_links() {
    let rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    assert_eq!(rig.path_to_ancestor(3, 0), Some(vec![3, 2, 1, 0]));
    assert_eq!(rig.path_to_ancestor(3, 3), Some(vec![3]));
}

#[test]
fn path_to_ancestor_rejects_non_ancestor() {
    let mut sources = chain_sources();
    sources[0].children = vec![1, 3];
    sources[2].children.clear();
    let rig = Rig::from_nodes(&sources, 0).unwrap();
    // Node 3 hangs off the root, not off node 2.
    assert_eq!(rig.path_to_ancestor(3, 2), None);
}

#[test]
fn skeleton_lines_pair_parent_and_child() {
    let rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    let lines = rig.skeleton_lines();
    // Three edges, two vertices each.
    assert_eq!(lines.len(), 6);
    assert!(approx_vec3(lines[0], Vec3::ZERO));
    assert!(approx_vec3(lines[1], Vec3::new(0.0, 1.0, 0.0)));
    assert!(approx_vec3(lines[4], Vec3::new(0.0, 2.0, 0.0)));
    assert!(approx_vec3(lines[5], Vec3::new(0.0, 3.0, 0.0)));
}

#[test]
fn local_matrix_uses_blend_pose() {
    let mut rig = Rig::from_nodes(&chain_sources(), 0).unwrap();
    rig.node_mut(0).blend_scale(Vec3::splat(2.0), 1.0);
    rig.update_local_matrices();
    let expected = Affine3A::from_scale(Vec3::splat(2.0));
    let local = rig.node(0).local_matrix();
    assert!((local.matrix3.x_axis - expected.matrix3.x_axis).length() < EPSILON);
}
