//! IK solver tests
//!
//! Tests for:
//! - Chain setup and cached bone lengths
//! - CCD convergence on reachable targets and failure on unreachable ones
//! - FABRIK convergence, rotation recovery, and full extension toward
//!   unreachable targets
//! - Degenerate chains (too short to solve)

use glam::{Quat, Vec3};
use marionette::assets::NodeSource;
use marionette::ik::IkSolver;
use marionette::rig::Rig;

const EPSILON: f32 = 1e-5;

/// Two unit bones straight up: shoulder at the origin, elbow at (0,1,0),
/// hand at (0,2,0). Chain order is effector first: [2, 1, 0].
fn two_bone_rig() -> Rig {
    let joint = |name: &str, y: f32, children: Vec<usize>| NodeSource {
        name: name.to_string(),
        translation: Some(Vec3::new(0.0, y, 0.0)),
        children,
        ..Default::default()
    };
    let sources = vec![
        joint("Shoulder", 0.0, vec![1]),
        joint("Elbow", 1.0, vec![2]),
        joint("Hand", 1.0, vec![]),
    ];
    Rig::from_nodes(&sources, 0).unwrap()
}

fn two_bone_solver(rig: &Rig) -> IkSolver {
    let mut solver = IkSolver::new();
    solver.set_chain(rig, &[2, 1, 0]);
    solver
}

// ============================================================================
// Chain setup
// ============================================================================

#[test]
fn set_chain_caches_bone_lengths() {
    let rig = two_bone_rig();
    let solver = two_bone_solver(&rig);
    assert_eq!(solver.chain(), &[2, 1, 0]);
    assert_eq!(solver.effector(), Some(2));
    assert_eq!(solver.chain_root(), Some(0));
}

#[test]
fn default_tuning_parameters() {
    let solver = IkSolver::new();
    assert_eq!(solver.iterations(), 10);
    assert!((solver.threshold() - 1e-5).abs() < f32::EPSILON);
}

#[test]
fn short_chain_cannot_solve() {
    let rig = two_bone_rig();
    let mut empty = IkSolver::new();
    assert!(!empty.solve_ccd(&mut rig.clone(), Vec3::ONE));
    assert!(!empty.solve_fabrik(&mut rig.clone(), Vec3::ONE));

    let mut single = IkSolver::new();
    single.set_chain(&rig, &[2]);
    assert!(!single.solve_ccd(&mut rig.clone(), Vec3::ONE));
}

// ============================================================================
// CCD
// ============================================================================

#[test]
fn ccd_reaches_off_axis_target_within_default_budget() {
    let mut rig = two_bone_rig();
    let solver = two_bone_solver(&rig);

    // Reachable: distance 1.5 < total reach 2, off the chain axis.
    let target = Vec3::new(1.0, 1.0, 0.0).normalize() * 1.5;
    assert!(solver.solve_ccd(&mut rig, target), "CCD must converge on a reachable target");
    let effector = rig.node(2).global_position();
    assert!(
        effector.distance(target) < EPSILON,
        "effector at {effector}, target {target}"
    );
}

#[test]
fn ccd_preserves_bone_lengths() {
    let mut rig = two_bone_rig();
    let solver = two_bone_solver(&rig);
    solver.solve_ccd(&mut rig, Vec3::new(1.0, 1.0, 0.2).normalize() * 1.2);

    let shoulder = rig.node(0).global_position();
    let elbow = rig.node(1).global_position();
    let hand = rig.node(2).global_position();
    assert!((shoulder.distance(elbow) - 1.0).abs() < 1e-4);
    assert!((elbow.distance(hand) - 1.0).abs() < 1e-4);
}

#[test]
fn ccd_unreachable_target_reports_failure() {
    let mut rig = two_bone_rig();
    let solver = two_bone_solver(&rig);
    assert!(!solver.solve_ccd(&mut rig, Vec3::new(10.0, 0.0, 0.0)));
    // No rollback: the chain stays in its last attempted pose, reaching out.
    let effector = rig.node(2).global_position();
    assert!(effector.x > 1.0, "chain should stretch toward the target, effector at {effector}");
}

#[test]
fn ccd_converged_start_exits_without_touching_the_pose() {
    let mut rig = two_bone_rig();
    let solver = two_bone_solver(&rig);
    // Target exactly at the current effector position: the pre-sweep check
    // exits before any node edit, so the blend pose stays bit-identical.
    assert!(solver.solve_ccd(&mut rig, Vec3::new(0.0, 2.0, 0.0)));
    assert_eq!(rig.node(0).blend_rotation_value(), Quat::IDENTITY);
    assert_eq!(rig.node(1).blend_rotation_value(), Quat::IDENTITY);
}

#[test]
fn ccd_closes_a_sub_millimeter_gap() {
    // A target a hair off the effector's current direction: the per-node
    // delta is tiny but must still be resolved, not rounded to identity.
    let mut rig = two_bone_rig();
    let solver = two_bone_solver(&rig);
    let target = Vec3::new(0.03, 1.0, 0.0).normalize() * 1.999;
    assert!(solver.solve_ccd(&mut rig, target), "solve must close the final sub-millimeter gap");
    assert!(rig.node(2).global_position().distance(target) < EPSILON);
}

// ============================================================================
// FABRIK
// ============================================================================

#[test]
fn fabrik_reaches_off_axis_target() {
    let mut rig = two_bone_rig();
    let mut solver = two_bone_solver(&rig);

    let target = Vec3::new(1.0, 1.0, 0.0).normalize() * 1.5;
    assert!(solver.solve_fabrik(&mut rig, target), "FABRIK must converge on a reachable target");
    let effector = rig.node(2).global_position();
    assert!(
        effector.distance(target) < 1e-3,
        "effector at {effector}, target {target}"
    );
}

#[test]
fn fabrik_unreachable_target_extends_fully() {
    let mut rig = two_bone_rig();
    let mut solver = two_bone_solver(&rig);

    let target = Vec3::new(10.0, 0.0, 0.0);
    assert!(!solver.solve_fabrik(&mut rig, target), "unreachable target must report failure");

    // Chain of total length 2 stretched straight at the target leaves the
    // effector at distance 10 - 2 = 8.
    let effector = rig.node(2).global_position();
    assert!(
        (effector.distance(target) - 8.0).abs() < 1e-2,
        "effector at {effector}, expected distance 8 from {target}"
    );
}

#[test]
fn fabrik_keeps_chain_root_in_place() {
    let mut rig = two_bone_rig();
    let mut solver = two_bone_solver(&rig);
    solver.solve_fabrik(&mut rig, Vec3::new(1.2, 0.4, 0.3));
    let root = rig.node(0).global_position();
    assert!(root.length() < 1e-4, "chain root moved to {root}");
}

#[test]
fn fabrik_preserves_bone_lengths() {
    let mut rig = two_bone_rig();
    let mut solver = two_bone_solver(&rig);
    solver.solve_fabrik(&mut rig, Vec3::new(0.8, 1.1, -0.4));

    let shoulder = rig.node(0).global_position();
    let elbow = rig.node(1).global_position();
    let hand = rig.node(2).global_position();
    assert!((shoulder.distance(elbow) - 1.0).abs() < 1e-3);
    assert!((elbow.distance(hand) - 1.0).abs() < 1e-3);
}

// ============================================================================
// Longer chains
// ============================================================================

#[test]
fn solvers_handle_a_four_bone_chain() {
    let joint = |name: &str, y: f32, children: Vec<usize>| NodeSource {
        name: name.to_string(),
        translation: Some(Vec3::new(0.0, y, 0.0)),
        children,
        ..Default::default()
    };
    let sources = vec![
        joint("J0", 0.0, vec![1]),
        joint("J1", 1.0, vec![2]),
        joint("J2", 1.0, vec![3]),
        joint("J3", 1.0, vec![4]),
        joint("J4", 1.0, vec![]),
    ];
    let rig = Rig::from_nodes(&sources, 0).unwrap();
    let target = Vec3::new(2.0, 1.5, 0.5);

    let mut ccd_rig = rig.clone();
    let mut solver = IkSolver::new();
    solver.set_iterations(50);
    solver.set_chain(&ccd_rig, &[4, 3, 2, 1, 0]);
    assert!(solver.solve_ccd(&mut ccd_rig, target));

    let mut fabrik_rig = rig.clone();
    let mut solver = IkSolver::new();
    solver.set_iterations(50);
    solver.set_chain(&fabrik_rig, &[4, 3, 2, 1, 0]);
    assert!(solver.solve_fabrik(&mut fabrik_rig, target));
    assert!(fabrik_rig.node(4).global_position().distance(target) < 1e-3);
}
