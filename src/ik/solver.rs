//! Inverse kinematics over a chain of live rig nodes.
//!
//! Both solvers adjust local blend rotations only; bone lengths are cached
//! when the chain is set and treated as rigid. Convergence is a normal
//! outcome reported as `bool`, and a failed solve keeps the last iteration's
//! pose rather than rolling back, which reads as "reaching toward" an
//! unreachable target.

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use crate::rig::{NodeIndex, Rig};

const DEFAULT_ITERATIONS: u32 = 10;
const DEFAULT_THRESHOLD: f32 = 1e-5;

/// CCD and FABRIK solver state for one joint chain.
///
/// The chain is ordered effector first, chain root last; each node is the
/// parent of the one before it. Nodes are arena indices into the rig being
/// solved, so the solver holds no references and can persist across frames.
#[derive(Debug, Clone)]
pub struct IkSolver {
    nodes: SmallVec<[NodeIndex; 8]>,
    bone_lengths: SmallVec<[f32; 8]>,
    /// FABRIK position scratch, one entry per chain node.
    positions: SmallVec<[Vec3; 8]>,
    iterations: u32,
    threshold: f32,
}

impl Default for IkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IkSolver {
    /// Creates a solver with an empty chain, 10 iterations and a 1e-5
    /// world-distance convergence threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SmallVec::new(),
            bone_lengths: SmallVec::new(),
            positions: SmallVec::new(),
            iterations: DEFAULT_ITERATIONS,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Replaces the chain and caches its bone lengths from the rig's
    /// current world positions.
    ///
    /// `nodes` runs from the effector to the chain root, consecutive
    /// entries being child and parent. Later pose changes do not update the
    /// cached lengths; set the chain again if the skeleton is re-scaled.
    pub fn set_chain(&mut self, rig: &Rig, nodes: &[NodeIndex]) {
        self.nodes = SmallVec::from_slice(nodes);
        self.positions.clear();
        self.positions.resize(self.nodes.len(), Vec3::ZERO);

        self.bone_lengths.clear();
        for pair in self.nodes.windows(2) {
            let from = rig.node(pair[0]).global_position();
            let to = rig.node(pair[1]).global_position();
            self.bone_lengths.push(from.distance(to));
        }
        log::debug!(
            "IK chain set: {} nodes, bone lengths {:?}",
            self.nodes.len(),
            self.bone_lengths.as_slice()
        );
    }

    /// Chain node indices, effector first.
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// The driven end of the chain.
    #[inline]
    #[must_use]
    pub fn effector(&self) -> Option<NodeIndex> {
        self.nodes.first().copied()
    }

    /// The fixed end of the chain.
    #[inline]
    #[must_use]
    pub fn chain_root(&self) -> Option<NodeIndex> {
        self.nodes.last().copied()
    }

    #[inline]
    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[inline]
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    // ========================================================================
    // CCD
    // ========================================================================

    /// Cyclic coordinate descent toward `target`.
    ///
    /// Each iteration first checks the effector against the threshold, then
    /// sweeps the chain from the node above the effector to the chain root.
    /// Each node is rotated so its current bone direction to the effector
    /// points at the target, its subtree is refreshed immediately, and the
    /// solve exits as converged the moment the effector lands within the
    /// threshold, even mid-sweep. Returns whether the effector reached the
    /// target within the iteration cap.
    pub fn solve_ccd(&self, rig: &mut Rig, target: Vec3) -> bool {
        if self.nodes.len() < 2 {
            return false;
        }
        let effector = self.nodes[0];

        for _ in 0..self.iterations {
            if rig.node(effector).global_position().distance(target) < self.threshold {
                return true;
            }
            for &node_index in &self.nodes[1..] {
                let node_position = rig.node(node_index).global_position();
                let effector_position = rig.node(effector).global_position();

                let Some(to_effector) = (effector_position - node_position).try_normalize() else {
                    continue;
                };
                let Some(to_target) = (target - node_position).try_normalize() else {
                    continue;
                };

                let world_delta = rotation_between(to_effector, to_target);
                apply_world_delta(rig, node_index, world_delta);
                rig.update_subtree(node_index);

                if rig.node(effector).global_position().distance(target) < self.threshold {
                    return true;
                }
            }
        }

        rig.node(effector).global_position().distance(target) < self.threshold
    }

    // ========================================================================
    // FABRIK
    // ========================================================================

    /// Forward-and-backward reaching toward `target`.
    ///
    /// Solves joint positions in the scratch buffer by alternating a
    /// forward pass (pin the effector to the target, walk to the root) and
    /// a backward pass (pin the root back to its original position, walk
    /// out to the effector), then recovers joint rotations from the solved
    /// positions. An unreachable target leaves the chain fully extended
    /// toward it and returns `false`.
    pub fn solve_fabrik(&mut self, rig: &mut Rig, target: Vec3) -> bool {
        if self.nodes.len() < 2 {
            return false;
        }

        for (slot, &node) in self.positions.iter_mut().zip(self.nodes.iter()) {
            *slot = rig.node(node).global_position();
        }
        let root_position = self.positions[self.positions.len() - 1];

        for _ in 0..self.iterations {
            if self.positions[0].distance(target) < self.threshold {
                break;
            }
            self.forward_pass(target);
            self.backward_pass(root_position);
        }

        self.adjust_nodes(rig);

        // Judge success on the live effector, not the scratch solution.
        let effector = self.nodes[0];
        rig.node(effector).global_position().distance(target) < self.threshold
    }

    /// Pins the effector to the target and walks toward the root, keeping
    /// every bone at its cached length along the previous direction.
    fn forward_pass(&mut self, target: Vec3) {
        self.positions[0] = target;
        for i in 1..self.positions.len() {
            let Some(direction) = (self.positions[i] - self.positions[i - 1]).try_normalize()
            else {
                continue;
            };
            self.positions[i] = self.positions[i - 1] + direction * self.bone_lengths[i - 1];
        }
    }

    /// Pins the root back to its original position and walks out to the
    /// effector.
    fn backward_pass(&mut self, root_position: Vec3) {
        let last = self.positions.len() - 1;
        self.positions[last] = root_position;
        for i in (0..last).rev() {
            let Some(direction) = (self.positions[i] - self.positions[i + 1]).try_normalize()
            else {
                continue;
            };
            self.positions[i] = self.positions[i + 1] + direction * self.bone_lengths[i];
        }
    }

    /// Turns solved scratch positions back into joint rotations, walking
    /// from the chain root toward the effector.
    ///
    /// Each node is rotated so its live bone direction to the next chain
    /// node matches the direction to that node's solved position; the
    /// subtree is refreshed before the next node reads its world state.
    fn adjust_nodes(&self, rig: &mut Rig) {
        for i in (1..self.nodes.len()).rev() {
            let node_index = self.nodes[i];
            let next_index = self.nodes[i - 1];

            let node_position = rig.node(node_index).global_position();
            let next_position = rig.node(next_index).global_position();

            let Some(to_next) = (next_position - node_position).try_normalize() else {
                continue;
            };
            let Some(to_desired) = (self.positions[i - 1] - node_position).try_normalize() else {
                continue;
            };

            let world_delta = rotation_between(to_next, to_desired);
            apply_world_delta(rig, node_index, world_delta);
            rig.update_subtree(node_index);
        }
    }
}

/// Shortest-arc rotation taking unit vector `from` onto unit vector `to`.
///
/// `Quat::from_rotation_arc` snaps to identity below roughly a milliradian,
/// which leaves the solve stuck around 1e-3 from the target, well short of
/// the default threshold. This variant keeps resolving arbitrarily small
/// angles; only the antiparallel case needs special handling.
fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let dot = from.dot(to);
    if dot < -0.999_999 {
        return Quat::from_axis_angle(from.any_orthonormal_vector(), std::f32::consts::PI);
    }
    let axis = from.cross(to);
    Quat::from_xyzw(axis.x, axis.y, axis.z, 1.0 + dot).normalize()
}


/// Applies a world-space rotation delta to one node's local blend rotation.
///
/// A world delta `W` at a node with world rotation `R` becomes the local
/// delta `R⁻¹ * W * R`, composed onto the node's current blend rotation.
/// The blend setter normalizes, which keeps repeated IK steps from
/// accumulating drift.
fn apply_world_delta(rig: &mut Rig, node_index: NodeIndex, world_delta: Quat) {
    let global_rotation = rig.node(node_index).global_rotation();
    let local_delta = global_rotation.inverse() * world_delta * global_rotation;
    let node = rig.node_mut(node_index);
    let adjusted = node.blend_rotation_value() * local_delta;
    node.blend_rotation(adjusted, 1.0);
}
