//! Rig: the flat node arena and its hierarchy passes.
//!
//! Nodes are stored in one `Vec`, indexed by the source asset's node index,
//! so animation tracks, skins, masks and IK chains can all address joints
//! with plain `usize` values. Tree edges are index pairs; traversal uses an
//! explicit stack, so deep hierarchies cannot overflow the call stack.

use glam::{Affine3A, Vec3};

use crate::assets::NodeSource;
use crate::errors::{MarionetteError, Result};
use crate::rig::NodeIndex;
use crate::rig::mask::NodeMask;
use crate::rig::node::Node;

/// A skeleton: flat node storage plus a designated root.
#[derive(Debug, Clone)]
pub struct Rig {
    nodes: Vec<Node>,
    root: NodeIndex,
}

impl Rig {
    /// Builds a rig from plain source nodes.
    ///
    /// Every source node becomes an arena slot (animation tracks may target
    /// nodes outside the skeleton tree). Tree edges are wired by walking the
    /// child lists from `root`; children flagged as carrying their own skin
    /// are skipped, since independently skinned meshes must not inherit this
    /// skeleton's motion. Absent rest pose components default to identity.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range root or child index, and on child lists that
    /// reach the same node twice (the hierarchy must be a tree).
    pub fn from_nodes(sources: &[NodeSource], root: NodeIndex) -> Result<Self> {
        if root >= sources.len() {
            return Err(MarionetteError::InvalidRootNode {
                index: root,
                count: sources.len(),
            });
        }

        let mut nodes: Vec<Node> = sources
            .iter()
            .map(|source| {
                let mut node = Node::new(source.name.clone());
                if let Some(scale) = source.scale {
                    node.set_rest_scale(scale);
                }
                if let Some(rotation) = source.rotation {
                    node.set_rest_rotation(rotation);
                }
                if let Some(translation) = source.translation {
                    node.set_rest_translation(translation);
                }
                node
            })
            .collect();

        // Wire tree edges from the root down.
        let mut visited = vec![false; sources.len()];
        visited[root] = true;
        let mut stack: Vec<NodeIndex> = vec![root];
        while let Some(parent) = stack.pop() {
            for &child in &sources[parent].children {
                if child >= sources.len() {
                    return Err(MarionetteError::NodeIndexOutOfBounds {
                        context: "node child list",
                        index: child,
                        count: sources.len(),
                    });
                }
                if sources[child].skin.is_some() {
                    log::debug!(
                        "Rig: skipping child {} ('{}'): carries its own skin",
                        child,
                        sources[child].name
                    );
                    continue;
                }
                if visited[child] {
                    return Err(MarionetteError::CyclicHierarchy { index: child });
                }
                visited[child] = true;
                nodes[parent].children.push(child);
                nodes[child].parent = Some(parent);
                stack.push(child);
            }
        }

        let mut rig = Self { nodes, root };
        rig.update_local_matrices();
        rig.update_world_matrices();
        log::debug!(
            "Rig built: {} nodes, root {} ('{}')",
            rig.nodes.len(),
            root,
            rig.nodes[root].name()
        );
        Ok(rig)
    }

    /// The designated root node index.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Number of nodes in the arena.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrows the node at `index`. Panics on an out-of-range index.
    #[inline]
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// Mutably borrows the node at `index`. Panics on an out-of-range index.
    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index]
    }

    /// All nodes, in arena order.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Finds a node by name (linear scan; first match wins).
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.iter().position(|node| node.name() == name)
    }

    /// Path from `node` up to `ancestor`, both inclusive.
    ///
    /// Returns `None` when `ancestor` is not on `node`'s parent chain.
    #[must_use]
    pub fn path_to_ancestor(&self, node: NodeIndex, ancestor: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut path = vec![node];
        let mut current = node;
        while current != ancestor {
            current = self.nodes[current].parent?;
            path.push(current);
        }
        Some(path)
    }

    // ========================================================================
    // Matrix passes
    // ========================================================================

    /// Rebuilds every node's local matrix from its blend pose.
    ///
    /// A single flat pass: local matrices do not depend on tree order.
    pub fn update_local_matrices(&mut self) {
        for node in &mut self.nodes {
            node.update_local_matrix();
        }
    }

    /// Recomputes world matrices for the tree below (and including) the root.
    ///
    /// Pre-order walk with an explicit stack; each node multiplies its
    /// parent's already-updated world matrix. Local matrices are taken as-is,
    /// so run [`Rig::update_local_matrices`] first when blend poses changed.
    /// Arena nodes not attached to the tree keep their previous world matrix.
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(NodeIndex, Affine3A)> = Vec::with_capacity(64);
        stack.push((self.root, Affine3A::IDENTITY));

        while let Some((index, parent_world)) = stack.pop() {
            let node = &mut self.nodes[index];
            node.world_matrix = parent_world * node.local_matrix;
            let world = node.world_matrix;
            // Reverse push keeps left-to-right processing order.
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Recomputes local and world matrices for `start` and its descendants.
    ///
    /// Reads the parent's current world matrix, so only the subtree is
    /// touched. The IK solvers call this after adjusting a single joint.
    pub fn update_subtree(&mut self, start: NodeIndex) {
        let parent_world = self.nodes[start]
            .parent
            .map_or(Affine3A::IDENTITY, |parent| self.nodes[parent].world_matrix);

        let mut stack: Vec<(NodeIndex, Affine3A)> = vec![(start, parent_world)];
        while let Some((index, parent_world)) = stack.pop() {
            let node = &mut self.nodes[index];
            node.update_local_matrix();
            node.world_matrix = parent_world * node.local_matrix;
            let world = node.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    // ========================================================================
    // Pose and mask helpers
    // ========================================================================

    /// Resets the blend pose to the rest pose for every node the mask
    /// includes. Matrices are not refreshed here.
    pub fn reset_blend_poses(&mut self, mask: &NodeMask) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if mask.contains(index) {
                node.reset_blend();
            }
        }
    }

    /// Builds the additive mask pair for a split node.
    ///
    /// The primary mask excludes the split node's entire subtree and includes
    /// everything else; the inverted mask is the complement. Splitting at the
    /// tree root therefore empties the primary mask.
    #[must_use]
    pub fn split_masks(&self, split: NodeIndex) -> (NodeMask, NodeMask) {
        let mut primary = NodeMask::all(self.nodes.len());
        let mut stack: Vec<NodeIndex> = vec![split];
        while let Some(index) = stack.pop() {
            primary.set(index, false);
            stack.extend_from_slice(self.nodes[index].children());
        }
        let inverted = primary.inverted();
        (primary, inverted)
    }

    // ========================================================================
    // Debug output
    // ========================================================================

    /// World-space line segments for skeleton visualization.
    ///
    /// Consecutive position pairs form one parent-to-child segment each.
    /// Nodes without a parent contribute nothing.
    #[must_use]
    pub fn skeleton_lines(&self) -> Vec<Vec3> {
        let mut lines = Vec::with_capacity(self.nodes.len().saturating_sub(1) * 2);
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                lines.push(self.nodes[parent].global_position());
                lines.push(node.global_position());
            }
        }
        lines
    }

    /// Logs the tree below the root at debug level, indented by depth.
    pub fn dump_tree(&self) {
        let mut stack: Vec<(NodeIndex, usize)> = vec![(self.root, 0)];
        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            log::debug!("{:indent$}- {} [{}]", "", node.name(), index, indent = depth * 2);
            for &child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}
