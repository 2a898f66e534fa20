//! Rig module: the animated node hierarchy.
//!
//! - [`Node`]: one joint (rest pose, blend pose, cached matrices)
//! - [`Rig`]: flat node arena with tree wiring and matrix passes
//! - [`NodeMask`]: per-node inclusion flags for masked pose application

pub mod mask;
pub mod node;
#[allow(clippy::module_inception)]
pub mod rig;

pub use mask::NodeMask;
pub use node::Node;
pub use rig::Rig;

/// Index of a node inside a [`Rig`] arena.
///
/// Matches the node index of the source asset, so tracks, skins and IK
/// chains loaded from the same asset address nodes directly.
pub type NodeIndex = usize;
