//! Error Types
//!
//! This module defines the error types used throughout the toolkit.
//!
//! # Overview
//!
//! The main error type [`MarionetteError`] covers all failure modes including:
//! - Rig construction errors (bad indices, broken hierarchies)
//! - Animation track validation errors
//! - Skin and IK chain setup errors
//! - Asset loading and decoding errors
//!
//! All of these are *construction-time* failures: once a [`crate::Model`] has
//! been assembled, the per-frame update path does not allocate errors. Frame
//! work either degrades to documented defaults (matrix decomposition, empty
//! tracks), reports a plain `bool` (IK convergence), or treats the condition
//! as a programming error and panics (out-of-range arena indices, which
//! validation has already ruled out for loaded data).
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MarionetteError>`.
//!
//! ```rust,ignore
//! use marionette::errors::{MarionetteError, Result};
//!
//! fn build_rig() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the marionette toolkit.
///
/// This enum covers all possible error conditions that can occur while
/// assembling a rig, its clips and skins. Each variant provides specific
/// context about what went wrong.
#[derive(Error, Debug)]
pub enum MarionetteError {
    // ========================================================================
    // Rig Construction Errors
    // ========================================================================
    /// The designated root node index does not exist in the source node set.
    #[error("Invalid root node {index} (node count: {count})")]
    InvalidRootNode {
        /// The invalid root index
        index: usize,
        /// Number of source nodes
        count: usize,
    },

    /// A node index referenced by source data is out of bounds.
    #[error("Node index out of bounds: {context} (index: {index}, node count: {count})")]
    NodeIndexOutOfBounds {
        /// Description of what was being referenced
        context: &'static str,
        /// The invalid index
        index: usize,
        /// Number of rig nodes
        count: usize,
    },

    /// The source hierarchy revisits a node, so it is not a tree.
    #[error("Cyclic node hierarchy: node {index} reached twice")]
    CyclicHierarchy {
        /// The node reached through two different paths
        index: usize,
    },

    // ========================================================================
    // Animation Track Errors
    // ========================================================================
    /// A track timeline is not strictly increasing.
    #[error("Track timeline is not strictly increasing at key {key}")]
    NonIncreasingTimeline {
        /// Index of the offending key
        key: usize,
    },

    /// A track's value buffer does not match its timeline for the chosen
    /// interpolation mode (1x per key, or 3x per key for cubic splines).
    #[error("Track value count mismatch: expected {expected} values for {keys} keys, got {actual}")]
    TrackValueCountMismatch {
        /// Number of timeline keys
        keys: usize,
        /// Required value count
        expected: usize,
        /// Provided value count
        actual: usize,
    },

    /// A track's value kind does not fit its target path
    /// (rotations are quaternions; translation and scale are vectors).
    #[error("Track data kind does not match target path {target}")]
    TrackKindMismatch {
        /// The target path the track was declared with
        target: &'static str,
    },

    // ========================================================================
    // Skin & IK Errors
    // ========================================================================
    /// Joint list and inverse bind matrix list differ in length.
    #[error("Skin '{name}': {joints} joints but {matrices} inverse bind matrices")]
    JointCountMismatch {
        /// Skin name
        name: String,
        /// Number of joints
        joints: usize,
        /// Number of inverse bind matrices
        matrices: usize,
    },

    /// The requested IK effector does not descend from the requested root.
    #[error("IK chain broken: effector {effector} does not descend from node {root}")]
    IkChainBroken {
        /// Effector node index
        effector: usize,
        /// Intended chain root node index
        root: usize,
    },

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The loaded asset carries no usable scene or node data.
    #[error("Asset has no usable content: {0}")]
    EmptyAsset(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

#[cfg(feature = "gltf")]
impl From<gltf::Error> for MarionetteError {
    fn from(err: gltf::Error) -> Self {
        MarionetteError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, MarionetteError>`.
pub type Result<T> = std::result::Result<T, MarionetteError>;
