//! Marionette: a CPU-side skeletal animation toolkit.
//!
//! Loads a skinned character rig from plain source data (or glTF, behind
//! the `gltf` feature), samples and blends its animation clips, optionally
//! poses a limb chain with CCD or FABRIK inverse kinematics, and produces
//! the joint matrix / dual-quaternion buffers a renderer consumes.
//!
//! The crate stops at plain data on both ends: it parses no file format
//! beyond the optional glTF import and touches no GPU. A typical frame:
//!
//! ```rust,ignore
//! model.update(timer.elapsed_seconds());
//! upload(model.joint_matrices(0));
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod errors;
pub mod ik;
pub mod model;
pub mod rig;
pub mod skin;
pub mod utils;

pub use animation::{
    AnimationClip, AnimationPlayer, BlendMode, InterpolationMode, KeyframeTrack,
    PlaybackDirection, TargetPath, Track, TrackData, TrackMeta, TrackValue,
};
pub use assets::{ClipSource, ModelSource, NodeSource, SkinSource, TrackSource, TrackValues};
pub use errors::{MarionetteError, Result};
pub use ik::IkSolver;
pub use model::{IkMode, Model, UpdateTimings};
pub use rig::{Node, NodeIndex, NodeMask, Rig};
pub use skin::{JointDualQuat, Skin};
pub use utils::{Stopwatch, Timer};
