//! Asset boundary: the plain-data contract between loaders and the core.
//!
//! A loader (or a test, or procedural code) fills a [`ModelSource`] and
//! hands it to [`crate::Model::from_source`], which validates everything
//! once and assembles the live types. Node references are plain indices
//! into [`ModelSource::nodes`], mirroring glTF's index-based layout.

use glam::{Mat4, Quat, Vec3};

use crate::animation::{InterpolationMode, TargetPath};

#[cfg(feature = "gltf")]
pub mod gltf;

/// One source node: rest pose plus hierarchy references.
///
/// Absent pose components default to identity (scale 1, rotation identity,
/// translation 0). A node that carries its own skin is excluded from the
/// skeleton tree during rig construction; it still occupies an arena slot
/// so tracks can target it.
#[derive(Debug, Clone, Default)]
pub struct NodeSource {
    pub name: String,
    pub scale: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub translation: Option<Vec3>,
    /// Child node indices into the source node list.
    pub children: Vec<usize>,
    /// Index of the skin this node carries, if any.
    pub skin: Option<usize>,
}

/// One source skin: joint node indices plus inverse bind matrices.
#[derive(Debug, Clone)]
pub struct SkinSource {
    pub name: String,
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// Raw keyframe values for one track, typed per target property.
#[derive(Debug, Clone)]
pub enum TrackValues {
    Vector3(Vec<Vec3>),
    Quaternion(Vec<Quat>),
}

/// One source track: target, timeline and value buffer.
#[derive(Debug, Clone)]
pub struct TrackSource {
    /// Target node index into the source node list.
    pub node: usize,
    pub target: TargetPath,
    pub interpolation: InterpolationMode,
    pub times: Vec<f32>,
    pub values: TrackValues,
}

/// One source animation clip.
#[derive(Debug, Clone)]
pub struct ClipSource {
    pub name: String,
    pub tracks: Vec<TrackSource>,
}

/// Everything a model needs: nodes, the designated rig root, skins, clips.
#[derive(Debug, Clone, Default)]
pub struct ModelSource {
    pub nodes: Vec<NodeSource>,
    /// Index of the skeleton root node.
    pub root: usize,
    pub skins: Vec<SkinSource>,
    pub clips: Vec<ClipSource>,
}
