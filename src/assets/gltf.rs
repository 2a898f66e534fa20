//! glTF import: maps a glTF document onto a [`ModelSource`].
//!
//! Only the animation-relevant parts of the document are read: node
//! hierarchy and TRS, skins with inverse bind matrices, and keyframe
//! animations. Meshes, materials and textures are a renderer's concern and
//! are ignored here.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};

use crate::animation::{InterpolationMode, TargetPath};
use crate::assets::{ClipSource, ModelSource, NodeSource, SkinSource, TrackSource, TrackValues};
use crate::errors::{MarionetteError, Result};

/// Loads a `.gltf` / `.glb` file into a [`ModelSource`].
///
/// The rig root is the first node of the default scene (or of the first
/// scene when no default is set); extra scene roots are ignored with a
/// warning, matching the single-skeleton scope of this crate.
///
/// # Errors
///
/// Fails on unreadable or malformed files and on documents without a scene
/// or scene nodes.
pub fn load(path: impl AsRef<Path>) -> Result<ModelSource> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| MarionetteError::EmptyAsset(format!("{}: no scenes", path.display())))?;

    let mut scene_roots = scene.nodes();
    let root = scene_roots
        .next()
        .ok_or_else(|| {
            MarionetteError::EmptyAsset(format!("{}: scene has no nodes", path.display()))
        })?
        .index();
    let extra_roots = scene_roots.count();
    if extra_roots > 0 {
        log::warn!(
            "glTF scene has {extra_roots} extra root node(s); node {root} becomes the rig root"
        );
    }

    let nodes = load_nodes(&document);
    let skins = load_skins(&document, &buffers);
    let clips = load_clips(&document, &buffers)?;

    log::debug!(
        "glTF '{}': {} nodes, {} skins, {} clips",
        path.display(),
        nodes.len(),
        skins.len(),
        clips.len()
    );

    Ok(ModelSource {
        nodes,
        root,
        skins,
        clips,
    })
}

fn load_nodes(document: &gltf::Document) -> Vec<NodeSource> {
    document
        .nodes()
        .map(|node| {
            let name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
            let (translation, rotation, scale) = node.transform().decomposed();
            NodeSource {
                name,
                scale: Some(Vec3::from_array(scale)),
                rotation: Some(Quat::from_array(rotation)),
                translation: Some(Vec3::from_array(translation)),
                children: node.children().map(|child| child.index()).collect(),
                skin: node.skin().map(|skin| skin.index()),
            }
        })
        .collect()
}

fn load_skins(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<SkinSource> {
    document
        .skins()
        .map(|skin| {
            let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
            let inverse_bind_matrices: Vec<Mat4> =
                if let Some(iter) = reader.read_inverse_bind_matrices() {
                    iter.map(|m| Mat4::from_cols_array_2d(&m)).collect()
                } else {
                    vec![Mat4::IDENTITY; skin.joints().count()]
                };
            SkinSource {
                name: skin.name().unwrap_or("Skin").to_string(),
                joints: skin.joints().map(|joint| joint.index()).collect(),
                inverse_bind_matrices,
            }
        })
        .collect()
}

fn load_clips(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<Vec<ClipSource>> {
    let mut clips = Vec::new();

    for (anim_index, anim) in document.animations().enumerate() {
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
            let target = channel.target();
            let node = target.node().index();

            let times: Vec<f32> = reader
                .read_inputs()
                .ok_or_else(|| {
                    MarionetteError::GltfError(format!(
                        "animation {anim_index}: channel for node {node} has no input accessor"
                    ))
                })?
                .collect();

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let outputs = reader.read_outputs().ok_or_else(|| {
                MarionetteError::GltfError(format!(
                    "animation {anim_index}: channel for node {node} has no output accessor"
                ))
            })?;

            let (target, values) = match outputs {
                gltf::animation::util::ReadOutputs::Translations(iter) => (
                    TargetPath::Translation,
                    TrackValues::Vector3(iter.map(Vec3::from_array).collect()),
                ),
                gltf::animation::util::ReadOutputs::Rotations(iter) => (
                    TargetPath::Rotation,
                    TrackValues::Quaternion(iter.into_f32().map(Quat::from_array).collect()),
                ),
                gltf::animation::util::ReadOutputs::Scales(iter) => (
                    TargetPath::Scale,
                    TrackValues::Vector3(iter.map(Vec3::from_array).collect()),
                ),
                gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                    log::warn!(
                        "animation {anim_index}: morph weight channel on node {node} skipped"
                    );
                    continue;
                }
            };

            tracks.push(TrackSource {
                node,
                target,
                interpolation,
                times,
                values,
            });
        }

        clips.push(ClipSource {
            name: anim
                .name()
                .map_or_else(|| format!("Clip_{anim_index}"), str::to_string),
            tracks,
        });
    }

    Ok(clips)
}
