//! Animation clips: named sets of tracks applied to a rig under a mask.

use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;
use crate::errors::{MarionetteError, Result};
use crate::rig::{NodeIndex, NodeMask, Rig};

/// The node property a track animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

impl TargetPath {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetPath::Translation => "translation",
            TargetPath::Rotation => "rotation",
            TargetPath::Scale => "scale",
        }
    }
}

/// Which node and property a track drives.
#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node: NodeIndex,
    pub target: TargetPath,
}

/// Typed keyframe storage for one track.
#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

/// A sampled track value, typed per target path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

/// Complete track definition: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    meta: TrackMeta,
    data: TrackData,
}

impl Track {
    /// Pairs metadata with keyframe data.
    ///
    /// # Errors
    ///
    /// Fails when the data kind does not fit the target path: rotation
    /// tracks carry quaternions, translation and scale tracks carry vectors.
    pub fn new(meta: TrackMeta, data: TrackData) -> Result<Self> {
        let kind_fits = match meta.target {
            TargetPath::Rotation => matches!(data, TrackData::Quaternion(_)),
            TargetPath::Translation | TargetPath::Scale => matches!(data, TrackData::Vector3(_)),
        };
        if !kind_fits {
            return Err(MarionetteError::TrackKindMismatch {
                target: meta.target.as_str(),
            });
        }
        Ok(Self { meta, data })
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeIndex {
        self.meta.node
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> TargetPath {
        self.meta.target
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &TrackData {
        &self.data
    }

    /// Last timeline entry, or 0.0 for an empty track.
    #[must_use]
    pub fn max_time(&self) -> f32 {
        match &self.data {
            TrackData::Vector3(track) => track.max_time(),
            TrackData::Quaternion(track) => track.max_time(),
        }
    }

    /// Samples the track at `time`.
    ///
    /// Empty tracks degrade to the target path's rest-style default: one for
    /// scale, zero for translation, identity for rotation.
    #[must_use]
    pub fn sample(&self, time: f32) -> TrackValue {
        match &self.data {
            TrackData::Vector3(track) => {
                let fallback = match self.meta.target {
                    TargetPath::Scale => Vec3::ONE,
                    _ => Vec3::ZERO,
                };
                TrackValue::Vector3(track.sample(time).unwrap_or(fallback))
            }
            TrackData::Quaternion(track) => {
                TrackValue::Quaternion(track.sample(time).unwrap_or(Quat::IDENTITY))
            }
        }
    }
}

/// A named animation: a set of tracks over a shared local timeline.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip; its duration is the first track's end time.
    ///
    /// glTF exporters end every channel of a clip at the same time, so the
    /// first track is authoritative. A clip with no tracks has duration 0.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.first().map_or(0.0, Track::max_time);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clip end time in seconds.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Writes this clip's pose at `time` into the rig, overriding the blend
    /// pose of every masked target node (blend factor 1).
    pub fn set_pose(&self, rig: &mut Rig, mask: &NodeMask, time: f32) {
        self.blend_pose(rig, mask, time, 1.0);
    }

    /// Blends this clip's pose at `time` into the rig.
    ///
    /// Each track whose target node the mask includes is sampled and routed
    /// to the matching node blend setter, which mixes toward the rest pose
    /// by `factor`. Afterwards every node's local matrix is rebuilt in one
    /// flat pass; the caller runs the world-matrix pass once per composed
    /// pose.
    pub fn blend_pose(&self, rig: &mut Rig, mask: &NodeMask, time: f32, factor: f32) {
        for track in &self.tracks {
            let target = track.node();
            if !mask.contains(target) {
                continue;
            }
            match (track.sample(time), track.target()) {
                (TrackValue::Vector3(value), TargetPath::Translation) => {
                    rig.node_mut(target).blend_translation(value, factor);
                }
                (TrackValue::Vector3(value), TargetPath::Scale) => {
                    rig.node_mut(target).blend_scale(value, factor);
                }
                (TrackValue::Quaternion(value), _) => {
                    rig.node_mut(target).blend_rotation(value, factor);
                }
                // Track::new rules out vector data on rotation tracks.
                (TrackValue::Vector3(_), TargetPath::Rotation) => {}
            }
        }
        rig.update_local_matrices();
    }
}
