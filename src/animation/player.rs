//! Animation player: maps wall-clock time to clip-local time and composes
//! the frame's pose according to the active blend mode.
//!
//! The player owns no clock. Callers pass wall-time seconds in (see
//! [`crate::utils::Timer`]), which keeps replay deterministic and leaves
//! frame pacing to the embedding application.

use crate::animation::clip::AnimationClip;
use crate::rig::{NodeIndex, NodeMask, Rig};

/// Replay direction for the active clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDirection {
    Forward,
    Backward,
}

/// How the frame's pose is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// One clip, faded between rest pose and full animation by the blend
    /// factor.
    FadeInOut,
    /// Two clips, the whole skeleton fading from source to destination by
    /// the cross-blend factor.
    CrossFade,
    /// Two clips on disjoint skeleton halves, split at a chosen node.
    Additive,
}

/// Playback state and per-frame pose orchestration.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    /// Active (source) clip index.
    pub clip: usize,
    /// Destination clip index for [`BlendMode::CrossFade`] and
    /// [`BlendMode::Additive`].
    pub dest_clip: usize,
    /// When false, the held time position is replayed (scrubbing).
    pub playing: bool,
    /// Playback speed multiplier.
    pub speed: f32,
    /// Rest-to-animation fade for [`BlendMode::FadeInOut`].
    pub blend_factor: f32,
    /// Source-to-destination fade for the two-clip modes.
    pub cross_blend_factor: f32,
    pub direction: PlaybackDirection,
    blend_mode: BlendMode,
    time_position: f32,
    split_node: Option<NodeIndex>,
    primary_mask: NodeMask,
    inverted_mask: NodeMask,
    full_mask: NodeMask,
    empty_mask: NodeMask,
}

impl AnimationPlayer {
    /// Creates a player for a rig of `node_count` nodes.
    ///
    /// Starts playing clip 0 forward at speed 1 with full blend-in and no
    /// split node.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            clip: 0,
            dest_clip: 0,
            playing: true,
            speed: 1.0,
            blend_factor: 1.0,
            cross_blend_factor: 0.0,
            direction: PlaybackDirection::Forward,
            blend_mode: BlendMode::FadeInOut,
            time_position: 0.0,
            split_node: None,
            primary_mask: NodeMask::all(node_count),
            inverted_mask: NodeMask::none(node_count),
            full_mask: NodeMask::all(node_count),
            empty_mask: NodeMask::none(node_count),
        }
    }

    #[inline]
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Switches the blend mode and resets every blend pose to rest, so pose
    /// data written by the previous mode cannot leak into the new one.
    pub fn set_blend_mode(&mut self, rig: &mut Rig, mode: BlendMode) {
        if self.blend_mode != mode {
            self.blend_mode = mode;
            rig.reset_blend_poses(&self.full_mask);
        }
    }

    #[inline]
    #[must_use]
    pub fn split_node(&self) -> Option<NodeIndex> {
        self.split_node
    }

    /// Chooses the additive split node and rebuilds the mask pair.
    ///
    /// The split node's subtree is excluded from the primary mask and owned
    /// by the inverted mask, so the destination clip drives that subtree in
    /// [`BlendMode::Additive`].
    pub fn set_split_node(&mut self, rig: &Rig, node: NodeIndex) {
        let (primary, inverted) = rig.split_masks(node);
        self.primary_mask = primary;
        self.inverted_mask = inverted;
        self.split_node = Some(node);
    }

    #[inline]
    #[must_use]
    pub fn primary_mask(&self) -> &NodeMask {
        &self.primary_mask
    }

    #[inline]
    #[must_use]
    pub fn inverted_mask(&self) -> &NodeMask {
        &self.inverted_mask
    }

    /// Clip-local time of the last applied frame.
    #[inline]
    #[must_use]
    pub fn time_position(&self) -> f32 {
        self.time_position
    }

    /// Holds a clip-local time for scrub replay while paused.
    #[inline]
    pub fn set_time_position(&mut self, time: f32) {
        self.time_position = time;
    }

    /// Maps wall time onto the clip's local timeline.
    #[must_use]
    pub fn local_time(&self, duration: f32, wall_time: f32) -> f32 {
        if duration <= 0.0 {
            return 0.0;
        }
        let cycled = (wall_time * self.speed).rem_euclid(duration);
        match self.direction {
            PlaybackDirection::Forward => cycled,
            PlaybackDirection::Backward => duration - cycled,
        }
    }

    /// Composes this frame's pose into the rig.
    ///
    /// Samples the active clip(s) at the mapped local time, writes blend
    /// poses per the blend mode, then runs one full-tree world-matrix pass.
    /// With no clips loaded the rig keeps its rest pose.
    pub fn apply(&mut self, rig: &mut Rig, clips: &[AnimationClip], wall_time: f32) {
        if clips.is_empty() {
            return;
        }
        let source = &clips[self.clip];

        let local = if self.playing {
            self.local_time(source.duration(), wall_time)
        } else {
            self.time_position
        };
        self.time_position = local;

        match self.blend_mode {
            BlendMode::FadeInOut => {
                source.blend_pose(rig, &self.full_mask, local, self.blend_factor);
            }
            BlendMode::CrossFade => {
                self.cross_blend(rig, clips, local, &self.full_mask, &self.empty_mask);
            }
            BlendMode::Additive => {
                self.cross_blend(rig, clips, local, &self.primary_mask, &self.inverted_mask);
            }
        }
        rig.update_world_matrices();
    }

    /// Two-clip composition shared by cross-fade and additive modes.
    ///
    /// The destination clip is sampled at a time scaled by the duration
    /// ratio so both clips stay phase-aligned over their cycles. Four calls
    /// compose the pose: the source written fully and the destination
    /// blended over it on the primary half, and the reverse pairing on the
    /// inverted half.
    fn cross_blend(
        &self,
        rig: &mut Rig,
        clips: &[AnimationClip],
        source_time: f32,
        primary: &NodeMask,
        inverted: &NodeMask,
    ) {
        let source = &clips[self.clip];
        let dest = &clips[self.dest_clip];

        let scaled_time = if source.duration() > 0.0 {
            source_time * dest.duration() / source.duration()
        } else {
            0.0
        };

        source.set_pose(rig, primary, source_time);
        dest.blend_pose(rig, primary, scaled_time, self.cross_blend_factor);
        dest.set_pose(rig, inverted, scaled_time);
        source.blend_pose(rig, inverted, source_time, self.cross_blend_factor);
    }
}
