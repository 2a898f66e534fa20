//! Model: the viewer-facing facade over one animated skeleton.
//!
//! A [`Model`] owns a rig, its animation clips and skins, an
//! [`AnimationPlayer`] and an [`IkSolver`], and exposes the plain
//! getter/setter surface a viewer UI binds to. The per-frame entry point is
//! [`Model::update`], which runs pose sampling, optional IK and skin buffer
//! refresh in order and records per-phase timings.

use glam::{Mat4, Vec3};

use crate::animation::{AnimationClip, AnimationPlayer, BlendMode, KeyframeTrack, PlaybackDirection, Track, TrackData, TrackMeta};
use crate::assets::{ModelSource, TrackValues};
use crate::errors::{MarionetteError, Result};
use crate::ik::IkSolver;
use crate::rig::{NodeIndex, Rig};
use crate::skin::{JointDualQuat, Skin};
use crate::utils::Stopwatch;

/// Which IK algorithm [`Model::update`] runs after pose sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IkMode {
    /// No IK pass.
    #[default]
    Off,
    /// Cyclic coordinate descent.
    Ccd,
    /// Forward-and-backward reaching.
    Fabrik,
}

/// Milliseconds spent in each phase of the last [`Model::update`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateTimings {
    /// Clip sampling, blending and the world-matrix pass.
    pub pose_ms: f32,
    /// IK solve including its subtree refreshes (0 when IK is off).
    pub ik_ms: f32,
    /// Joint matrix and dual-quaternion buffer refresh.
    pub skinning_ms: f32,
}

/// One animated character: rig, clips, skins, playback and IK state.
#[derive(Debug, Clone)]
pub struct Model {
    rig: Rig,
    clips: Vec<AnimationClip>,
    skins: Vec<Skin>,
    player: AnimationPlayer,
    solver: IkSolver,
    ik_mode: IkMode,
    ik_target: Vec3,
    ik_converged: bool,
    timings: UpdateTimings,
}

impl Model {
    /// Assembles a model from plain source data, validating everything once.
    ///
    /// After this returns `Ok`, the per-frame path can index nodes, clips
    /// and joints without further range checks.
    ///
    /// # Errors
    ///
    /// Fails on a bad root or child index, a cyclic hierarchy, track
    /// timelines that are not strictly increasing, value buffers that do not
    /// match their interpolation mode, track data that does not fit its
    /// target path, out-of-range track or joint node indices, and skins
    /// whose joint and inverse-bind-matrix lists differ in length.
    pub fn from_source(source: ModelSource) -> Result<Self> {
        let rig = Rig::from_nodes(&source.nodes, source.root)?;
        let node_count = rig.len();

        let mut clips = Vec::with_capacity(source.clips.len());
        for clip_source in source.clips {
            let mut tracks = Vec::with_capacity(clip_source.tracks.len());
            for track_source in clip_source.tracks {
                if track_source.node >= node_count {
                    return Err(MarionetteError::NodeIndexOutOfBounds {
                        context: "track target",
                        index: track_source.node,
                        count: node_count,
                    });
                }
                let data = match track_source.values {
                    TrackValues::Vector3(values) => TrackData::Vector3(KeyframeTrack::new(
                        track_source.times,
                        values,
                        track_source.interpolation,
                    )?),
                    TrackValues::Quaternion(values) => TrackData::Quaternion(KeyframeTrack::new(
                        track_source.times,
                        values,
                        track_source.interpolation,
                    )?),
                };
                let meta = TrackMeta {
                    node: track_source.node,
                    target: track_source.target,
                };
                tracks.push(Track::new(meta, data)?);
            }
            clips.push(AnimationClip::new(clip_source.name, tracks));
        }

        let mut skins = Vec::with_capacity(source.skins.len());
        for skin_source in source.skins {
            if let Some(&bad) = skin_source.joints.iter().find(|&&j| j >= node_count) {
                return Err(MarionetteError::NodeIndexOutOfBounds {
                    context: "skin joint list",
                    index: bad,
                    count: node_count,
                });
            }
            skins.push(Skin::new(
                skin_source.name,
                skin_source.joints,
                skin_source.inverse_bind_matrices,
            )?);
        }

        log::debug!(
            "Model assembled: {} nodes, {} clips, {} skins",
            node_count,
            clips.len(),
            skins.len()
        );

        let player = AnimationPlayer::new(node_count);
        let mut model = Self {
            rig,
            clips,
            skins,
            player,
            solver: IkSolver::new(),
            ik_mode: IkMode::Off,
            ik_target: Vec3::ZERO,
            ik_converged: false,
            timings: UpdateTimings::default(),
        };
        // Skin buffers match the rest pose until the first update.
        for skin in &mut model.skins {
            skin.update_joint_matrices(&model.rig);
        }
        Ok(model)
    }

    /// Runs one frame: pose sampling, optional IK, skin buffer refresh.
    ///
    /// `wall_time` is seconds from the caller's clock (see
    /// [`crate::utils::Timer`]); the model holds no clock of its own.
    pub fn update(&mut self, wall_time: f32) {
        let watch = Stopwatch::start();
        self.player.apply(&mut self.rig, &self.clips, wall_time);
        self.timings.pose_ms = watch.elapsed_ms();

        let watch = Stopwatch::start();
        match self.ik_mode {
            IkMode::Off => {}
            IkMode::Ccd => {
                self.ik_converged = self.solver.solve_ccd(&mut self.rig, self.ik_target);
            }
            IkMode::Fabrik => {
                self.ik_converged = self.solver.solve_fabrik(&mut self.rig, self.ik_target);
            }
        }
        self.timings.ik_ms = watch.elapsed_ms();

        let watch = Stopwatch::start();
        for skin in &mut self.skins {
            skin.update_joint_matrices(&self.rig);
        }
        self.timings.skinning_ms = watch.elapsed_ms();
    }

    /// Phase timings of the last [`Model::update`] call.
    #[inline]
    #[must_use]
    pub fn last_timings(&self) -> UpdateTimings {
        self.timings
    }

    // ========================================================================
    // Rig access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.rig.len()
    }

    /// Node names in arena order (UI node pickers).
    #[must_use]
    pub fn node_names(&self) -> Vec<&str> {
        self.rig.nodes().iter().map(crate::rig::Node::name).collect()
    }

    /// World-space parent-to-child line segments for skeleton display.
    #[must_use]
    pub fn skeleton_lines(&self) -> Vec<Vec3> {
        self.rig.skeleton_lines()
    }

    // ========================================================================
    // Clips and playback
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Clip names in load order (UI clip pickers).
    #[must_use]
    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(AnimationClip::name).collect()
    }

    #[inline]
    #[must_use]
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Active (source) clip index.
    #[inline]
    #[must_use]
    pub fn clip(&self) -> usize {
        self.player.clip
    }

    /// Selects the active clip. Panics on an out-of-range index at the next
    /// update, per the fail-fast indexing policy.
    #[inline]
    pub fn set_clip(&mut self, clip: usize) {
        self.player.clip = clip;
    }

    /// Destination clip index for the two-clip blend modes.
    #[inline]
    #[must_use]
    pub fn dest_clip(&self) -> usize {
        self.player.dest_clip
    }

    #[inline]
    pub fn set_dest_clip(&mut self, clip: usize) {
        self.player.dest_clip = clip;
    }

    /// End time of the active clip in seconds.
    #[must_use]
    pub fn clip_end_time(&self) -> f32 {
        self.clips.get(self.player.clip).map_or(0.0, AnimationClip::duration)
    }

    #[inline]
    #[must_use]
    pub fn playing(&self) -> bool {
        self.player.playing
    }

    #[inline]
    pub fn set_playing(&mut self, playing: bool) {
        self.player.playing = playing;
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.player.speed
    }

    #[inline]
    pub fn set_speed(&mut self, speed: f32) {
        self.player.speed = speed;
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> PlaybackDirection {
        self.player.direction
    }

    #[inline]
    pub fn set_direction(&mut self, direction: PlaybackDirection) {
        self.player.direction = direction;
    }

    #[inline]
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.player.blend_mode()
    }

    /// Switches the blend mode; the player resets all blend poses on a
    /// change so stale pose data cannot leak across modes.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.player.set_blend_mode(&mut self.rig, mode);
    }

    #[inline]
    #[must_use]
    pub fn blend_factor(&self) -> f32 {
        self.player.blend_factor
    }

    #[inline]
    pub fn set_blend_factor(&mut self, factor: f32) {
        self.player.blend_factor = factor;
    }

    #[inline]
    #[must_use]
    pub fn cross_blend_factor(&self) -> f32 {
        self.player.cross_blend_factor
    }

    #[inline]
    pub fn set_cross_blend_factor(&mut self, factor: f32) {
        self.player.cross_blend_factor = factor;
    }

    /// Clip-local time of the last applied frame.
    #[inline]
    #[must_use]
    pub fn time_position(&self) -> f32 {
        self.player.time_position()
    }

    /// Holds a clip-local time for scrubbing; takes effect while paused.
    #[inline]
    pub fn set_time_position(&mut self, time: f32) {
        self.player.set_time_position(time);
    }

    /// Additive split node, if one is set.
    #[inline]
    #[must_use]
    pub fn split_node(&self) -> Option<NodeIndex> {
        self.player.split_node()
    }

    /// Chooses the additive split node and rebuilds the mask pair.
    pub fn set_split_node(&mut self, node: NodeIndex) {
        self.player.set_split_node(&self.rig, node);
    }

    // ========================================================================
    // IK
    // ========================================================================

    /// Sets the IK chain from an effector node up to a chain root.
    ///
    /// Walks parent links from `effector` to `root` and hands the resulting
    /// effector-first chain to the solver, caching bone lengths from the
    /// rig's current world pose.
    ///
    /// # Errors
    ///
    /// Fails with [`MarionetteError::IkChainBroken`] when `effector` does
    /// not descend from `root`.
    pub fn set_ik_chain(&mut self, effector: NodeIndex, root: NodeIndex) -> Result<()> {
        let chain = self
            .rig
            .path_to_ancestor(effector, root)
            .ok_or(MarionetteError::IkChainBroken { effector, root })?;
        self.solver.set_chain(&self.rig, &chain);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn ik_mode(&self) -> IkMode {
        self.ik_mode
    }

    #[inline]
    pub fn set_ik_mode(&mut self, mode: IkMode) {
        self.ik_mode = mode;
    }

    #[inline]
    #[must_use]
    pub fn ik_target(&self) -> Vec3 {
        self.ik_target
    }

    #[inline]
    pub fn set_ik_target(&mut self, target: Vec3) {
        self.ik_target = target;
    }

    #[inline]
    #[must_use]
    pub fn ik_iterations(&self) -> u32 {
        self.solver.iterations()
    }

    #[inline]
    pub fn set_ik_iterations(&mut self, iterations: u32) {
        self.solver.set_iterations(iterations);
    }

    /// Effector node of the current IK chain, if one is set.
    #[inline]
    #[must_use]
    pub fn ik_effector(&self) -> Option<NodeIndex> {
        self.solver.effector()
    }

    /// Root node of the current IK chain, if one is set.
    #[inline]
    #[must_use]
    pub fn ik_root(&self) -> Option<NodeIndex> {
        self.solver.chain_root()
    }

    /// Whether the last IK solve reached the target.
    #[inline]
    #[must_use]
    pub fn ik_converged(&self) -> bool {
        self.ik_converged
    }

    // ========================================================================
    // Skinning output
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    /// Joint matrices of skin `skin`, refreshed by the last update.
    /// Panics on an out-of-range skin index.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self, skin: usize) -> &[Mat4] {
        self.skins[skin].joint_matrices()
    }

    /// Dual quaternions of skin `skin`, refreshed by the last update.
    /// Panics on an out-of-range skin index.
    #[inline]
    #[must_use]
    pub fn joint_dual_quats(&self, skin: usize) -> &[JointDualQuat] {
        self.skins[skin].joint_dual_quats()
    }
}
