use glam::{Affine3A, Quat, Vec3};

use crate::rig::NodeIndex;

/// One joint of an animated rig.
///
/// # Design Principles
///
/// - Nodes live contiguously in a [`crate::rig::Rig`] arena and reference
///   each other by index, so the per-frame passes walk plain `Vec`s
/// - Each node carries two poses: the *rest* pose authored in the source
///   asset, and the *blend* pose the animation system writes every frame
/// - Matrices are cached on the node; they are only valid after the rig's
///   update passes have run
///
/// # Poses
///
/// The rest pose is the blend pivot: blending with factor 0 yields the rest
/// pose, factor 1 yields the sampled animation value. Setting a rest value
/// also resets the matching blend value, so a node nothing animates renders
/// in its authored pose.
#[derive(Debug, Clone)]
pub struct Node {
    // === Core Hierarchy ===
    /// Node name from the source asset (may be synthesized)
    pub(crate) name: String,
    /// Parent node index (None for the root and unattached nodes)
    pub(crate) parent: Option<NodeIndex>,
    /// Child node indices
    pub(crate) children: Vec<NodeIndex>,

    // === Rest Pose ===
    rest_scale: Vec3,
    rest_rotation: Quat,
    rest_translation: Vec3,

    // === Blend Pose ===
    blend_scale: Vec3,
    blend_rotation: Quat,
    blend_translation: Vec3,

    // === Cached Matrices ===
    /// Local transform of the blend pose (translation * rotation * scale)
    pub(crate) local_matrix: Affine3A,
    /// Parent world matrix times local matrix
    pub(crate) world_matrix: Affine3A,
}

impl Node {
    /// Creates an unattached node in the identity pose.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            rest_scale: Vec3::ONE,
            rest_rotation: Quat::IDENTITY,
            rest_translation: Vec3::ZERO,
            blend_scale: Vec3::ONE,
            blend_rotation: Quat::IDENTITY,
            blend_translation: Vec3::ZERO,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
        }
    }

    /// Returns the node name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent node index, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns a read-only slice of child node indices.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    // ========================================================================
    // Rest pose
    // ========================================================================

    /// Sets the rest scale and resets the blend scale to match.
    pub fn set_rest_scale(&mut self, scale: Vec3) {
        self.rest_scale = scale;
        self.blend_scale = scale;
    }

    /// Sets the rest rotation and resets the blend rotation to match.
    pub fn set_rest_rotation(&mut self, rotation: Quat) {
        self.rest_rotation = rotation;
        self.blend_rotation = rotation;
    }

    /// Sets the rest translation and resets the blend translation to match.
    pub fn set_rest_translation(&mut self, translation: Vec3) {
        self.rest_translation = translation;
        self.blend_translation = translation;
    }

    #[inline]
    #[must_use]
    pub fn rest_scale(&self) -> Vec3 {
        self.rest_scale
    }

    #[inline]
    #[must_use]
    pub fn rest_rotation(&self) -> Quat {
        self.rest_rotation
    }

    #[inline]
    #[must_use]
    pub fn rest_translation(&self) -> Vec3 {
        self.rest_translation
    }

    // ========================================================================
    // Blend pose
    // ========================================================================

    /// Blends the scale between rest pose and `scale`.
    ///
    /// `factor` is clamped to `[0, 1]`; 0 keeps the rest scale, 1 takes
    /// `scale` entirely.
    pub fn blend_scale(&mut self, scale: Vec3, factor: f32) {
        let f = factor.clamp(0.0, 1.0);
        self.blend_scale = scale * f + self.rest_scale * (1.0 - f);
    }

    /// Blends the rotation between rest pose and `rotation`.
    ///
    /// Uses spherical interpolation, which keeps the result on the shortest
    /// arc and sidesteps quaternion double-cover artifacts. The result is
    /// re-normalized before storing.
    pub fn blend_rotation(&mut self, rotation: Quat, factor: f32) {
        let f = factor.clamp(0.0, 1.0);
        self.blend_rotation = self.rest_rotation.slerp(rotation, f).normalize();
    }

    /// Blends the translation between rest pose and `translation`.
    ///
    /// `factor` is clamped to `[0, 1]`.
    pub fn blend_translation(&mut self, translation: Vec3, factor: f32) {
        let f = factor.clamp(0.0, 1.0);
        self.blend_translation = translation * f + self.rest_translation * (1.0 - f);
    }

    /// Resets the blend pose back to the rest pose.
    pub fn reset_blend(&mut self) {
        self.blend_scale = self.rest_scale;
        self.blend_rotation = self.rest_rotation;
        self.blend_translation = self.rest_translation;
    }

    #[inline]
    #[must_use]
    pub fn blend_scale_value(&self) -> Vec3 {
        self.blend_scale
    }

    #[inline]
    #[must_use]
    pub fn blend_rotation_value(&self) -> Quat {
        self.blend_rotation
    }

    #[inline]
    #[must_use]
    pub fn blend_translation_value(&self) -> Vec3 {
        self.blend_translation
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Rebuilds the local matrix from the blend pose.
    ///
    /// Composition order is translation * rotation * scale, matching glTF
    /// node TRS semantics.
    #[inline]
    pub fn update_local_matrix(&mut self) {
        self.local_matrix = Affine3A::from_scale_rotation_translation(
            self.blend_scale,
            self.blend_rotation,
            self.blend_translation,
        );
    }

    /// Returns a reference to the local transformation matrix.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Valid only after [`crate::rig::Rig::update_world_matrices`] (or a
    /// subtree update covering this node) has run.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World-space position of this node.
    ///
    /// Decomposes the cached world matrix; a degenerate matrix yields
    /// `Vec3::ZERO` instead of propagating NaNs.
    #[must_use]
    pub fn global_position(&self) -> Vec3 {
        decompose_affine(&self.world_matrix)
            .map_or(Vec3::ZERO, |(_, _, translation)| translation)
    }

    /// World-space rotation of this node.
    ///
    /// Decomposes the cached world matrix; a degenerate matrix yields
    /// `Quat::IDENTITY` instead of propagating NaNs.
    #[must_use]
    pub fn global_rotation(&self) -> Quat {
        decompose_affine(&self.world_matrix).map_or(Quat::IDENTITY, |(_, rotation, _)| rotation)
    }
}

/// Decomposes an affine transform into scale, rotation and translation.
///
/// Returns `None` when the linear part is singular or non-finite, in which
/// case callers substitute identity defaults.
pub(crate) fn decompose_affine(matrix: &Affine3A) -> Option<(Vec3, Quat, Vec3)> {
    let det = matrix.matrix3.determinant();
    if !det.is_finite() || det.abs() < 1e-10 {
        return None;
    }
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    if !(scale.is_finite() && rotation.is_finite() && translation.is_finite()) {
        return None;
    }
    Some((scale, rotation, translation))
}
