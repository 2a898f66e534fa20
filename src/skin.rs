//! Skin output: GPU-ready joint matrix and dual-quaternion buffers.
//!
//! A [`Skin`] pairs a joint list with inverse bind matrices and refreshes
//! two parallel buffers from the rig's world matrices each frame. Both
//! buffers are plain `#[repr(C)]` data castable with [`bytemuck`], so a
//! renderer can upload them without copying.

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use crate::errors::{MarionetteError, Result};
use crate::rig::node::decompose_affine;
use crate::rig::{NodeIndex, Rig};

/// A rigid transform as a dual quaternion, laid out for GPU upload.
///
/// `real` is the rotation quaternion (xyzw); `dual` encodes the translation
/// as `0.5 * (t, 0) * real`. Dual-quaternion skinning blends these per
/// vertex without the volume-loss artifacts of blended matrices.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct JointDualQuat {
    pub real: Vec4,
    pub dual: Vec4,
}

impl JointDualQuat {
    /// No rotation, no translation.
    pub const IDENTITY: Self = Self {
        real: Vec4::new(0.0, 0.0, 0.0, 1.0),
        dual: Vec4::ZERO,
    };

    /// Encodes a rotation plus translation.
    #[must_use]
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let real = Vec4::from(rotation);
        let t = Quat::from_xyzw(translation.x, translation.y, translation.z, 0.0);
        let dual = Vec4::from(t * rotation) * 0.5;
        Self { real, dual }
    }
}

/// Joint set and skinning buffers for one skinned mesh.
#[derive(Debug, Clone)]
pub struct Skin {
    name: String,
    joints: Vec<NodeIndex>,
    inverse_bind_matrices: Vec<Affine3A>,
    joint_matrices: Vec<Mat4>,
    joint_dual_quats: Vec<JointDualQuat>,
}

impl Skin {
    /// Builds a skin from its joint node indices and inverse bind matrices.
    ///
    /// # Errors
    ///
    /// Fails when the two lists differ in length.
    pub fn new(
        name: impl Into<String>,
        joints: Vec<NodeIndex>,
        inverse_bind_matrices: Vec<Mat4>,
    ) -> Result<Self> {
        let name = name.into();
        if joints.len() != inverse_bind_matrices.len() {
            return Err(MarionetteError::JointCountMismatch {
                name,
                joints: joints.len(),
                matrices: inverse_bind_matrices.len(),
            });
        }
        let count = joints.len();
        let inverse_bind_matrices = inverse_bind_matrices
            .into_iter()
            .map(Affine3A::from_mat4)
            .collect();
        Ok(Self {
            name,
            joints,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; count],
            joint_dual_quats: vec![JointDualQuat::IDENTITY; count],
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joint node indices, in glTF joint order.
    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[NodeIndex] {
        &self.joints
    }

    /// Per-joint `world * inverseBind` matrices from the last update.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Dual-quaternion equivalents of [`Skin::joint_matrices`].
    #[inline]
    #[must_use]
    pub fn joint_dual_quats(&self) -> &[JointDualQuat] {
        &self.joint_dual_quats
    }

    /// Refreshes both skinning buffers from the rig's world matrices.
    ///
    /// Each joint matrix is the node's world matrix times the joint's
    /// inverse bind matrix; the rig's world matrices are already
    /// model-space, so no further root term applies. The dual quaternion is
    /// decomposed from the same product; a joint whose matrix cannot be
    /// decomposed contributes the identity dual quat, while its matrix
    /// entry stays exact.
    pub fn update_joint_matrices(&mut self, rig: &Rig) {
        for (i, &joint) in self.joints.iter().enumerate() {
            let matrix = *rig.node(joint).world_matrix() * self.inverse_bind_matrices[i];
            self.joint_matrices[i] = Mat4::from(matrix);
            self.joint_dual_quats[i] = match decompose_affine(&matrix) {
                Some((_, rotation, translation)) => {
                    JointDualQuat::from_rotation_translation(rotation, translation)
                }
                None => JointDualQuat::IDENTITY,
            };
        }
    }

    /// CPU linear-blend skinning for one vertex buffer.
    ///
    /// `joints` holds four joint indices per vertex (into this skin's joint
    /// list) and `weights` their blend weights. Uses the joint matrices from
    /// the last [`Skin::update_joint_matrices`] call. Intended for debug
    /// views and tests; real-time skinning belongs on the GPU.
    #[must_use]
    pub fn skin_positions(
        &self,
        positions: &[Vec3],
        joints: &[[u16; 4]],
        weights: &[Vec4],
    ) -> Vec<Vec3> {
        positions
            .iter()
            .zip(joints)
            .zip(weights)
            .map(|((&position, joint), &weight)| {
                let skin_matrix = self.joint_matrices[joint[0] as usize] * weight.x
                    + self.joint_matrices[joint[1] as usize] * weight.y
                    + self.joint_matrices[joint[2] as usize] * weight.z
                    + self.joint_matrices[joint[3] as usize] * weight.w;
                skin_matrix.transform_point3(position)
            })
            .collect()
    }
}
