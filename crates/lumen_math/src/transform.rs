// Node transforms for hierarchical ray tracing.
//
// A scene node keeps its local matrix together with the inverse (for pulling
// rays into local space) and the inverse-transpose (for pushing normals and
// tangents back out under non-uniform scale).

use std::str::FromStr;

use glam::{Mat3, Mat4, Vec3};
use thiserror::Error;

/// Errors produced while editing a transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("unknown rotation axis '{0}', expected x, y or z")]
    UnknownAxis(String),
}

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Inverse-transpose of the upper 3x3, used to transform normals.
    fn normal_matrix(&self) -> Mat3;
}

impl Mat4Ext for Mat4 {
    fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(*self).inverse().transpose()
    }
}

/// Principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

impl FromStr for Axis {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(TransformError::UnknownAxis(other.to_string())),
        }
    }
}

/// A local transform with its cached inverse and normal matrix.
///
/// Every edit left-multiplies onto the current matrix, so the most recent
/// operation is applied last (outermost).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
    normal: Mat3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
        normal: Mat3::IDENTITY,
    };

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix,
            inverse: matrix.inverse(),
            normal: matrix.normal_matrix(),
        }
    }

    /// Replace the matrix and refresh the caches.
    pub fn set(&mut self, matrix: Mat4) {
        *self = Self::from_matrix(matrix);
    }

    pub fn scale(&mut self, amount: Vec3) {
        self.set(Mat4::from_scale(amount) * self.matrix);
    }

    pub fn translate(&mut self, amount: Vec3) {
        self.set(Mat4::from_translation(amount) * self.matrix);
    }

    /// Rotate about a principal axis by `degrees`.
    pub fn rotate(&mut self, axis: Axis, degrees: f32) {
        let rotation = Mat4::from_axis_angle(axis.unit(), degrees.to_radians());
        self.set(rotation * self.matrix);
    }

    #[inline]
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    #[inline]
    pub fn inverse(&self) -> &Mat4 {
        &self.inverse
    }

    #[inline]
    pub fn normal_matrix(&self) -> &Mat3 {
        &self.normal
    }

    /// Local point to parent space.
    #[inline]
    pub fn point_to_parent(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }

    /// Local normal or tangent to parent space (renormalized).
    #[inline]
    pub fn normal_to_parent(&self, normal: Vec3) -> Vec3 {
        (self.normal * normal).normalize_or_zero()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
