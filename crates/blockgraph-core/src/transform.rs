//! Placement transforms and transform chains.
//!
//! Transforms use the column-vector convention of `glam`: a point `p` is
//! mapped to `M * p`. On the wire a transform is 16 doubles in row-major
//! order, so the translation sits at indices 3, 7 and 11.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A 4x4 affine placement transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Transform(DMat4);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform(DMat4::IDENTITY);

    /// Wrap a glam matrix.
    pub fn from_matrix(matrix: DMat4) -> Self {
        Self(matrix)
    }

    /// Pure translation.
    pub fn from_translation(translation: DVec3) -> Self {
        Self(DMat4::from_translation(translation))
    }

    /// Build from 16 row-major values.
    pub fn from_row_major(values: [f64; 16]) -> Self {
        Self(DMat4::from_cols_array(&values).transpose())
    }

    /// The 16 row-major values.
    pub fn to_row_major(&self) -> [f64; 16] {
        self.0.transpose().to_cols_array()
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> DMat4 {
        self.0
    }

    /// Translation component.
    pub fn translation(&self) -> DVec3 {
        self.0.w_axis.truncate()
    }

    /// Copy with the translation multiplied by `factor`.
    ///
    /// Used to move a placement between unit systems; rotation and scale
    /// are dimensionless and stay as they are.
    pub fn with_scaled_translation(&self, factor: f64) -> Self {
        let mut matrix = self.0;
        matrix.w_axis.x *= factor;
        matrix.w_axis.y *= factor;
        matrix.w_axis.z *= factor;
        Self(matrix)
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.0.transform_point3(point)
    }

    /// Whether this is (numerically) the identity.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&Self::IDENTITY, epsilon)
    }

    /// Element-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Transform, epsilon: f64) -> bool {
        self.0.abs_diff_eq(other.0, epsilon)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform(self.0 * rhs.0)
    }
}

impl From<DMat4> for Transform {
    fn from(matrix: DMat4) -> Self {
        Self(matrix)
    }
}

impl From<Transform> for Vec<f64> {
    fn from(transform: Transform) -> Self {
        transform.to_row_major().to_vec()
    }
}

impl TryFrom<Vec<f64>> for Transform {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let values: [f64; 16] = values
            .try_into()
            .map_err(|v: Vec<f64>| format!("transform needs 16 values, got {}", v.len()))?;
        Ok(Self::from_row_major(values))
    }
}

/// Collapse an innermost-first chain into one absolute transform.
///
/// For a chain `[inner, .., outer]` the result is `outer * .. * inner`, so
/// the innermost placement is applied to the geometry first. An empty
/// chain is the identity.
pub fn collapse(chain: &[Transform]) -> Transform {
    chain
        .iter()
        .fold(Transform::IDENTITY, |absolute, local| *local * absolute)
}
