// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of methods for three-dimensional vector.

use std::ops::{Deref, DerefMut};

use nalgebra::base::Vector3;

use crate::structures::simbox::SimBox;

/// Describes length and orientation of a vector in space or a position of a point in space.
/// Implemented using `nalgebra`'s Vector3.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Vector3D(pub(crate) Vector3<f32>);

/// Function replicating the behavior of Python '%'.
#[inline]
fn floor_mod(x: f32, y: f32) -> f32 {
    (x % y + y) % y
}

impl From<[f32; 3]> for Vector3D {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Vector3D(Vector3::new(arr[0], arr[1], arr[2]))
    }
}

/// Allows accessing fields of `Vector3D` as `.x`, `.y`, and `.z`.
pub struct Vector3Raw {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Deref for Vector3D {
    type Target = Vector3Raw;

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.0.as_ptr() as *const Vector3Raw) }
    }
}

impl DerefMut for Vector3D {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *(self.0.as_mut_ptr() as *mut Vector3Raw) }
    }
}

impl Vector3D {
    /// Create new `Vector3D` structure from the provided coordinates.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3D(Vector3::new(x, y, z))
    }

    /// Calculate length of the vector.
    #[inline]
    pub fn len(&self) -> f32 {
        self.0.norm()
    }

    /// Check whether the vector is a zero vector.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Calculate the dot product of two vectors.
    #[inline]
    pub fn dot(&self, vector: &Vector3D) -> f32 {
        self.0.dot(&vector.0)
    }

    /// Calculate the cross product of two vectors.
    #[inline]
    pub fn cross(&self, vector: &Vector3D) -> Vector3D {
        Vector3D(self.0.cross(&vector.0))
    }

    /// Calculate the angle between two vectors. Returns angle in radians.
    ///
    /// ## Example
    /// ```
    /// use ensa_rs::prelude::*;
    /// use float_cmp::assert_approx_eq;
    ///
    /// let vector1 = Vector3D::new(1.0, 0.0, 0.0);
    /// let vector2 = Vector3D::new(0.0, 1.0, 0.0);
    ///
    /// assert_approx_eq!(f32, vector1.angle(&vector2), std::f32::consts::FRAC_PI_2);
    /// ```
    pub fn angle(&self, vector: &Vector3D) -> f32 {
        (self.dot(vector) / (self.len() * vector.len()))
            .clamp(-1.0, 1.0)
            .acos()
    }

    /// Subtract `vector` from this vector returning the result.
    #[inline]
    pub fn sub(&self, vector: &Vector3D) -> Vector3D {
        Vector3D(self.0 - vector.0)
    }

    /// Scale the vector to unit length. A zero vector stays zero.
    pub fn to_unit(&self) -> Vector3D {
        let length = self.len();
        if length == 0.0 {
            *self
        } else {
            Vector3D(self.0 / length)
        }
    }

    /// Calculate distance between two points in space ignoring periodic boundary conditions.
    #[inline]
    pub fn distance_naive(&self, point: &Vector3D) -> f32 {
        (self.0 - point.0).norm()
    }

    /// Calculate distance between two points in space applying the minimum image
    /// convention for an orthogonal simulation box.
    pub fn distance(&self, point: &Vector3D, sbox: &SimBox) -> f32 {
        let dx = minimum_image(self.x - point.x, sbox.x);
        let dy = minimum_image(self.y - point.y, sbox.y);
        let dz = minimum_image(self.z - point.z, sbox.z);

        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Wrap the point into the simulation box.
    pub fn wrap(&mut self, sbox: &SimBox) {
        self.x = floor_mod(self.x, sbox.x);
        self.y = floor_mod(self.y, sbox.y);
        self.z = floor_mod(self.z, sbox.z);
    }
}

/// Shift the oriented distance along a single dimension to its minimum image.
#[inline]
fn minimum_image(mut delta: f32, box_len: f32) -> f32 {
    if box_len <= 0.0 {
        return delta;
    }

    while delta > box_len / 2.0 {
        delta -= box_len;
    }
    while delta < -box_len / 2.0 {
        delta += box_len;
    }

    delta
}

impl Default for Vector3D {
    /// Create a zero vector.
    #[inline]
    fn default() -> Self {
        Vector3D::new(0.0, 0.0, 0.0)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
