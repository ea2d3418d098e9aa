// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive 3D box type and scalar helpers.

use core::cmp::Ordering;

/// Axis-aligned bounding box in 3D.
///
/// Stored as min/max corners. Float inputs are assumed to be finite (no NaNs).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb3D<T> {
    /// Minimum x
    pub min_x: T,
    /// Minimum y
    pub min_y: T,
    /// Minimum z
    pub min_z: T,
    /// Maximum x
    pub max_x: T,
    /// Maximum y
    pub max_y: T,
    /// Maximum z
    pub max_z: T,
}

impl<T> Aabb3D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, min_z: T, max_x: T, max_y: T, max_z: T) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// Create an AABB from per-axis `(min, max)` extents in `x, y, z` order.
    pub fn from_extents(x: (T, T), y: (T, T), z: (T, T)) -> Self {
        Self::new(x.0, y.0, z.0, x.1, y.1, z.1)
    }

    /// Create an AABB from the interleaved `[xmin, xmax, ymin, ymax, zmin, zmax]` layout.
    pub fn from_array([min_x, max_x, min_y, max_y, min_z, max_z]: [T; 6]) -> Self {
        Self::new(min_x, min_y, min_z, max_x, max_y, max_z)
    }
}

impl<T: Copy> Aabb3D<T> {
    /// The box as `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub const fn as_array(&self) -> [T; 6] {
        [
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_z, self.max_z,
        ]
    }

    /// The `(min, max)` extent along `axis` (0 = x, 1 = y, 2 = z).
    ///
    /// Returns `None` for any other axis.
    pub const fn extent(&self, axis: usize) -> Option<(T, T)> {
        match axis {
            0 => Some((self.min_x, self.max_x)),
            1 => Some((self.min_y, self.max_y)),
            2 => Some((self.min_z, self.max_z)),
            _ => None,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb3D<T> {
    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, x: T, y: T, z: T) -> bool {
        le(self.min_x, x)
            && le(self.min_y, y)
            && le(self.min_z, z)
            && le(x, self.max_x)
            && le(y, self.max_y)
            && le(z, self.max_z)
    }

    /// The smallest AABB enclosing both boxes.
    ///
    /// Each of the six extrema is folded independently.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            min_z: min_t(self.min_z, other.min_z),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
            max_z: max_t(self.max_z, other.max_z),
        }
    }

    /// The intersection of two AABBs. May be empty; see [`Aabb3D::is_empty`].
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: max_t(self.min_x, other.min_x),
            min_y: max_t(self.min_y, other.min_y),
            min_z: max_t(self.min_z, other.min_z),
            max_x: min_t(self.max_x, other.max_x),
            max_y: min_t(self.max_y, other.max_y),
            max_z: min_t(self.max_z, other.max_z),
        }
    }

    /// Return true if the AABB is inverted on any axis. Assumes no NaN.
    ///
    /// Degenerate boxes (zero extent on an axis, such as the bounds of a single point)
    /// are not empty.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y) || lt(self.max_z, self.min_z)
    }
}

impl Aabb3D<f64> {
    /// The fixed unit-cube bounds `[-1, 1]` on every axis.
    ///
    /// Published when no real geometry is available.
    pub const CANONICAL: Self = Self::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);

    /// Midpoint of the box on every axis.
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
            0.5 * (self.min_z + self.max_z),
        ]
    }

    /// Per-axis size of the box (`max - min`).
    pub fn size(&self) -> [f64; 3] {
        [
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        ]
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}
