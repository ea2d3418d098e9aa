// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-leaf render delegates and clipping planes.
//!
//! ## Overview
//!
//! A [`LeafDelegate`] draws exactly one poly data leaf. The composite mapper
//! creates one per accepted leaf through a [`DelegateFactory`] and owns it
//! until the next structure rebuild. Releasing a delegate is dropping it;
//! implement [`Drop`] to free anything it holds.
//!
//! Delegates receive the current [`ClipPlanes`] before every render call and
//! should not assume planes persist between frames.

use alloc::sync::Weak;
use alloc::vec::Vec;

use glam::DVec3;
use understory_bounds::Bounds3D;

use crate::data::PolyData;

/// Renders a single leaf dataset.
pub trait LeafDelegate {
    /// Renderer-side state passed through to every delegate.
    type Context: ?Sized;
    /// Per-draw attributes (transform, material, ...) shared by all leaves of the composite.
    type Actor: ?Sized;
    /// Failure raised while rendering.
    type Error;

    /// Replace the clipping configuration used by the next render.
    fn set_clipping_planes(&mut self, planes: &ClipPlanes);

    /// Draw the bound leaf.
    fn render(&mut self, context: &mut Self::Context, actor: &Self::Actor)
    -> Result<(), Self::Error>;

    /// Bounds of the bound leaf, uninitialized if it has none or is gone.
    fn bounds(&self) -> Bounds3D<f64>;
}

/// Creates delegates for accepted leaves.
///
/// Closures of the form `FnMut(Weak<PolyData>) -> D` are factories.
pub trait DelegateFactory {
    /// The delegate type produced.
    type Delegate: LeafDelegate;

    /// Create a delegate bound to `leaf`.
    ///
    /// The reference is weak: the source owns the dataset and may drop it.
    fn bind(&mut self, leaf: Weak<PolyData>) -> Self::Delegate;
}

impl<F, D> DelegateFactory for F
where
    F: FnMut(Weak<PolyData>) -> D,
    D: LeafDelegate,
{
    type Delegate = D;

    fn bind(&mut self, leaf: Weak<PolyData>) -> D {
        self(leaf)
    }
}

/// Bounds of a weakly bound leaf; uninitialized once the source has dropped it.
pub fn bound_leaf_bounds(leaf: &Weak<PolyData>) -> Bounds3D<f64> {
    leaf.upgrade()
        .map_or(Bounds3D::Uninitialized, |pd| pd.bounds())
}

/// A clipping plane. Points with negative [`signed_distance`](Self::signed_distance) are clipped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    /// A point on the plane.
    pub origin: DVec3,
    /// Plane normal, pointing toward the kept half-space.
    pub normal: DVec3,
}

impl Plane {
    /// Create a plane from a point and a normal.
    pub const fn new(origin: DVec3, normal: DVec3) -> Self {
        Self { origin, normal }
    }

    /// Signed distance of `point` scaled by the normal's length.
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        (point - self.origin).dot(self.normal)
    }

    /// Whether `point` lies in the kept half-space (boundary inclusive).
    pub fn keeps(&self, point: DVec3) -> bool {
        self.signed_distance(point) >= 0.0
    }
}

/// Ordered set of clipping planes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipPlanes {
    planes: Vec<Plane>,
}

impl ClipPlanes {
    /// No clipping.
    pub const fn new() -> Self {
        Self { planes: Vec::new() }
    }

    /// Append a plane.
    pub fn push(&mut self, plane: Plane) {
        self.planes.push(plane);
    }

    /// Remove every plane.
    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// Number of planes.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// True if there are no planes.
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// The planes in insertion order.
    pub fn as_slice(&self) -> &[Plane] {
        &self.planes
    }

    /// Iterate planes in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Plane> {
        self.planes.iter()
    }

    /// Whether `point` survives every plane.
    pub fn keeps(&self, point: DVec3) -> bool {
        self.planes.iter().all(|p| p.keeps(point))
    }
}

impl FromIterator<Plane> for ClipPlanes {
    fn from_iter<I: IntoIterator<Item = Plane>>(iter: I) -> Self {
        Self {
            planes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ClipPlanes {
    type Item = &'a Plane;
    type IntoIter = core::slice::Iter<'a, Plane>;

    fn into_iter(self) -> Self::IntoIter {
        self.planes.iter()
    }
}
