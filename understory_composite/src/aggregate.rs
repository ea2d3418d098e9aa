// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Union bounds over the accepted leaves of a source, cached behind their own gate.

use understory_bounds::{Aabb3D, Bounds3D};

use crate::data::{LeafMatch, RootStructure};
use crate::source::CompositeSource;
use crate::stamp::{Gate, Stamp};

/// Fold the bounds of every accepted leaf in `structure`.
///
/// Rejected leaves and leaves without bounds do not contribute.
pub fn leaf_bounds_union(structure: RootStructure<'_>) -> Bounds3D<f64> {
    match structure {
        RootStructure::Absent => Bounds3D::Uninitialized,
        RootStructure::Flat(object) => match object.leaf() {
            LeafMatch::Accepted(pd) => pd.bounds(),
            LeafMatch::Rejected(_) => Bounds3D::Uninitialized,
        },
        RootStructure::Hierarchy(hierarchy) => {
            Bounds3D::union_all(hierarchy.leaves().filter_map(|object| match object.leaf() {
                LeafMatch::Accepted(pd) => Some(pd.bounds()),
                LeafMatch::Rejected(_) => None,
            }))
        }
    }
}

/// Cached union bounds of a source's accepted leaves.
///
/// Recomputed straight from the source (not from any delegate list), gated
/// independently of the delegate pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundsAggregator {
    bounds: Bounds3D<f64>,
    gate: Gate,
}

impl BoundsAggregator {
    /// Create an aggregator that has never computed bounds.
    pub const fn new() -> Self {
        Self {
            bounds: Bounds3D::Uninitialized,
            gate: Gate::new(),
        }
    }

    /// Recompute only if the source changed since the last recompute.
    ///
    /// Returns whether a recompute happened.
    pub fn recompute_if_stale<S: CompositeSource + ?Sized>(&mut self, source: &S) -> bool {
        if !self.gate.is_stale(source.pipeline_stamp()) {
            return false;
        }
        self.recompute(source);
        true
    }

    /// Recompute the union from the source's current output.
    #[tracing::instrument(skip_all)]
    pub fn recompute<S: CompositeSource + ?Sized>(&mut self, source: &S) {
        let observed = source.pipeline_stamp();
        self.bounds = leaf_bounds_union(source.structure());
        self.gate.mark_built(observed);
        tracing::debug!(
            initialized = self.bounds.is_initialized(),
            stamp = observed.get(),
            "recomputed composite bounds"
        );
    }

    /// The cached union, possibly uninitialized.
    pub const fn bounds(&self) -> Bounds3D<f64> {
        self.bounds
    }

    /// The cached union, or [`Aabb3D::CANONICAL`] when nothing contributed.
    pub fn published(&self) -> Aabb3D<f64> {
        self.bounds.box_or(Aabb3D::CANONICAL)
    }

    /// Stamp of the last recompute, or [`Stamp::NEVER`].
    pub const fn stamp(&self) -> Stamp {
        self.gate.last_built()
    }

    /// Drop the cached union and forget the last recompute.
    pub fn invalidate(&mut self) {
        self.bounds = Bounds3D::Uninitialized;
        self.gate.invalidate();
    }
}
