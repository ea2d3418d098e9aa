// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The delegate pool: one delegate per accepted leaf, rebuilt wholesale when stale.

use alloc::sync::Arc;
use alloc::vec::Vec;

use understory_bounds::Bounds3D;

use crate::data::{LeafMatch, RootStructure};
use crate::delegate::{DelegateFactory, LeafDelegate};
use crate::source::CompositeSource;
use crate::stamp::{Gate, Stamp};

/// Outcome of one [`DelegatePool::rebuild`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Delegates created.
    pub bound: usize,
    /// Non-conforming hierarchy entries skipped.
    pub skipped: usize,
    /// Diagnostics emitted; at most one per rebuild.
    pub warnings: usize,
    /// Pipeline stamp the rebuild was made against.
    pub stamp: Stamp,
}

/// Exclusively owned delegates in source traversal order.
///
/// Delegates live from the rebuild that created them until the next rebuild
/// or until the pool is dropped, and are dropped exactly once.
pub struct DelegatePool<D> {
    delegates: Vec<D>,
    gate: Gate,
}

impl<D> core::fmt::Debug for DelegatePool<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DelegatePool")
            .field("delegates", &self.delegates.len())
            .field("built", &self.gate.last_built())
            .finish_non_exhaustive()
    }
}

impl<D> Default for DelegatePool<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DelegatePool<D> {
    /// Create an empty pool that has never been built.
    pub const fn new() -> Self {
        Self {
            delegates: Vec::new(),
            gate: Gate::new(),
        }
    }

    /// Number of live delegates.
    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    /// True if there are no live delegates.
    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    /// Delegates in pool order.
    pub fn iter(&self) -> core::slice::Iter<'_, D> {
        self.delegates.iter()
    }

    /// Delegates in pool order, mutably.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, D> {
        self.delegates.iter_mut()
    }

    /// Delegates as a slice.
    pub fn as_slice(&self) -> &[D] {
        &self.delegates
    }

    /// Stamp of the last rebuild, or [`Stamp::NEVER`].
    pub const fn structure_stamp(&self) -> Stamp {
        self.gate.last_built()
    }

    /// Whether a source at `pipeline` requires a rebuild.
    pub fn is_stale(&self, pipeline: Stamp) -> bool {
        self.gate.is_stale(pipeline)
    }

    /// Drop every delegate and forget the last build, so the next check rebuilds.
    pub fn release(&mut self) {
        self.delegates.clear();
        self.gate.invalidate();
    }
}

impl<D: LeafDelegate> DelegatePool<D> {
    /// Rebuild only if the source changed since the last rebuild.
    ///
    /// Returns `None` without touching the source's output when current.
    pub fn rebuild_if_stale<S, F>(&mut self, source: &S, factory: &mut F) -> Option<RebuildReport>
    where
        S: CompositeSource + ?Sized,
        F: DelegateFactory<Delegate = D>,
    {
        if !self.is_stale(source.pipeline_stamp()) {
            return None;
        }
        Some(self.rebuild(source, factory))
    }

    /// Discard all delegates and create one per accepted leaf of `source`.
    ///
    /// A flat poly data output yields one delegate; a flat output of any other
    /// kind yields none. In a hierarchy, non-conforming leaves are skipped and
    /// reported with a single warning per rebuild. An absent output leaves the
    /// pool empty.
    #[tracing::instrument(skip_all, fields(previous = self.delegates.len()))]
    pub fn rebuild<S, F>(&mut self, source: &S, factory: &mut F) -> RebuildReport
    where
        S: CompositeSource + ?Sized,
        F: DelegateFactory<Delegate = D>,
    {
        let observed = source.pipeline_stamp();
        self.delegates.clear();

        let mut report = RebuildReport {
            stamp: observed,
            ..RebuildReport::default()
        };
        match source.structure() {
            RootStructure::Absent => {}
            RootStructure::Flat(object) => {
                if let LeafMatch::Accepted(pd) = object.leaf() {
                    self.delegates.push(factory.bind(Arc::downgrade(pd)));
                }
            }
            RootStructure::Hierarchy(hierarchy) => {
                for object in hierarchy.leaves() {
                    match object.leaf() {
                        LeafMatch::Accepted(pd) => {
                            self.delegates.push(factory.bind(Arc::downgrade(pd)));
                        }
                        LeafMatch::Rejected(kind) => {
                            if report.warnings == 0 {
                                tracing::warn!(
                                    ?kind,
                                    "hierarchical input contains non-poly data; those blocks will not be rendered"
                                );
                                report.warnings = 1;
                            }
                            report.skipped += 1;
                        }
                    }
                }
            }
        }
        report.bound = self.delegates.len();

        self.gate.mark_built(observed);
        tracing::debug!(
            bound = report.bound,
            skipped = report.skipped,
            stamp = observed.get(),
            "rebuilt delegate pool"
        );
        report
    }

    /// Union of the bounds reported by the live delegates.
    ///
    /// Only leaves that became delegates contribute, unlike the mapper's
    /// bounds, which are recomputed from the source.
    pub fn delegate_bounds(&self) -> Bounds3D<f64> {
        Bounds3D::union_all(self.delegates.iter().map(LeafDelegate::bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataObject, HierarchicalDataSet, ImageData, PolyData, Table};
    use crate::delegate::{ClipPlanes, bound_leaf_bounds};
    use crate::source::Pipeline;
    use alloc::rc::Rc;
    use alloc::sync::Weak;
    use core::cell::Cell;
    use glam::DVec3;

    #[derive(Default)]
    struct Ledger {
        created: Cell<usize>,
        released: Cell<usize>,
    }

    struct Probe {
        leaf: Weak<PolyData>,
        ledger: Rc<Ledger>,
    }

    impl Drop for Probe {
        fn drop(&mut self) {
            self.ledger.released.set(self.ledger.released.get() + 1);
        }
    }

    impl LeafDelegate for Probe {
        type Context = ();
        type Actor = ();
        type Error = core::convert::Infallible;

        fn set_clipping_planes(&mut self, _planes: &ClipPlanes) {}

        fn render(&mut self, _: &mut (), _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        fn bounds(&self) -> Bounds3D<f64> {
            bound_leaf_bounds(&self.leaf)
        }
    }

    fn factory(ledger: &Rc<Ledger>) -> impl FnMut(Weak<PolyData>) -> Probe + use<> {
        let ledger = ledger.clone();
        move |leaf| {
            ledger.created.set(ledger.created.get() + 1);
            Probe {
                leaf,
                ledger: ledger.clone(),
            }
        }
    }

    fn cube_at(x: f64) -> PolyData {
        PolyData::cuboid(DVec3::new(x, 0.0, 0.0), DVec3::new(x + 1.0, 1.0, 1.0))
    }

    fn mixed_hierarchy() -> HierarchicalDataSet {
        let mut h = HierarchicalDataSet::new();
        h.set_block(0, 0, Some(cube_at(0.0).into()));
        h.set_block(0, 1, Some(ImageData::default().into()));
        h.set_block(0, 2, Some(cube_at(2.0).into()));
        h.set_block(0, 3, Some(Table::new().into()));
        h.set_block(0, 4, Some(cube_at(4.0).into()));
        h
    }

    #[test]
    fn flat_poly_data_gets_one_delegate() {
        let ledger = Rc::new(Ledger::default());
        let mut make = factory(&ledger);
        let pipeline = Pipeline::with_output(cube_at(0.0));
        let mut pool = DelegatePool::new();

        let report = pool.rebuild(&pipeline, &mut make);
        assert_eq!(report.bound, 1);
        assert_eq!(report.warnings, 0);

        let Some(DataObject::Poly(pd)) = pipeline.root() else {
            panic!("pipeline output should be poly data");
        };
        let bound = pool.as_slice()[0].leaf.upgrade().unwrap();
        assert!(Arc::ptr_eq(&bound, pd), "delegate must be bound to the flat dataset");
    }

    #[test]
    fn flat_non_poly_data_is_empty_without_warning() {
        let ledger = Rc::new(Ledger::default());
        let mut make = factory(&ledger);
        let pipeline = Pipeline::with_output(ImageData::default());
        let mut pool = DelegatePool::new();
        let report = pool.rebuild(&pipeline, &mut make);
        assert!(pool.is_empty());
        assert_eq!(report.warnings, 0);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn mixed_hierarchy_warns_once() {
        let ledger = Rc::new(Ledger::default());
        let mut make = factory(&ledger);
        let pipeline = Pipeline::with_output(mixed_hierarchy());
        let mut pool = DelegatePool::new();

        let report = pool.rebuild(&pipeline, &mut make);
        assert_eq!(pool.len(), 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.warnings, 1, "two mismatches must produce a single warning");

        // Pool order follows traversal order.
        let xs: Vec<f64> = pool
            .iter()
            .map(|p| p.bounds().as_box().unwrap().min_x)
            .collect();
        assert_eq!(xs, [0.0, 2.0, 4.0]);

        // A second rebuild warns again, once.
        let again = pool.rebuild(&pipeline, &mut make);
        assert_eq!(again.warnings, 1);
    }

    #[test]
    fn absent_output_leaves_pool_empty() {
        let ledger = Rc::new(Ledger::default());
        let mut make = factory(&ledger);
        let mut pipeline = Pipeline::with_output(cube_at(0.0));
        let mut pool = DelegatePool::new();
        pool.rebuild(&pipeline, &mut make);
        assert_eq!(pool.len(), 1);

        pipeline.set_input(None);
        pipeline.execute();
        let report = pool.rebuild_if_stale(&pipeline, &mut make).unwrap();
        assert_eq!(report, RebuildReport {
            stamp: pipeline.pipeline_stamp(),
            ..RebuildReport::default()
        });
        assert!(pool.is_empty());
        assert_eq!(ledger.released.get(), 1);
    }

    #[test]
    fn rebuild_if_stale_short_circuits() {
        let ledger = Rc::new(Ledger::default());
        let mut make = factory(&ledger);
        let mut pipeline = Pipeline::with_output(mixed_hierarchy());
        let mut pool = DelegatePool::new();

        assert!(pool.rebuild_if_stale(&pipeline, &mut make).is_some());
        assert_eq!(pool.structure_stamp(), pipeline.pipeline_stamp());
        assert!(pool.rebuild_if_stale(&pipeline, &mut make).is_none());
        assert_eq!(ledger.created.get(), 3, "no delegates created while current");

        pipeline.mark_modified();
        assert!(pool.rebuild_if_stale(&pipeline, &mut make).is_some());
        assert_eq!(ledger.created.get(), 6);
        assert_eq!(ledger.released.get(), 3, "previous delegates released first");
    }

    #[test]
    fn every_delegate_is_released_exactly_once() {
        let ledger = Rc::new(Ledger::default());
        {
            let mut make = factory(&ledger);
            let mut pipeline = Pipeline::with_output(mixed_hierarchy());
            let mut pool = DelegatePool::new();
            for _ in 0..4 {
                pool.rebuild_if_stale(&pipeline, &mut make);
                pipeline.mark_modified();
            }
            pool.release();
            assert!(pool.is_stale(Stamp::from_raw(1)));
            pool.rebuild(&pipeline, &mut make);
        }
        assert_eq!(ledger.created.get(), 15);
        assert_eq!(ledger.released.get(), ledger.created.get());
    }

    #[test]
    fn delegate_bounds_cover_bound_leaves_only() {
        let ledger = Rc::new(Ledger::default());
        let mut make = factory(&ledger);
        let pipeline = Pipeline::with_output(mixed_hierarchy());
        let mut pool = DelegatePool::new();
        pool.rebuild(&pipeline, &mut make);
        let b = pool.delegate_bounds().as_box().unwrap();
        assert_eq!(b.as_array(), [0.0, 5.0, 0.0, 1.0, 0.0, 1.0]);
    }
}
