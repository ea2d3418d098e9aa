// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composite mapper: one drawable over a possibly hierarchical input.

use glam::DVec3;
use understory_bounds::Aabb3D;

use crate::aggregate::BoundsAggregator;
use crate::data::DataKinds;
use crate::delegate::{ClipPlanes, DelegateFactory, LeafDelegate, Plane};
use crate::pool::{DelegatePool, RebuildReport};
use crate::source::CompositeSource;
use crate::stamp::Stamp;

/// What a [`CompositeMapper`] advertises for its input port.
///
/// This is informational. Non-conforming leaves are discovered, skipped, and
/// reported when the delegate pool is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputRequirements {
    /// Kinds accepted as a plain (non-hierarchical) input.
    pub leaf: DataKinds,
    /// Kinds accepted as a hierarchical input, whose leaves should be of `leaf` kinds.
    pub composite: DataKinds,
}

impl Default for InputRequirements {
    fn default() -> Self {
        Self {
            leaf: DataKinds::POLY,
            composite: DataKinds::COMPOSITE,
        }
    }
}

/// Failure while fanning a render out to the leaf delegates.
#[derive(Debug, thiserror::Error)]
pub enum RenderError<E> {
    /// A delegate failed; delegates after it in pool order were not rendered.
    #[error("leaf delegate {index} failed to render")]
    Leaf {
        /// Position of the failing delegate in pool order.
        index: usize,
        /// The delegate's error.
        #[source]
        source: E,
    },
}

type DelegateOf<F> = <F as DelegateFactory>::Delegate;
type ContextOf<F> = <DelegateOf<F> as LeafDelegate>::Context;
type ActorOf<F> = <DelegateOf<F> as LeafDelegate>::Actor;
type ErrorOf<F> = <DelegateOf<F> as LeafDelegate>::Error;

/// Presents a possibly hierarchical input as one drawable.
///
/// ## Semantics
///
/// - [`render`](Self::render) rebuilds the delegate pool when the input's
///   pipeline stamp is newer than the pool's, then pushes the current clipping
///   planes into every delegate and renders each in pool order.
/// - [`bounds`](Self::bounds) executes the input, recomputes the union bounds
///   when stale, and returns them. Without input, or with no contributing leaf,
///   it returns [`Aabb3D::CANONICAL`].
/// - The pool and the bounds are gated independently: a bounds query never
///   rebuilds delegates and a render never recomputes bounds.
///
/// Not safe for concurrent use; all entry points take `&mut self`.
pub struct CompositeMapper<S, F: DelegateFactory> {
    input: Option<S>,
    factory: F,
    pool: DelegatePool<DelegateOf<F>>,
    bounds: BoundsAggregator,
    clipping_planes: ClipPlanes,
    last_rebuild: Option<RebuildReport>,
}

impl<S, F: DelegateFactory> core::fmt::Debug for CompositeMapper<S, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompositeMapper")
            .field("has_input", &self.input.is_some())
            .field("pool", &self.pool)
            .field("bounds", &self.bounds)
            .field("clipping_planes", &self.clipping_planes.len())
            .finish_non_exhaustive()
    }
}

impl<S, F> CompositeMapper<S, F>
where
    S: CompositeSource,
    F: DelegateFactory,
{
    /// Create a mapper without input.
    pub fn new(factory: F) -> Self {
        Self {
            input: None,
            factory,
            pool: DelegatePool::new(),
            bounds: BoundsAggregator::new(),
            clipping_planes: ClipPlanes::new(),
            last_rebuild: None,
        }
    }

    /// Create a mapper reading from `input`.
    pub fn with_input(input: S, factory: F) -> Self {
        let mut mapper = Self::new(factory);
        mapper.input = Some(input);
        mapper
    }

    /// See [`InputRequirements`].
    pub fn input_requirements(&self) -> InputRequirements {
        InputRequirements::default()
    }

    /// Attach, replace, or detach the input, returning the previous one.
    ///
    /// Delegates and bounds derived from the previous input are released;
    /// stamps from different sources are not comparable.
    pub fn set_input(&mut self, input: Option<S>) -> Option<S> {
        self.pool.release();
        self.bounds.invalidate();
        self.last_rebuild = None;
        core::mem::replace(&mut self.input, input)
    }

    /// The attached input.
    pub fn input(&self) -> Option<&S> {
        self.input.as_ref()
    }

    /// The attached input, mutably.
    ///
    /// Edits made through this reference are picked up by stamp comparison.
    pub fn input_mut(&mut self) -> Option<&mut S> {
        self.input.as_mut()
    }

    /// Render every leaf.
    ///
    /// The first delegate error stops the fan-out and is returned; there is no
    /// per-leaf isolation. Without input this does nothing.
    pub fn render(
        &mut self,
        context: &mut ContextOf<F>,
        actor: &ActorOf<F>,
    ) -> Result<(), RenderError<ErrorOf<F>>> {
        let Some(source) = self.input.as_ref() else {
            return Ok(());
        };
        if let Some(report) = self.pool.rebuild_if_stale(source, &mut self.factory) {
            self.last_rebuild = Some(report);
        }

        tracing::trace!(delegates = self.pool.len(), "rendering composite");
        for (index, delegate) in self.pool.iter_mut().enumerate() {
            delegate.set_clipping_planes(&self.clipping_planes);
            delegate
                .render(context, actor)
                .map_err(|source| RenderError::Leaf { index, source })?;
        }
        Ok(())
    }

    /// Union bounds of all accepted leaves.
    ///
    /// Returns [`Aabb3D::CANONICAL`] without touching anything when there is no
    /// input, and when no leaf has bounds.
    pub fn bounds(&mut self) -> Aabb3D<f64> {
        let Some(source) = self.input.as_mut() else {
            return Aabb3D::CANONICAL;
        };
        source.execute();
        self.bounds.recompute_if_stale(&*source);
        self.bounds.published()
    }

    /// Center of [`bounds`](Self::bounds).
    pub fn center(&mut self) -> DVec3 {
        DVec3::from_array(self.bounds().center())
    }

    /// Diagonal length of [`bounds`](Self::bounds).
    pub fn length(&mut self) -> f64 {
        DVec3::from_array(self.bounds().size()).length()
    }

    /// Replace the clipping planes pushed into delegates on every render.
    pub fn set_clipping_planes(&mut self, planes: ClipPlanes) {
        self.clipping_planes = planes;
    }

    /// Append a clipping plane.
    pub fn add_clipping_plane(&mut self, plane: Plane) {
        self.clipping_planes.push(plane);
    }

    /// Remove every clipping plane.
    pub fn remove_all_clipping_planes(&mut self) {
        self.clipping_planes.clear();
    }

    /// Current clipping planes.
    pub fn clipping_planes(&self) -> &ClipPlanes {
        &self.clipping_planes
    }

    /// Live delegates in pool order.
    pub fn delegates(&self) -> &[DelegateOf<F>] {
        self.pool.as_slice()
    }

    /// Number of live delegates.
    pub fn delegate_count(&self) -> usize {
        self.pool.len()
    }

    /// The delegate pool.
    pub fn pool(&self) -> &DelegatePool<DelegateOf<F>> {
        &self.pool
    }

    /// Report of the most recent pool rebuild since the input was attached.
    pub fn last_rebuild(&self) -> Option<&RebuildReport> {
        self.last_rebuild.as_ref()
    }

    /// Stamp of the last pool rebuild.
    pub fn structure_stamp(&self) -> Stamp {
        self.pool.structure_stamp()
    }

    /// Stamp of the last bounds recompute.
    pub fn bounds_stamp(&self) -> Stamp {
        self.bounds.stamp()
    }

    /// The delegate factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The delegate factory, mutably.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }
}
