// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_composite --heading-base-level=0

//! Understory Composite: render a hierarchical collection of datasets as one drawable.
//!
//! A [`CompositeMapper`] sits on top of a [`CompositeSource`] whose output may be a single
//! dataset or a [`HierarchicalDataSet`]. It keeps one [`LeafDelegate`] per accepted leaf and
//! the union bounds of those leaves, and re-derives each only when the source's pipeline
//! [`Stamp`] is newer than the stamp the cache was built against.
//!
//! - Actual drawing is delegated: bring your own [`LeafDelegate`] and [`DelegateFactory`].
//! - Only [`PolyData`] leaves are accepted; other kinds in a hierarchy are skipped with a
//!   single warning per rebuild.
//! - Bounds fall back to the unit cube [`Aabb3D::CANONICAL`] when there is no input or no
//!   leaf has bounds.
//!
//! ## Staleness
//!
//! Every cache owns a [`Gate`] holding the pipeline stamp it was built against. A cache is
//! stale exactly when the current pipeline stamp is greater ([`needs_rebuild`]). The delegate
//! pool and the bounds have separate gates, so rendering never recomputes bounds and a bounds
//! query never rebuilds delegates.
//!
//! ## API overview
//!
//! - [`CompositeMapper`]: the facade; [`render`](CompositeMapper::render) and
//!   [`bounds`](CompositeMapper::bounds).
//! - [`DelegatePool`]: owned delegates, rebuilt wholesale. See [`RebuildReport`].
//! - [`BoundsAggregator`]: cached union bounds.
//! - [`Pipeline`]: a minimal stamped [`CompositeSource`].
//! - [`DataObject`], [`HierarchicalDataSet`], [`RootStructure`]: the dataset model.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Weak;
//! use understory_bounds::Bounds3D;
//! use understory_composite::{
//!     ClipPlanes, CompositeMapper, HierarchicalDataSet, ImageData, LeafDelegate, Pipeline,
//!     PolyData, bound_leaf_bounds,
//! };
//! use glam::DVec3;
//!
//! struct Counter(Weak<PolyData>);
//!
//! impl LeafDelegate for Counter {
//!     type Context = usize;
//!     type Actor = ();
//!     type Error = core::convert::Infallible;
//!
//!     fn set_clipping_planes(&mut self, _planes: &ClipPlanes) {}
//!
//!     fn render(&mut self, drawn: &mut usize, _: &()) -> Result<(), Self::Error> {
//!         *drawn += 1;
//!         Ok(())
//!     }
//!
//!     fn bounds(&self) -> Bounds3D<f64> {
//!         bound_leaf_bounds(&self.0)
//!     }
//! }
//!
//! let data = HierarchicalDataSet::new()
//!     .with_block(0, 0, PolyData::cuboid(DVec3::ZERO, DVec3::ONE))
//!     .with_block(0, 1, ImageData::default())
//!     .with_block(1, 0, PolyData::cuboid(DVec3::splat(2.0), DVec3::splat(3.0)));
//!
//! let mut mapper = CompositeMapper::with_input(Pipeline::with_output(data), Counter);
//!
//! let mut drawn = 0;
//! mapper.render(&mut drawn, &()).unwrap();
//! assert_eq!(drawn, 2);
//! assert_eq!(mapper.bounds().as_array(), [0.0, 3.0, 0.0, 3.0, 0.0, 3.0]);
//!
//! // Nothing changed upstream: the same delegates are reused.
//! mapper.render(&mut drawn, &()).unwrap();
//! assert_eq!(mapper.last_rebuild().unwrap().skipped, 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod aggregate;
pub mod data;
pub mod delegate;
pub mod mapper;
pub mod pool;
pub mod source;
pub mod stamp;

pub use aggregate::{BoundsAggregator, leaf_bounds_union};
pub use data::{
    DataKind, DataKinds, DataObject, HierarchicalDataSet, ImageData, LeafMatch, Leaves, PolyData,
    RootStructure, Table,
};
pub use delegate::{ClipPlanes, DelegateFactory, LeafDelegate, Plane, bound_leaf_bounds};
pub use mapper::{CompositeMapper, InputRequirements, RenderError};
pub use pool::{DelegatePool, RebuildReport};
pub use source::{CompositeSource, Pipeline};
pub use stamp::{Gate, Stamp, StampClock, needs_rebuild};

pub use understory_bounds::{Aabb3D, Bounds3D};
