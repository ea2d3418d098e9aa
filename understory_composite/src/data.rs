// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dataset model: leaf kinds, hierarchical collections, and traversal.
//!
//! ## Overview
//!
//! A [`DataObject`] is a closed set of dataset kinds. Only [`PolyData`] is accepted
//! as a renderable leaf; [`DataObject::leaf`] is the single place that decides this.
//! A [`HierarchicalDataSet`] holds levels of block slots, and its
//! [`leaves`](HierarchicalDataSet::leaves) traversal yields every non-composite block.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use bitflags::bitflags;
use glam::DVec3;
use understory_bounds::{Aabb3D, Bounds3D};

/// Discriminant of a [`DataObject`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// [`PolyData`], the accepted leaf kind.
    Poly,
    /// [`ImageData`].
    Image,
    /// [`Table`].
    Table,
    /// [`HierarchicalDataSet`].
    Composite,
}

impl DataKind {
    /// The single-kind flag set for this kind.
    pub const fn flag(self) -> DataKinds {
        match self {
            Self::Poly => DataKinds::POLY,
            Self::Image => DataKinds::IMAGE,
            Self::Table => DataKinds::TABLE,
            Self::Composite => DataKinds::COMPOSITE,
        }
    }
}

bitflags! {
    /// A set of [`DataKind`]s, used to advertise what an input port accepts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DataKinds: u8 {
        /// Poly data.
        const POLY      = 0b0000_0001;
        /// Image data.
        const IMAGE     = 0b0000_0010;
        /// Tables.
        const TABLE     = 0b0000_0100;
        /// Hierarchical collections.
        const COMPOSITE = 0b0000_1000;
    }
}

/// Polygonal geometry: points plus triangle connectivity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyData {
    points: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
}

impl PolyData {
    /// Create poly data from points and triangles indexing into them.
    pub fn new(points: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self { points, triangles }
    }

    /// Poly data with points only (a vertex cloud).
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Self {
        Self {
            points: points.into_iter().collect(),
            triangles: Vec::new(),
        }
    }

    /// An axis-aligned box corner pair as eight points and twelve triangles.
    pub fn cuboid(min: DVec3, max: DVec3) -> Self {
        let points = (0..8_u32)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                )
            })
            .collect();
        let triangles = alloc::vec![
            [0, 2, 1],
            [1, 2, 3],
            [4, 5, 6],
            [5, 7, 6],
            [0, 1, 4],
            [1, 5, 4],
            [2, 6, 3],
            [3, 6, 7],
            [0, 4, 2],
            [2, 4, 6],
            [1, 3, 5],
            [3, 7, 5],
        ];
        Self { points, triangles }
    }

    /// Point coordinates.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Triangle connectivity.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Bounds of all points; uninitialized when there are none.
    pub fn bounds(&self) -> Bounds3D<f64> {
        self.points
            .iter()
            .map(|p| Aabb3D::new(p.x, p.y, p.z, p.x, p.y, p.z))
            .collect()
    }
}

/// Regular grid of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    /// World position of sample `(0, 0, 0)`.
    pub origin: DVec3,
    /// Distance between samples along each axis.
    pub spacing: DVec3,
    /// Sample count along each axis.
    pub dimensions: [u32; 3],
}

impl Default for ImageData {
    fn default() -> Self {
        Self {
            origin: DVec3::ZERO,
            spacing: DVec3::ONE,
            dimensions: [0; 3],
        }
    }
}

impl ImageData {
    /// Bounds spanned by the sample positions; uninitialized when any dimension is zero.
    pub fn bounds(&self) -> Bounds3D<f64> {
        if self.dimensions.contains(&0) {
            return Bounds3D::Uninitialized;
        }
        let steps = DVec3::new(
            f64::from(self.dimensions[0] - 1),
            f64::from(self.dimensions[1] - 1),
            f64::from(self.dimensions[2] - 1),
        );
        let far = self.origin + self.spacing * steps;
        let lo = self.origin.min(far);
        let hi = self.origin.max(far);
        Bounds3D::Box(Aabb3D::new(lo.x, lo.y, lo.z, hi.x, hi.y, hi.z))
    }
}

/// Named columns of scalar values. Carries no geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Vec<f64>)>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (length of the longest column).
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0)
    }
}

/// A dataset produced by a pipeline.
///
/// Payloads are shared with [`Arc`] so the producer keeps ownership while
/// consumers hold cheap handles or [`Weak`](alloc::sync::Weak) back references.
#[derive(Clone, Debug)]
pub enum DataObject {
    /// Polygonal geometry.
    Poly(Arc<PolyData>),
    /// Structured grid.
    Image(Arc<ImageData>),
    /// Non-geometric table.
    Table(Arc<Table>),
    /// Hierarchical collection of further data objects.
    Composite(Arc<HierarchicalDataSet>),
}

/// Result of discriminating a [`DataObject`] against the accepted leaf kind.
#[derive(Copy, Clone, Debug)]
pub enum LeafMatch<'a> {
    /// The object is poly data.
    Accepted(&'a Arc<PolyData>),
    /// The object is some other kind.
    Rejected(DataKind),
}

impl DataObject {
    /// The kind of this object.
    pub const fn kind(&self) -> DataKind {
        match self {
            Self::Poly(_) => DataKind::Poly,
            Self::Image(_) => DataKind::Image,
            Self::Table(_) => DataKind::Table,
            Self::Composite(_) => DataKind::Composite,
        }
    }

    /// Decide whether this object is an accepted leaf.
    pub fn leaf(&self) -> LeafMatch<'_> {
        match self {
            Self::Poly(pd) => LeafMatch::Accepted(pd),
            other => LeafMatch::Rejected(other.kind()),
        }
    }

    /// View this object as the root of a pipeline output.
    pub fn structure(&self) -> RootStructure<'_> {
        match self {
            Self::Composite(h) => RootStructure::Hierarchy(h),
            other => RootStructure::Flat(other),
        }
    }
}

impl From<PolyData> for DataObject {
    fn from(pd: PolyData) -> Self {
        Self::Poly(Arc::new(pd))
    }
}

impl From<ImageData> for DataObject {
    fn from(image: ImageData) -> Self {
        Self::Image(Arc::new(image))
    }
}

impl From<Table> for DataObject {
    fn from(table: Table) -> Self {
        Self::Table(Arc::new(table))
    }
}

impl From<HierarchicalDataSet> for DataObject {
    fn from(h: HierarchicalDataSet) -> Self {
        Self::Composite(Arc::new(h))
    }
}

/// Shape of a pipeline's output as seen by a consumer.
#[derive(Copy, Clone, Debug)]
pub enum RootStructure<'a> {
    /// A single, non-hierarchical object (of any kind).
    Flat(&'a DataObject),
    /// A hierarchical collection.
    Hierarchy(&'a HierarchicalDataSet),
    /// No output.
    Absent,
}

impl<'a> RootStructure<'a> {
    /// Classify an optional root object.
    pub fn from_root(root: Option<&'a DataObject>) -> Self {
        root.map_or(Self::Absent, DataObject::structure)
    }
}

/// Levels of block slots, each optionally holding a [`DataObject`].
///
/// Slots may be left empty. Blocks may themselves be composites; traversal descends into them.
#[derive(Clone, Debug, Default)]
pub struct HierarchicalDataSet {
    levels: Vec<Vec<Option<DataObject>>>,
}

type Blocks<'a> = core::iter::Flatten<core::slice::Iter<'a, Vec<Option<DataObject>>>>;

impl HierarchicalDataSet {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `object` at `(level, index)`, growing levels and slots as needed.
    ///
    /// Passing `None` empties the slot.
    pub fn set_block(&mut self, level: usize, index: usize, object: Option<DataObject>) {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, Vec::new);
        }
        let blocks = &mut self.levels[level];
        if blocks.len() <= index {
            blocks.resize_with(index + 1, || None);
        }
        blocks[index] = object;
    }

    /// Builder form of [`set_block`](Self::set_block) for a populated slot.
    pub fn with_block(mut self, level: usize, index: usize, object: impl Into<DataObject>) -> Self {
        self.set_block(level, index, Some(object.into()));
        self
    }

    /// Append a whole level of populated blocks.
    pub fn push_level<I>(&mut self, blocks: I)
    where
        I: IntoIterator,
        I::Item: Into<DataObject>,
    {
        self.levels
            .push(blocks.into_iter().map(|b| Some(b.into())).collect());
    }

    /// The object at `(level, index)`, if that slot exists and is populated.
    pub fn block(&self, level: usize, index: usize) -> Option<&DataObject> {
        self.levels.get(level)?.get(index)?.as_ref()
    }

    /// Number of levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Number of slots on `level` (populated or not); zero for a missing level.
    pub fn block_count(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, Vec::len)
    }

    /// Traverse every non-composite object.
    ///
    /// Order is level by level, block by block, depth-first into nested composites.
    /// Each call starts a fresh traversal.
    pub fn leaves(&self) -> Leaves<'_> {
        let mut stack = Vec::with_capacity(4);
        stack.push(self.blocks());
        Leaves { stack }
    }

    fn blocks(&self) -> Blocks<'_> {
        self.levels.iter().flatten()
    }
}

/// Lazy traversal over the leaves of a [`HierarchicalDataSet`].
///
/// Created by [`HierarchicalDataSet::leaves`].
pub struct Leaves<'a> {
    stack: Vec<Blocks<'a>>,
}

impl core::fmt::Debug for Leaves<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Leaves")
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a DataObject;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(None) => {}
                Some(Some(DataObject::Composite(child))) => {
                    let child: &'a HierarchicalDataSet = child;
                    self.stack.push(child.blocks());
                }
                Some(Some(object)) => return Some(object),
            }
        }
    }
}

impl core::iter::FusedIterator for Leaves<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_poly(offset: f64) -> PolyData {
        PolyData::cuboid(DVec3::splat(offset), DVec3::splat(offset + 1.0))
    }

    #[test]
    fn only_poly_data_is_accepted() {
        let poly = DataObject::from(unit_poly(0.0));
        assert!(matches!(poly.leaf(), LeafMatch::Accepted(_)));
        let image = DataObject::from(ImageData::default());
        assert!(matches!(image.leaf(), LeafMatch::Rejected(DataKind::Image)));
        let table = DataObject::from(Table::new());
        assert!(matches!(table.leaf(), LeafMatch::Rejected(DataKind::Table)));
        let nested = DataObject::from(HierarchicalDataSet::new());
        assert!(matches!(nested.leaf(), LeafMatch::Rejected(DataKind::Composite)));
    }

    #[test]
    fn root_structure_classification() {
        assert!(matches!(RootStructure::from_root(None), RootStructure::Absent));
        let flat = DataObject::from(ImageData::default());
        assert!(matches!(
            RootStructure::from_root(Some(&flat)),
            RootStructure::Flat(_)
        ));
        let tree = DataObject::from(HierarchicalDataSet::new());
        assert!(matches!(tree.structure(), RootStructure::Hierarchy(_)));
    }

    #[test]
    fn poly_bounds_cover_points() {
        let pd = PolyData::from_points([
            DVec3::new(1.0, -2.0, 0.5),
            DVec3::new(-1.0, 4.0, 0.0),
            DVec3::new(0.0, 0.0, 3.0),
        ]);
        let b = pd.bounds().as_box().unwrap();
        assert_eq!(b.as_array(), [-1.0, 1.0, -2.0, 4.0, 0.0, 3.0]);
        assert_eq!(PolyData::default().bounds(), Bounds3D::Uninitialized);
    }

    #[test]
    fn cuboid_is_closed_and_bounded() {
        let pd = PolyData::cuboid(DVec3::ZERO, DVec3::new(2.0, 3.0, 4.0));
        assert_eq!(pd.points().len(), 8);
        assert_eq!(pd.triangles().len(), 12);
        assert!(pd.triangles().iter().flatten().all(|&i| i < 8));
        assert_eq!(
            pd.bounds().as_box().unwrap().as_array(),
            [0.0, 2.0, 0.0, 3.0, 0.0, 4.0]
        );
    }

    #[test]
    fn image_bounds_follow_spacing() {
        let image = ImageData {
            origin: DVec3::new(1.0, 0.0, 0.0),
            spacing: DVec3::new(0.5, -1.0, 2.0),
            dimensions: [3, 2, 1],
        };
        let b = image.bounds().as_box().unwrap();
        assert_eq!(b.as_array(), [1.0, 2.0, -1.0, 0.0, 0.0, 0.0]);
        let empty = ImageData {
            dimensions: [4, 0, 1],
            ..ImageData::default()
        };
        assert!(!empty.bounds().is_initialized());
    }

    #[test]
    fn leaves_skip_empty_slots_and_descend() {
        let inner = HierarchicalDataSet::new()
            .with_block(0, 0, unit_poly(10.0))
            .with_block(1, 0, Table::new());

        let mut outer = HierarchicalDataSet::new();
        outer.set_block(0, 0, Some(unit_poly(0.0).into()));
        outer.set_block(0, 2, Some(inner.into()));
        outer.set_block(1, 0, Some(ImageData::default().into()));
        assert_eq!(outer.block_count(0), 3);
        assert!(outer.block(0, 1).is_none());
        assert_eq!(outer.block_count(7), 0);

        let kinds: Vec<_> = outer.leaves().map(DataObject::kind).collect();
        assert_eq!(
            kinds,
            [DataKind::Poly, DataKind::Poly, DataKind::Table, DataKind::Image]
        );
    }

    #[test]
    fn leaves_traversal_is_restartable() {
        let mut h = HierarchicalDataSet::new();
        h.push_level([unit_poly(0.0), unit_poly(1.0)]);
        h.push_level([unit_poly(2.0)]);
        assert_eq!(h.level_count(), 2);

        let mut first = h.leaves();
        assert!(first.next().is_some());
        assert_eq!(h.leaves().count(), 3, "a new traversal starts from the beginning");
        assert_eq!(first.count(), 2);
    }

    #[test]
    fn empty_collection_has_no_leaves() {
        let mut h = HierarchicalDataSet::new();
        h.set_block(2, 3, None);
        assert_eq!(h.level_count(), 3);
        let mut leaves = h.leaves();
        assert!(leaves.next().is_none());
        assert!(leaves.next().is_none(), "traversal stays finished");
    }

    #[test]
    fn kind_flags_are_distinct() {
        let all = DataKind::Poly.flag()
            | DataKind::Image.flag()
            | DataKind::Table.flag()
            | DataKind::Composite.flag();
        assert_eq!(all, DataKinds::all());
    }
}
