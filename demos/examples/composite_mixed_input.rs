// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mixed hierarchies.
//!
//! Non-poly blocks are skipped when delegates are built, with a single
//! warning per rebuild no matter how many there are.
//!
//! Run:
//! - `cargo run -p understory_examples --example composite_mixed_input`

use std::sync::Weak;

use glam::DVec3;
use understory_bounds::Bounds3D;
use understory_composite::{
    ClipPlanes, CompositeMapper, DataObject, HierarchicalDataSet, ImageData, LeafDelegate,
    Pipeline, PolyData, Table, bound_leaf_bounds,
};

struct Noop(Weak<PolyData>);

impl LeafDelegate for Noop {
    type Context = ();
    type Actor = ();
    type Error = std::convert::Infallible;

    fn set_clipping_planes(&mut self, _planes: &ClipPlanes) {}

    fn render(&mut self, _: &mut (), _: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    fn bounds(&self) -> Bounds3D<f64> {
        bound_leaf_bounds(&self.0)
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut h = HierarchicalDataSet::new();
    h.push_level([
        DataObject::from(PolyData::cuboid(DVec3::ZERO, DVec3::ONE)),
        DataObject::from(ImageData {
            dimensions: [8, 8, 1],
            ..ImageData::default()
        }),
        DataObject::from(PolyData::cuboid(DVec3::ONE, DVec3::splat(2.0))),
        DataObject::from(Table::new().with_column("t", vec![0.0, 1.0])),
        DataObject::from(PolyData::cuboid(DVec3::splat(2.0), DVec3::splat(3.0))),
    ]);

    let mut mapper = CompositeMapper::with_input(Pipeline::with_output(h), Noop);
    mapper.render(&mut (), &()).unwrap();

    let report = mapper.last_rebuild().copied().unwrap();
    println!(
        "bound {} delegates, skipped {}, warnings {}",
        report.bound, report.skipped, report.warnings
    );
    assert_eq!(report.warnings, 1, "mismatches should be reported once per rebuild");
    println!("bounds (poly leaves only): {:?}", mapper.bounds().as_array());
    println!("drawn leaves only: {:?}", mapper.pool().delegate_bounds());
}
