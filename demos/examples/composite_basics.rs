// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite mapper basics.
//!
//! Build a two-level hierarchy, render it twice, edit the pipeline, and
//! watch the delegate pool and bounds refresh only when stale.
//!
//! Run:
//! - `cargo run -p understory_examples --example composite_basics`

use std::sync::Weak;

use glam::DVec3;
use understory_bounds::Bounds3D;
use understory_composite::{
    ClipPlanes, CompositeMapper, HierarchicalDataSet, LeafDelegate, Pipeline, Plane, PolyData,
    bound_leaf_bounds,
};

/// Prints instead of drawing.
struct Printer {
    leaf: Weak<PolyData>,
    planes: usize,
}

impl LeafDelegate for Printer {
    type Context = Vec<String>;
    type Actor = &'static str;
    type Error = std::convert::Infallible;

    fn set_clipping_planes(&mut self, planes: &ClipPlanes) {
        self.planes = planes.len();
    }

    fn render(&mut self, log: &mut Vec<String>, actor: &&'static str) -> Result<(), Self::Error> {
        let triangles = self.leaf.upgrade().map_or(0, |pd| pd.triangles().len());
        log.push(format!(
            "{actor}: {triangles} triangles, {} clipping planes",
            self.planes
        ));
        Ok(())
    }

    fn bounds(&self) -> Bounds3D<f64> {
        bound_leaf_bounds(&self.leaf)
    }
}

fn main() {
    let data = HierarchicalDataSet::new()
        .with_block(0, 0, PolyData::cuboid(DVec3::ZERO, DVec3::ONE))
        .with_block(1, 0, PolyData::cuboid(DVec3::splat(-2.0), DVec3::splat(-1.0)))
        .with_block(1, 1, PolyData::from_points([DVec3::new(4.0, 0.0, 0.0)]));

    let printer = |leaf: Weak<PolyData>| Printer { leaf, planes: 0 };
    let mut mapper = CompositeMapper::with_input(Pipeline::with_output(data), printer);
    mapper.add_clipping_plane(Plane::new(DVec3::ZERO, DVec3::Y));

    println!("bounds: {:?}", mapper.bounds().as_array());
    println!("center: {}, length: {:.3}", mapper.center(), mapper.length());

    let mut log = Vec::new();
    mapper.render(&mut log, &"actor").unwrap();
    mapper.render(&mut log, &"actor").unwrap();
    for line in &log {
        println!("{line}");
    }
    println!(
        "delegates: {}, built at {:?}",
        mapper.delegate_count(),
        mapper.structure_stamp()
    );

    // Replace the upstream input; the next frame rebuilds.
    mapper
        .input_mut()
        .unwrap()
        .set_input(Some(PolyData::cuboid(DVec3::ZERO, DVec3::splat(10.0)).into()));
    println!("bounds after edit: {:?}", mapper.bounds().as_array());
    log.clear();
    mapper.render(&mut log, &"actor").unwrap();
    assert_eq!(mapper.delegate_count(), 1, "flat input should have a single delegate");
    println!("after edit: {log:?}");
}
