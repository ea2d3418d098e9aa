// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Weak;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use understory_composite::{
    Bounds3D, ClipPlanes, CompositeMapper, DataObject, HierarchicalDataSet, ImageData,
    LeafDelegate, Pipeline, Plane, PolyData, bound_leaf_bounds, leaf_bounds_union,
};

struct Touch(Weak<PolyData>);

impl LeafDelegate for Touch {
    type Context = usize;
    type Actor = ();
    type Error = std::convert::Infallible;

    fn set_clipping_planes(&mut self, planes: &ClipPlanes) {
        black_box(planes.len());
    }

    fn render(&mut self, drawn: &mut usize, _: &()) -> Result<(), Self::Error> {
        *drawn += 1;
        Ok(())
    }

    fn bounds(&self) -> Bounds3D<f64> {
        bound_leaf_bounds(&self.0)
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// `levels` levels of `per_level` random cubes; every `reject_every`th block is an image.
fn gen_hierarchy(levels: usize, per_level: usize, reject_every: usize) -> HierarchicalDataSet {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let mut h = HierarchicalDataSet::new();
    for level in 0..levels {
        for i in 0..per_level {
            let object: DataObject = if reject_every > 0 && i % reject_every == reject_every - 1 {
                ImageData::default().into()
            } else {
                let min = DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * 1000.0;
                PolyData::cuboid(min, min + DVec3::splat(10.0)).into()
            };
            h.set_block(level, i, Some(object));
        }
    }
    h
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for &n in &[16usize, 128, 1024] {
        let data = gen_hierarchy(4, n, 8);
        group.throughput(Throughput::Elements((4 * n) as u64));

        group.bench_function(format!("cached_n{}", n), |b| {
            let mut mapper =
                CompositeMapper::with_input(Pipeline::with_output(data.clone()), Touch);
            mapper.add_clipping_plane(Plane::new(DVec3::ZERO, DVec3::Z));
            let mut drawn = 0_usize;
            mapper.render(&mut drawn, &()).unwrap();
            b.iter(|| {
                mapper.render(&mut drawn, &()).unwrap();
                black_box(drawn);
            });
        });

        group.bench_function(format!("rebuild_each_frame_n{}", n), |b| {
            let mut mapper =
                CompositeMapper::with_input(Pipeline::with_output(data.clone()), Touch);
            let mut drawn = 0_usize;
            b.iter(|| {
                mapper.input_mut().unwrap().mark_modified();
                mapper.render(&mut drawn, &()).unwrap();
                black_box(drawn);
            });
        });
    }
    group.finish();
}

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounds");
    for &n in &[16usize, 128, 1024] {
        let data = DataObject::from(gen_hierarchy(4, n, 0));
        group.throughput(Throughput::Elements((4 * n) as u64));
        group.bench_function(format!("union_n{}", n), |b| {
            b.iter(|| black_box(leaf_bounds_union(data.structure())));
        });
        group.bench_function(format!("mapper_fresh_n{}", n), |b| {
            b.iter_batched(
                || CompositeMapper::with_input(Pipeline::with_output(data.clone()), Touch),
                |mut mapper| black_box(mapper.bounds()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_bounds);
criterion_main!(benches);
