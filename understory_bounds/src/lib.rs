// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bounds --heading-base-level=0

//! Understory Bounds: generic 3D axis-aligned boxes and accumulated bounds.
//!
//! - [`Aabb3D`] is a plain min/max box over any `Copy + PartialOrd` scalar.
//! - [`Bounds3D`] adds an explicit uninitialized state so a union can be folded
//!   from zero or more contributions without sentinel values leaking into the result.
//!
//! It does not depend on any geometry crate.
//! Higher layers (like a composite mapper) compute per-leaf boxes and fold them here.
//!
//! # Example
//!
//! ```rust
//! use understory_bounds::{Aabb3D, Bounds3D};
//!
//! let mut total = Bounds3D::Uninitialized;
//! total.include_box(Aabb3D::from_extents((0.0, 1.0), (0.0, 1.0), (0.0, 1.0)));
//! total.include_box(Aabb3D::from_extents((-1.0, 0.5), (2.0, 3.0), (0.0, 0.2)));
//!
//! let b = total.box_or(Aabb3D::CANONICAL);
//! assert_eq!(b.as_array(), [-1.0, 1.0, 0.0, 3.0, 0.0, 1.0]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

pub mod bounds;
pub mod types;

pub use bounds::Bounds3D;
pub use types::Aabb3D;
