// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accumulated bounds with an explicit uninitialized state.

use crate::types::Aabb3D;

/// Bounds that are either not yet known or a concrete [`Aabb3D`].
///
/// Folding starts from [`Bounds3D::Uninitialized`]. The first initialized
/// contribution seeds the box; every later one expands it. Folding an
/// uninitialized value is a no-op, so empty inputs never corrupt a union.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Bounds3D<T> {
    /// Nothing with valid bounds has been folded in yet.
    #[default]
    Uninitialized,
    /// Tight union of everything folded in so far.
    Box(Aabb3D<T>),
}

impl<T: Copy + PartialOrd> Bounds3D<T> {
    /// True once at least one box has been folded in.
    pub const fn is_initialized(&self) -> bool {
        matches!(self, Self::Box(_))
    }

    /// The box, if initialized.
    pub const fn as_box(&self) -> Option<Aabb3D<T>> {
        match self {
            Self::Uninitialized => None,
            Self::Box(b) => Some(*b),
        }
    }

    /// The box, or `fallback` when uninitialized.
    pub fn box_or(&self, fallback: Aabb3D<T>) -> Aabb3D<T> {
        self.as_box().unwrap_or(fallback)
    }

    /// Fold one box into these bounds.
    pub fn include_box(&mut self, aabb: Aabb3D<T>) {
        *self = match *self {
            Self::Uninitialized => Self::Box(aabb),
            Self::Box(current) => Self::Box(current.union(&aabb)),
        };
    }

    /// Fold other bounds into these bounds. Uninitialized `other` is ignored.
    pub fn include(&mut self, other: Self) {
        if let Self::Box(aabb) = other {
            self.include_box(aabb);
        }
    }

    /// Union of every item, `Uninitialized` if none contribute.
    pub fn union_all<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        items.into_iter().fold(Self::Uninitialized, |mut acc, b| {
            acc.include(b);
            acc
        })
    }
}

impl<T> From<Aabb3D<T>> for Bounds3D<T> {
    fn from(aabb: Aabb3D<T>) -> Self {
        Self::Box(aabb)
    }
}

impl<T: Copy + PartialOrd> FromIterator<Aabb3D<T>> for Bounds3D<T> {
    fn from_iter<I: IntoIterator<Item = Aabb3D<T>>>(iter: I) -> Self {
        Self::union_all(iter.into_iter().map(Self::Box))
    }
}
