// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Modification stamps and the staleness gate.

/// Monotonic modification stamp.
///
/// ## Semantics
///
/// - [`Stamp::NEVER`] is older than every stamp a [`StampClock`] hands out.
/// - Stamps from one clock are totally ordered; a larger stamp is a later change.
/// - Stamps from different clocks are not comparable in any meaningful way.
///   Gates must be [invalidated](Gate::invalidate) when their source is replaced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(u64);

impl Stamp {
    /// The stamp of something that was never built or modified.
    pub const NEVER: Self = Self(0);

    /// Wrap a raw counter value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Source of strictly increasing [`Stamp`]s.
///
/// The first tick is `1`. Behavior on counter overflow is unspecified; `u64` is ample.
#[derive(Clone, Debug, Default)]
pub struct StampClock {
    last: u64,
}

impl StampClock {
    /// Create a clock that has not ticked yet.
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Advance the clock and return the new stamp.
    pub fn tick(&mut self) -> Stamp {
        self.last += 1;
        Stamp(self.last)
    }

    /// The most recent stamp handed out, or [`Stamp::NEVER`].
    pub const fn last(&self) -> Stamp {
        Stamp(self.last)
    }
}

/// Returns true when derived state built at `last_built` is older than `pipeline`.
///
/// This is the only invalidation rule: equal stamps are current.
pub fn needs_rebuild(pipeline: Stamp, last_built: Stamp) -> bool {
    pipeline > last_built
}

/// One cached derivation's build stamp.
///
/// Each cache that depends on the pipeline owns its own gate, so caches are
/// refreshed on their own schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gate {
    last_built: Stamp,
}

impl Gate {
    /// A gate that has never been built; stale against any ticked stamp.
    pub const fn new() -> Self {
        Self {
            last_built: Stamp::NEVER,
        }
    }

    /// See [`needs_rebuild`].
    pub fn is_stale(&self, pipeline: Stamp) -> bool {
        needs_rebuild(pipeline, self.last_built)
    }

    /// Record a completed build against the pipeline stamp observed when it started.
    ///
    /// The recorded stamp never moves backwards.
    pub fn mark_built(&mut self, observed: Stamp) {
        self.last_built = self.last_built.max(observed);
    }

    /// Forget the last build.
    pub fn invalidate(&mut self) {
        self.last_built = Stamp::NEVER;
    }

    /// Stamp of the last build, or [`Stamp::NEVER`].
    pub const fn last_built(&self) -> Stamp {
        self.last_built
    }
}
