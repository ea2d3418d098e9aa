// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Upstream data sources and a minimal stamped pipeline.

use crate::data::{DataObject, RootStructure};
use crate::stamp::{Stamp, StampClock};

/// Producer of data for a composite consumer.
///
/// Implementations expose a monotonic change stamp covering everything
/// upstream. Consumers compare it with their own build stamps and re-derive
/// cached state only when it is newer.
pub trait CompositeSource {
    /// Stamp of the most recent upstream change.
    fn pipeline_stamp(&self) -> Stamp;

    /// The current output, if any.
    fn root(&self) -> Option<&DataObject>;

    /// Bring the output up to date with upstream changes.
    ///
    /// Called before contents are trusted (for example before computing bounds).
    fn execute(&mut self);

    /// The current output classified as flat, hierarchical, or absent.
    fn structure(&self) -> RootStructure<'_> {
        RootStructure::from_root(self.root())
    }
}

impl<S: CompositeSource + ?Sized> CompositeSource for &mut S {
    fn pipeline_stamp(&self) -> Stamp {
        (**self).pipeline_stamp()
    }

    fn root(&self) -> Option<&DataObject> {
        (**self).root()
    }

    fn execute(&mut self) {
        (**self).execute();
    }
}

/// A single-stage pipeline holding a pending input and its published output.
///
/// ## Semantics
///
/// - [`set_input`](Self::set_input) and [`mark_modified`](Self::mark_modified) tick the
///   modification stamp; nothing is published yet.
/// - [`execute`](CompositeSource::execute) publishes the pending input when modified since the
///   last execution and ticks the execution stamp.
/// - [`pipeline_stamp`](CompositeSource::pipeline_stamp) is the newer of the two, so
///   both edits and executions invalidate downstream caches.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    clock: StampClock,
    pending: Option<DataObject>,
    output: Option<DataObject>,
    modified: Stamp,
    executed: Stamp,
}

impl Pipeline {
    /// Create a pipeline with no input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline whose output is `input`, already executed.
    pub fn with_output(input: impl Into<DataObject>) -> Self {
        let mut pipeline = Self::new();
        pipeline.set_input(Some(input.into()));
        pipeline.execute();
        pipeline
    }

    /// Replace the input. Takes effect on the next [`execute`](CompositeSource::execute).
    pub fn set_input(&mut self, input: Option<DataObject>) {
        self.pending = input;
        self.modified = self.clock.tick();
    }

    /// Record an upstream change that does not replace the input.
    pub fn mark_modified(&mut self) {
        self.modified = self.clock.tick();
    }

    /// The input that the next execution will publish.
    pub fn pending(&self) -> Option<&DataObject> {
        self.pending.as_ref()
    }

    /// Stamp of the last edit.
    pub const fn modified_stamp(&self) -> Stamp {
        self.modified
    }

    /// Stamp of the last execution that published output.
    pub const fn executed_stamp(&self) -> Stamp {
        self.executed
    }

    /// Whether an edit is waiting for [`execute`](CompositeSource::execute).
    pub fn needs_execute(&self) -> bool {
        self.modified > self.executed
    }

    fn run(&mut self) -> bool {
        if !self.needs_execute() {
            return false;
        }
        self.output = self.pending.clone();
        self.executed = self.clock.tick();
        tracing::trace!(stamp = self.executed.get(), "pipeline executed");
        true
    }
}

impl CompositeSource for Pipeline {
    fn pipeline_stamp(&self) -> Stamp {
        self.modified.max(self.executed)
    }

    fn root(&self) -> Option<&DataObject> {
        self.output.as_ref()
    }

    fn execute(&mut self) {
        self.run();
    }
}
