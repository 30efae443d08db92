//! Core identifier and span types shared across the extraction pipeline.

use std::num::NonZeroU32;
use serde::{Deserialize, Serialize};

/// Opaque identifier for any extracted entity (file, function, struct, field, variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(NonZeroU32);

/// Opaque identifier for a source file entity, distinct so APIs can't confuse
/// a file id with a symbol id even though both are backed by `EntityId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(NonZeroU32);

impl EntityId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

impl FileId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }

    pub fn as_entity(&self) -> EntityId {
        EntityId(self.0)
    }
}

/// A monotonically increasing id source. Counters persist across incremental
/// runs so ids already written into downstream consumers stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdCounter {
    next: u32,
}

impl Default for IdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdCounter {
    pub fn resume_after(last_issued: u32) -> Self {
        Self { next: last_issued + 1 }
    }

    pub fn next_entity(&mut self) -> EntityId {
        let id = EntityId::new(self.next).expect("counter never issues zero");
        self.next += 1;
        id
    }

    pub fn peek_next(&self) -> u32 {
        self.next
    }
}

/// 1-indexed line/column span within a file, inclusive of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self { start_line, start_column, end_line, end_column }
    }

    pub fn contains_point(&self, line: u32, column: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && column < self.start_column {
            return false;
        }
        if line == self.end_line && column > self.end_column {
            return false;
        }
        true
    }

    pub fn contains_span(&self, other: &Span) -> bool {
        self.contains_point(other.start_line, other.start_column)
            && self.contains_point(other.end_line, other.end_column)
    }
}
