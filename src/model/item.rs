use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of work requiring reindexing: an entity id and the revision to index.
///
/// Immutable. Created by decoding a [`RawRecord`](crate::RawRecord), handed to
/// the downstream target once, then dropped.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    id: String,
    revision: i64,
}

impl WorkItem {
    /// Creates a work item.
    pub fn new(id: impl Into<String>, revision: i64) -> Self {
        Self {
            id: id.into(),
            revision,
        }
    }

    /// Entity identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Revision to reindex.
    pub fn revision(&self) -> i64 {
        self.revision
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.revision)
    }
}
