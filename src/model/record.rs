//! # Raw records and their classification.
//!
//! A take-operation yields `Option<RawRecord>`. [`DecodeResult::classify`]
//! turns that into one of three outcomes:
//!
//! ```text
//! None                                   → Empty
//! Some({ "id": <string>, "revision": <i64>, .. }) → Item(WorkItem)
//! Some(anything else)                    → Malformed
//! ```
//!
//! The revision must be a JSON integer representable as `i64`. Floats
//! (even `1.0`), strings and oversized unsigned values are malformed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::WorkItem;

/// Field holding the entity identifier.
pub const ID_FIELD: &str = "id";

/// Field holding the revision to reindex.
pub const REVISION_FIELD: &str = "revision";

/// Opaque record removed from the shared queue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wraps a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value if it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Returns a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the record's fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Decodes the record into a [`WorkItem`], or `None` if a field is
    /// missing or has the wrong shape.
    pub fn decode(&self) -> Option<WorkItem> {
        let id = self.get(ID_FIELD)?.as_str()?;
        let revision = self.get(REVISION_FIELD)?.as_i64()?;
        Some(WorkItem::new(id, revision))
    }
}

impl From<&WorkItem> for RawRecord {
    fn from(item: &WorkItem) -> Self {
        let mut fields = Map::with_capacity(2);
        fields.insert(ID_FIELD.to_owned(), Value::from(item.id()));
        fields.insert(REVISION_FIELD.to_owned(), Value::from(item.revision()));
        Self(fields)
    }
}

impl From<WorkItem> for RawRecord {
    fn from(item: WorkItem) -> Self {
        RawRecord::from(&item)
    }
}

/// Outcome of one take-operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeResult {
    /// A decodable record was removed from the queue.
    Item(WorkItem),
    /// A record was removed but could not be decoded. It is gone for good.
    Malformed,
    /// The queue had nothing to take.
    Empty,
}

impl DecodeResult {
    /// Classifies the result of a take-operation.
    pub fn classify(taken: Option<RawRecord>) -> Self {
        match taken {
            None => DecodeResult::Empty,
            Some(record) => match record.decode() {
                Some(item) => DecodeResult::Item(item),
                None => DecodeResult::Malformed,
            },
        }
    }
}
