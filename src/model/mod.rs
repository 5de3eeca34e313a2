//! # Work items and raw queue records.
//!
//! - [`WorkItem`] a decoded reindex request (`id` + `revision`)
//! - [`RawRecord`] the opaque JSON object returned by a take-operation
//! - [`DecodeResult`] the classification of one take-operation result

mod item;
mod record;

pub use item::WorkItem;
pub use record::{DecodeResult, ID_FIELD, REVISION_FIELD, RawRecord};
