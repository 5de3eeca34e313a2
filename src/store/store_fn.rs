//! # Function-backed store (`StoreFn`)
//!
//! [`StoreFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! take. Handy for adapting a client library call without writing a type, and
//! for scripting failures in tests.
//!
//! ## Example
//! ```rust
//! use queuedrain::{RawRecord, StoreError, StoreFn, StoreRef};
//!
//! let store: StoreRef = StoreFn::arc("offline", || async {
//!     Err::<Option<RawRecord>, _>(StoreError::unavailable("connection refused"))
//! });
//! assert_eq!(store.name(), "offline");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::RawRecord;
use crate::store::WorkQueueStore;

/// Function-backed store implementation.
#[derive(Debug)]
pub struct StoreFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> StoreFn<F> {
    /// Creates a new function-backed store.
    ///
    /// Prefer [`StoreFn::arc`] when you immediately need a [`StoreRef`](crate::StoreRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the store and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> WorkQueueStore for StoreFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<RawRecord>, StoreError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn take_one(&self) -> Result<Option<RawRecord>, StoreError> {
        (self.f)().await
    }
}
