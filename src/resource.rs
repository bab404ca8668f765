//! Static data loaded once at startup.

use crate::error::{CommentaryError, Result};
use std::sync::Arc;

/// A read-only resource that was either loaded or failed to load.
///
/// A failed load does not stop the process. Each use reports
/// [`CommentaryError::ResourceNotFound`] with the original reason instead.
#[derive(Debug)]
pub enum Resource<T> {
    Loaded(Arc<T>),
    Unavailable(String),
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        match self {
            Resource::Loaded(value) => Resource::Loaded(Arc::clone(value)),
            Resource::Unavailable(reason) => Resource::Unavailable(reason.clone()),
        }
    }
}

impl<T> Resource<T> {
    /// Wrap the result of a load attempt.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Resource::Loaded(Arc::new(value)),
            Err(CommentaryError::ResourceNotFound(reason)) => Resource::Unavailable(reason),
            Err(e) => Resource::Unavailable(e.to_string()),
        }
    }

    /// Borrow the loaded value.
    pub fn get(&self) -> Result<&T> {
        match self {
            Resource::Loaded(value) => Ok(&**value),
            Resource::Unavailable(reason) => Err(CommentaryError::ResourceNotFound(reason.clone())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Resource::Loaded(_))
    }
}

impl<T> From<T> for Resource<T> {
    fn from(value: T) -> Self {
        Resource::Loaded(Arc::new(value))
    }
}
