use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
struct Tracked {
    loading: bool,
    error: Option<ApiError>,
}

/// Loading flag and last error for one kind of call made by a view.
///
/// Shared by reference, so the flag can be read while the call is pending.
#[derive(Debug, Default)]
pub struct CallState {
    inner: Mutex<Tracked>,
}

impl CallState {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Tracked> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `call`, clearing the previous error first and recording the new
    /// one if it fails. The result is passed through unchanged.
    ///
    /// # Errors
    /// Returns whatever `call` returns.
    pub async fn track<T, F>(&self, call: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        {
            let mut inner = self.inner();
            inner.loading = true;
            inner.error = None;
        }

        let result = call.await;

        let mut inner = self.inner();
        inner.loading = false;
        if let Err(err) = &result {
            inner.error = Some(err.clone());
        }
        result
    }

    pub fn loading(&self) -> bool {
        self.inner().loading
    }

    pub fn error(&self) -> Option<ApiError> {
        self.inner().error.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner().error.as_ref().map(|err| err.message().to_string())
    }

    pub fn clear_error(&self) {
        self.inner().error = None;
    }
}
