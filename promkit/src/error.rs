use std::{error::Error as StdError, fmt};

use thiserror::Error as ThisError;

/// An error raised by a storage backend.
///
/// The wrapped error is kept as-is and is reachable through [`BackendError::get_ref`] or
/// [`BackendError::into_inner`]; nothing in this crate retries or rewrites it.
pub struct BackendError(Box<dyn StdError + Send + Sync + 'static>);

impl BackendError {
    /// Wraps an arbitrary error raised by a backend.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self(error.into())
    }

    /// Gets a reference to the wrapped error.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Consumes this error, returning the wrapped error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.0
    }
}

impl fmt::Debug for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for BackendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// Errors that can occur while defining, labelling, observing, or registering metrics.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A label was supplied that the metric does not declare.
    #[error("metric `{metric}` does not declare a label named `{label}`")]
    UnexpectedLabel {
        /// Name of the metric.
        metric: String,
        /// The undeclared label.
        label: String,
    },

    /// An observation was attempted before every required label was bound.
    #[error("metric `{metric}` cannot be observed until all of its required labels are bound")]
    UnobservableMetric {
        /// Name of the metric.
        metric: String,
    },

    /// An argument was rejected, either while defining a metric or while observing it.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A collector with the same name is already registered.
    #[error("a collector named `{0}` is already registered")]
    DuplicateName(String),

    /// The storage backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// No backend constructor is registered under the requested identifier.
    #[error("no backend is registered under `{0}`")]
    UnknownBackend(String),

    /// The backend configuration could not be loaded or was rejected.
    #[error("invalid backend configuration: {0}")]
    InvalidBackendConfig(String),

    /// The default registry was replaced after metrics had already registered with it.
    #[error("the default registry cannot be replaced once metrics have registered with it")]
    DefaultRegistryInUse,
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        Error::InvalidArgument(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{BackendError, Error};

    #[test]
    fn backend_errors_pass_through_unchanged() {
        let inner = io::Error::new(io::ErrorKind::ConnectionRefused, "store unreachable");
        let err: Error = BackendError::new(inner).into();

        assert_eq!(err.to_string(), "store unreachable");
        let Error::Backend(backend) = err else { panic!("expected a backend error") };
        let io_err = backend
            .into_inner()
            .downcast::<io::Error>()
            .expect("wrapped error should still be an io::Error");
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
    }
}
