//! Error context extension
//!
//! Attaches a configuration-level message to foreign errors while keeping
//! the source chain intact.

use cpk_domain::error::{Error, Result};

/// Adds `.context(..)` to results carrying foreign error types.
pub trait ErrorContext<T> {
    /// Wrap the error as a configuration error with the given message.
    fn context(self, message: &str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: &str) -> Result<T> {
        self.map_err(|err| Error::configuration_with_source(message, err))
    }
}
