//! Error reporting for failed host library calls

use crate::backend::{HostFailure, HostLibrary, HostResult};
use thiserror::Error;

/// Message used when the host reports a failure without setting any text.
const UNKNOWN_FAILURE: &str = "Unknown host library failure";

/// A host library call failed.
///
/// There is a single error kind: the call did not succeed, and the host's
/// last error message explains why. The message is read immediately after the
/// failing call, before anything else can overwrite it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Error {
    message: String,
}

/// Result alias used by every wrapper operation
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() {
                UNKNOWN_FAILURE.to_string()
            } else {
                message
            },
        }
    }

    /// The host library's error text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Capture the host's current error message.
    pub(crate) fn from_host(host: &dyn HostLibrary) -> Self {
        Self::from_host_or(host, UNKNOWN_FAILURE)
    }

    /// Capture the host's current error message, or `fallback` if the host
    /// did not set one.
    pub(crate) fn from_host_or(host: &dyn HostLibrary, fallback: &str) -> Self {
        let message = host.get_error();
        let error = if message.is_empty() {
            Self::new(fallback)
        } else {
            Self::new(message)
        };
        log::warn!("{} call failed: {}", host.name(), error.message);
        error
    }

    /// Error for an operation attempted on a wrapper that no longer holds a
    /// native handle. Uses the same text the host gives for a bad handle.
    pub(crate) fn invalid_handle(kind: &str) -> Self {
        Self::new(format!("Invalid {kind}"))
    }
}

/// Translation of raw host status into [`Error`]
pub(crate) trait HostResultExt<T> {
    /// Convert a host failure into an [`Error`] carrying the host message.
    fn or_host_error(self, host: &dyn HostLibrary) -> Result<T>;
}

impl<T> HostResultExt<T> for HostResult<T> {
    fn or_host_error(self, host: &dyn HostLibrary) -> Result<T> {
        self.map_err(|HostFailure| Error::from_host(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessHost;

    #[test]
    fn test_display_is_the_host_message() {
        let error = Error::new("Invalid renderer");
        assert_eq!(error.to_string(), "Invalid renderer");
        assert_eq!(error.message(), "Invalid renderer");
    }

    #[test]
    fn test_empty_message_is_replaced() {
        let error = Error::new("");
        assert!(!error.message().is_empty());
    }

    #[test]
    fn test_invalid_handle_text() {
        assert_eq!(Error::invalid_handle("texture").message(), "Invalid texture");
    }

    #[test]
    fn test_from_host_uses_fallback_when_host_is_silent() {
        let host = HeadlessHost::new();
        host.clear_error();
        let error = Error::from_host_or(&host, "no render drivers available");
        assert_eq!(error.message(), "no render drivers available");
    }

    #[test]
    fn test_or_host_error_reads_last_message() {
        let host = HeadlessHost::new();
        let status: HostResult<()> = host.render_clear(Default::default());
        let error = status.or_host_error(&host).unwrap_err();
        assert_eq!(error.message(), "Invalid renderer");
    }
}
