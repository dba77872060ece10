//! Error types for demo loading.

use std::fmt;

use thiserror::Error;

/// Result type for demo operations.
pub type DemoResult<T> = Result<T, DemoError>;

/// Errors that can occur while booting a demo module.
///
/// Errors are `Clone` so a single failed load can be reported to every
/// trigger that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemoError {
    /// The canvas declares no module location.
    #[error("No module declared for canvas")]
    MissingModule,

    /// The module script could not be resolved or its factory was missing.
    #[error("{0}")]
    Import(String),

    /// The module factory raised while instantiating.
    #[error("{0}")]
    Instantiate(String),

    /// The module entry routine raised something other than a controlled exit.
    #[error("{0}")]
    EntryPoint(String),

    /// The host environment could not provide something the binder needs.
    #[error("Host error: {0}")]
    Host(String),
}

/// A value raised by module code (a thrown JavaScript value in the browser).
///
/// Hosts capture whatever they can read off the raised value: the value itself
/// when it is a plain string, the `name` and `message` when it is an error
/// object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raised {
    /// The raised value when it was a plain string.
    pub text: Option<String>,
    /// The `name` of the raised error object, if any.
    pub name: Option<String>,
    /// Human readable description.
    pub message: String,
}

/// Sentinel string raised by modules that unwind out of `main` on purpose.
pub const UNWIND_SENTINEL: &str = "unwind";

/// Error name carried by modules that called `exit()`.
pub const EXIT_STATUS_NAME: &str = "ExitStatus";

impl Raised {
    /// A raised plain string.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            message: text.clone(),
            text: Some(text),
            name: None,
        }
    }

    /// A raised error object with a name and message.
    #[must_use]
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            text: None,
            name: Some(name.into()),
            message: message.into(),
        }
    }

    /// A raised value with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            text: None,
            name: None,
            message: message.into(),
        }
    }

    /// Whether this value means the module exited under its own control.
    ///
    /// Both the unwind sentinel and an `ExitStatus` error count.
    #[must_use]
    pub fn is_controlled_exit(&self) -> bool {
        self.text.as_deref() == Some(UNWIND_SENTINEL)
            || self.name.as_deref() == Some(EXIT_STATUS_NAME)
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
