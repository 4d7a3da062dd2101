//! Error handling for the SpikeKit session
//!
//! Two families of failures matter to callers:
//! - Naming errors, raised when a handler does not follow the `on_<event>`
//!   convention (checked before anything is registered)
//! - Argument errors, raised when arguments cannot be bound to a callback
//!   signature (wrong arity, unknown keyword, duplicated value)
//!
//! Failures raised by handler and action bodies are carried as `anyhow`
//! sources so nothing is lost on the way back to the emitter.

use thiserror::Error;

/// Session error type
#[derive(Error, Debug)]
pub enum SessionError {
    /// Handler name does not follow the `<prefix><event>` convention
    #[error("Callback '{name}' cannot be connected: name must start with '{prefix}' followed by an event name")]
    InvalidCallbackName {
        /// The offending callback name.
        name: String,
        /// The required prefix.
        prefix: String,
    },

    /// Required parameters were not supplied
    #[error("{callable}() missing required argument(s): {}", missing.join(", "))]
    MissingArguments {
        /// The callback or action name.
        callable: String,
        /// Names of the parameters left unset.
        missing: Vec<String>,
    },

    /// More positional arguments than declared parameters
    #[error("{callable}() takes {accepted} positional argument(s) but {given} were given")]
    TooManyPositional {
        /// The callback or action name.
        callable: String,
        /// Number of positional parameters declared.
        accepted: usize,
        /// Number of positional arguments supplied.
        given: usize,
    },

    /// Keyword argument not declared by a strict callee
    #[error("{callable}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword {
        /// The callback or action name.
        callable: String,
        /// The undeclared keyword.
        keyword: String,
    },

    /// Same parameter supplied positionally and by keyword
    #[error("{callable}() got multiple values for argument '{param}'")]
    MultipleValues {
        /// The callback or action name.
        callable: String,
        /// The parameter given twice.
        param: String,
    },

    /// Bound value could not be read as the requested type
    #[error("Invalid value for argument '{param}': {reason}")]
    InvalidArgument {
        /// The parameter name.
        param: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// No action registered under this name
    #[error("Unknown action: {name}")]
    UnknownAction {
        /// The requested action name.
        name: String,
    },

    /// Action name already taken and overriding is disabled
    #[error("Action '{name}' is already registered")]
    DuplicateAction {
        /// The action name.
        name: String,
    },

    /// A handler failed while an event was being emitted
    #[error("Handler '{handler}' failed on event '{event}': {source}")]
    Handler {
        /// The event being emitted.
        event: String,
        /// The failing handler's name.
        handler: String,
        /// The underlying failure.
        source: anyhow::Error,
    },

    /// An action body failed
    #[error("Action '{action}' failed: {source}")]
    Action {
        /// The action name.
        action: String,
        /// The underlying failure.
        source: anyhow::Error,
    },
}

impl SessionError {
    /// Check if this is a handler naming error
    pub fn is_naming_error(&self) -> bool {
        matches!(self, SessionError::InvalidCallbackName { .. })
    }

    /// Check if this is an argument binding error
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            SessionError::MissingArguments { .. }
                | SessionError::TooManyPositional { .. }
                | SessionError::UnexpectedKeyword { .. }
                | SessionError::MultipleValues { .. }
        )
    }

    /// Check if this error came out of a handler or action body
    pub fn is_callback_failure(&self) -> bool {
        matches!(
            self,
            SessionError::Handler { .. } | SessionError::Action { .. }
        )
    }
}

/// Result type using SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
