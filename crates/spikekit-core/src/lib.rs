//! # SpikeKit Core
//!
//! Core types for SpikeKit sessions: the event dispatcher and action
//! registry shared by every view of the application, the argument binding
//! it relies on, and the error types it reports.

pub mod error;
pub mod session;

pub use error::{Result, SessionError};

pub use session::{
    Action, ActionBuilder, ActionOptions, Args, BindMode, Bound, BoundAction, Callback,
    CallbackId, Connector, Param, Session, SessionConfig, Signature, HANDLER_PREFIX,
};
