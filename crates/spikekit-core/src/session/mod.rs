//! # Session Module
//!
//! Event dispatch and action registration for a SpikeKit session.
//!
//! ## Overview
//!
//! - Handlers are named `on_<event>` and connected to `<event>`
//! - `emit` calls every handler of an event synchronously, in registration
//!   order, passing each one only the keyword arguments it declares
//! - Actions are named operations invoked through `call`, with strict
//!   argument checking
//!
//! ## Usage
//!
//! ```rust
//! use spikekit_core::args;
//! use spikekit_core::session::{Callback, Session, Signature};
//!
//! # fn main() -> anyhow::Result<()> {
//! let session = Session::new();
//!
//! session.connect(Callback::new(
//!     "on_select",
//!     Signature::new().param("ids").param_or("source", "user"),
//!     |_, args| {
//!         println!("selected {:?} from {}", args.get("ids"), args.str("source")?);
//!         Ok(())
//!     },
//! ))?;
//!
//! session.action_with("Select all").apply(Callback::new(
//!     "select_all",
//!     Signature::new(),
//!     |session, _| Ok(session.emit("select", args![vec![0, 1, 2]; source = "menu"])?),
//! ))?;
//!
//! session.call("select_all", args![])?;
//! # Ok(())
//! # }
//! ```

mod action;
mod args;
mod bus;
mod callback;

pub use action::*;
pub use args::*;
pub use bus::*;
pub use callback::*;
