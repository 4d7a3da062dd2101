//! Named callbacks shared between the handler table and the action registry.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::args::{Args, BindMode, Bound, Signature};
use super::bus::Session;
use crate::error::Result;

/// Identity of a callback, shared by all of its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(Uuid);

impl CallbackId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cb({})", &self.0.to_string()[..8])
    }
}

/// Type alias for callback bodies
type CallbackFn = dyn Fn(&Session, &Bound) -> anyhow::Result<Value> + Send + Sync;

/// A named function with a declared signature.
///
/// The body receives the session it is invoked from, so it can emit further
/// events or call other actions.
#[derive(Clone)]
pub struct Callback {
    id: CallbackId,
    name: String,
    signature: Signature,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Create a new callback.
    ///
    /// Any serializable return value is accepted; `()` becomes `null`.
    pub fn new<F, R>(name: impl Into<String>, signature: Signature, func: F) -> Self
    where
        F: Fn(&Session, &Bound) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        let func: Arc<CallbackFn> = Arc::new(
            move |session: &Session, bound: &Bound| -> anyhow::Result<Value> {
                let out = func(session, bound)?;
                Ok(serde_json::to_value(out)?)
            },
        );
        Self {
            id: CallbackId::new(),
            name: name.into(),
            signature,
            func,
        }
    }

    /// Identity used for unconnecting
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Callback identifier (`on_<event>` for handlers)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Check if two handles refer to the same callback
    pub fn same_as(&self, other: &Callback) -> bool {
        self.id == other.id
    }

    /// Event name derived from the callback name, if it carries `prefix`
    pub fn event_name(&self, prefix: &str) -> Option<&str> {
        self.name
            .strip_prefix(prefix)
            .filter(|event| !event.is_empty())
    }

    /// Bind `args` and run the body. Binding errors are returned before the
    /// body runs; body errors are returned as-is for the caller to wrap.
    pub(crate) fn invoke(
        &self,
        session: &Session,
        args: &Args,
        mode: BindMode,
    ) -> Result<anyhow::Result<Value>> {
        let bound = self.signature.bind(&self.name, args, mode)?;
        Ok((self.func)(session, &bound))
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}
