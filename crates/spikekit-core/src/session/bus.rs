//! Session implementation.
//!
//! Holds the handler table and the action registry, and dispatches events
//! synchronously on the calling thread.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use super::action::{Action, ActionBuilder, ActionOptions, BoundAction};
use super::args::{Args, BindMode};
use super::callback::Callback;
use crate::error::{Result, SessionError};

/// Default prefix of handler names
pub const HANDLER_PREFIX: &str = "on_";

/// Configuration for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Prefix a handler name must carry; the rest is the event name.
    pub handler_prefix: String,
    /// Whether registering an existing action name replaces it.
    pub allow_action_override: bool,
    /// Log every handler invocation at trace level.
    pub trace_emissions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handler_prefix: HANDLER_PREFIX.to_string(),
            allow_action_override: true,
            trace_emissions: false,
        }
    }
}

/// Event dispatcher and action registry for one session
pub struct Session {
    /// Handlers by event name, in registration order
    handlers: RwLock<HashMap<String, Vec<Callback>>>,
    /// Actions in registration order
    actions: RwLock<Vec<Action>>,
    /// Configuration
    config: SessionConfig,
}

impl Session {
    /// Create a new session with default configuration
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create a new session with custom configuration
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            actions: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Connect a handler named `on_<event>` to `<event>`.
    ///
    /// Fails without registering anything if the name does not follow the
    /// convention. Returns the callback so it can still be used directly.
    pub fn connect(&self, callback: Callback) -> Result<Callback> {
        let event = callback
            .event_name(&self.config.handler_prefix)
            .ok_or_else(|| SessionError::InvalidCallbackName {
                name: callback.name().to_string(),
                prefix: self.config.handler_prefix.clone(),
            })?
            .to_string();
        Ok(self.connect_to(event, callback))
    }

    /// Connect a handler to an explicit event name. No naming check applies.
    pub fn connect_to(&self, event: impl Into<String>, callback: Callback) -> Callback {
        let event = event.into();
        tracing::debug!("Connected {} ({}) to '{}'", callback.name(), callback.id(), event);
        self.handlers
            .write()
            .entry(event)
            .or_default()
            .push(callback.clone());
        callback
    }

    /// Zero-argument form of [`Session::connect`]
    pub fn connector(&self) -> Connector<'_> {
        Connector {
            session: self,
            event: None,
        }
    }

    /// Remove `callback` from the event its name maps to.
    ///
    /// The event is derived from the name exactly as in
    /// [`Session::connect`]; registrations made with
    /// [`Session::connect_to`] under another event are left alone (use
    /// [`Session::unconnect_from`]). Other handlers keep their relative
    /// order. Returns how many registrations were removed; unknown or
    /// misnamed callbacks are a no-op.
    pub fn unconnect(&self, callback: &Callback) -> usize {
        let Some(event) = callback.event_name(&self.config.handler_prefix) else {
            return 0;
        };
        let removed = self.unconnect_from(event, callback);
        if removed > 0 {
            tracing::debug!(
                "Unconnected {} ({}) from '{}', {} registration(s)",
                callback.name(),
                callback.id(),
                event,
                removed
            );
        }
        removed
    }

    /// Remove the registrations of `callback` for one event only
    pub fn unconnect_from(&self, event: &str, callback: &Callback) -> usize {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(event) else {
            return 0;
        };
        let before = list.len();
        list.retain(|h| !h.same_as(callback));
        let removed = before - list.len();
        if list.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    /// Call every handler of `event` in registration order.
    ///
    /// Each handler only receives the keyword arguments it declares.
    /// Returns the handler results in order. Emitting an event nobody
    /// listens to is a no-op. The first failing handler stops delivery.
    pub fn emit(&self, event: &str, args: Args) -> Result<Vec<Value>> {
        // Snapshot so handlers may connect, unconnect or emit re-entrantly.
        let handlers = match self.handlers.read().get(event) {
            Some(list) => list.clone(),
            None => return Ok(Vec::new()),
        };

        let mut results = Vec::with_capacity(handlers.len());
        for handler in &handlers {
            if self.config.trace_emissions {
                tracing::trace!("Emitting '{}' to {} ({})", event, handler.name(), handler.id());
            }
            let value = handler
                .invoke(self, &args, BindMode::Lenient)?
                .map_err(|source| {
                    surface(source, |source| SessionError::Handler {
                        event: event.to_string(),
                        handler: handler.name().to_string(),
                        source,
                    })
                })?;
            results.push(value);
        }
        Ok(results)
    }

    /// Emit and return the first non-null handler result
    pub fn emit_first(&self, event: &str, args: Args) -> Result<Option<Value>> {
        Ok(self
            .emit(event, args)?
            .into_iter()
            .find(|value| !value.is_null()))
    }

    /// Register `callback` as an action named after it
    pub fn action(&self, callback: Callback) -> Result<Callback> {
        self.register_action(callback, ActionOptions::default())
    }

    /// Decorator-factory form of [`Session::action`].
    ///
    /// Accepts either full [`ActionOptions`] or a bare title.
    pub fn action_with(&self, options: impl Into<ActionOptions>) -> ActionBuilder<'_> {
        ActionBuilder::new(self, options.into())
    }

    pub(crate) fn register_action(
        &self,
        callback: Callback,
        options: ActionOptions,
    ) -> Result<Callback> {
        let action = Action::new(callback.clone(), options);
        let mut actions = self.actions.write();

        match actions.iter().position(|a| a.name() == action.name()) {
            Some(_) if !self.config.allow_action_override => {
                return Err(SessionError::DuplicateAction {
                    name: action.name().to_string(),
                });
            }
            Some(index) => {
                tracing::warn!("Action '{}' replaced", action.name());
                actions[index] = action;
            }
            None => {
                tracing::debug!("Action '{}' registered ({})", action.name(), action.title());
                actions.push(action);
            }
        }
        Ok(callback)
    }

    /// Call a registered action by name.
    ///
    /// Arguments are checked strictly: wrong arity or unknown keywords fail
    /// before the action body runs.
    pub fn call(&self, name: &str, args: Args) -> Result<Value> {
        let action = self.find_action(name)?;
        self.run_action(&action, &args)
    }

    /// Look up an action as a callable handle
    pub fn get_action(&self, name: &str) -> Option<BoundAction<'_>> {
        self.find_action(name)
            .ok()
            .map(|action| BoundAction::new(self, action))
    }

    pub(crate) fn run_action(&self, action: &Action, args: &Args) -> Result<Value> {
        action
            .callback()
            .invoke(self, args, BindMode::Strict)?
            .map_err(|source| {
                surface(source, |source| SessionError::Action {
                    action: action.name().to_string(),
                    source,
                })
            })
    }

    fn find_action(&self, name: &str) -> Result<Action> {
        self.actions
            .read()
            .iter()
            .find(|a| a.name() == name)
            .cloned()
            .ok_or_else(|| SessionError::UnknownAction {
                name: name.to_string(),
            })
    }

    /// Check if an action is registered under `name`
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.read().iter().any(|a| a.name() == name)
    }

    /// Registered actions in registration order
    pub fn actions(&self) -> Vec<Action> {
        self.actions.read().clone()
    }

    /// Remove an action. Returns true if it was registered.
    pub fn remove_action(&self, name: &str) -> bool {
        let mut actions = self.actions.write();
        let before = actions.len();
        actions.retain(|a| a.name() != name);
        let removed = actions.len() != before;
        if removed {
            tracing::debug!("Action '{}' removed", name);
        }
        removed
    }

    /// Event names with at least one handler, sorted
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.handlers.read().keys().cloned().collect();
        events.sort();
        events
    }

    /// Number of registrations for `event`
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }

    /// Drop all handlers and actions
    pub fn reset(&self) {
        self.handlers.write().clear();
        self.actions.write().clear();
        tracing::debug!("Session reset");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("events", &self.events())
            .field("actions", &self.actions.read().len())
            .field("config", &self.config)
            .finish()
    }
}

/// Turn a failing callback body into a session error.
///
/// Argument and naming errors raised by a nested `call` or `emit` keep their
/// class and are returned unwrapped; anything else is wrapped by `wrap`.
fn surface(
    source: anyhow::Error,
    wrap: impl FnOnce(anyhow::Error) -> SessionError,
) -> SessionError {
    match source.downcast::<SessionError>() {
        Ok(inner) if inner.is_argument_error() || inner.is_naming_error() => inner,
        Ok(inner) => wrap(inner.into()),
        Err(source) => wrap(source),
    }
}

/// Decorator-factory form of [`Session::connect`]
#[must_use = "the handler is only connected once `apply` is called"]
pub struct Connector<'a> {
    session: &'a Session,
    event: Option<String>,
}

impl Connector<'_> {
    /// Connect to an explicit event instead of the one derived from the name
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Connect `callback`
    pub fn apply(self, callback: Callback) -> Result<Callback> {
        match self.event {
            Some(event) => Ok(self.session.connect_to(event, callback)),
            None => self.session.connect(callback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::session::Signature;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Track = Arc<Mutex<Vec<String>>>;

    fn pusher(name: &str, track: &Track, text: &str) -> Callback {
        let track = track.clone();
        let text = text.to_string();
        Callback::new(name, Signature::new(), move |_, _| {
            track.lock().push(text.clone());
            Ok(())
        })
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new();
        assert!(session.events().is_empty());
        assert!(session.actions().is_empty());
        assert_eq!(session.config().handler_prefix, "on_");
    }

    #[test]
    fn test_connect_rejects_misnamed_callback() {
        let session = Session::new();
        let track = Track::default();

        for name in ["invalid", "my_event", "on_", "On_event", "handle_on_x"] {
            let err = session.connect(pusher(name, &track, "x")).unwrap_err();
            assert!(err.is_naming_error(), "{name} should be rejected");
        }
        assert!(session.events().is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let session = Session::with_config(SessionConfig {
            handler_prefix: "handle_".to_string(),
            ..Default::default()
        });
        let track = Track::default();

        assert!(session.connect(pusher("on_select", &track, "x")).is_err());
        session
            .connect(pusher("handle_select", &track, "select"))
            .unwrap();
        session.emit("select", args![]).unwrap();
        assert_eq!(*track.lock(), vec!["select"]);
    }

    #[test]
    fn test_same_callback_registered_twice() {
        let session = Session::new();
        let track = Track::default();
        let cb = pusher("on_tick", &track, "tick");

        session.connect(cb.clone()).unwrap();
        session.connect(cb.clone()).unwrap();
        assert_eq!(session.handler_count("tick"), 2);

        session.emit("tick", args![]).unwrap();
        assert_eq!(track.lock().len(), 2);

        assert_eq!(session.unconnect(&cb), 2);
        assert_eq!(session.handler_count("tick"), 0);
        assert!(session.events().is_empty());
    }

    #[test]
    fn test_unconnect_from_single_event() {
        let session = Session::new();
        let track = Track::default();
        let cb = pusher("on_tick", &track, "tick");

        session.connect(cb.clone()).unwrap();
        session.connect_to("tock", cb.clone());
        assert_eq!(session.unconnect_from("tock", &cb), 1);
        assert_eq!(session.unconnect_from("missing", &cb), 0);
        assert_eq!(session.events(), vec!["tick"]);
    }

    #[test]
    fn test_unconnect_only_touches_inferred_event() {
        let session = Session::new();
        let track = Track::default();
        let cb = pusher("on_a", &track, "a");

        session.connect(cb.clone()).unwrap();
        session.connect_to("b", cb.clone());

        assert_eq!(session.unconnect(&cb), 1);
        assert_eq!(session.handler_count("a"), 0);
        assert_eq!(session.handler_count("b"), 1);

        // A name without the prefix maps to no event.
        let plain = pusher("highlight", &track, "x");
        session.connect_to("b", plain.clone());
        assert_eq!(session.unconnect(&plain), 0);
        assert_eq!(session.handler_count("b"), 2);
    }

    #[test]
    fn test_nested_argument_error_is_not_wrapped() {
        let session = Session::new();
        session
            .action(Callback::new("inner", Signature::new().param("x"), |_, _| Ok(())))
            .unwrap();
        session
            .action(Callback::new("outer", Signature::new(), |s: &Session, _| {
                Ok(s.call("inner", args![])?)
            }))
            .unwrap();

        let err = session.call("outer", args![]).unwrap_err();
        assert!(err.is_argument_error());
        assert!(matches!(err, SessionError::MissingArguments { ref callable, .. } if callable == "inner"));
    }

    #[test]
    fn test_nested_failure_is_still_wrapped() {
        let session = Session::new();
        session
            .action(Callback::new("outer", Signature::new(), |s: &Session, _| {
                Ok(s.call("missing", args![])?)
            }))
            .unwrap();

        let err = session.call("outer", args![]).unwrap_err();
        assert!(matches!(err, SessionError::Action { ref action, .. } if action == "outer"));
        assert!(err.to_string().contains("Unknown action: missing"));
    }

    #[test]
    fn test_emit_returns_results_in_order() {
        let session = Session::new();
        session
            .connect(Callback::new("on_query", Signature::new(), |_, _| Ok(1)))
            .unwrap();
        session
            .connect(Callback::new("on_query", Signature::new(), |_, _| Ok(())))
            .unwrap();
        session
            .connect(Callback::new("on_query", Signature::new(), |_, _| Ok("three")))
            .unwrap();

        let results = session.emit("query", args![]).unwrap();
        assert_eq!(results, vec![Value::from(1), Value::Null, Value::from("three")]);
        assert_eq!(
            session.emit_first("query", args![]).unwrap(),
            Some(Value::from(1))
        );
        assert_eq!(session.emit_first("nothing", args![]).unwrap(), None);
    }

    #[test]
    fn test_handler_error_stops_delivery() {
        let session = Session::new();
        let track = Track::default();

        session
            .connect(Callback::new("on_save", Signature::new(), |_, _| -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }))
            .unwrap();
        session.connect(pusher("on_save", &track, "saved")).unwrap();

        let err = session.emit("save", args![]).unwrap_err();
        assert!(err.is_callback_failure());
        assert!(err.to_string().contains("disk full"));
        assert!(track.lock().is_empty());
    }

    #[test]
    fn test_handlers_connected_during_emit_wait_for_next_emit() {
        let session = Session::new();
        let track = Track::default();
        let late = pusher("on_open", &track, "late");

        session
            .connect(Callback::new("on_open", Signature::new(), move |s: &Session, _| {
                s.connect(late.clone())?;
                Ok(())
            }))
            .unwrap();

        session.emit("open", args![]).unwrap();
        assert!(track.lock().is_empty());
        session.emit("open", args![]).unwrap();
        assert_eq!(*track.lock(), vec!["late"]);
    }

    #[test]
    fn test_duplicate_action_policy() {
        let strict = Session::with_config(SessionConfig {
            allow_action_override: false,
            ..Default::default()
        });
        let cb = Callback::new("undo", Signature::new(), |_, _| Ok(()));
        strict.action(cb.clone()).unwrap();
        assert!(matches!(
            strict.action(cb.clone()),
            Err(SessionError::DuplicateAction { .. })
        ));

        let lenient = Session::new();
        lenient.action(cb.clone()).unwrap();
        lenient
            .action_with("Undo last")
            .apply(cb)
            .unwrap();
        let actions = lenient.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), "Undo last");
    }

    #[test]
    fn test_unknown_action() {
        let session = Session::new();
        let err = session.call("nope", args![]).unwrap_err();
        assert!(matches!(err, SessionError::UnknownAction { ref name } if name == "nope"));
        assert!(session.get_action("nope").is_none());
    }

    #[test]
    fn test_remove_action_and_reset() {
        let session = Session::new();
        let track = Track::default();
        session
            .action(Callback::new("split", Signature::new(), |_, _| Ok(())))
            .unwrap();
        session.connect(pusher("on_split", &track, "x")).unwrap();

        assert!(session.remove_action("split"));
        assert!(!session.remove_action("split"));
        assert!(!session.has_action("split"));

        session
            .action(Callback::new("merge", Signature::new(), |_, _| Ok(())))
            .unwrap();
        session.reset();
        assert!(session.actions().is_empty());
        assert!(session.events().is_empty());
    }
}
