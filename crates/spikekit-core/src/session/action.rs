//! Actions: named operations exposed by the session.

use serde_json::Value;

use super::args::Args;
use super::bus::Session;
use super::callback::Callback;
use crate::error::Result;

/// Registration options for an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOptions {
    /// Display title (menus, palettes). Derived from the name when unset.
    pub title: Option<String>,
    /// Name override. Defaults to the callback name.
    pub name: Option<String>,
    /// Keyboard shortcut hint for the UI.
    pub shortcut: Option<String>,
}

impl ActionOptions {
    /// Options with only a display title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the exposed action name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the shortcut hint
    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }
}

// A bare string is taken as the title.
impl From<&str> for ActionOptions {
    fn from(title: &str) -> Self {
        Self::titled(title)
    }
}

impl From<String> for ActionOptions {
    fn from(title: String) -> Self {
        Self::titled(title)
    }
}

/// A registered action
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    title: String,
    shortcut: Option<String>,
    callback: Callback,
}

impl Action {
    pub(crate) fn new(callback: Callback, options: ActionOptions) -> Self {
        let name = options
            .name
            .unwrap_or_else(|| callback.name().to_string());
        let title = options.title.unwrap_or_else(|| humanize(&name));
        Self {
            name,
            title,
            shortcut: options.shortcut,
            callback,
        }
    }

    /// Name the action is called by
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Shortcut hint, if any
    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    /// The underlying callback
    pub fn callback(&self) -> &Callback {
        &self.callback
    }
}

/// `my_action_hello` -> `My action hello`
fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Decorator-factory form of [`Session::action`].
///
/// Obtained from [`Session::action_with`]; nothing is registered until
/// [`ActionBuilder::apply`] is called.
#[must_use = "the action is only registered once `apply` is called"]
pub struct ActionBuilder<'a> {
    session: &'a Session,
    options: ActionOptions,
}

impl<'a> ActionBuilder<'a> {
    pub(crate) fn new(session: &'a Session, options: ActionOptions) -> Self {
        Self { session, options }
    }

    /// Register `callback` with the collected options
    pub fn apply(self, callback: Callback) -> Result<Callback> {
        self.session.register_action(callback, self.options)
    }
}

/// An action bound to its session, callable like a method
pub struct BoundAction<'a> {
    session: &'a Session,
    action: Action,
}

impl<'a> BoundAction<'a> {
    pub(crate) fn new(session: &'a Session, action: Action) -> Self {
        Self { session, action }
    }

    /// Action name
    pub fn name(&self) -> &str {
        self.action.name()
    }

    /// Display title
    pub fn title(&self) -> &str {
        self.action.title()
    }

    /// Invoke the action with strict argument checking
    pub fn call(&self, args: Args) -> Result<Value> {
        self.session.run_action(&self.action, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Signature;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("my_action"), "My action");
        assert_eq!(humanize("merge"), "Merge");
        assert_eq!(humanize("_split_"), "Split");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_options_from_title() {
        let options: ActionOptions = "My action".into();
        assert_eq!(options.title.as_deref(), Some("My action"));
        assert!(options.name.is_none());
    }

    #[test]
    fn test_action_metadata() {
        let cb = Callback::new("merge_clusters", Signature::new(), |_, _| Ok(()));
        let action = Action::new(cb.clone(), ActionOptions::default().shortcut("g"));
        assert_eq!(action.name(), "merge_clusters");
        assert_eq!(action.title(), "Merge clusters");
        assert_eq!(action.shortcut(), Some("g"));
        assert!(action.callback().same_as(&cb));

        let renamed = Action::new(cb, ActionOptions::titled("Merge").name("merge"));
        assert_eq!(renamed.name(), "merge");
        assert_eq!(renamed.title(), "Merge");
    }
}
