//! Call arguments, callback signatures and argument binding.
//!
//! Handlers never see the raw [`Args`] passed to `emit`. The session binds
//! them against the handler's [`Signature`] first, so each handler only
//! receives the parameters it declares.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Result, SessionError};

/// Positional and keyword arguments for an event or action call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
}

impl Args {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Positional arguments in call order
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments
    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// Check if no argument was supplied at all
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

/// Build an [`Args`] value.
///
/// Positional arguments come first, keywords follow a `;`:
///
/// ```rust
/// use spikekit_core::args;
///
/// let args = args!["hello world"; kwarg = "!"];
/// assert_eq!(args.positional().len(), 1);
/// assert_eq!(args.keywords()["kwarg"], "!");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::session::Args::new()
    };
    ($($pos:expr),* $(,)? $(; $($key:ident = $val:expr),* $(,)?)?) => {
        $crate::session::Args::new()
            $(.arg($pos))*
            $($(.kwarg(stringify!($key), $val))*)?
    };
}

/// A single declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name, matched against keyword arguments.
    pub name: String,
    /// Value used when the caller does not supply one.
    pub default: Option<Value>,
}

/// Declared parameters of a callback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
    varargs: bool,
    varkw: bool,
}

impl Signature {
    /// A signature with no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Add a parameter with a default value
    pub fn param_or(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Accept any number of extra positional arguments
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Accept any keyword argument
    pub fn varkw(mut self) -> Self {
        self.varkw = true;
        self
    }

    /// Declared parameters in order
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Check if a parameter with this name is declared
    pub fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// Number of parameters without a default
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    /// Bind arguments to this signature.
    ///
    /// In lenient mode undeclared keywords are dropped; in strict mode they
    /// are an error. Arity is checked in both modes.
    pub fn bind(&self, callable: &str, args: &Args, mode: BindMode) -> Result<Bound> {
        let mut bound = Bound::default();

        for (index, value) in args.positional.iter().enumerate() {
            match self.params.get(index) {
                Some(param) => {
                    bound.named.insert(param.name.clone(), value.clone());
                }
                None if self.varargs => bound.rest.push(value.clone()),
                None => {
                    return Err(SessionError::TooManyPositional {
                        callable: callable.to_string(),
                        accepted: self.params.len(),
                        given: args.positional.len(),
                    });
                }
            }
        }

        for (key, value) in &args.keywords {
            if self.declares(key) {
                if bound.named.contains_key(key) {
                    return Err(SessionError::MultipleValues {
                        callable: callable.to_string(),
                        param: key.clone(),
                    });
                }
                bound.named.insert(key.clone(), value.clone());
            } else if self.varkw {
                bound.extra.insert(key.clone(), value.clone());
            } else if mode == BindMode::Strict {
                return Err(SessionError::UnexpectedKeyword {
                    callable: callable.to_string(),
                    keyword: key.clone(),
                });
            } else {
                tracing::trace!("Dropping keyword '{}' not declared by {}", key, callable);
            }
        }

        let mut missing = Vec::new();
        for param in &self.params {
            if bound.named.contains_key(&param.name) {
                continue;
            }
            match &param.default {
                Some(default) => {
                    bound.named.insert(param.name.clone(), default.clone());
                }
                None => missing.push(param.name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(SessionError::MissingArguments {
                callable: callable.to_string(),
                missing,
            });
        }

        Ok(bound)
    }
}

/// How undeclared keyword arguments are treated during binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Drop keywords the signature does not declare (event delivery).
    Lenient,
    /// Reject keywords the signature does not declare (action calls).
    Strict,
}

/// Arguments after binding to a signature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bound {
    named: BTreeMap<String, Value>,
    rest: Vec<Value>,
    extra: BTreeMap<String, Value>,
}

impl Bound {
    /// Raw value of a declared parameter
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Declared parameter as a string slice
    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::InvalidArgument {
                param: name.to_string(),
                reason: "expected a string".to_string(),
            })
    }

    /// Declared parameter deserialized into `T`
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| SessionError::InvalidArgument {
            param: name.to_string(),
            reason: "not bound".to_string(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| SessionError::InvalidArgument {
            param: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Check if a parameter received a value
    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Extra positional arguments (signatures with `varargs`)
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    /// Extra keyword arguments (signatures with `varkw`)
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }
}
