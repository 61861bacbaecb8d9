//! Environment variable expansion for configuration values.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Result type for expansion.
pub type EnvResult<T> = Result<T, EnvError>;

/// Expansion failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A referenced variable is not set.
    #[error("environment variable not set: {0}")]
    NotFound(String),

    /// A `${VAR:?message}` variable is not set, or the reference is malformed.
    #[error("{name}: {message}")]
    Invalid {
        /// Variable name.
        name: String,
        /// Failure text.
        message: String,
    },
}

/// Source for environment variables.
pub trait EnvSource {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expands environment variables in strings.
///
/// Supported syntax:
/// - `$VAR` and `${VAR}` - Required variable
/// - `${VAR:-default}` - Variable with default value (also used when empty)
/// - `${VAR:?message}` - Required with custom error
/// - `$$` - Literal dollar sign
#[derive(Debug, Clone, Default)]
pub struct EnvExpander<S: EnvSource = StdEnvSource> {
    source: S,
}

impl EnvExpander<StdEnvSource> {
    /// Create an expander over the process environment.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: EnvSource> EnvExpander<S> {
    /// Create an expander with a custom environment source.
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Expand every variable reference in `input`.
    pub fn expand(&self, input: &str) -> EnvResult<String> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    result.push_str(&self.expand_braced(&mut chars)?);
                }
                Some(next) if next.is_alphabetic() || *next == '_' => {
                    result.push_str(&self.expand_simple(&mut chars)?);
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    fn expand_braced(&self, chars: &mut Peekable<Chars<'_>>) -> EnvResult<String> {
        let mut name = String::new();
        let mut modifier = None;
        let mut modifier_value = String::new();
        let mut closed = false;

        while let Some(c) = chars.next() {
            if c == '}' {
                closed = true;
                break;
            } else if c == ':' && modifier.is_none() {
                modifier = chars.next();
            } else if modifier.is_some() {
                modifier_value.push(c);
            } else {
                name.push(c);
            }
        }

        if !closed {
            return Err(EnvError::Invalid {
                name,
                message: "unterminated variable reference".to_string(),
            });
        }
        if name.is_empty() {
            return Err(EnvError::Invalid {
                name,
                message: "empty variable name".to_string(),
            });
        }

        match self.source.get(&name) {
            Some(value) if !value.is_empty() => Ok(value),
            unset_or_empty => match modifier {
                Some('-') => Ok(modifier_value),
                Some('?') => Err(EnvError::Invalid {
                    message: if modifier_value.is_empty() {
                        format!("required variable '{}' is not set", name)
                    } else {
                        modifier_value
                    },
                    name,
                }),
                _ => unset_or_empty.ok_or(EnvError::NotFound(name)),
            },
        }
    }

    fn expand_simple(&self, chars: &mut Peekable<Chars<'_>>) -> EnvResult<String> {
        let mut name = String::new();

        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }

        self.source.get(&name).ok_or(EnvError::NotFound(name))
    }
}
