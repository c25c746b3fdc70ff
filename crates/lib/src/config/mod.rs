//! Subtree-wide configuration and its inheritance rules.
//!
//! A [`Config`] is held through a [`SharedConfig`] handle. Nodes created under a
//! parent without overrides hold the *same* handle as that parent, so an
//! in-place change made through any of them is visible to all of them. This
//! aliasing is part of the contract: it is how a single `set` on a form root
//! reaches every field without an explicit cascade.
//!
//! Replacing the handle (rather than mutating through it) is done with
//! `Node::set_config`, which re-points the whole subtree.
//!
//! # Example
//!
//! ```
//! use formtree::config::Config;
//!
//! let config = Config::from_json(r#"{"delimiter": "/", "locale": "en"}"#)?;
//! assert_eq!(config.delimiter, "/");
//! assert_eq!(config.get("locale"), Some(&serde_json::json!("en")));
//! # Ok::<(), formtree::Error>(())
//! ```

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    Result,
    constants::{DEFAULT_DELIMITER, DELIMITER_KEY},
};

pub mod errors;

pub use errors::ConfigError;

/// Override record merged into a config at construction time.
pub type ConfigOverrides = Map<String, Value>;

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

/// A record of options shared by a subtree.
///
/// The delimiter is typed because address resolution depends on it. Every
/// other option is free-form and kept in `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Separator used to split address strings into tokens.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Free-form options consumed by plugins and other collaborators.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            options: Map::new(),
        }
    }
}

impl Config {
    /// Creates a config with the default delimiter and no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to a JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Gets a free-form option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Sets a single option.
    ///
    /// Setting `"delimiter"` updates the typed field and is validated.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        if key == DELIMITER_KEY {
            self.delimiter = parse_delimiter(&value)?;
        } else {
            self.options.insert(key, value);
        }
        Ok(())
    }

    /// Destructively merges an override record into this config.
    ///
    /// Keys present in `overrides` replace existing ones. The delimiter is
    /// checked before anything is written, so a rejected record leaves the
    /// config untouched.
    pub fn merge(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        let delimiter = overrides
            .get(DELIMITER_KEY)
            .map(parse_delimiter)
            .transpose()?;
        if let Some(delimiter) = delimiter {
            self.delimiter = delimiter;
        }
        for (key, value) in overrides {
            if key != DELIMITER_KEY {
                self.options.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::InvalidOption {
                key: DELIMITER_KEY.to_string(),
                reason: "delimiter cannot be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_delimiter(value: &Value) -> Result<String> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        other => Err(ConfigError::InvalidOption {
            key: DELIMITER_KEY.to_string(),
            reason: format!("expected a non-empty string, got {other}"),
        }
        .into()),
    }
}

/// Shared, interior-mutable handle to a [`Config`].
///
/// Cloning the handle aliases the same record. Use [`SharedConfig::snapshot`]
/// to get a detached copy.
#[derive(Clone, Default)]
pub struct SharedConfig {
    inner: Rc<RefCell<Config>>,
}

impl SharedConfig {
    /// Wraps a config in a new, unshared handle.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Rc::new(RefCell::new(config)),
        }
    }

    /// Returns true when both handles point at the same record.
    pub fn ptr_eq(&self, other: &SharedConfig) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrows the underlying record.
    pub fn borrow(&self) -> Ref<'_, Config> {
        self.inner.borrow()
    }

    /// Mutably borrows the underlying record.
    pub fn borrow_mut(&self) -> RefMut<'_, Config> {
        self.inner.borrow_mut()
    }

    /// Current address delimiter.
    pub fn delimiter(&self) -> String {
        self.inner.borrow().delimiter.clone()
    }

    /// Reads an option, cloning it out of the shared record.
    pub fn get(&self, key: &str) -> Option<Value> {
        let config = self.inner.borrow();
        if key == DELIMITER_KEY {
            return Some(Value::String(config.delimiter.clone()));
        }
        config.get(key).cloned()
    }

    /// Writes an option in place; every node aliasing this handle observes it.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.inner.borrow_mut().set(key, value)
    }

    /// Merges overrides in place.
    pub fn merge(&self, overrides: &ConfigOverrides) -> Result<()> {
        self.inner.borrow_mut().merge(overrides)
    }

    /// Detached copy of the current record.
    pub fn snapshot(&self) -> Config {
        self.inner.borrow().clone()
    }
}

impl PartialEq for SharedConfig {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedConfig")
            .field(&*self.inner.borrow())
            .finish()
    }
}

/// Builds the config handle for a node under construction.
///
/// - parent, no overrides: the parent's handle, aliased.
/// - parent and overrides: the overrides are merged into the parent's record
///   in place, and that same handle is returned.
/// - no parent: a fresh record from the defaults plus any overrides.
pub(crate) fn inherit(
    parent: Option<SharedConfig>,
    overrides: Option<&ConfigOverrides>,
) -> Result<SharedConfig> {
    match (parent, overrides) {
        (Some(shared), None) => Ok(shared),
        (Some(shared), Some(overrides)) => {
            shared.merge(overrides)?;
            Ok(shared)
        }
        (None, overrides) => {
            let mut config = Config::default();
            if let Some(overrides) = overrides {
                config.merge(overrides)?;
            }
            Ok(SharedConfig::new(config))
        }
    }
}
