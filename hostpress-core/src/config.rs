//! # hostpress configuration
//!
//! A minimal, framework-agnostic string key/value store, mirroring the
//! `app.set()` / `app.get()` style. Hooks receive an immutable snapshot.
//!
//! ```rust
//! use hostpress_core::HostpressApp;
//! let app = HostpressApp::new();
//!
//! app.set("paginate.default", "20");
//! assert_eq!(app.get("paginate.default"), Some("20".to_string()));
//! ```
//!
//! Environment overrides use a `PREFIX__SECTION__KEY` convention, see
//! [`HostpressConfig::load_env`].

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct HostpressConfig {
    values: HashMap<String, String>,
}

impl HostpressConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Apply `PREFIX__A__B=value` pairs as `a.b = value`.
    ///
    /// `HOSTPRESS__PAGINATE__MAX=50` becomes `paginate.max`.
    pub fn load_env<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped
                    .trim_start_matches("__")
                    .to_lowercase()
                    .replace("__", ".");
                if !normalized.is_empty() {
                    self.set(normalized, value);
                }
            }
        }
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| match v.trim() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
    }
}
