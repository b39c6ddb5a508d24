//! Data-driven item-name rules.
//!
//! A [`RuleStore`] decomposes a free-text metric name into a base name and
//! attributes. Rules are tried in load order and the first one whose
//! pattern matches the *whole* name wins.
//!
//! ```
//! use metricbridge_lib::rules::RuleStore;
//!
//! let store = RuleStore::from_yaml(
//!     r#"
//! rules:
//!   - id: per-cpu
//!     pattern: '#(?P<cpu>\d+): (?P<base>CPU .+)'
//!     attributes:
//!       - { name: cpu.id, from_group: cpu }
//! "#,
//!     "inline",
//! )
//! .unwrap();
//!
//! let parsed = store.apply("#3: CPU utilization");
//! assert_eq!(parsed.base.as_deref(), Some("CPU utilization"));
//! assert_eq!(parsed.attributes.get("cpu.id"), Some("3"));
//! ```

pub mod watcher;

pub use watcher::RuleWatcher;

use crate::core::{Attributes, BridgeError, Result};
use arc_swap::ArcSwap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Rule set compiled into the binary, used when no rule file is readable.
pub const DEFAULT_RULES: &str = include_str!("default_rules.yaml");

/// Origin label for the bundled rule set in logs.
const DEFAULT_ORIGIN: &str = "bundled:default_rules.yaml";

/// Name of the capture group holding the base metric name.
const BASE_GROUP: &str = "base";

/// Rule store handle that can be swapped atomically on reload.
pub type SharedRules = Arc<ArcSwap<RuleStore>>;

/// Wrap a store for sharing across workers and the reload watcher.
pub fn shared(store: RuleStore) -> SharedRules {
    Arc::new(ArcSwap::from_pointee(store))
}

/// One `{name, from_group}` entry of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrSpec {
    /// Output attribute key
    pub name: String,
    /// Named capture group supplying the value
    pub from_group: String,
}

/// A rule as written in the rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Identifier used in logs
    pub id: String,
    /// Regex source; a group named `base` supplies the metric name
    pub pattern: String,
    /// Attributes read from named groups
    #[serde(default)]
    pub attributes: Vec<AttrSpec>,
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    source: String,
    pattern: Regex,
    attributes: Vec<AttrSpec>,
}

impl Rule {
    /// Compile a rule, anchoring the pattern at both ends.
    pub fn compile(spec: RuleSpec) -> Result<Self> {
        let pattern = Regex::new(&anchor(&spec.pattern)).map_err(|source| BridgeError::RuleCompile {
            id: spec.id.clone(),
            source,
        })?;

        Ok(Self {
            id: spec.id,
            source: spec.pattern,
            pattern,
            attributes: spec.attributes,
        })
    }

    /// Rule identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pattern as written, without anchors
    pub fn pattern(&self) -> &str {
        &self.source
    }

    fn extract(&self, raw_name: &str) -> Option<ParsedName> {
        let caps = self.pattern.captures(raw_name)?;

        let base = caps.name(BASE_GROUP).map(|m| m.as_str().to_string());
        let mut attributes = Attributes::new();
        for spec in &self.attributes {
            // Groups missing from the pattern or not taking part in this
            // match simply contribute nothing.
            if let Some(m) = caps.name(&spec.from_group) {
                attributes.insert(spec.name.as_str(), m.as_str());
            }
        }

        Some(ParsedName { base, attributes })
    }
}

/// Wrap `pattern` so it must match the whole name.
fn anchor(pattern: &str) -> String {
    // A trailing `# comment` in verbose mode would swallow the closing anchor.
    if enables_verbose(pattern) {
        format!("\\A(?:{pattern}\n)\\z")
    } else {
        format!(r"\A(?:{pattern})\z")
    }
}

/// True when an inline flag group such as `(?x)` or `(?ix-s)` turns on
/// verbose mode for the rest of the pattern.
fn enables_verbose(pattern: &str) -> bool {
    pattern.match_indices("(?").any(|(i, _)| {
        if pattern[..i].ends_with('\\') {
            return false;
        }
        let rest = &pattern[i + 2..];
        let flags_len = rest
            .find(|c: char| !(c.is_ascii_alphabetic() || c == '-'))
            .unwrap_or(rest.len());
        let (flags, tail) = rest.split_at(flags_len);
        tail.starts_with(')') && flags.split('-').next().is_some_and(|on| on.contains('x'))
    })
}

/// Result of applying the rule store to a raw name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    /// Value of the `base` group, `None` when nothing matched or the
    /// group did not participate
    pub base: Option<String>,
    /// Extracted attributes in rule order
    pub attributes: Attributes,
}

impl ParsedName {
    /// The base name, or `raw_name` when no base was extracted.
    pub fn base_or<'a>(&'a self, raw_name: &'a str) -> &'a str {
        self.base.as_deref().unwrap_or(raw_name)
    }
}

/// Ordered, immutable rule list.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    /// A store with no rules; every name falls through unmatched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a store from already-compiled rules
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile rule specifications, dropping any whose pattern is invalid.
    pub fn compile(specs: Vec<RuleSpec>, origin: &str) -> Self {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            match Rule::compile(spec) {
                Ok(rule) => rules.push(rule),
                Err(e) => tracing::warn!(origin, error = %e, "Dropping rule"),
            }
        }

        tracing::info!(origin, count = rules.len(), "Loaded name rules");
        for (i, rule) in rules.iter().enumerate() {
            tracing::debug!("  [{}] id={}, pattern={}", i, rule.id, rule.source);
        }

        Self { rules }
    }

    /// Parse a YAML (or JSON) rule document.
    ///
    /// A document without a top-level `rules` key yields an empty store.
    pub fn from_yaml(text: &str, origin: &str) -> Result<Self> {
        let root: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| BridgeError::config_load(format!("{origin}: {e}")))?;

        let specs = match root.get("rules") {
            None | Some(serde_yaml::Value::Null) => {
                tracing::warn!(origin, "Rule document has no 'rules' list");
                Vec::new()
            },
            Some(serde_yaml::Value::Sequence(entries)) => entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    match serde_yaml::from_value::<RuleSpec>(entry.clone()) {
                        Ok(spec) => Some(spec),
                        Err(e) => {
                            tracing::warn!(origin, index, error = %e, "Dropping malformed rule entry");
                            None
                        },
                    }
                })
                .collect(),
            Some(_) => {
                return Err(BridgeError::config_load(format!("{origin}: 'rules' must be a list")));
            },
        };

        Ok(Self::compile(specs, origin))
    }

    /// Read and parse a rule file
    pub fn from_file(path: &Path) -> Result<Self> {
        let origin = format!("file:{}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config_load(format!("{origin}: {e}")))?;
        Self::from_yaml(&text, &origin)
    }

    /// Load rules from `path`, falling back to the bundled defaults.
    ///
    /// Never fails: see [`RuleStore::load_with_fallback`].
    pub fn load(path: Option<&Path>) -> Self {
        Self::load_with_fallback(path, DEFAULT_RULES)
    }

    /// Load rules from `path`, then `fallback`, then give up with an empty
    /// store. Every failure is logged and swallowed.
    pub fn load_with_fallback(path: Option<&Path>, fallback: &str) -> Self {
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(store) => return store,
                Err(e) => tracing::error!(error = %e, "Failed to load rule file, using bundled rules"),
            }
        }

        match Self::from_yaml(fallback, DEFAULT_ORIGIN) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load bundled rules, continuing with none");
                Self::empty()
            },
        }
    }

    /// Apply the first fully matching rule to `raw_name`.
    pub fn apply(&self, raw_name: &str) -> ParsedName {
        if raw_name.is_empty() {
            return ParsedName::default();
        }

        for rule in &self.rules {
            if let Some(parsed) = rule.extract(raw_name) {
                tracing::trace!(
                    rule = %rule.id,
                    base = ?parsed.base,
                    attributes = %parsed.attributes,
                    raw = raw_name,
                    "Name rule matched"
                );
                return parsed;
            }
        }

        tracing::trace!(raw = raw_name, "No name rule matched");
        ParsedName::default()
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when no rules are loaded
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule identifiers in evaluation order
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::id)
    }
}
