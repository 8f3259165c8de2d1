//! Qualified names for PHP symbols
//!
//! PHP resolves class, interface and function names case-insensitively, so
//! every registry and graph in this crate compares names through a lowercase
//! key instead of scattering `to_lowercase()` at call sites.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// A normalized, fully qualified PHP name
///
/// Keeps the original spelling for display while equality, ordering and
/// hashing go through a precomputed lowercase key. A leading `\` is stripped
/// on construction so `\Foo\Bar` and `Foo\Bar` are the same name.
#[derive(Debug, Clone, Serialize)]
pub struct QualifiedName {
    text: String,
    #[serde(skip)]
    key: String,
}

impl QualifiedName {
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if let Some(stripped) = text.strip_prefix('\\') {
            text = stripped.to_string();
        }
        let key = text.to_lowercase();
        Self { text, key }
    }

    /// The name as written (minus any leading `\`)
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The lowercase lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Leaf name without the namespace prefix
    pub fn short_name(&self) -> &str {
        self.text.rsplit('\\').next().unwrap_or(&self.text)
    }

    /// Namespace prefix, if any
    pub fn namespace(&self) -> Option<&str> {
        self.text.rsplit_once('\\').map(|(ns, _)| ns)
    }

    /// The `Class::member` name for a member of this class
    pub fn member(&self, name: &str) -> QualifiedName {
        QualifiedName::new(format!("{}::{}", self.text, name))
    }

    /// Case-insensitive comparison against a raw name
    pub fn matches(&self, name: &str) -> bool {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.key == name.to_lowercase()
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for QualifiedName {}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for QualifiedName {
    fn from(text: &str) -> Self {
        QualifiedName::new(text)
    }
}

impl From<String> for QualifiedName {
    fn from(text: String) -> Self {
        QualifiedName::new(text)
    }
}
