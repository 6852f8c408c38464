//! Layer name sanitization.
//!
//! Maps arbitrary layer names to identifiers that are legal in every target
//! language. Each disallowed character becomes a single `_`, so non-ASCII
//! names degrade to runs of underscores.

use std::collections::HashMap;
use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;
use strata_core::{BuildError, BuildResult, Identifier, NodeKind};

/// Default bound on disambiguation attempts per name.
pub const DEFAULT_MAX_ATTEMPTS: usize = 256;

/// Names that would clash with target-language keywords.
const RESERVED: &[&str] = &[
    // Swift
    "as", "associatedtype", "break", "case", "catch", "class", "continue", "default", "defer",
    "do", "else", "enum", "extension", "fallthrough", "false", "fileprivate", "for", "func",
    "guard", "if", "import", "in", "init", "inout", "internal", "is", "let", "nil", "open",
    "operator", "private", "protocol", "public", "repeat", "return", "self", "Self", "static",
    "struct", "subscript", "super", "switch", "throw", "throws", "true", "try", "typealias", "var",
    "where", "while", "body", "View",
    // TypeScript / JSX
    "const", "debugger", "delete", "export", "extends", "finally", "function", "instanceof",
    "new", "null", "this", "typeof", "void", "with", "yield", "styles", "React",
];

fn disallowed() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("disallowed-character pattern is valid"))
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize(raw: &str) -> String {
    disallowed().replace_all(raw, "_").into_owned()
}

/// True when a sanitized name cannot be used as-is.
pub fn is_degenerate(sanitized: &str) -> bool {
    match sanitized.chars().next() {
        None => true,
        Some(c) if c.is_ascii_digit() => true,
        Some(_) => sanitized.chars().all(|c| c == '_'),
    }
}

/// What a name is issued for; selects the fallback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Group,
    Shape,
    Text,
    Image,
    Asset,
}

impl NameKind {
    pub fn fallback_token(&self) -> &'static str {
        match self {
            NameKind::Group => "group",
            NameKind::Shape => "shape",
            NameKind::Text => "text",
            NameKind::Image => "image",
            NameKind::Asset => "asset",
        }
    }
}

impl From<NodeKind> for NameKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Group => NameKind::Group,
            NodeKind::Shape => NameKind::Shape,
            NodeKind::Text => NameKind::Text,
            NodeKind::Image => NameKind::Image,
        }
    }
}

/// Issues unique identifiers for one export run.
///
/// Output depends only on the input name and the names issued before it,
/// so replaying the same sequence of calls yields the same identifiers.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    issued: IndexSet<String>,
    counters: HashMap<NameKind, usize>,
    max_attempts: usize,
}

impl NameRegistry {
    /// A registry with target-language keywords already reserved.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for word in RESERVED {
            registry.reserve(word);
        }
        registry
    }

    /// A registry with nothing reserved.
    pub fn empty() -> Self {
        Self {
            issued: IndexSet::new(),
            counters: HashMap::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Mark a name as taken. Returns false if it already was.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.issued.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.issued.contains(name)
    }

    /// Issue a unique identifier for `raw`.
    pub fn issue(&mut self, raw: &str, kind: NameKind) -> BuildResult<Identifier> {
        let sanitized = sanitize(raw);
        let base = if is_degenerate(&sanitized) {
            self.fallback(kind)?
        } else {
            sanitized
        };

        if self.issued.insert(base.clone()) {
            return Ok(Identifier(base));
        }

        for n in 1..=self.max_attempts {
            let candidate = format!("{}_{}", base, n);
            if self.issued.insert(candidate.clone()) {
                return Ok(Identifier(candidate));
            }
        }

        Err(BuildError::NameCollisionUnresolved {
            base,
            attempts: self.max_attempts,
        })
    }

    /// Next free `{token}{counter}` for `kind`.
    fn fallback(&mut self, kind: NameKind) -> BuildResult<String> {
        let token = kind.fallback_token();
        for _ in 0..self.max_attempts {
            let counter = self.counters.entry(kind).or_insert(0);
            *counter += 1;
            let candidate = format!("{}{}", token, counter);
            if !self.issued.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(BuildError::NameCollisionUnresolved {
            base: token.to_string(),
            attempts: self.max_attempts,
        })
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
