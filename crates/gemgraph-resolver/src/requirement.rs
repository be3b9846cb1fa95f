//! Parsing of raw dependency requirement strings.
//!
//! Requirements reach the resolver in three shapes:
//! - gemspec form, as stored by the parser: `"rake", ">= 10.0"`
//! - Gemfile.lock form: `rack-test (~> 2.1, >= 2.1.0)`
//! - inline form: `rake >=10.0`

use gemgraph_core::spec::clean_name;

use crate::version::looks_like_version;

/// Comparison operators RubyGems accepts in a constraint.
const OPERATORS: [&str; 7] = ["~>", ">=", "<=", "!=", ">", "<", "="];

/// A gem name plus its version constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraints: Vec<String>,
}

impl Requirement {
    /// Parse any of the supported requirement shapes. Returns `None` when no
    /// gem name can be extracted.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (name, constraints) = if raw.contains('"') || raw.contains('\'') {
            let mut tokens = split_args(raw).into_iter();
            let name = tokens.next()?;
            (name, tokens.collect())
        } else if let Some(open) = raw.find('(') {
            let close = raw.rfind(')').filter(|&c| c > open).unwrap_or(raw.len());
            let inner = &raw[open + 1..close];
            let constraints = inner
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            (raw[..open].to_string(), constraints)
        } else {
            match raw.split_once(char::is_whitespace) {
                Some((name, rest)) => (name.to_string(), vec![rest.trim().to_string()]),
                None => (raw.to_string(), Vec::new()),
            }
        };

        // `"x >=1.0"`: a single quoted token carrying both name and constraint
        let (name, constraints) = match name.trim().split_once(char::is_whitespace) {
            Some((n, rest)) if constraints.is_empty() => {
                (n.to_string(), vec![rest.trim().to_string()])
            }
            _ => (name, constraints),
        };

        let name = clean_name(&name);
        if name.is_empty() {
            return None;
        }
        Some(Self { name, constraints })
    }

    /// The first numeric token left after stripping range operators.
    pub fn version_token(&self) -> Option<&str> {
        self.constraints
            .iter()
            .map(|c| strip_operator(c))
            .find(|v| looks_like_version(v))
    }
}

/// Remove a leading comparison operator and surrounding whitespace.
pub fn strip_operator(constraint: &str) -> &str {
    let trimmed = constraint.trim();
    for op in OPERATORS {
        if let Some(rest) = trimmed.strip_prefix(op) {
            return rest.trim();
        }
    }
    trimmed
}

/// Split a gemspec-style argument list on commas outside quotes, dropping
/// array brackets and quotes from every token.
pub(crate) fn split_args(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted = false;

    for ch in raw.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(ch);
                quoted = true;
            }
            (None, ',') => {
                push_token(&mut tokens, &current, quoted);
                current.clear();
                quoted = false;
            }
            (None, '[') | (None, ']') => {}
            (None, c) => current.push(c),
        }
    }
    push_token(&mut tokens, &current, quoted);
    tokens
}

/// Keep empty tokens only when they were written as an empty literal (`""`).
fn push_token(tokens: &mut Vec<String>, raw: &str, quoted: bool) {
    let token = raw.trim();
    if !token.is_empty() || quoted {
        tokens.push(token.to_string());
    }
}
