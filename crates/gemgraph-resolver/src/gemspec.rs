//! Line-local tokenizer for the gemspec DSL.
//!
//! Gemspecs are Ruby source, so this does not evaluate anything. Each line
//! is reduced to a leading "column" token (`s.name`, `spec.add_dependency`,
//! ...). Columns on the allow-list are handed to a reducer for their field;
//! every other line is noise. Control flow, variables and conditionals are
//! ignored, which is good enough for the conventional statements package
//! authors write and for the normalized specs RubyGems installs.

use std::path::Path;

use gemgraph_core::spec::Spec;
use gemgraph_util::errors::GemgraphResult;

use crate::requirement::split_args;

/// Receivers accepted in front of every field, besides a `do |x|` block variable.
const DEFAULT_RECEIVERS: [&str; 2] = ["s", "spec"];

/// Fields the parser understands, keyed by the method name after the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Version,
    License,
    Licenses,
    Authors,
    Emails,
    Homepage,
    Summary,
    Description,
    RuntimeDependency,
    DevelopmentDependency,
}

impl Field {
    fn from_method(method: &str) -> Option<Self> {
        Some(match method {
            "name" => Self::Name,
            "version" => Self::Version,
            "license" => Self::License,
            "licenses" => Self::Licenses,
            "authors" | "author" => Self::Authors,
            "email" | "emails" => Self::Emails,
            "homepage" => Self::Homepage,
            "summary" => Self::Summary,
            "description" => Self::Description,
            "add_dependency" | "add_runtime_dependency" => Self::RuntimeDependency,
            "add_development_dependency" => Self::DevelopmentDependency,
            _ => return None,
        })
    }
}

/// Parse a gemspec file from disk.
pub fn parse_gemspec_file(path: &Path) -> GemgraphResult<Spec> {
    let content = gemgraph_util::fs::read_to_string(path)?;
    let spec = parse_gemspec(&content);
    tracing::debug!(
        "parsed {} -> {} {}",
        path.display(),
        spec.name,
        spec.version
    );
    Ok(spec)
}

/// Parse gemspec source into a [`Spec`].
pub fn parse_gemspec(content: &str) -> Spec {
    let mut spec = Spec::default();
    let mut block_receiver: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.contains("#{") {
            continue;
        }

        let line = match find_unquoted(line, " #") {
            Some(idx) => line[..idx].trim_end(),
            None => line,
        };

        if let Some(var) = block_variable(line) {
            block_receiver = Some(var);
            continue;
        }

        let column = column_of(line);
        let Some(field) = recognize(column, block_receiver.as_deref()) else {
            continue;
        };
        let rest = &line[column.len()..];
        apply(&mut spec, field, rest);
    }

    spec
}

/// The leading identifier of a line: everything up to the first space,
/// `(` or `=`.
fn column_of(line: &str) -> &str {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '(' || c == '=')
        .unwrap_or(line.len());
    &line[..end]
}

/// Map a column to a field if its receiver is one we accept.
fn recognize(column: &str, block_receiver: Option<&str>) -> Option<Field> {
    let (receiver, method) = column.split_once('.')?;
    let accepted =
        DEFAULT_RECEIVERS.contains(&receiver) || block_receiver.is_some_and(|b| b == receiver);
    if !accepted {
        return None;
    }
    Field::from_method(method)
}

/// `Gem::Specification.new do |gem|` yields `gem`.
fn block_variable(line: &str) -> Option<String> {
    if !line.starts_with("Gem::Specification.new") {
        return None;
    }
    let start = line.find('|')?;
    let end = line[start + 1..].find('|')? + start + 1;
    let var = line[start + 1..end].trim();
    (!var.is_empty()).then(|| var.to_string())
}

fn apply(spec: &mut Spec, field: Field, rest: &str) {
    match field {
        Field::Name => spec.name = scalar_value(rest),
        Field::Version => spec.version = scalar_value(rest),
        Field::License => spec.license = scalar_value(rest),
        Field::Licenses => spec.licenses = list_value(rest),
        Field::Authors => spec.authors = list_value(rest),
        Field::Emails => spec.emails = list_value(rest),
        Field::Homepage => spec.homepage = scalar_value(rest),
        Field::Summary => spec.summary = scalar_value(rest),
        Field::Description => spec.description = scalar_value(rest),
        Field::RuntimeDependency => push_dependency(&mut spec.runtime_dependencies, rest),
        Field::DevelopmentDependency => {
            push_dependency(&mut spec.development_dependencies, rest)
        }
    }
}

/// Text after the assignment: `  = "demo".freeze` becomes `"demo".freeze`.
fn assigned(rest: &str) -> &str {
    let rest = rest.trim_start();
    rest.strip_prefix('=').unwrap_or(rest).trim()
}

/// Reduce a scalar assignment to its literal value.
fn scalar_value(rest: &str) -> String {
    let value = strip_freeze(assigned(rest));
    if value.starts_with("<<") {
        // heredoc bodies live on following lines
        return String::new();
    }
    if let Some(literal) = percent_literal(&value) {
        return literal;
    }
    if let Some(literal) = quoted_literal(&value) {
        return literal;
    }
    // Unquoted: a constant such as `Demo::VERSION`, or `nil`.
    let bare = strip_modifier(&value);
    if bare == "nil" {
        String::new()
    } else {
        bare.to_string()
    }
}

/// Reduce a list assignment (`["a", "b"]`, `%w[a b]`, or a single string).
fn list_value(rest: &str) -> Vec<String> {
    let value = strip_freeze(assigned(rest));
    let value = strip_modifier(&value);
    if let Some(words) = value
        .strip_prefix("%w[")
        .or_else(|| value.strip_prefix("%w("))
        .or_else(|| value.strip_prefix("%w{"))
    {
        return words
            .trim_end_matches([']', ')', '}'])
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }
    split_args(value)
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect()
}

/// Normalize a dependency declaration to `"name", "constraint", ...` and
/// append it unless the same declaration was already seen.
fn push_dependency(deps: &mut Vec<String>, rest: &str) {
    let Some(dep) = dependency_value(rest) else {
        return;
    };
    if !deps.contains(&dep) {
        deps.push(dep);
    }
}

fn dependency_value(rest: &str) -> Option<String> {
    let mut args = strip_freeze(rest.trim()).trim().to_string();
    if args.starts_with('(') {
        if let Some(close) = args.rfind(')') {
            args = args[1..close].to_string();
        }
    } else {
        args = strip_modifier(&args).to_string();
    }
    let args = rewrite_percent_literals(&args);

    let mut tokens = split_args(&args).into_iter();
    let name = tokens.next().filter(|n| !n.is_empty())?;
    // a bare identifier (`dep`, `name`) is a Ruby variable, not a gem
    if !args.trim_start().starts_with(['"', '\'']) {
        return None;
    }
    let mut out = format!("\"{name}\"");
    for constraint in tokens.filter(|c| !c.is_empty()) {
        out.push_str(&format!(", \"{constraint}\""));
    }
    Some(out)
}

/// Remove every `.freeze` call.
fn strip_freeze(value: &str) -> String {
    value.replace(".freeze", "")
}

/// Drop a trailing `if ...` / `unless ...` statement modifier.
fn strip_modifier(value: &str) -> &str {
    let mut end = value.len();
    for marker in [" if ", " unless "] {
        if let Some(idx) = find_unquoted(value, marker) {
            end = end.min(idx);
        }
    }
    value[..end].trim()
}

/// Byte offset of `needle` outside any quoted section.
fn find_unquoted(haystack: &str, needle: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in haystack.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if haystack[idx..].starts_with(needle) => return Some(idx),
            None => {}
        }
    }
    None
}

/// Contents of the leading `"..."` or `'...'` literal.
fn quoted_literal(value: &str) -> Option<String> {
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &value[1..];
    let end = body.find(quote).unwrap_or(body.len());
    Some(body[..end].to_string())
}

/// Contents of a leading `%q{...}` / `%Q<...>` literal.
fn percent_literal(value: &str) -> Option<String> {
    let rest = value
        .strip_prefix("%q")
        .or_else(|| value.strip_prefix("%Q"))?;
    let open = rest.chars().next()?;
    let close = closing_delimiter(open)?;
    let body = &rest[open.len_utf8()..];
    let end = body.find(close).unwrap_or(body.len());
    Some(body[..end].trim().to_string())
}

fn closing_delimiter(open: char) -> Option<char> {
    match open {
        '{' => Some('}'),
        '<' => Some('>'),
        '(' => Some(')'),
        '[' => Some(']'),
        _ => None,
    }
}

/// Rewrite `%q<rack>` style literals inside an argument list to `"rack"`.
fn rewrite_percent_literals(args: &str) -> String {
    let mut out = String::with_capacity(args.len());
    let mut rest = args;
    while let Some(idx) = rest.find("%q").or_else(|| rest.find("%Q")) {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        match percent_literal(tail) {
            Some(literal) => {
                out.push('"');
                out.push_str(&literal);
                out.push('"');
                let open_len = tail[2..].chars().next().map_or(0, char::len_utf8);
                let body = &tail[2 + open_len..];
                let close = tail[2..]
                    .chars()
                    .next()
                    .and_then(closing_delimiter)
                    .and_then(|c| body.find(c).map(|i| i + c.len_utf8()))
                    .unwrap_or(body.len());
                rest = &body[close..];
            }
            None => {
                out.push_str(&tail[..2]);
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}
