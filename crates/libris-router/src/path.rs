//! Route pattern compilation and matching.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::RouteParams;

/// Regex fragment used by placeholders without an explicit constraint.
const DEFAULT_SEGMENT: &str = "[a-z-]+";

/// A route pattern compiled into an anchored, case-insensitive regex.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    /// The pattern as registered.
    pattern: String,
    /// Compiled matcher.
    regex: Regex,
    /// Placeholder names in order of appearance.
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compiles a route pattern.
    ///
    /// Pattern syntax:
    /// - `books/index` - literal text, matched case-insensitively
    /// - `{controller}` - one or more letters or hyphens
    /// - `{id:\d+}` - a caller-supplied regex fragment
    ///
    /// Leading and trailing slashes are insignificant.
    ///
    /// # Example
    ///
    /// ```
    /// use libris_router::RoutePattern;
    ///
    /// let pattern = RoutePattern::new("/{controller}/{action}/{id:\\d+}").unwrap();
    /// let params = pattern.match_path("books/edit/7").unwrap();
    /// assert_eq!(params.get("controller"), Some("books"));
    /// assert_eq!(params.get("id"), Some("7"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let mut regex_str = String::from("(?i)^");
        let mut param_names: Vec<String> = Vec::new();
        let mut rest = pattern.trim_matches('/');

        while let Some(start) = rest.find('{') {
            regex_str.push_str(&regex::escape(&rest[..start]));

            let after = &rest[start + 1..];
            let end = closing_brace(after).ok_or_else(|| {
                RouterError::InvalidPattern(format!("unterminated placeholder in {pattern:?}"))
            })?;

            let placeholder = &after[..end];
            let (name, fragment) = placeholder
                .split_once(':')
                .unwrap_or((placeholder, DEFAULT_SEGMENT));

            if !is_param_name(name) {
                return Err(RouterError::InvalidPattern(format!(
                    "bad parameter name {name:?} in {pattern:?}"
                )));
            }
            if fragment.is_empty() {
                return Err(RouterError::InvalidPattern(format!(
                    "empty constraint for {name:?} in {pattern:?}"
                )));
            }
            if param_names.iter().any(|n| n == name) {
                return Err(RouterError::InvalidPattern(format!(
                    "parameter {name:?} appears twice in {pattern:?}"
                )));
            }

            regex_str.push_str(&format!("(?P<{name}>{fragment})"));
            param_names.push(name.to_string());
            rest = &after[end + 1..];
        }

        regex_str.push_str(&regex::escape(rest));
        regex_str.push('$');

        let regex = Regex::new(&regex_str)
            .map_err(|e| RouterError::InvalidPattern(format!("{pattern:?}: {e}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// Attempts to match a stripped path against this pattern.
    ///
    /// Returns only the captured values; route defaults are merged by the
    /// route table.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        let caps = self.regex.captures(path)?;

        let mut params = RouteParams::new();
        for name in &self.param_names {
            if let Some(value) = caps.name(name) {
                params.insert(name.as_str(), value.as_str());
            }
        }

        Some(params)
    }

    /// Returns the pattern as registered.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the placeholder names.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

/// Finds the `}` closing a placeholder, skipping balanced braces and escapes
/// inside a regex fragment such as `\d{4}`.
fn closing_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }

    None
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
