//! Expansion of `{name}` style path templates.
use std::{borrow::Cow, sync::OnceLock};

use regex::Regex;

use crate::{attribute::UriTemplateVariables, error::TemplateError};

fn names_pattern() -> &'static Regex {
    static NAMES: OnceLock<Regex> = OnceLock::new();
    NAMES.get_or_init(|| Regex::new(r"\{([^/]+?)\}").expect("invalid template pattern"))
}

/// `{id:[0-9]+}` names the variable `id`.
fn variable_name(placeholder: &str) -> &str {
    match placeholder.split_once(':') {
        Some((name, _pattern)) => name.trim(),
        None => placeholder.trim(),
    }
}

/// Drop braces nested inside a placeholder, `{id:\d{3}}` becomes `{id:\d}`.
fn strip_nested_braces(template: &str) -> Cow<'_, str> {
    let mut level = 0isize;
    let mut stripped = String::with_capacity(template.len());
    let mut changed = false;
    for c in template.chars() {
        match c {
            '{' => level += 1,
            '}' => level -= 1,
            _ => {}
        }
        if level > 1 || (level == 1 && c == '}') {
            changed = true;
            continue;
        }
        stripped.push(c);
    }
    if changed {
        Cow::Owned(stripped)
    } else {
        Cow::Borrowed(template)
    }
}

/// Whether the template has anything to expand.
#[inline]
pub fn is_template(template: &str) -> bool {
    template.contains('{')
}

/// Substitute every placeholder in `template` with its value in `variables`.
///
/// # Example
/// ```rust
/// # use routectx_kernel::{attribute::UriTemplateVariables, utils::template::expand};
/// let variables = UriTemplateVariables::from_iter([("id", "42")]);
/// assert_eq!(expand("/users/{id}", &variables).unwrap(), "/users/42");
/// assert_eq!(expand("/users/{id:[0-9]+}/orders", &variables).unwrap(), "/users/42/orders");
/// ```
///
/// # Errors
/// If a placeholder has no value in `variables`.
pub fn expand<'t>(template: &'t str, variables: &UriTemplateVariables) -> Result<Cow<'t, str>, TemplateError> {
    if !is_template(template) {
        return Ok(Cow::Borrowed(template));
    }
    let source = if template.contains(':') { strip_nested_braces(template) } else { Cow::Borrowed(template) };
    let mut expanded = String::with_capacity(source.len());
    let mut last = 0;
    for captures in names_pattern().captures_iter(&source) {
        let (Some(whole), Some(placeholder)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = variable_name(placeholder.as_str());
        let value = variables.get(name).ok_or_else(|| TemplateError::UnresolvedVariable(name.to_string()))?;
        expanded.push_str(source.get(last..whole.start()).unwrap_or_default());
        expanded.push_str(value);
        last = whole.end();
    }
    if last == 0 {
        return Ok(source);
    }
    expanded.push_str(source.get(last..).unwrap_or_default());
    Ok(Cow::Owned(expanded))
}
