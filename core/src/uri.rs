//! Named-placeholder expansion for request URIs.

use std::borrow::Cow;
use std::collections::HashMap;

/// Replaces `{name}` placeholders in a URI template with mapped values.
///
/// Substitution is purely textual. Placeholders with no mapped value are
/// left as written, and an empty mapping returns the template untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriExpander;

impl UriExpander {
    pub fn new() -> Self {
        UriExpander
    }

    pub fn expand<'a>(&self, template: &'a str, parameters: &HashMap<String, String>) -> Cow<'a, str> {
        if parameters.is_empty() || !template.contains('{') {
            return Cow::Borrowed(template);
        }

        let mut expanded = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let (before, after_open) = rest.split_at(open);
            expanded.push_str(before);
            match after_open[1..].find(['{', '}']) {
                Some(close) if after_open.as_bytes()[close + 1] == b'}' => {
                    let name = &after_open[1..close + 1];
                    match parameters.get(name) {
                        Some(value) => expanded.push_str(value),
                        None => expanded.push_str(&after_open[..close + 2]),
                    }
                    rest = &after_open[close + 2..];
                }
                // Unterminated or nested brace: keep the `{` and scan on.
                _ => {
                    expanded.push('{');
                    rest = &after_open[1..];
                }
            }
        }
        expanded.push_str(rest);
        Cow::Owned(expanded)
    }
}
