//! Recovers what a macro invocation expanded to, by anchoring on the tokens
//! immediately surrounding it in the original source and searching for that
//! same neighborhood in the preprocessor's annotated output (spec.md §4.1
//! steps 4-5).
//!
//! `canonicalize_head` is a direct port of `skip_non_variable_start` from
//! `original_source/parser/extract_relation_calls.py`, the function spec.md
//! names without spelling out — strip leading non-identifier characters,
//! truncate at the first `(`, then strip trailing non-identifier characters
//! from what remains.

use std::path::Path;

use crate::preprocess::annotate::AnnotatedLine;
use crate::preprocess::macro_locator::MacroSite;
use crate::types::Span;

#[derive(Debug, Clone)]
pub struct MacroEntry {
    pub name: String,
    pub site_span: Span,
    /// The canonicalized head of whatever the macro expanded to — usually
    /// the name of the function actually being called.
    pub canonical_head: String,
}

pub fn expand_macros(
    path: &Path,
    sites: &[MacroSite],
    original_source: &str,
    annotated: &[AnnotatedLine],
) -> Vec<MacroEntry> {
    let lines: Vec<&str> = original_source.lines().collect();
    let basename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let mut entries = Vec::new();
    for site in sites {
        let Some(line_text) = lines.get((site.span.start_line - 1) as usize) else { continue };
        let (before, after) = surrounding_tokens(line_text, site);

        if let Some(expansion) = find_expansion(&before, &after, basename, annotated) {
            let canonical = canonicalize_head(&expansion);
            if !canonical.is_empty() {
                entries.push(MacroEntry {
                    name: site.name.clone(),
                    site_span: site.span,
                    canonical_head: canonical,
                });
            }
        }
    }
    entries
}

/// The word immediately before the macro invocation and immediately after
/// its closing delimiter on the same source line, used as search anchors.
fn surrounding_tokens(line: &str, site: &MacroSite) -> (String, String) {
    let start = site.span.start_column as usize;
    let end = (site.span.end_column as usize).min(line.len());
    let before_region = line.get(..start.min(line.len())).unwrap_or("");
    let after_region = line.get(end..).unwrap_or("");

    let before = before_region
        .trim_end()
        .rsplit(|c: char| !c.is_alphanumeric() && c != '_')
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string();
    let after = after_region
        .trim_start()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string();

    (before, after)
}

fn find_expansion(before: &str, after: &str, basename: &str, annotated: &[AnnotatedLine]) -> Option<String> {
    for line in annotated {
        if !basename.is_empty() {
            let line_base = Path::new(&line.file).file_name().and_then(|n| n.to_str()).unwrap_or("");
            if line_base != basename {
                continue;
            }
        }

        let content = &line.content;
        let before_pos = if before.is_empty() { Some(0) } else { content.find(before) };
        let Some(before_pos) = before_pos else { continue };
        let search_from = before_pos + before.len();
        let after_pos = if after.is_empty() {
            None
        } else {
            content[search_from..].find(after).map(|p| p + search_from)
        };

        let slice = match after_pos {
            Some(p) => &content[search_from..p],
            None => &content[search_from..],
        };
        let trimmed = slice.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    None
}

/// Port of `skip_non_variable_start`: strip leading non-identifier-start
/// characters, truncate at the first `(`, then strip trailing
/// non-identifier characters.
pub fn canonicalize_head(input: &str) -> String {
    let start = input
        .char_indices()
        .find(|(_, c)| c.is_alphabetic() || *c == '_')
        .map(|(i, _)| i);
    let Some(start) = start else { return String::new() };

    let rest = &input[start..];
    let truncated = match rest.find('(') {
        Some(paren) => &rest[..paren],
        None => rest,
    };

    truncated.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    #[test]
    fn canonicalize_strips_leading_symbols_and_trailing_parens() {
        assert_eq!(canonicalize_head("  = do_call(arg)"), "do_call");
        assert_eq!(canonicalize_head("*ptr_to_fn(x, y)"), "ptr_to_fn");
        assert_eq!(canonicalize_head("plain_name"), "plain_name");
        assert_eq!(canonicalize_head("123"), "");
    }

    #[test]
    fn expand_macros_anchors_on_surrounding_tokens() {
        let site = MacroSite {
            name: "WRAP".to_string(),
            span: Span::new(1, 8, 1, 17),
            is_function_like: true,
        };
        let original = "int x = WRAP(call)(1, 2);\n";
        let annotated = vec![AnnotatedLine {
            file: "a.c".to_string(),
            line: 1,
            content: "int x = real_target(1, 2);".to_string(),
        }];
        let entries = expand_macros(Path::new("a.c"), &[site], original, &annotated);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].canonical_head, "real_target");
    }
}
