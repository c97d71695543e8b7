//! Suppression directive parsing.
//!
//! ```text
//! tfbreak:ignore[-file] [<rule-or-all>(,<rule-or-all>)*] [key="value"]* [# <reason>]
//! ```

use super::lexer::{self, BlockExtent, Comment};
use super::{Annotation, AnnotationScope, RuleTarget};
use crate::errors::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*tfbreak:(ignore-file|ignore)(?:\s+(.*))?$").unwrap()
});

static RULE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_]+)\s*=\s*"([^"]*)""#).unwrap());

/// Annotations and block extents of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFile {
    pub annotations: Vec<Annotation>,
    pub blocks: Vec<BlockExtent>,
}

/// Turns comments into [`Annotation`]s, resolving rule tokens to IDs.
#[derive(Debug, Clone)]
pub struct AnnotationParser {
    name_to_id: BTreeMap<String, String>,
    known_ids: BTreeSet<String>,
}

impl AnnotationParser {
    pub fn new(name_to_id: BTreeMap<String, String>) -> Self {
        let known_ids = name_to_id.values().cloned().collect();
        Self {
            name_to_id,
            known_ids,
        }
    }

    /// Scan a source file and parse every directive in it.
    ///
    /// # Errors
    ///
    /// Returns `SourceStructure` when the file cannot be lexed. Malformed
    /// directives are skipped.
    pub fn parse_source(&self, file: &str, source: &str) -> Result<ParsedFile> {
        let scan = lexer::scan(file, source)?;
        let annotations = scan
            .comments
            .iter()
            .filter_map(|c| self.parse_comment(file, c))
            .collect();
        Ok(ParsedFile {
            annotations,
            blocks: scan.blocks,
        })
    }

    /// Parse one comment. Returns `None` for ordinary and malformed comments.
    pub fn parse_comment(&self, file: &str, comment: &Comment) -> Option<Annotation> {
        let caps = DIRECTIVE_RE.captures(comment.text.trim_end())?;
        let scope = match &caps[1] {
            "ignore-file" => AnnotationScope::File,
            _ => AnnotationScope::Block,
        };
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        match self.parse_body(rest) {
            Ok(body) => Some(Annotation {
                scope,
                target: body.target,
                reason: body.reason,
                ticket: body.ticket,
                expires: body.expires,
                file: file.to_string(),
                line: comment.line,
                governs_line: None,
            }),
            Err(why) => {
                tracing::debug!(file, line = comment.line, reason = %why, "skipping malformed directive");
                None
            }
        }
    }

    fn parse_body(&self, rest: &str) -> std::result::Result<Body, String> {
        let (head, trailing_reason) = split_reason(rest);
        let head = head.trim();

        // The rule list is the first word unless that word is a key="value" pair
        let (rule_list, pairs) = match head.split_once(char::is_whitespace) {
            Some((first, tail)) if !first.contains('=') => (first, tail),
            None if !head.contains('=') => (head, ""),
            _ => ("", head),
        };

        let target = self.resolve_targets(rule_list)?;
        let mut body = Body {
            target,
            reason: None,
            ticket: None,
            expires: None,
        };

        for caps in PAIR_RE.captures_iter(pairs) {
            let value = caps[2].to_string();
            match &caps[1] {
                "reason" => body.reason = Some(value).filter(|v| !v.is_empty()),
                "ticket" => body.ticket = Some(value).filter(|v| !v.is_empty()),
                "expires" => {
                    let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|e| format!("invalid expires '{}': {}", value, e))?;
                    body.expires = Some(date);
                }
                _ => {}
            }
        }

        if let Some(reason) = trailing_reason {
            body.reason = Some(reason);
        }
        Ok(body)
    }

    fn resolve_targets(&self, list: &str) -> std::result::Result<RuleTarget, String> {
        if list.is_empty() {
            return Ok(RuleTarget::All);
        }
        let mut ids = Vec::new();
        for token in list.split(',') {
            if !RULE_TOKEN_RE.is_match(token) {
                return Err(format!("invalid rule token '{}'", token));
            }
            if token == "all" {
                return Ok(RuleTarget::All);
            }
            match self.resolve_token(token) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => tracing::debug!(token, "dropping unknown rule in directive"),
            }
        }
        Ok(RuleTarget::Rules(ids))
    }

    fn resolve_token(&self, token: &str) -> Option<String> {
        if let Some(id) = self.name_to_id.get(token) {
            return Some(id.clone());
        }
        self.known_ids.contains(token).then(|| token.to_string())
    }
}

struct Body {
    target: RuleTarget,
    reason: Option<String>,
    ticket: Option<String>,
    expires: Option<NaiveDate>,
}

/// Split at the first `#` outside double quotes.
fn split_reason(text: &str) -> (&str, Option<String>) {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => {
                let reason = text[i + 1..].trim();
                return (&text[..i], (!reason.is_empty()).then(|| reason.to_string()));
            }
            _ => {}
        }
    }
    (text, None)
}
