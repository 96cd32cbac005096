//! Recursive-descent parser for `condition:` ranges.
//!
//! Grammar:
//!
//! ```text
//! range     = "condition:" ws ident ws "?" ws branch? ws ":" ws branch? list("esm")? list("peer")? ("#" word)?
//! branch    = group | plain
//! group     = "(" balanced ")"
//! list(p)   = "(" p ":" item ("|" item)* ")"
//! ```
//!
//! Groups are matched with a depth counter, so a branch may contain a whole
//! nested condition range with its own parentheses. The group interior is kept
//! as text; nested conditions are only expanded when the host resolves the
//! branch descriptor.

use crate::condition::expression::{BranchRange, ConditionExpression, ordered_unique};
use crate::constants::CONDITION_PROTOCOL;
use crate::core::CondepError;

/// Parse a raw condition range.
///
/// # Errors
///
/// Returns [`CondepError::Grammar`] for a missing protocol tag, a missing test
/// identifier, a missing `?` or `:`, an unterminated group, or trailing input.
///
/// # Examples
///
/// ```rust
/// use condep_cli::condition::parse;
///
/// let expr = parse("condition: foo ? (workspace:*) : 1.0.0").unwrap();
/// assert_eq!(expr.test, "foo");
/// assert_eq!(expr.consequent.unwrap(), "workspace:*");
/// assert_eq!(expr.alternate.unwrap(), "1.0.0");
/// assert!(expr.hash.is_none());
/// ```
pub fn parse(source: &str) -> Result<ConditionExpression, CondepError> {
    if !source.starts_with(CONDITION_PROTOCOL) {
        return Err(CondepError::grammar(format!("Expected '{CONDITION_PROTOCOL}'"), 0, source));
    }

    let mut cursor = Cursor {
        source,
        pos: CONDITION_PROTOCOL.len(),
    };

    cursor.skip_ws();
    let test = cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if test.is_empty() {
        return Err(cursor.error("Expected an identifier"));
    }

    cursor.skip_ws();
    cursor.expect('?')?;
    cursor.skip_ws();

    let consequent = match cursor.peek() {
        Some('(') => non_empty(cursor.eat_group()?.trim()),
        Some(':') => None,
        _ => non_empty(cursor.eat_while(|c| c != '(' && c != ':').trim_end()),
    };

    cursor.expect(':')?;
    cursor.skip_ws();

    let alternate = match cursor.peek() {
        None | Some(':') => None,
        Some('(') if !cursor.at_list("esm") && !cursor.at_list("peer") => {
            non_empty(cursor.eat_group()?.trim())
        }
        _ => non_empty(cursor.eat_while(|c| c != '(' && c != '#').trim_end()),
    };

    let mut esm_exports = cursor.parse_list("esm")?;
    let peers = cursor.parse_list("peer")?;
    if esm_exports.is_none() && peers.is_some() {
        esm_exports = cursor.parse_list("esm")?;
    }

    let mut hash = None;
    if cursor.peek() == Some('#') {
        cursor.pos += 1;
        hash = non_empty(cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_'))
            .map(str::to_string);
        cursor.skip_ws();
    }

    if let Some(ch) = cursor.peek() {
        return Err(cursor.error(format!("Unexpected '{ch}'")));
    }

    Ok(ConditionExpression {
        test: test.to_string(),
        consequent: consequent.map(BranchRange::new),
        alternate: alternate.map(BranchRange::new),
        esm_exports,
        peers,
        hash,
    })
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() { None } else { Some(text) }
}

struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn error(&self, message: impl Into<String>) -> CondepError {
        CondepError::grammar(message, self.pos, self.source)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_list(&self, prefix: &str) -> bool {
        self.rest().strip_prefix('(').is_some_and(|r| {
            r.strip_prefix(prefix).is_some_and(|r| r.starts_with(':'))
        })
    }

    fn expect(&mut self, expected: char) -> Result<(), CondepError> {
        if self.peek() != Some(expected) {
            return Err(self.error(format!("Expected '{expected}'")));
        }
        self.pos += expected.len_utf8();
        Ok(())
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.char_indices().find(|&(_, c)| !pred(c)).map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    fn skip_ws(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// Consume a balanced `( ... )` group and the whitespace after it.
    fn eat_group(&mut self) -> Result<&'a str, CondepError> {
        self.expect('(')?;

        let start = self.pos;
        let mut depth = 1usize;
        for (offset, ch) in self.rest().char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset;
                        self.pos = end + 1;
                        self.skip_ws();
                        return Ok(&self.source[start..end]);
                    }
                }
                _ => {}
            }
        }

        self.pos = self.source.len();
        Err(self.error("Expected ')' (unterminated group)"))
    }

    fn parse_list(&mut self, prefix: &str) -> Result<Option<Vec<String>>, CondepError> {
        if !self.at_list(prefix) {
            return Ok(None);
        }
        let group = self.eat_group()?;
        let items = group[prefix.len() + 1..].trim();
        if items.is_empty() {
            return Ok(None);
        }
        Ok(ordered_unique(items.split('|').map(str::trim)))
    }
}
