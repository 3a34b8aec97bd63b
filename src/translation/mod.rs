use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, is_named_marker,
};
use scanner::{State, scan_identifier};

/// Result of rewriting `:name` placeholders into MySQL's positional `?` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedQuery<'a> {
    /// SQL with every named placeholder replaced by `?`
    pub sql: Cow<'a, str>,
    /// Placeholder names in the order their `?` markers appear (repeats included)
    pub names: Vec<String>,
    /// Count of `?` markers that were already positional in the input
    pub positional_markers: usize,
}

/// Rewrite `:name` placeholders to `?`, recording the name behind each marker.
///
/// Quoted strings (`'...'`, `"..."`), backtick identifiers, and `--`, `#` and `/* */`
/// comments are copied through untouched, as are `::` and `:=`. Returns a borrowed `Cow`
/// when the statement has no named placeholders.
///
/// ```rust
/// use mysql_gateway::translation::translate_named_placeholders;
///
/// let t = translate_named_placeholders("UPDATE t SET x = 1 WHERE id = :id");
/// assert_eq!(t.sql, "UPDATE t SET x = 1 WHERE id = ?");
/// assert_eq!(t.names, vec!["id".to_string()]);
/// ```
#[must_use]
pub fn translate_named_placeholders(sql: &str) -> TranslatedQuery<'_> {
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut names = Vec::new();
    let mut positional_markers = 0;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' | b'"' | b'`' => state = State::Quoted(b),
                b'?' => positional_markers += 1,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                _ if is_named_marker(bytes, idx) => {
                    if let Some((name_end, name)) = scan_identifier(bytes, idx + 1) {
                        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                        buf.push_str(&sql[copied..idx]);
                        buf.push('?');
                        names.push(name.to_string());
                        copied = name_end;
                        idx = name_end;
                        continue;
                    }
                }
                _ => {}
            },
            State::Quoted(quote) => {
                if b == b'\\' && quote != b'`' {
                    idx += 1; // skip escaped byte
                } else if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        idx += 1; // skip doubled quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    let sql = match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    };

    TranslatedQuery {
        sql,
        names,
        positional_markers,
    }
}
