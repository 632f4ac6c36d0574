//! Rendered statements.

use crate::param::{Param, ParamList};
use serde::Serialize;

/// A rendered SQL statement and its ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    sql: String,
    params: ParamList,
    fetch_sql: bool,
}

impl Statement {
    pub(crate) fn new(sql: String, params: ParamList, fetch_sql: bool) -> Self {
        Self {
            sql,
            params,
            fetch_sql,
        }
    }

    /// SQL text with `?` / `:name` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        self.params.as_slice()
    }

    /// Whether the caller asked for compiled SQL instead of execution.
    pub fn fetch_sql(&self) -> bool {
        self.fetch_sql
    }

    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.sql, self.params.into_vec())
    }

    /// Inline every bound value as a SQL literal.
    ///
    /// `?` placeholders take positional params in order, `:name` placeholders
    /// take the named param of that name. Text inside single-quoted literals
    /// is left untouched, as are placeholders with no matching param.
    pub fn to_real_sql(&self) -> String {
        let mut positional = self.params.iter().filter(|p| !p.is_named());
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 4);
        scan_placeholders(&self.sql, |token| match token {
            Token::Text(text) => out.push_str(text),
            Token::Positional => match positional.next() {
                Some(p) => out.push_str(&p.value.to_literal()),
                None => out.push('?'),
            },
            Token::Named(name) => match self.params.get(name) {
                Some(p) => out.push_str(&p.value.to_literal()),
                None => {
                    out.push(':');
                    out.push_str(name);
                }
            },
        });
        out
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

pub(crate) enum Token<'a> {
    Text(&'a str),
    Positional,
    Named(&'a str),
}

/// Count `?` placeholders outside quoted literals.
pub(crate) fn count_positional(sql: &str) -> usize {
    let mut n = 0;
    scan_placeholders(sql, |t| {
        if matches!(t, Token::Positional) {
            n += 1;
        }
    });
    n
}

/// Split SQL into literal text and placeholder tokens.
pub(crate) fn scan_placeholders<'a>(sql: &'a str, mut f: impl FnMut(Token<'a>)) {
    let bytes = sql.as_bytes();
    let mut start = 0;
    let mut i = 0;
    let mut in_quote = false;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quote {
            match b {
                // backslash escapes the next byte, e.g. `'it\'s'`
                b'\\' => i += 2,
                b'\'' => {
                    in_quote = false;
                    i += 1;
                }
                _ => i += 1,
            }
            continue;
        }
        match b {
            b'\'' => {
                in_quote = true;
                i += 1;
            }
            b'?' => {
                if start < i {
                    f(Token::Text(&sql[start..i]));
                }
                f(Token::Positional);
                i += 1;
                start = i;
            }
            b':' => {
                // `::type` casts are not placeholders
                if bytes.get(i + 1) == Some(&b':') {
                    i += 2;
                    continue;
                }
                let name_start = i + 1;
                let mut end = name_start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                let starts_ok = bytes
                    .get(name_start)
                    .is_some_and(|c| c.is_ascii_alphabetic() || *c == b'_');
                if end > name_start && starts_ok {
                    if start < i {
                        f(Token::Text(&sql[start..i]));
                    }
                    f(Token::Named(&sql[name_start..end]));
                    start = end;
                }
                i = end.max(i + 1);
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        f(Token::Text(&sql[start..]));
    }
}
