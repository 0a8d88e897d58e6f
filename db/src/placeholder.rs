//! Named placeholder extraction.
//!
//! Scans SQL text for `:name` and `{name}` markers and records them so the text
//! can later be rendered with a driver's numbered positional markers. Text inside
//! string literals, quoted identifiers, dollar-quoted bodies, and comments is
//! copied verbatim, and `::` casts are not mistaken for placeholders.

use crate::backend::Placeholder;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Sql(String),
    /// Index into `ParsedSql::names`
    Param(usize),
}

/// SQL text split into literal runs and placeholder references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    names: Vec<String>,
    segments: Vec<Segment>,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl ParsedSql {
    /// Parse `sql`, collecting distinct placeholder names by first occurrence.
    pub fn parse(sql: &str) -> Self {
        let mut parsed = ParsedSql {
            names: Vec::new(),
            segments: Vec::new(),
        };
        let mut literal = String::with_capacity(sql.len());
        let chars: Vec<char> = sql.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' if is_escape_prefix(&chars, i) => {
                    let end = escape_string_end(&chars, i + 1);
                    literal.extend(&chars[i..end]);
                    i = end;
                }
                '\'' | '"' => {
                    let end = find_char(&chars, i + 1, c).map_or(chars.len(), |j| j + 1);
                    literal.extend(&chars[i..end]);
                    i = end;
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    let end = find_char(&chars, i, '\n').unwrap_or(chars.len());
                    literal.extend(&chars[i..end]);
                    i = end;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    let end = find_seq(&chars, i + 2, &['*', '/']).map_or(chars.len(), |j| j + 2);
                    literal.extend(&chars[i..end]);
                    i = end;
                }
                '$' => match dollar_tag(&chars, i) {
                    Some(tag_len) => {
                        let tag = &chars[i..i + tag_len];
                        let end = find_seq(&chars, i + tag_len, tag).map_or(chars.len(), |j| j + tag_len);
                        literal.extend(&chars[i..end]);
                        i = end;
                    }
                    None => {
                        literal.push(c);
                        i += 1;
                    }
                },
                ':' if chars.get(i + 1) == Some(&':') => {
                    literal.push_str("::");
                    i += 2;
                }
                ':' if chars.get(i + 1).is_some_and(|&n| is_ident_start(n)) => {
                    let end = ident_end(&chars, i + 1);
                    parsed.push_param(&mut literal, chars[i + 1..end].iter().collect());
                    i = end;
                }
                '{' if chars.get(i + 1).is_some_and(|&n| is_ident_start(n)) => {
                    let end = ident_end(&chars, i + 1);
                    if chars.get(end) == Some(&'}') {
                        parsed.push_param(&mut literal, chars[i + 1..end].iter().collect());
                        i = end + 1;
                    } else {
                        literal.push(c);
                        i += 1;
                    }
                }
                _ => {
                    literal.push(c);
                    i += 1;
                }
            }
        }

        if !literal.is_empty() {
            parsed.segments.push(Segment::Sql(literal));
        }
        parsed
    }

    fn push_param(&mut self, literal: &mut String, name: String) {
        if !literal.is_empty() {
            self.segments.push(Segment::Sql(std::mem::take(literal)));
        }
        let index = match self.names.iter().position(|n| *n == name) {
            Some(index) => index,
            None => {
                self.names.push(name);
                self.names.len() - 1
            }
        };
        self.segments.push(Segment::Param(index));
    }

    /// Distinct placeholder names in first-occurrence order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render the SQL with numbered positional markers in `style`.
    ///
    /// The n-th distinct name becomes marker `n`, so repeated names share a marker.
    pub fn render(&self, style: Placeholder) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Sql(s) => out.push_str(s),
                Segment::Param(index) => out.push_str(&style.marker(index + 1)),
            }
        }
        out
    }
}

/// True when the quote at `quote` opens a PostgreSQL `E'...'` string.
fn is_escape_prefix(chars: &[char], quote: usize) -> bool {
    let Some(prefix) = quote.checked_sub(1) else {
        return false;
    };
    matches!(chars[prefix], 'E' | 'e') && (prefix == 0 || !is_ident_char(chars[prefix - 1]))
}

/// Index just past the closing quote of an escape string whose body starts
/// at `from`; a backslash escapes the next character.
fn escape_string_end(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\'' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn find_char(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars.get(from..)?.iter().position(|&c| c == target).map(|p| p + from)
}

fn find_seq(chars: &[char], from: usize, seq: &[char]) -> Option<usize> {
    chars
        .get(from..)?
        .windows(seq.len())
        .position(|w| w == seq)
        .map(|p| p + from)
}

fn ident_end(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|&c| !is_ident_char(c))
        .map_or(chars.len(), |p| p + from)
}

/// Length of a dollar-quote opening tag (`$$` or `$tag$`) starting at `start`.
fn dollar_tag(chars: &[char], start: usize) -> Option<usize> {
    match chars.get(start + 1) {
        Some('$') => Some(2),
        Some(&c) if is_ident_start(c) => {
            let end = ident_end(chars, start + 1);
            (chars.get(end) == Some(&'$')).then(|| end + 1 - start)
        }
        _ => None,
    }
}
