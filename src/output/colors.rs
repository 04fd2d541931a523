use std::borrow::Cow;
use std::io::Write;

use crate::error::{Result, TravlogError};

/// ANSI escape sequences usable as template substitutions.
pub mod seq {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const OFF: &str = "\x1b[0m";
    pub const REVERSE: &str = "\x1b[7m";
    pub const UNREVERSE: &str = "\x1b[27m";
}

fn style_token(name: &str) -> Option<&'static str> {
    match name {
        "red" => Some(seq::RED),
        "green" => Some(seq::GREEN),
        "yellow" => Some(seq::YELLOW),
        "cyan" => Some(seq::CYAN),
        "bold" => Some(seq::BOLD),
        "dim" => Some(seq::DIM),
        "off" => Some(seq::OFF),
        "reverse" => Some(seq::REVERSE),
        "unreverse" => Some(seq::UNREVERSE),
        _ => None,
    }
}

/// A named substitution value. `Text` is quoted so control characters can
/// never corrupt the terminal; `Number` passes through as-is.
pub enum Value {
    Text(String),
    Number(i64),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }
}

fn is_unsafe(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

fn quote_unsafe_char(c: char, out: &mut String) {
    out.push_str(seq::REVERSE);
    match c {
        '\t' => out.push('\t'),
        c if c < ' ' || c == '\u{7f}' => {
            out.push('^');
            out.push(char::from(0x40 ^ c as u8));
        }
        c => {
            out.push_str(&format!("<U+{:04X}>", c as u32));
        }
    }
    out.push_str(seq::UNREVERSE);
}

/// Replaces every control character (C0, DEL, C1) with a reverse-video
/// marker. Strings without control characters are returned unchanged.
fn quote(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_unsafe) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_unsafe(c) {
            quote_unsafe_char(c, &mut out);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Renders a `{name}`-placeholder template. Explicit substitutions shadow
/// the built-in style tokens; a name found in neither is an error.
/// `{{` and `}}` are literal braces.
pub fn render(template: &str, vars: &[(&str, Value)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(TravlogError::MissingKey(name)),
                    }
                }
                if let Some((_, value)) = vars.iter().find(|(k, _)| *k == name) {
                    match value {
                        Value::Text(s) => out.push_str(&quote(s)),
                        Value::Number(n) => out.push_str(&n.to_string()),
                    }
                } else if let Some(code) = style_token(&name) {
                    out.push_str(code);
                } else {
                    return Err(TravlogError::MissingKey(name));
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Renders the template and writes it with a trailing newline.
pub fn print<W: Write>(out: &mut W, template: &str, vars: &[(&str, Value)]) -> Result<()> {
    writeln!(out, "{}", render(template, vars)?)?;
    Ok(())
}
