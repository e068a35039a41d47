//! Raw document wire format: JSON with comments and trailing commas.
//!
//! Documents are normalized to strict JSON before being handed to serde_json.
//! Formatting (whitespace, comments, trailing commas) never reaches the parsed
//! value, so cosmetic edits do not register as configuration changes.

use serde::de::DeserializeOwned;

/// Strip comments and trailing commas, producing strict JSON.
///
/// A blank document (or one containing only comments) normalizes to `{}`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            '}' | ']' => {
                strip_trailing_comma(&mut out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    if out.trim().is_empty() {
        return "{}".to_string();
    }
    out
}

fn strip_trailing_comma(out: &mut String) {
    let end = out.trim_end().len();
    if out[..end].ends_with(',') {
        out.truncate(end - 1);
    }
}

/// Parse a raw document into `T`.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(&normalize(raw))
}
