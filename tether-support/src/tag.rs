//! Struct-tag parsing.
//!
//! Field metadata is written in the conventional struct-tag form:
//! space separated `key:"value"` pairs where the value is a double quoted
//! string with backslash escapes.
//!
//! ```
//! use tether_support::tag;
//!
//! let raw = r#"inject:"db" singleton:"true""#;
//! assert_eq!(tag::extract(raw, "inject").unwrap().as_deref(), Some("db"));
//! assert!(tag::flag(raw, "singleton").unwrap());
//! assert!(!tag::flag(raw, "cannil").unwrap());
//! ```

/// Error raised for malformed tag text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// A key was not followed by `:`.
    #[error("tag key {key:?} is missing ':' at byte {offset}")]
    MissingColon { key: String, offset: usize },

    /// A value does not start with `"`.
    #[error("value of tag key {key:?} must be a quoted string")]
    MissingQuote { key: String },

    /// A quoted value never ends.
    #[error("value of tag key {key:?} is not terminated")]
    Unterminated { key: String },

    /// An escape sequence inside a value is not recognised.
    #[error("unknown escape '\\{escape}' in value of tag key {key:?}")]
    BadEscape { key: String, escape: char },

    /// A boolean modifier holds something other than `true`/`false`.
    #[error("tag key {key:?} expects \"true\" or \"false\", found {value:?}")]
    InvalidFlag { key: String, value: String },
}

/// Parses every `key:"value"` pair of a tag, in order.
///
/// # Errors
/// Returns a [`TagError`] describing the first malformed pair.
pub fn parse(tag: &str) -> Result<Vec<(String, String)>, TagError> {
    let bytes = tag.as_bytes();
    let mut pairs = Vec::new();
    let mut i = 0;

    loop {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() {
            return Ok(pairs);
        }

        let start = i;
        while i < bytes.len() && bytes[i] > b' ' && bytes[i] != b':' && bytes[i] != b'"' {
            i += 1;
        }
        let key = tag[start..i].to_string();
        if i >= bytes.len() || bytes[i] != b':' || key.is_empty() {
            return Err(TagError::MissingColon { key, offset: i });
        }
        i += 1;

        if i >= bytes.len() || bytes[i] != b'"' {
            return Err(TagError::MissingQuote { key });
        }
        i += 1;

        let (value, consumed) = unquote(&tag[i..], &key)?;
        i += consumed;
        pairs.push((key, value));
    }
}

/// Returns the value stored under `key`, or `None` when the key is absent.
///
/// The whole tag is validated, so a malformed pair anywhere is an error.
pub fn extract(tag: &str, key: &str) -> Result<Option<String>, TagError> {
    Ok(parse(tag)?
        .into_iter()
        .find_map(|(k, v)| (k == key).then_some(v)))
}

/// Reads a boolean modifier. Absent keys read as `false`.
pub fn flag(tag: &str, key: &str) -> Result<bool, TagError> {
    match extract(tag, key)?.as_deref() {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(TagError::InvalidFlag {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Formats a single pair, escaping the value.
///
/// ```
/// assert_eq!(tether_support::tag::pair("inject", "a\"b"), r#"inject:"a\"b""#);
/// ```
pub fn pair(key: &str, value: &str) -> String {
    let mut out = String::with_capacity(key.len() + value.len() + 3);
    out.push_str(key);
    out.push_str(":\"");
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Decodes a quoted body (opening quote already consumed).
/// Returns the value and the number of bytes consumed including the closing quote.
fn unquote(rest: &str, key: &str) -> Result<(String, usize), TagError> {
    let mut value = String::new();
    let mut chars = rest.char_indices();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((value, idx + 1)),
            '\\' => {
                let (_, escape) = chars.next().ok_or_else(|| TagError::Unterminated {
                    key: key.to_string(),
                })?;
                value.push(match escape {
                    '"' => '"',
                    '\\' => '\\',
                    '\'' => '\'',
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => {
                        return Err(TagError::BadEscape {
                            key: key.to_string(),
                            escape: other,
                        });
                    }
                });
            }
            _ => value.push(ch),
        }
    }

    Err(TagError::Unterminated {
        key: key.to_string(),
    })
}
