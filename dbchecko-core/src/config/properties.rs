//! Java-style `.properties` files.
//!
//! Supports the subset of the format found in portal-ext and JDBC property
//! files: `#`/`!` comments, `=`/`:`/whitespace separators, backslash line
//! continuations and the standard escapes including `\uXXXX`.

use super::ConnectionConfig;
use crate::Result;
use crate::error::DbCheckoError;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Property key holding the connection URL.
pub const URL_PROPERTY: &str = "jdbc.default.url";
/// Property key holding the user name.
pub const USER_PROPERTY: &str = "jdbc.default.username";
/// Property key holding the password.
pub const PASSWORD_PROPERTY: &str = "jdbc.default.password";
/// Property key holding the driver identifier.
pub const DRIVER_CLASS_NAME_PROPERTY: &str = "jdbc.default.driverClassName";

/// Syntax error in a properties document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertiesError {
    /// `\u` not followed by four hex digits, or an unpaired surrogate
    #[error("malformed \\uXXXX escape on line {line}")]
    MalformedUnicodeEscape { line: usize },
}

/// Parses a properties document into a key/value map.
///
/// Later definitions of the same key replace earlier ones.
///
/// # Errors
/// Returns [`PropertiesError`] on a malformed unicode escape.
pub fn parse_properties(text: &str) -> std::result::Result<HashMap<String, String>, PropertiesError> {
    let normalized = text.replace("\r\n", "\n");
    let mut physical = normalized.split(['\n', '\r']).enumerate();
    let mut properties = HashMap::new();

    while let Some((index, line)) = physical.next() {
        let line_number = index.saturating_add(1);
        let trimmed = line.trim_start_matches(is_separator_space);
        if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match physical.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_separator_space)),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        properties.insert(unescape(key, line_number)?, unescape(value, line_number)?);
    }

    Ok(properties)
}

/// Builds a [`ConnectionConfig`] from the four `jdbc.default.*` properties.
///
/// Absent keys become empty strings. Each one is logged so that a broken
/// file is visible without refusing configs that worked before.
pub fn from_properties(properties: &HashMap<String, String>) -> ConnectionConfig {
    let lookup = |key: &str| match properties.get(key) {
        Some(value) => value.clone(),
        None => {
            tracing::warn!("Property '{}' is missing, using an empty value", key);
            String::new()
        }
    };

    ConnectionConfig::new(
        lookup(URL_PROPERTY),
        lookup(USER_PROPERTY),
        lookup(PASSWORD_PROPERTY),
        lookup(DRIVER_CLASS_NAME_PROPERTY),
    )
}

/// Reads a UTF-8 properties file and builds a [`ConnectionConfig`] from it.
///
/// # Errors
/// Returns `ConfigRead` if the file cannot be read or is not a valid
/// properties document.
pub fn from_properties_file(path: &Path) -> Result<ConnectionConfig> {
    tracing::debug!("Reading properties file {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|e| {
        DbCheckoError::config_read(
            format!("cannot read properties file {}", path.display()),
            e,
        )
    })?;

    let properties = parse_properties(&text).map_err(|e| {
        DbCheckoError::config_read(format!("invalid properties file {}", path.display()), e)
    })?;

    Ok(from_properties(&properties))
}

fn is_separator_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn ends_with_continuation(line: &str) -> bool {
    let backslashes = line.chars().rev().take_while(|&c| c == '\\').count();
    backslashes & 1 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_separator_space(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_separator_space);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_separator_space);
    }

    (key, rest)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = chars.next()?.to_digit(16)?;
        code = code.checked_mul(16)?.checked_add(digit)?;
    }
    Some(code)
}

fn combine_surrogates(high: u32, low: u32) -> Option<u32> {
    let high = high.checked_sub(0xD800)?.checked_mul(0x400)?;
    let low = low.checked_sub(0xDC00)?;
    high.checked_add(low)?.checked_add(0x10000)
}

fn unescape(raw: &str, line: usize) -> std::result::Result<String, PropertiesError> {
    let malformed = PropertiesError::MalformedUnicodeEscape { line };
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let code = read_hex4(&mut chars).ok_or_else(|| malformed.clone())?;
                let decoded = if (0xD800..0xDC00).contains(&code) {
                    // high surrogate, the low half must follow as \uXXXX
                    let low = match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => read_hex4(&mut chars),
                        _ => None,
                    }
                    .filter(|low| (0xDC00..0xE000).contains(low))
                    .ok_or_else(|| malformed.clone())?;
                    combine_surrogates(code, low).and_then(char::from_u32)
                } else {
                    char::from_u32(code)
                };
                out.push(decoded.ok_or_else(|| malformed.clone())?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}
