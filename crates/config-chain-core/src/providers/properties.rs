//! Properties File Source
//!
//! Loads flat `key=value` files in the conventional properties format:
//!
//! ```text
//! # Comment
//! ! Also a comment
//! database.host = db.internal
//! database.port: 5432
//! greeting Hello world
//! long.value = first part \
//!              second part
//! unicode = caf\u00e9
//! ```
//!
//! The file is read once, when the source is constructed. A missing or
//! unreadable file is reported immediately rather than degrading to an empty
//! source, so a typo in a path fails at startup.

use super::traits::ConfigurationSource;
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source backed by a parsed properties file
#[derive(Debug, Clone)]
pub struct PropertiesSource {
    /// Where the values came from, if loaded from disk
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl PropertiesSource {
    /// Load and parse a properties file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::PropertiesIo {
            path: path.clone(),
            source,
        })?;

        let values = parse_properties(&content).map_err(|e| ConfigError::PropertiesSyntax {
            path: path.clone(),
            line: e.line,
            reason: e.reason,
        })?;

        tracing::debug!(path = %path.display(), entries = values.len(), "Loaded properties file");

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Parse properties from a string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let values = parse_properties(content).map_err(|e| ConfigError::PropertiesSyntax {
            path: PathBuf::from("<inline>"),
            line: e.line,
            reason: e.reason,
        })?;

        Ok(Self { path: None, values })
    }

    /// The file this source was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no properties were defined
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for PropertiesSource {
    fn name(&self) -> &str {
        "properties"
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[derive(Debug)]
struct SyntaxError {
    line: usize,
    reason: String,
}

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

fn parse_properties(content: &str) -> Result<HashMap<String, String>, SyntaxError> {
    let mut values = HashMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let line = raw.trim_start_matches(WHITESPACE);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        // Join continuation lines into one logical line
        let line_number = index + 1;
        let mut logical = String::new();
        let mut current = line;
        while ends_with_continuation(current) {
            logical.push_str(&current[..current.len() - 1]);
            match lines.next() {
                Some((_, next)) => current = next.trim_start_matches(WHITESPACE),
                None => {
                    current = "";
                    break;
                }
            }
        }
        logical.push_str(current);

        let (raw_key, raw_value) = split_entry(&logical);
        let key = unescape(raw_key).map_err(|reason| SyntaxError {
            line: line_number,
            reason,
        })?;
        let value = unescape(raw_value).map_err(|reason| SyntaxError {
            line: line_number,
            reason,
        })?;

        values.insert(key, value);
    }

    Ok(values)
}

/// A line continues when it ends in an odd number of backslashes
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into its raw (still escaped) key and value
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut separator = None;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                separator = Some((i, c));
                break;
            }
            _ => {}
        }
    }

    let Some((at, sep)) = separator else {
        return (line, "");
    };

    let key = &line[..at];
    let mut rest = line[at + sep.len_utf8()..].trim_start_matches(WHITESPACE);
    if WHITESPACE.contains(&sep) {
        if let Some(after) = rest.strip_prefix(['=', ':']) {
            rest = after.trim_start_matches(WHITESPACE);
        }
    }

    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
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
                let unit = read_hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&unit) {
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => read_hex4(&mut lookahead)?,
                        _ => return Err(format!("unpaired surrogate \\u{unit:04X}")),
                    };
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(format!("unpaired surrogate \\u{unit:04X}"));
                    }
                    chars = lookahead;
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };
                let decoded = char::from_u32(code)
                    .ok_or_else(|| format!("invalid code point \\u{code:04X}"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            // A lone trailing backslash is dropped
            None => {}
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.chars().count() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("malformed \\uxxxx encoding: \\u{digits}"));
    }
    u32::from_str_radix(&digits, 16).map_err(|e| e.to_string())
}
