//! Properties-file configuration source
//!
//! Reads `key=value` resources such as `META-INF/test-config.properties`.
//! These act as defaults and sit below environment variables and system
//! properties.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::traits::{ConfigError, ConfigResult, ConfigSource};

/// Default ordinal of properties-file sources
pub const PROPERTIES_ORDINAL: i32 = 100;

/// Key a properties file can use to override its own ordinal
pub const CONFIG_ORDINAL_KEY: &str = "config_ordinal";

/// Configuration source loaded from a properties file
///
/// # Example
///
/// ```no_run
/// use systest_core::config::{ConfigSource, PropertiesConfigSource};
///
/// let source = PropertiesConfigSource::load("tests/resources/META-INF/test-config.properties")
///     .expect("resource should be readable");
/// let route = source.get_value("test.target.route");
/// ```
#[derive(Debug, Clone)]
pub struct PropertiesConfigSource {
    name: String,
    path: Option<PathBuf>,
    ordinal: i32,
    properties: HashMap<String, String>,
}

impl PropertiesConfigSource {
    /// Load a properties file, failing if it is absent or unreadable
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Discovery {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_content(path, &content)
    }

    /// Load a properties file, returning `None` if it does not exist
    pub fn load_if_exists(path: impl AsRef<Path>) -> ConfigResult<Option<Self>> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_content(path, &content).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Discovery {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse properties text that did not come from a file
    pub fn parse(name: impl Into<String>, content: &str) -> ConfigResult<Self> {
        let name = name.into();
        let properties = parse_properties(content).map_err(|e| ConfigError::Malformed {
            path: PathBuf::from(&name),
            line: e.line,
            message: e.message,
        })?;
        let ordinal = declared_ordinal(&name, &properties)?;
        Ok(Self {
            name,
            path: None,
            ordinal,
            properties,
        })
    }

    fn from_content(path: &Path, content: &str) -> ConfigResult<Self> {
        let properties = parse_properties(content).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })?;
        let name = format!("properties:{}", path.display());
        let ordinal = declared_ordinal(&name, &properties)?;
        debug!(
            source = %name,
            ordinal,
            keys = properties.len(),
            "loaded properties resource"
        );
        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            ordinal,
            properties,
        })
    }

    /// The file this source was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn declared_ordinal(name: &str, properties: &HashMap<String, String>) -> ConfigResult<i32> {
    match properties.get(CONFIG_ORDINAL_KEY) {
        None => Ok(PROPERTIES_ORDINAL),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidOrdinal {
            source_name: name.to_string(),
            value: value.clone(),
        }),
    }
}

impl ConfigSource for PropertiesConfigSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn ordinal(&self) -> i32 {
        self.ordinal
    }

    fn get_value(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn properties(&self) -> HashMap<String, String> {
        self.properties.clone()
    }
}

/// A syntax problem in properties text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesParseError {
    /// 1-based line where the offending logical line starts
    pub line: usize,
    pub message: String,
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Parse properties text into a map
///
/// Later occurrences of a key replace earlier ones.
pub fn parse_properties(content: &str) -> Result<HashMap<String, String>, PropertiesParseError> {
    let mut properties = HashMap::new();
    let mut lines = split_lines(content).enumerate();

    while let Some((index, raw)) = lines.next() {
        let line = raw.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let start = index + 1;
        let mut logical = String::new();
        let mut current = line;
        loop {
            if !continues(current) {
                logical.push_str(current);
                break;
            }
            logical.push_str(&current[..current.len() - 1]);
            match lines.next() {
                Some((_, next)) => current = next.trim_start_matches(is_blank),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        properties.insert(unescape(key, start)?, unescape(value, start)?);
    }

    Ok(properties)
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start_matches(is_blank)),
            c if is_blank(c) => {
                let rest = line[i..].trim_start_matches(is_blank);
                let rest = rest.strip_prefix(&['=', ':'][..]).unwrap_or(rest);
                return (&line[..i], rest.trim_start_matches(is_blank));
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesParseError> {
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
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let high = read_code_unit(&mut chars, line)?;
                let decoded = if (0xD800..0xDC00).contains(&high) {
                    // A high surrogate must be followed by an escaped low surrogate
                    let low = match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => Some(read_code_unit(&mut chars, line)?),
                        _ => None,
                    };
                    low.and_then(|low| char::decode_utf16([high, low]).next()?.ok())
                } else {
                    char::from_u32(u32::from(high))
                };
                out.push(decoded.ok_or_else(|| PropertiesParseError {
                    line,
                    message: format!("unpaired surrogate in \\u escape: \\u{:04X}", high),
                })?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_code_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16, PropertiesParseError> {
    let hex: String = chars.by_ref().take(4).collect();
    u16::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| PropertiesParseError {
            line,
            message: format!("malformed \\uXXXX escape: \\u{}", hex),
        })
}

/// Split on `\n`, `\r\n` or a lone `\r`
fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\n', '\r']) {
            Some(end) => {
                let line = &rest[..end];
                let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
