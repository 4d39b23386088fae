//! Simple TOML parser for panel configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the panel configuration. It does NOT support full TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Basic string escapes (`\"`, `\\`, `\n`, `\t`, `\r`)
//! - [section] headers
//! - [unit.<region>] headers
//! - Comments (# ...)
//!
//! ```toml
//! [server]
//! url = "http://192.168.1.10:8080/api/feed"
//! token = "s3cret"
//!
//! [fetch]
//! interval_minutes = 10
//!
//! [unit.calendar]
//! interval_minutes = 60
//! refresh = "full"
//! ```

use heapless::String;

use super::types::{PanelConfig, RefreshClass};
use crate::layout::Region;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String longer than its field allows
    TooLong,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidSection => write!(f, "invalid section"),
            ConfigError::UnknownKey => write!(f, "unknown key"),
            ConfigError::InvalidValue => write!(f, "invalid value"),
            ConfigError::TooLong => write!(f, "value too long"),
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Server,
    Fetch,
    Refresh,
    Unit(Region),
}

/// Parse TOML configuration into a [`PanelConfig`]
///
/// Keys that are not present keep their default values.
pub fn parse_config(input: &str) -> Result<PanelConfig, ConfigError> {
    let mut config = PanelConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or(ConfigError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        if let Err(err) = apply_value(&mut config, section, key, value) {
            warn!("config: rejected key {}", key);
            return Err(err);
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    let header = header.trim();

    if let Some(name) = header.strip_prefix("unit.") {
        return Region::from_name(name)
            .map(Section::Unit)
            .ok_or(ConfigError::InvalidSection);
    }

    match header {
        "server" => Ok(Section::Server),
        "fetch" => Ok(Section::Fetch),
        "refresh" => Ok(Section::Refresh),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    config: &mut PanelConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Server, "url") => config.server.url = parse_string(value)?,
        (Section::Server, "token") => config.server.bearer_token = Some(parse_string(value)?),
        (Section::Server, "api_key") => config.server.api_key = Some(parse_string(value)?),
        (Section::Server, "timeout_ms") => config.server.timeout_ms = parse_int(value)?,

        (Section::Fetch, "interval_minutes") => {
            config.fetch.interval_minutes = parse_positive(value)?;
        }
        (Section::Fetch, "max_retries") => config.fetch.max_retries = parse_positive(value)?,
        (Section::Fetch, "retry_delay_ms") => config.fetch.retry_delay_ms = parse_int(value)?,

        (Section::Refresh, "maintenance_interval_minutes") => {
            let minutes: u32 = parse_positive(value)?;
            config.refresh.maintenance_interval_ms = minutes
                .checked_mul(60_000)
                .ok_or(ConfigError::InvalidValue)?;
        }
        (Section::Refresh, "max_partial_refreshes") => {
            config.refresh.max_partial_refreshes = parse_positive(value)?;
        }

        (Section::Unit(region), "interval_minutes") => {
            config.unit_mut(region).interval_minutes = parse_int(value)?;
        }
        (Section::Unit(region), "refresh") => {
            config.unit_mut(region).refresh = parse_refresh_class(value)?;
        }
        (Section::Unit(region), "partial") => {
            config.unit_mut(region).refresh = if parse_bool(value)? {
                RefreshClass::FastPartial
            } else {
                RefreshClass::FullOnly
            };
        }

        _ => return Err(ConfigError::UnknownKey),
    }

    Ok(())
}

/// Split `key = value`, dropping trailing comments
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(&line[eq_pos + 1..]).trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Cut at the first `#` outside a quoted string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &value[..i],
            _ => {}
        }
    }
    value
}

/// Parse a string value into a bounded string
///
/// Quoted values may use the basic escapes `\"`, `\\`, `\n`, `\t` and `\r`.
/// Unquoted values are taken verbatim.
fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    let Some(quoted) = value.strip_prefix('"') else {
        out.push_str(value).map_err(|_| ConfigError::TooLong)?;
        return Ok(out);
    };

    let mut chars = quoted.chars();
    loop {
        let c = match chars.next().ok_or(ConfigError::InvalidValue)? {
            '"' => break,
            '\\' => match chars.next().ok_or(ConfigError::InvalidValue)? {
                '"' => '"',
                '\\' => '\\',
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                _ => return Err(ConfigError::InvalidValue),
            },
            c => c,
        };
        out.push(c).map_err(|_| ConfigError::TooLong)?;
    }

    // Nothing may follow the closing quote
    if !chars.as_str().is_empty() {
        return Err(ConfigError::InvalidValue);
    }
    Ok(out)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

/// Parse an integer that must be at least 1
fn parse_positive<T>(value: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr + PartialOrd + From<u8>,
{
    let n: T = parse_int(value)?;
    if n < T::from(1) {
        return Err(ConfigError::InvalidValue);
    }
    Ok(n)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_refresh_class(value: &str) -> Result<RefreshClass, ConfigError> {
    let class: String<8> = parse_string(value).map_err(|_| ConfigError::InvalidValue)?;
    match class.as_str() {
        "partial" => Ok(RefreshClass::FastPartial),
        "full" => Ok(RefreshClass::FullOnly),
        _ => Err(ConfigError::InvalidValue),
    }
}
