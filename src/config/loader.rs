//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::record::ConfigRecord;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read at all.
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load config records from a file, one per accepted line, in source order.
pub fn load_config(path: &Path) -> Result<Vec<ConfigRecord>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_records(&content))
}

/// Parse config text into records.
///
/// Per line: lines starting with `#` or `;` are comments; a line without a
/// space has no parameters and is skipped; the substring before the first
/// space must parse as a port in 1..=65535 or the line is skipped; everything
/// after the first space becomes the record's parameter string, verbatim.
pub fn parse_records(content: &str) -> Vec<ConfigRecord> {
    let mut records = Vec::new();
    for line in content.lines() {
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let (port_str, parameters) = match line.split_once(' ') {
            Some(split) => split,
            None => continue,
        };
        let port = match port_str.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => continue,
        };
        records.push(ConfigRecord::new(port, parameters));
    }
    records
}
