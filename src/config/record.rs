//! Config records: one TCP port paired with its dd-style parameter string.

use std::collections::HashMap;

/// Immutable pairing of a TCP port with the raw `dd` operand string that
/// parameterizes transfers on that port (e.g. `of=/dev/sdb bs=4096`).
///
/// The token vector and key/value map are derived on demand; both are pure
/// functions of the raw string, so re-deriving is always safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    port: u16,
    raw_parameters: String,
}

impl ConfigRecord {
    /// Create a record. The parameter string is stored verbatim.
    pub fn new(port: u16, raw_parameters: impl Into<String>) -> Self {
        Self {
            port,
            raw_parameters: raw_parameters.into(),
        }
    }

    /// TCP port this record listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The raw parameter string, exactly as it appeared in the config file.
    pub fn raw_parameters(&self) -> &str {
        &self.raw_parameters
    }

    /// Split the parameter string on single spaces, preserving order.
    ///
    /// Tokens without `=` are kept here even though they never reach the map.
    pub fn parameter_tokens(&self) -> Vec<String> {
        self.raw_parameters.split(' ').map(str::to_owned).collect()
    }

    /// Parse the parameter string into a key/value map.
    ///
    /// Each token is split at its first `=`; tokens without `=` and tokens
    /// with an empty key are omitted. A repeated key keeps the later value.
    pub fn parameter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for token in self.raw_parameters.split(' ') {
            let (key, value) = match token.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            if key.is_empty() {
                continue;
            }
            map.insert(key.to_owned(), value.to_owned());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_and_raw_parameters_are_stored_verbatim() {
        let record = ConfigRecord::new(12345, "of=/tmp/f12345");
        assert_eq!(record.port(), 12345);
        assert_eq!(record.raw_parameters(), "of=/tmp/f12345");
    }

    #[test]
    fn tokens_preserve_order() {
        let record = ConfigRecord::new(11111, "of=/tmp/f11111 bs=1024 seek=1");
        assert_eq!(
            record.parameter_tokens(),
            vec!["of=/tmp/f11111", "bs=1024", "seek=1"]
        );

        let single = ConfigRecord::new(12345, "of=/tmp/f12345");
        assert_eq!(single.parameter_tokens(), vec!["of=/tmp/f12345"]);
    }

    #[test]
    fn map_splits_at_first_equals() {
        let record = ConfigRecord::new(11111, "of=/tmp/f11111 bs=1024 seek=1");
        let map = record.parameter_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["of"], "/tmp/f11111");
        assert_eq!(map["bs"], "1024");
        assert_eq!(map["seek"], "1");

        // A value containing '=' keeps everything after the first one.
        let record = ConfigRecord::new(10000, "of=/tmp/a=b");
        assert_eq!(record.parameter_map()["of"], "/tmp/a=b");
    }

    #[test]
    fn map_skips_tokens_without_equals_and_empty_keys() {
        let record = ConfigRecord::new(10000, "verbose of=/tmp/f10000 =orphan");
        let tokens = record.parameter_tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], "verbose");

        let map = record.parameter_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["of"], "/tmp/f10000");
    }

    #[test]
    fn map_keeps_later_value_for_repeated_key() {
        let record = ConfigRecord::new(10000, "of=/tmp/first of=/tmp/second");
        assert_eq!(record.parameter_map()["of"], "/tmp/second");
    }

    #[test]
    fn derivation_is_idempotent() {
        let record = ConfigRecord::new(11111, "of=/tmp/f11111 bs=1024 seek=1");
        assert_eq!(record.parameter_tokens(), record.parameter_tokens());
        assert_eq!(record.parameter_map(), record.parameter_map());
    }
}
