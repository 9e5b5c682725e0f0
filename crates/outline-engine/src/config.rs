use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "data/tree.json";
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Runtime settings, read from `OUTLINE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    /// Buffered updates per subscriber before it starts lagging.
    pub broadcast_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("OUTLINE_DATA_FILE").filter(|p| !p.is_empty()) {
            config.data_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup("OUTLINE_BROADCAST_CAPACITY") {
            match raw.parse::<usize>() {
                Ok(capacity) if capacity > 0 => config.broadcast_capacity = capacity,
                _ => tracing::warn!(value = %raw, "ignoring invalid OUTLINE_BROADCAST_CAPACITY"),
            }
        }
        config
    }

    /// Applies command line overrides (`--data <path>`).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg.as_ref() == "--data" {
                if let Some(path) = args.next() {
                    self.data_file = PathBuf::from(path.as_ref());
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_env_and_ignores_bad_capacity() {
        let config = Config::from_lookup(lookup(&[
            ("OUTLINE_DATA_FILE", "/srv/outline.json"),
            ("OUTLINE_BROADCAST_CAPACITY", "zero"),
        ]));
        assert_eq!(config.data_file, PathBuf::from("/srv/outline.json"));
        assert_eq!(config.broadcast_capacity, DEFAULT_BROADCAST_CAPACITY);

        let config = Config::from_lookup(lookup(&[("OUTLINE_BROADCAST_CAPACITY", "8")]));
        assert_eq!(config.broadcast_capacity, 8);
    }

    #[test]
    fn data_flag_overrides_env() {
        let config = Config::default().with_args(["outline", "--data", "other.json"]);
        assert_eq!(config.data_file, PathBuf::from("other.json"));
    }
}
