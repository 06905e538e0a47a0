use serde::Deserialize;

/// Tunables of one splitting run.
///
/// The builder on `ReadPartitionSplitter` is the primary configuration
/// path; `Settings` maps a config file and `TUNDRA_PARTITION`-prefixed
/// environment variables onto the same knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_max_record_in_partition")]
    pub max_record_in_partition: i64,
    #[serde(default = "default_max_record_ratio")]
    pub max_record_ratio: i64,
    #[serde(default = "default_count_num_of_thread")]
    pub count_num_of_thread: usize,
    #[serde(default)]
    pub count_is_slow: bool,
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
}

fn default_max_record_in_partition() -> i64 {
    500_000
}

fn default_max_record_ratio() -> i64 {
    4
}

fn default_count_num_of_thread() -> usize {
    3
}

fn default_drain_interval_ms() -> u64 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_record_in_partition: default_max_record_in_partition(),
            max_record_ratio: default_max_record_ratio(),
            count_num_of_thread: default_count_num_of_thread(),
            count_is_slow: false,
            drain_interval_ms: default_drain_interval_ms(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let config_file_path = std::env::var("PARTITION_CONFIG_PATH")
            .unwrap_or_else(|_| "config/partition.toml".to_string());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&config_file_path).required(false))
            .add_source(config::Environment::with_prefix("TUNDRA_PARTITION").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Upper bound on an accepted partition's estimated row count.
    pub fn upper_bound(&self) -> i64 {
        self.max_record_in_partition * self.max_record_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let s = Settings::default();
        assert_eq!(s.max_record_in_partition, 500_000);
        assert_eq!(s.max_record_ratio, 4);
        assert_eq!(s.count_num_of_thread, 3);
        assert!(!s.count_is_slow);
        assert_eq!(s.upper_bound(), 2_000_000);
    }
}
