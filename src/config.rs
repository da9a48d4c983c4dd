use chrono::Duration;
use log::LevelFilter;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::PathBuf};
use toml;

use crate::utils::SingleInit;

static CONFIG: SingleInit<Config> = SingleInit::uninit();

pub fn load() -> crate::Result<&'static Config> {
    CONFIG.get_or_try_init(|| {
        let data = fs::read("config.toml").map_err(ReadConfigurationError)?;
        from_slice(&data)
    })
}

fn from_slice(data: &[u8]) -> crate::Result<Config> {
    toml::from_slice(data).map_err(|e| ConfigurationError(e).into())
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database: Option<Database>,
    #[serde(default)]
    pub review: Review,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    /// Validate configuration correctness.
    pub fn validate(&self) -> Result<(), failure::Error> {
        ensure!(
            self.review.durations.len() == CLASS_COUNT,
            "review.durations must have exactly {} entries, one per document \
            class",
            CLASS_COUNT,
        );
        ensure!(
            !self.review.return_codes.is_empty(),
            "review.return_codes cannot be empty",
        );
        ensure!(
            !self.metadata.statuses.is_empty(),
            "metadata.statuses cannot be empty",
        );

        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Database {
    /// Database connection URL.
    pub url: String,
}

/// Number of document classes. Classes rank documents by criticality, and
/// select the review duration.
pub const CLASS_COUNT: usize = 4;

/// Review configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Review {
    /// Review duration in days, indexed by document class.
    #[serde(default = "default_durations")]
    pub durations: Vec<i64>,
    /// Known return codes, ordered from least to most severe.
    #[serde(default = "default_return_codes")]
    pub return_codes: Vec<String>,
}

impl Review {
    /// Review duration for a document class.
    pub fn duration_for_class(&self, docclass: i32) -> Duration {
        let inx = (docclass as usize).saturating_sub(1)
            .min(self.durations.len() - 1);
        Duration::days(self.durations[inx])
    }

    /// Severity rank of a return code.
    ///
    /// Codes missing from the configured list rank above all known ones.
    pub fn return_code_ordinal(&self, code: &str) -> usize {
        self.return_codes.iter()
            .position(|known| known == code)
            .unwrap_or(usize::max_value())
    }

    /// Pick the most severe of a set of return codes.
    pub fn worst_return_code<'c, I>(&self, codes: I) -> Option<&'c str>
    where
        I: IntoIterator<Item = &'c str>,
    {
        codes.into_iter()
            .max_by_key(|code| self.return_code_ordinal(code))
    }
}

/// Revision metadata configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Metadata {
    /// Vocabulary of revision statuses.
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

/// File storage configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
    /// Directory where review comment files are kept.
    #[serde(default = "default_comments_path")]
    pub comments: PathBuf,
    /// Directory where generated exports are kept.
    #[serde(default = "default_exports_path")]
    pub exports: PathBuf,
}

/// Logging configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Logging {
    /// Default logging level.
    #[serde(default = "default_level_filter")]
    pub level: LevelFilter,
    /// Custom filters.
    #[serde(default)]
    pub filters: HashMap<String, LevelFilter>,
}

#[derive(Debug, Fail)]
#[fail(display = "Cannot read configuration file")]
pub struct ReadConfigurationError(#[fail(cause)] std::io::Error);

#[derive(Debug, Fail)]
#[fail(display = "Invalid configuration: {}", _0)]
pub struct ConfigurationError(#[fail(cause)] toml::de::Error);

fn default_durations() -> Vec<i64> {
    vec![4, 8, 13, 13]
}

fn default_return_codes() -> Vec<String> {
    ["0", "1", "2", "3", "4"].iter().map(|s| s.to_string()).collect()
}

fn default_statuses() -> Vec<String> {
    ["STD", "IDC", "IFR", "FIN", "ASB"].iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_comments_path() -> PathBuf {
    PathBuf::from("comments")
}

fn default_exports_path() -> PathBuf {
    PathBuf::from("exports")
}

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

impl Default for Review {
    fn default() -> Self {
        Review {
            durations: default_durations(),
            return_codes: default_return_codes(),
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            statuses: default_statuses(),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Storage {
            comments: default_comments_path(),
            exports: default_exports_path(),
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: default_level_filter(),
            filters: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_configuration_uses_defaults() {
        let config = from_slice(br#"
            [database]
            url = "postgres://localhost/docflow"
        "#).unwrap();

        config.validate().unwrap();
        assert_eq!(config.review.durations, [4, 8, 13, 13]);
        assert_eq!(config.logging.level, LevelFilter::Info);
    }

    #[test]
    fn duration_follows_document_class() {
        let review = Review::default();

        assert_eq!(review.duration_for_class(1), Duration::days(4));
        assert_eq!(review.duration_for_class(2), Duration::days(8));
        assert_eq!(review.duration_for_class(4), Duration::days(13));
    }

    #[test]
    fn worst_return_code_uses_configured_order() {
        let review = Review {
            durations: default_durations(),
            return_codes: vec!["0".into(), "1".into(), "2".into(), "3".into()],
        };

        assert_eq!(review.worst_return_code(vec!["1", "3", "2"]), Some("3"));
        assert_eq!(review.worst_return_code(vec!["2", "2"]), Some("2"));
        assert_eq!(review.worst_return_code(Vec::new()), None);
    }

    #[test]
    fn unknown_return_codes_rank_most_severe() {
        let review = Review::default();

        assert_eq!(review.worst_return_code(vec!["1", "XX"]), Some("XX"));
    }
}
