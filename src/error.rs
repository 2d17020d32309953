//! Configuration errors.

use thiserror::Error;

/// Problems found while reading or validating configuration.
///
/// None of these are fatal: the imperative API reports them through `log`
/// and returns its usual failure value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `minLength` is greater than `maxLength`
    #[error("minLength ({min}) exceeds maxLength ({max})")]
    InvalidLengthRange { min: usize, max: usize },
    /// A JSON configuration blob could not be parsed
    #[error("invalid JSON in {attribute} attribute: {source}")]
    InvalidJson {
        attribute: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// An override attribute carried a value of the wrong shape
    #[error("invalid value {value:?} for {attribute} attribute")]
    InvalidAttribute { attribute: &'static str, value: String },
    /// A preset file could not be parsed
    #[cfg(feature = "toml")]
    #[error("invalid options preset: {0}")]
    InvalidPreset(#[from] toml::de::Error),
}
