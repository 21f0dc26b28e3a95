//! Process wide defaults used by the analysis builders
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Default parameters for graph analyses
///
/// Builders such as [`crate::centrality::metaborank::MetaboRankBuilder`] read their defaults from
/// the global [`CONFIGURATION`], so updating it changes the defaults of every analysis created
/// afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Lower flux bound of reactions built without one
    pub lower_bound: f64,
    /// Upper flux bound of reactions built without one
    pub upper_bound: f64,
    /// Damping factor of the MetaboRank power iteration
    pub damping: f64,
    /// L1 change between successive score vectors below which power iteration stops
    pub tolerance: f64,
    /// Maximum number of power iterations
    pub max_iterations: usize,
    /// Exponent applied to vertex degree by the degree weighting policy
    pub degree_power: f64,
    /// Default number of alternative paths for k-shortest path searches
    pub k_paths: usize,
    /// Regex matching the compartment suffix of a metabolite id (e.g. `_c` in `glc__D_c`)
    pub compartment_suffix: String,
    /// Number of bits in a structural fingerprint
    pub fingerprint_bits: usize,
    /// Length of the SMILES substrings hashed into a fingerprint
    pub fingerprint_ngram: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: 0.,
            upper_bound: 1000.,
            damping: 0.85,
            tolerance: 0.001,
            max_iterations: 15000,
            degree_power: 2.0,
            k_paths: 3,
            compartment_suffix: String::from("_[A-Za-z0-9]{1,2}$"),
            fingerprint_bits: 1024,
            fingerprint_ngram: 3,
        }
    }
}

impl Configuration {
    /// Read a configuration from a JSON string, missing fields take their default value
    ///
    /// # Examples
    /// ```rust
    /// use metnet_core::configuration::Configuration;
    /// let config = Configuration::from_json(r#"{"damping": 0.9}"#).unwrap();
    /// assert_eq!(config.damping, 0.9);
    /// assert_eq!(config.max_iterations, 15000);
    /// ```
    pub fn from_json(json: &str) -> Result<Configuration, ConfigurationError> {
        let config: Configuration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters are usable
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigurationError::InvalidValue {
                field: "damping",
                reason: format!("{} is not within [0, 1]", self.damping),
            });
        }
        if !(self.tolerance > 0.0) {
            return Err(ConfigurationError::InvalidValue {
                field: "tolerance",
                reason: format!("{} is not positive", self.tolerance),
            });
        }
        if self.fingerprint_bits == 0 || self.fingerprint_ngram == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "fingerprint",
                reason: String::from("fingerprint size and n-gram length must be non-zero"),
            });
        }
        regex::Regex::new(&self.compartment_suffix)?;
        Ok(())
    }

    /// Replace the global configuration
    pub fn install(self) -> Result<(), ConfigurationError> {
        self.validate()?;
        match CONFIGURATION.write() {
            Ok(mut guard) => {
                *guard = self;
                Ok(())
            }
            Err(_) => Err(ConfigurationError::Poisoned),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Unable to parse configuration: {0}")]
    UnableToParse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("Invalid compartment suffix pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Global configuration lock was poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.damping, 0.85);
        assert_eq!(config.tolerance, 0.001);
        assert_eq!(config.max_iterations, 15000);
        assert_eq!(config.degree_power, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json() {
        let config = Configuration::from_json(r#"{"k_paths": 5, "tolerance": 1e-6}"#).unwrap();
        assert_eq!(config.k_paths, 5);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.damping, 0.85);
    }

    #[test]
    fn invalid_values() {
        assert!(Configuration::from_json(r#"{"damping": 1.5}"#).is_err());
        assert!(Configuration::from_json(r#"{"compartment_suffix": "(["}"#).is_err());
        assert!(Configuration::from_json("not json").is_err());
    }
}
