// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{AssetSettings, BacktestConfig, PortfolioSettings};

/// How far allocation fractions may drift from summing to exactly 1 before
/// the request is rejected.
const ALLOCATION_SUM_TOLERANCE: f64 = 1e-6;

/// Loads a backtest request from a TOML file.
///
/// This is where caller-side invariants are enforced: the engine itself
/// trusts the request as given, so allocation sums and fraction ranges are
/// validated here, at the input layer.
pub fn load_config(path: &str) -> Result<BacktestConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;

    let config = builder.try_deserialize::<BacktestConfig>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &BacktestConfig) -> Result<(), ConfigError> {
    if config.assets.is_empty() {
        return Err(ConfigError::Validation(
            "the request defines no assets".to_string(),
        ));
    }

    for asset in &config.assets {
        if !(0.0..=1.0).contains(&asset.allocation) {
            return Err(ConfigError::Validation(format!(
                "asset '{}' has allocation {} outside [0, 1]",
                asset.name, asset.allocation
            )));
        }
        if !(0.0..1.0).contains(&asset.fee) {
            return Err(ConfigError::Validation(format!(
                "asset '{}' has annual fee {} outside [0, 1)",
                asset.name, asset.fee
            )));
        }
    }

    let total: f64 = config.assets.iter().map(|a| a.allocation).sum();
    if (total - 1.0).abs() > ALLOCATION_SUM_TOLERANCE {
        return Err(ConfigError::Validation(format!(
            "asset allocations sum to {total}, expected 1"
        )));
    }

    Ok(())
}
