use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Portfolio has {assets} assets but {series} aligned series were provided.")]
    AssetCountMismatch { assets: usize, series: usize },
}
