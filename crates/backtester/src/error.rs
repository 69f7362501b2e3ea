use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Invalid backtest request: {0}")]
    InvalidRequest(#[from] core_types::CoreError),

    #[error("Series alignment failed: {0}")]
    Aligner(#[from] aligner::AlignerError),

    #[error("Simulation failed: {0}")]
    Simulator(#[from] simulator::SimulatorError),

    #[error("Analysis failed: {0}")]
    Metrics(#[from] metrics::MetricsError),

    #[error("Rolling-window analysis failed: {0}")]
    Rolling(#[from] rolling::RollingError),
}
