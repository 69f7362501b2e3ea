use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("{metric} needs at least {needed} snapshots, got {got}.")]
    InsufficientData {
        metric: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Cannot compute growth from non-positive starting value {value}.")]
    NonPositiveBaseline { value: f64 },

    #[error("Snapshot series spans no elapsed time.")]
    ZeroDuration,

    #[error("{metric} evaluated to a non-finite value.")]
    NonFinite { metric: &'static str },

    #[error("Money-weighted return solve did not converge within {iterations} iterations.")]
    NonConvergent { iterations: usize },
}
