use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollingError {
    #[error("Simulation failed inside a rolling window: {0}")]
    Simulator(#[from] simulator::SimulatorError),
}
