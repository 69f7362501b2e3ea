use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignerError {
    #[error("Portfolio has no assets to align.")]
    NoAssets,

    #[error("Asset {asset} has an empty price series.")]
    EmptySeries { asset: usize },

    #[error("The common date window from {start} to {end} is empty.")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error("Asset {asset} has no sample within tolerance of {date}.")]
    BoundaryNotFound { asset: usize, date: NaiveDate },

    #[error("Aligned series have differing point counts: {counts:?}.")]
    MisalignedSeries { counts: Vec<usize> },
}
