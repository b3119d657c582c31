use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("Negative box dimension: {width}x{height}")]
    NegativeDimension { width: i32, height: i32 },
    #[error("Rectangle #{index} has a negative size: {width}x{height}")]
    InvalidRect { index: usize, width: i32, height: i32 },
    #[error("Population size must be at least 2, got {0}")]
    InvalidPopulation(usize),
    #[error("Iteration count must not be negative, got {0}")]
    NegativeIterations(i32),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PackError>;
