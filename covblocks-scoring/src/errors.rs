use thiserror::Error;

use covblocks_core::CoreError;
use covblocks_depth::DepthError;

///
/// Why a single feature definition line was rejected. These are expected for
/// real-world annotation files; the loader reports and skips them.
///
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    #[error("column {column} is not a valid integer: {value:?}")]
    InvalidInteger { column: &'static str, value: String },

    #[error("block count is {declared} but {lengths} lengths and {offsets} offsets were given")]
    BlockCountMismatch {
        declared: usize,
        lengths: usize,
        offsets: usize,
    },

    #[error("composite name needs at least {expected} '/'-separated fields, found {found}")]
    CompositeFieldCount { expected: usize, found: usize },

    #[error("unknown feature mode prefix: {0:?}")]
    UnknownMode(String),

    #[error("composite name field {field} is invalid: {value:?}")]
    InvalidNameField { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid directionality: {0}")]
    InvalidDirectionality(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Depth(#[from] DepthError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
