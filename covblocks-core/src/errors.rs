use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Duplicate chromosome name in registry: {0}")]
    DuplicateChromosome(String),

    #[error("Reference ids must cover 0..{expected} exactly once, found {found}")]
    InvalidRefId { expected: usize, found: u32 },

    #[error("Error parsing chromosome sizes at line {line}: {reason}")]
    ChromSizesParseError { line: usize, reason: String },

    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Fragment block at {start}+{offset} of length {length} overflows the coordinate range")]
    CoordinateOverflow { start: u32, offset: u32, length: u32 },

    #[error("Number of threads must be at least 1, got {0}")]
    InvalidThreadCount(usize),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
