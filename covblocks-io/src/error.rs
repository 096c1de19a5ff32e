use thiserror::Error;

use covblocks_core::StrandClass;
use covblocks_depth::DepthError;

#[derive(Error, Debug)]
pub enum CovError {
    #[error("Not a COV container: bad magic bytes")]
    BadMagic,

    #[error("Unsupported COV format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Track for ref id {ref_id} ({class}) was already written")]
    DuplicateTrack { ref_id: u32, class: StrandClass },

    #[error("Unknown chromosome ref id {0}")]
    UnknownRefId(u32),

    #[error("Corrupt COV container: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Depth(#[from] DepthError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CovError>;
