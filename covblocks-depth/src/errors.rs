use thiserror::Error;

use covblocks_core::CoreError;

#[derive(Error, Debug)]
pub enum DepthError {
    #[error("Fragment references unknown chromosome ref id {0}")]
    UnknownRefId(u32),

    #[error("Block [{start}, {end}) lies outside {chrom} (length {length})")]
    BlockOutOfBounds {
        chrom: String,
        start: u32,
        end: u32,
        length: u32,
    },

    #[error("Depth tracks are finalized; combine with another finalized map to reopen them")]
    AlreadyFinalized,

    #[error("Depth tracks must be finalized before they can be queried")]
    NotFinalized,

    #[error("Cannot combine a finalized depth map with a non-finalized one")]
    MixedFinalizeState,

    #[error("Cannot combine depth maps built over different chromosome registries")]
    RegistryMismatch,

    #[error("Invalid depth track: {0}")]
    InvalidTrack(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DepthError>;
