pub const COV_FILE_EXTENSION: &str = "cov";

/// Leading bytes of every COV container.
pub const COV_MAGIC: &[u8; 4] = b"COVB";
pub const COV_FORMAT_VERSION: u8 = 1;

/// ref id (u32), name length (u32), chromosome length (u32), empty name
pub const MIN_CHROM_ENTRY_SIZE: u64 = 4 + 4 + 4;

/// offset (u64), compressed length (u64), number of runs (u32)
pub const INDEX_ENTRY_SIZE: u64 = 8 + 8 + 4;

/// The trailing index offset.
pub const FOOTER_SIZE: u64 = 8;
