pub mod fragment;
pub mod registry;
pub mod strand;

// re-export for cleaner imports
pub use self::fragment::{Fragment, FragmentBlock};
pub use self::registry::{ChromEntry, ChromosomeRegistry};
pub use self::strand::{Strand, StrandClass};
