pub mod directory;
pub mod fixture;
pub mod fmp;

pub use directory::DirectoryFileUniverse;
pub use fixture::{StaticFundamentals, StaticUniverse};
pub use fmp::FmpAdapter;
