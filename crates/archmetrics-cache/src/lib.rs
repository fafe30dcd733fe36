pub mod architecture_cache;
pub mod cache;

pub use architecture_cache::*;
pub use cache::*;
