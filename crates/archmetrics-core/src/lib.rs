pub mod adf;
pub mod aggregation;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod health;
pub mod traits;
pub mod types;

pub use adf::*;
pub use aggregation::*;
pub use collector::*;
pub use config::{
    ArchitectureConfig, CollectorSettings, GitHubConfig, LoggingConfig, ServerConfig, Settings,
};
pub use error::*;
pub use export::*;
pub use extractor::*;
pub use health::*;
pub use traits::*;
pub use types::*;
