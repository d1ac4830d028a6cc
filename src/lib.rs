pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod summary;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::Settings;
pub use error::{EtlError, Result};
pub use normalize::{normalize_countries, Normalized, Relations};
pub use pipeline::{run_once, run_pipeline, FileSource, RecordSource, RunSummary};
pub use writer::{LoadStats, SchemaBuilder};
