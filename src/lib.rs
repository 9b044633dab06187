pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig};
pub use core::engine::GeneratorEngine;
pub use core::pipeline::TestGenPipeline;
pub use utils::error::{GenError, Result};
