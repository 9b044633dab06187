pub mod engine;
pub mod introspect;
pub mod pipeline;
pub mod serialize;
pub mod synthesize;

pub use crate::domain::model::{StructuralModel, TestCaseSet};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
