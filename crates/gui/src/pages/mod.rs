#![forbid(unsafe_code)]

pub mod run_node;
pub mod versions;

pub use run_node::{RunNodePage, RunNodeTab};
pub use versions::PipelineVersionsPage;
