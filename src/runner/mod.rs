mod batch;
mod orchestrator;

pub use batch::partition;
pub use orchestrator::{
    BatchOptions, BatchOutcome, BatchStatus, Orchestrator, OutputSpec, RunReport,
};
