pub mod curation_flow;
pub mod run_state;

pub use curation_flow::CurationFlow;
pub use run_state::{RunState, RunTrace};
