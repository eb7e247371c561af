pub mod instance_ctx;
pub mod variety_selector;

pub use instance_ctx::InstanceCtx;
pub use variety_selector::{
    ChunkTracker, InstanceOutcome, Rejection, SelectionError, SelectionState, VarietySelector,
};
