mod engine;
mod monitor;

pub(crate) use engine::{
    LaunchedProcess, TransferEngine, TransferHandle, TransferLauncher, TransferOutcome,
    spawn_with_combined_output,
};
