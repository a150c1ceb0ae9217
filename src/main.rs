//! task-graph - Graphviz diagrams of task runner manifests

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = task_graph::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
