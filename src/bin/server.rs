//! Agena prioritization server.
//! Run with: cargo run --bin agena-server

use std::process::ExitCode;

use agena::start_agena;

fn main() -> ExitCode {
    start_agena::run()
}
