//! # Duka Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Terminal                                │
//! │                                                                         │
//! │  stdin ──► Shell (rustyline / script) ──► commands ──► state            │
//! │                                             │                           │
//! │                         ┌───────────────────┴───────────────┐           │
//! │                         ▼                                   ▼           │
//! │                  duka-core (ledger)              duka-remote (HTTP)     │
//! │                                                                         │
//! │  stdout: shell output           stderr: tracing logs                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match duka_terminal::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("duka: {e}");
            ExitCode::FAILURE
        }
    }
}
