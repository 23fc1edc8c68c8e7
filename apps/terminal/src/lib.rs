//! # Duka Terminal Library
//!
//! Terminal front end for Duka POS: a counter-side shell for building a
//! sale, recording it and asking the assistant about the day's takings.
//!
//! ## Module Organization
//! ```text
//! duka_terminal/
//! ├── lib.rs          ◄─── You are here (startup & AppContext)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── draft.rs    ◄─── Checkout (draft + cash tendered)
//! │   ├── ledger.rs   ◄─── Shared ledger
//! │   ├── config.rs   ◄─── Shop configuration, currency formatting
//! │   ├── remote.rs   ◄─── Classifier and sink handles
//! │   ├── busy.rs     ◄─── In-flight guard
//! │   └── clock.rs    ◄─── Injected "now"
//! ├── commands/       ◄─── draft, sale, summary, assistant
//! ├── shell.rs        ◄─── rustyline loop and dispatch
//! ├── output.rs       ◄─── Plain-text rendering
//! └── error.rs        ◄─── ApiError / ShellError
//! ```

pub mod commands;
pub mod error;
pub mod output;
pub mod shell;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use duka_remote::RemoteConfig;

use error::ShellError;
use shell::Shell;
use state::{BusyFlag, Clock, ConfigState, DraftState, LedgerState, RemoteState, SystemClock};

/// Every state object the shell lends to commands.
///
/// The assistant and recording each have their own busy flag so a slow
/// classifier call never blocks the till.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub draft: DraftState,
    pub ledger: LedgerState,
    pub config: ConfigState,
    pub remote: RemoteState,
    pub clock: Arc<dyn Clock>,
    pub assistant_busy: BusyFlag,
    pub recording_busy: BusyFlag,
}

impl AppContext {
    pub fn new(config: ConfigState, remote: RemoteState, clock: Arc<dyn Clock>) -> Self {
        AppContext {
            draft: DraftState::new(),
            ledger: LedgerState::new(),
            config,
            remote,
            clock,
            assistant_busy: BusyFlag::new(),
            recording_busy: BusyFlag::new(),
        }
    }
}

/// Runs the terminal application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,duka=debug,reqwest=warn; override with RUST_LOG     │
/// │                                                                         │
/// │  2. Load Remote Configuration ────────────────────────────────────────► │
/// │     • remote.toml in the platform config dir, then DUKA_* env           │
/// │     • Invalid file: warn and continue offline                           │
/// │                                                                         │
/// │  3. Initialize State Objects ─────────────────────────────────────────► │
/// │     • RemoteState: Gemini or offline classifier, webhook or disabled    │
/// │     • ConfigState: from DUKA_* env                                      │
/// │     • Empty checkout and ledger, system clock                           │
/// │                                                                         │
/// │  4. Build Runtime & Run Shell ────────────────────────────────────────► │
/// │     • Interactive, or script mode when DUKA_SCRIPT is set               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), ShellError> {
    init_tracing();

    info!("Starting Duka POS terminal");

    let remote_config = RemoteConfig::load_or_default(None);
    let remote = RemoteState::from_config(&remote_config)?;
    let config = ConfigState::from_env();
    info!(store = %config.store_name, currency = %config.currency_code, "Configuration loaded");

    let app = AppContext::new(config, remote, Arc::new(SystemClock));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    Shell::new(app, runtime).run()?;

    info!("Shell closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=duka=trace` - Show trace for duka crates only
/// - Default: INFO, DEBUG for duka crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,duka=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
