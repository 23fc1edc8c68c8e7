//! # State Module
//!
//! Owned state handed to commands. Each command takes only the pieces it
//! touches, so tests can build exactly what they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppContext                                 │   │
//! │  │  built once in `run()` (or by a test) and lent to the shell     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │      ┌──────────────┬────────┴─────┬──────────────┬──────────────┐     │
//! │      ▼              ▼              ▼              ▼              ▼      │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐  │
//! │  │DraftState│  │LedgerSt. │  │ConfigSt. │  │RemoteSt. │  │ BusyFlag │  │
//! │  │Arc<Mutex │  │Arc<RwLock│  │ currency │  │classifier│  │ x2       │  │
//! │  │<Checkout>│  │<Ledger>> │  │ credit   │  │ sink     │  │ + Clock  │  │
//! │  └──────────┘  └──────────┘  └──────────┘  └──────────┘  └──────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DraftState: Mutex, never held across an await                       │
//! │  • LedgerState: RwLock, many readers, one committer                    │
//! │  • ConfigState / RemoteState: read-only after initialization           │
//! │  • BusyFlag: AtomicBool with an RAII guard                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod busy;
mod clock;
mod config;
mod draft;
mod ledger;
mod remote;

pub use busy::{BusyFlag, BusyGuard};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ConfigState;
pub use draft::{Checkout, DraftState};
pub use ledger::LedgerState;
pub use remote::RemoteState;
