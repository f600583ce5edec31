//! VeilVote election core: the single owner of the membership registry and
//! the eligibility guard, exposed through an async service facade.
//!
//! External collaborators (serial bridge, HTTP surface, chain publisher) are
//! out of scope; this crate only provides their boundary contracts: scan
//! processing, eligibility queries, vote confirmation, and an event stream
//! carrying processed-voter and root-update notifications.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod events;
pub mod guard;
pub mod registry;
pub mod roster;
pub mod service;
pub mod shutdown;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GuardConfig;
pub use events::{ElectionEvent, EventBus};
pub use guard::{EligibilityGuard, IdentityState};
pub use registry::CommitmentRegistry;
pub use roster::IdentityResolver;
pub use service::{ElectionService, ElectionStats, EligibilityReport, ScanOutcome};
pub use shutdown::{shutdown_channel, ShutdownHandle};
pub use sweeper::CooldownSweeper;
