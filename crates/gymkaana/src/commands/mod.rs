//! Command dispatch: bridges CLI args -> check-in controller -> output formatting.

pub mod checkin;
pub mod config_cmd;
pub mod reasons;
pub mod scan;
pub mod util;

use gymkaana_core::{CheckinBackend, CheckinController};

use crate::cli::{Command, GlobalOpts};
use crate::config::ResolvedProfile;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch<B: CheckinBackend>(
    cmd: Command,
    ctl: &mut CheckinController<B>,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Lookup(args) => checkin::lookup(ctl, args, profile, global).await,
        Command::Accept(args) => checkin::accept(ctl, args, profile, global).await,
        Command::Reject(args) => checkin::reject(ctl, args, profile, global).await,
        Command::Scan(args) => scan::handle(ctl, args, profile, global).await,
        // Handled before a backend is resolved.
        Command::Reasons | Command::Config(_) | Command::Completions(_) => Err(
            CliError::Internal("command does not need a backend session".into()),
        ),
    }
}
