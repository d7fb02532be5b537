//! Rejection reason listing.

use serde::Serialize;
use tabled::Tabled;

use gymkaana_core::RejectionReason;

use crate::cli::GlobalOpts;
use crate::output;

#[derive(Serialize)]
struct ReasonEntry {
    code: String,
    label: &'static str,
    requires_note: bool,
}

impl From<RejectionReason> for ReasonEntry {
    fn from(reason: RejectionReason) -> Self {
        Self {
            code: reason.to_string(),
            label: reason.label(),
            requires_note: reason.requires_note(),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReasonRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Note")]
    note: &'static str,
}

impl From<&ReasonEntry> for ReasonRow {
    fn from(e: &ReasonEntry) -> Self {
        Self {
            code: e.code.clone(),
            label: e.label,
            note: if e.requires_note { "required" } else { "" },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts) {
    let entries: Vec<ReasonEntry> = RejectionReason::all()
        .into_iter()
        .map(ReasonEntry::from)
        .collect();
    let out = output::render_list(
        &global.output,
        &entries,
        |e| ReasonRow::from(e),
        |e| e.code.clone(),
    );
    output::print_output(&out, global.quiet);
}
