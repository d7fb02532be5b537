//! One-shot lookup, accept and reject handlers.

use serde::Serialize;

use gymkaana_core::{
    BookingRecord, CheckinBackend, CheckinController, Decision, RejectionReason, ScanState,
    normalize_scan,
};

use crate::cli::{AcceptArgs, GlobalOpts, LookupArgs, RejectArgs, RejectReason};
use crate::config::ResolvedProfile;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Rendering ───────────────────────────────────────────────────────

/// Key/value block for a booking under review.
pub fn detail(r: &BookingRecord) -> String {
    let mut lines = vec![
        format!("Member:   {}", r.member_name),
        format!("Plan:     {}", r.plan_name),
        format!("Status:   {}", r.status),
        format!("Booking:  {}", r.id),
    ];
    if let Some(ref gym) = r.gym_name {
        lines.push(format!("Gym:      {gym}"));
    }
    if let Some(until) = r.valid_until {
        lines.push(format!("Valid:    until {}", until.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(ref photo) = r.photo_url {
        lines.push(format!("Photo:    {photo}"));
    }
    lines.join("\n")
}

/// What was recorded, for structured output.
#[derive(Serialize)]
struct Outcome<'a> {
    booking_id: &'a str,
    member_name: &'a str,
    decision: Decision,
    reason: Option<&'a str>,
}

fn print_outcome(outcome: &Outcome<'_>, summary: &str, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        outcome,
        |_| output::ok(summary, color),
        |o| o.booking_id.to_owned(),
    );
    output::print_output(&out, global.quiet);
}

// ── Shared flow ─────────────────────────────────────────────────────

/// Submit `code` and expect the session to land in review.
async fn look_up<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    code: &str,
    profile: &str,
    quiet: bool,
) -> Result<BookingRecord, CliError> {
    let spinner = util::spinner("Looking up booking…", quiet);
    let state = ctl.submit_manual(code).await;
    spinner.finish_and_clear();

    match state {
        ScanState::Reviewing { record } => Ok(record.clone()),
        ScanState::Error { failure } => Err(CliError::from_failure(failure, Some(profile))),
        ScanState::Scanning { .. } => Err(CliError::Validation {
            field: "code".into(),
            reason: "booking code cannot be empty".into(),
        }),
        other => Err(CliError::Internal(format!(
            "unexpected {} state after lookup",
            other.phase()
        ))),
    }
}

fn reason_from_arg(arg: RejectReason) -> RejectionReason {
    match arg {
        RejectReason::BookingExpired => RejectionReason::BookingExpired,
        RejectReason::WrongGym => RejectionReason::WrongGym,
        RejectReason::IdentityMismatch => RejectionReason::IdentityMismatch,
        RejectReason::PlanNotValid => RejectionReason::PlanNotValid,
        RejectReason::Other => RejectionReason::Other,
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn lookup<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    args: LookupArgs,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let code = if args.scanned {
        normalize_scan(&args.code, &profile.checkin.prefix()).unwrap_or_default()
    } else {
        args.code
    };

    let record = look_up(ctl, &code, &profile.name, global.quiet).await?;
    let out = output::render_single(&global.output, &record, detail, |r| r.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn accept<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    args: AcceptArgs,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let record = look_up(ctl, &args.code, &profile.name, global.quiet).await?;

    if !global.yes {
        eprintln!("{}\n", detail(&record));
    }
    let question = format!("Accept check-in for {}?", record.member_name);
    if !util::confirm(&question, global.yes, "accept")? {
        ctl.reset().await;
        eprintln!("Aborted.");
        return Ok(());
    }

    let spinner = util::spinner("Confirming check-in…", global.quiet);
    let state = ctl.accept().await;
    spinner.finish_and_clear();

    match state {
        ScanState::Success { record } => {
            let summary = format!("{} checked in ({})", record.member_name, record.plan_name);
            let outcome = Outcome {
                booking_id: &record.id,
                member_name: &record.member_name,
                decision: Decision::Accept,
                reason: None,
            };
            print_outcome(&outcome, &summary, global);
            Ok(())
        }
        ScanState::Error { failure } => Err(CliError::from_failure(failure, Some(&profile.name))),
        other => Err(CliError::Internal(format!(
            "unexpected {} state after accept",
            other.phase()
        ))),
    }
}

pub async fn reject<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    args: RejectArgs,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reason = reason_from_arg(args.reason);
    let note = args.note.unwrap_or_default();
    if reason.requires_note() && note.trim().is_empty() {
        return Err(CliError::Validation {
            field: "note".into(),
            reason: "--note is required with --reason other".into(),
        });
    }
    if !reason.requires_note() && !note.is_empty() {
        tracing::warn!("--note is only sent with --reason other; ignoring it");
    }

    let record = look_up(ctl, &args.code, &profile.name, global.quiet).await?;

    ctl.begin_reject().await;
    ctl.select_reason(reason).await;
    ctl.edit_note(&note).await;
    let sent = ctl
        .state()
        .draft()
        .map(gymkaana_core::RejectionDraft::resolve)
        .transpose()?
        .unwrap_or_default();

    if !global.yes {
        eprintln!("{}\n", detail(&record));
    }
    let question = format!("Reject check-in for {} ({sent})?", record.member_name);
    if !util::confirm(&question, global.yes, "reject")? {
        ctl.reset().await;
        eprintln!("Aborted.");
        return Ok(());
    }

    let mut notices = ctl.notices();
    let spinner = util::spinner("Sending rejection…", global.quiet);
    let state = ctl.confirm_reject().await?;
    spinner.finish_and_clear();

    match state {
        ScanState::Scanning { .. } => {
            let summary = notices
                .try_recv()
                .unwrap_or_else(|_| format!("Check-in rejected for {}", record.member_name));
            let outcome = Outcome {
                booking_id: &record.id,
                member_name: &record.member_name,
                decision: Decision::Reject,
                reason: Some(&sent),
            };
            print_outcome(&outcome, &summary, global);
            Ok(())
        }
        ScanState::Error { failure } => Err(CliError::from_failure(failure, Some(&profile.name))),
        other => Err(CliError::Internal(format!(
            "unexpected {} state after reject",
            other.phase()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn detail_skips_missing_fields() {
        let mut record = BookingRecord {
            id: "bk_1".into(),
            member_name: "Asha Verma".into(),
            plan_name: "Monthly".into(),
            status: "Active".into(),
            photo_url: None,
            gym_name: None,
            valid_until: None,
        };
        let text = detail(&record);
        assert!(text.contains("Member:   Asha Verma"));
        assert!(!text.contains("Gym:"));

        record.valid_until = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).single();
        assert!(detail(&record).contains("Valid:    until 2026-03-01 18:30 UTC"));
    }

    #[test]
    fn every_reason_arg_maps() {
        assert_eq!(
            reason_from_arg(RejectReason::PlanNotValid),
            RejectionReason::PlanNotValid
        );
        assert!(reason_from_arg(RejectReason::Other).requires_note());
    }
}
