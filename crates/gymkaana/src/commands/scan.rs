//! Interactive check-in session.
//!
//! Walks the controller through every phase with terminal prompts. With
//! `--camera` the profile's decoder process feeds codes; otherwise the
//! owner types them. An empty code (or Ctrl-C while the camera is armed)
//! ends the session.

use std::io::{self, IsTerminal};

use dialoguer::{Input, Select};

use gymkaana_core::{
    CheckinBackend, CheckinController, CoreError, Phase, ProcessCamera, RejectionReason,
};

use crate::cli::{GlobalOpts, ScanArgs};
use crate::config::ResolvedProfile;
use crate::error::CliError;
use crate::output;

use super::checkin::detail;
use super::util::{self, prompt};

enum Step {
    Continue,
    Quit,
}

struct Ui {
    color: bool,
    quiet: bool,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    args: ScanArgs,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::NotInteractive {
            command: "scan".into(),
        });
    }

    let camera = if args.camera {
        Some(
            profile
                .checkin
                .camera()
                .map_err(|e| CliError::Camera {
                    message: e.to_string(),
                })?,
        )
    } else {
        None
    };
    let ui = Ui {
        color: output::should_color(&global.color),
        quiet: global.quiet,
    };
    let mut notices = ctl.notices();

    eprintln!(
        "{}",
        output::note(
            &format!("Check-in desk ready (profile '{}').", profile.name),
            ui.color
        )
    );

    loop {
        let step = match ctl.phase() {
            Phase::Scanning => match camera {
                Some(ref camera) => camera_step(ctl, camera, &ui).await,
                None => manual_step(ctl, &ui).await?,
            },
            Phase::Reviewing => review_step(ctl, &ui).await?,
            Phase::Rejecting => reject_step(ctl, &ui).await?,
            Phase::Success => {
                if let Some(record) = ctl.state().record() {
                    let line = format!("{} checked in ({})", record.member_name, record.plan_name);
                    eprintln!("{}", output::ok(&line, ui.color));
                }
                ctl.dismiss().await;
                Step::Continue
            }
            Phase::Error => error_step(ctl, &ui).await?,
            // Dispatch always settles before returning.
            Phase::Processing => {
                ctl.reset().await;
                Step::Continue
            }
        };

        while let Ok(notice) = notices.try_recv() {
            eprintln!("{}", output::ok(&notice, ui.color));
        }

        if matches!(step, Step::Quit) {
            break;
        }
    }

    Ok(())
}

// ── Phases ──────────────────────────────────────────────────────────

async fn camera_step<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    camera: &ProcessCamera,
    ui: &Ui,
) -> Step {
    if !ctl.camera_active() {
        ctl.start_live_scan(camera).await;
        if ctl.camera_active() {
            eprintln!(
                "{}",
                output::note(
                    &format!(
                        "Camera armed via `{}`. Show the member's QR code; Ctrl-C to stop.",
                        camera.program()
                    ),
                    ui.color
                )
            );
        }
        return Step::Continue;
    }

    let event = tokio::select! {
        event = ctl.next_decode() => event,
        _ = tokio::signal::ctrl_c() => None,
    };

    match event {
        Some(event) => {
            let spinner = util::spinner("Looking up booking…", ui.quiet);
            ctl.dispatch(event).await;
            spinner.finish_and_clear();
            Step::Continue
        }
        None => {
            ctl.stop_live_scan().await;
            Step::Quit
        }
    }
}

async fn manual_step<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    ui: &Ui,
) -> Result<Step, CliError> {
    let code: String = prompt(|| {
        Input::new()
            .with_prompt("Booking code (empty to quit)")
            .allow_empty(true)
            .interact_text()
    })
    .await?;

    if code.trim().is_empty() {
        return Ok(Step::Quit);
    }

    let spinner = util::spinner("Looking up booking…", ui.quiet);
    ctl.submit_manual(&code).await;
    spinner.finish_and_clear();
    Ok(Step::Continue)
}

async fn review_step<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    ui: &Ui,
) -> Result<Step, CliError> {
    if let Some(record) = ctl.state().record() {
        eprintln!("\n{}\n", detail(record));
    }

    let choice = prompt(|| {
        Select::new()
            .with_prompt("Decision")
            .items(&["Accept check-in", "Reject check-in", "Back to scanning"])
            .default(0)
            .interact()
    })
    .await?;

    match choice {
        0 => {
            let spinner = util::spinner("Confirming check-in…", ui.quiet);
            ctl.accept().await;
            spinner.finish_and_clear();
        }
        1 => {
            ctl.begin_reject().await;
        }
        _ => {
            ctl.reset().await;
        }
    }
    Ok(Step::Continue)
}

async fn reject_step<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    ui: &Ui,
) -> Result<Step, CliError> {
    let reasons = RejectionReason::all();
    let mut items: Vec<&'static str> = reasons.iter().map(|r| r.label()).collect();
    items.push("Cancel");

    let choice = prompt(move || {
        Select::new()
            .with_prompt("Reason for rejecting")
            .items(&items)
            .default(0)
            .interact()
    })
    .await?;

    let Some(&reason) = reasons.get(choice) else {
        ctl.cancel_reject().await;
        return Ok(Step::Continue);
    };
    ctl.select_reason(reason).await;

    if reason.requires_note() {
        let note: String = prompt(|| {
            Input::new()
                .with_prompt("Describe the reason")
                .allow_empty(true)
                .interact_text()
        })
        .await?;
        ctl.edit_note(&note).await;
    }

    let spinner = util::spinner("Sending rejection…", ui.quiet);
    let result = ctl.confirm_reject().await.map(|_| ());
    spinner.finish_and_clear();

    match result {
        Ok(()) => Ok(Step::Continue),
        // Incomplete draft: stay in the reject screen and ask again.
        Err(CoreError::Validation { message }) => {
            eprintln!("{}", output::fail(&message, ui.color));
            Ok(Step::Continue)
        }
        Err(e) => Err(e.into()),
    }
}

async fn error_step<B: CheckinBackend>(
    ctl: &mut CheckinController<B>,
    ui: &Ui,
) -> Result<Step, CliError> {
    if let Some(failure) = ctl.state().failure() {
        eprintln!("{}", output::fail(&failure.message, ui.color));
    }

    let choice = prompt(|| {
        Select::new()
            .with_prompt("What next?")
            .items(&["Scan again", "Quit"])
            .default(0)
            .interact()
    })
    .await?;

    if choice == 0 {
        ctl.retry().await;
        Ok(Step::Continue)
    } else {
        Ok(Step::Quit)
    }
}

