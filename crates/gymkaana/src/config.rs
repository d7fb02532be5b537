//! CLI configuration: thin wrapper around `gymkaana_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, etc.).

use secrecy::SecretString;

use gymkaana_core::CheckinConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use gymkaana_config::{
    Config, Profile, config_path, load_config, save_config, store_token,
};

/// A profile resolved against the command line.
#[derive(Debug)]
pub struct ResolvedProfile {
    pub name: String,
    pub checkin: CheckinConfig,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Build a `CheckinConfig` from the config file, profile, and CLI overrides.
///
/// CLI flags take priority over profile values. Without a matching profile,
/// `--api-url` and `--token` alone are enough.
pub fn resolve_checkin_config(global: &GlobalOpts) -> Result<ResolvedProfile, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.api_url.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(profile_not_found(&cfg, name));
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let checkin = match global.token {
        Some(ref token) => gymkaana_config::build_checkin_config(
            &profile,
            &cfg.defaults,
            SecretString::from(token.clone()),
        )?,
        None => gymkaana_config::profile_to_checkin_config(&profile, &name, &cfg.defaults)?,
    };

    Ok(ResolvedProfile { name, checkin })
}

/// `ProfileNotFound` listing what is configured.
pub fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}
