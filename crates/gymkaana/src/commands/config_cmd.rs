//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::{ExposeSecret, SecretString};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Read a non-empty token from the terminal without echo.
fn read_token() -> Result<SecretString, CliError> {
    let token = rpassword::prompt_password("Owner token: ").map_err(prompt_err)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(SecretString::from(token.to_owned()))
}

/// Copy of `cfg` safe to print.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

fn describe(cfg: &Config) -> String {
    let mut lines = vec![
        format!("Config:   {}", config::config_path().display()),
        format!(
            "Default:  {}",
            cfg.default_profile.as_deref().unwrap_or("(unset)")
        ),
        format!("Timeout:  {}s", cfg.defaults.timeout),
    ];

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        lines.push(String::new());
        lines.push(format!("[{name}]"));
        lines.push(format!("  api_url:  {}", p.api_url));
        let token = match (&p.token_env, &p.token) {
            (Some(env), _) => format!("${env}"),
            (None, Some(_)) => MASK.into(),
            (None, None) => "keyring".into(),
        };
        lines.push(format!("  token:    {token}"));
        if let Some(ref prefix) = p.scan_prefix {
            lines.push(format!("  prefix:   {prefix}"));
        }
        if let Some(ref cmd) = p.scanner_command {
            lines.push(format!("  scanner:  {}", cmd.join(" ")));
        }
        if let Some(ref ca) = p.ca_cert {
            lines.push(format!("  ca_cert:  {}", ca.display()));
        }
        if p.insecure == Some(true) {
            lines.push("  insecure: true".into());
        }
        if let Some(t) = p.timeout {
            lines.push(format!("  timeout:  {t}s"));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(&global.output, &cfg, describe, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: gymkaana config init");
                return Ok(());
            }
            let default = cfg.profile_name(None);
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = config::load_config()?;
            let name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&cfg, name));
            }

            let token = read_token()?;
            config::store_token(&name, token.expose_secret())?;
            eprintln!("✓ Token stored in system keyring for profile '{name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    // Merge into whatever is already on disk; refuse to clobber a broken file.
    let mut cfg = config::load_config()?;
    eprintln!("gymkaana -- check-in desk setup");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Backend URL")
        .default("https://api.gymkaana.com".into())
        .validate_with(|input: &String| -> Result<(), String> {
            gymkaana_config::parse_api_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let token = read_token()?;

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let plaintext = if store_selection == 0 {
        config::store_token(&profile_name, token.expose_secret())?;
        eprintln!("   ✓ Token stored in system keyring");
        None
    } else {
        Some(token.expose_secret().to_owned())
    };

    let profile = Profile {
        api_url,
        token: plaintext,
        ..Profile::default()
    };

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: gymkaana lookup <booking-code>");
    Ok(())
}
