//! Clap derive structures for the `gymkaana` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of workspace crates so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gymkaana -- front-desk check-ins for gym owners
#[derive(Debug, Parser)]
#[command(
    name = "gymkaana",
    version,
    about = "Check members in from the command line",
    long_about = "Verify member bookings at the front desk.\n\n\
        Scan the QR code on a member's booking (or type its code), review\n\
        the booking, then accept or reject the check-in.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "GYMKAANA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, env = "GYMKAANA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Owner API token
    #[arg(long, env = "GYMKAANA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GYMKAANA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "GYMKAANA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "GYMKAANA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a booking without deciding on it
    #[command(alias = "show")]
    Lookup(LookupArgs),

    /// Look up a booking and accept the check-in
    Accept(AcceptArgs),

    /// Look up a booking and reject the check-in
    Reject(RejectArgs),

    /// Run an interactive check-in session
    Scan(ScanArgs),

    /// List rejection reasons
    Reasons,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHECK-IN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Booking code, or a raw QR payload with --scanned
    pub code: String,

    /// Treat CODE as raw scanner output and strip the QR prefix
    #[arg(long)]
    pub scanned: bool,
}

#[derive(Debug, Args)]
pub struct AcceptArgs {
    /// Booking code
    pub code: String,
}

#[derive(Debug, Args)]
pub struct RejectArgs {
    /// Booking code
    pub code: String,

    /// Why the member is turned away
    #[arg(long, short = 'r')]
    pub reason: RejectReason,

    /// Free-text reason, required with `--reason other`
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RejectReason {
    /// The booking's validity window has passed
    BookingExpired,
    /// The booking belongs to another gym
    WrongGym,
    /// The person at the desk is not the booking's member
    IdentityMismatch,
    /// The member's plan does not cover this visit
    PlanNotValid,
    /// Anything else; needs --note
    Other,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Read QR codes from the camera via the profile's scanner command
    #[arg(long, short = 'c')]
    pub camera: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an owner token in the system keyring (for --profile or the default)
    SetToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
