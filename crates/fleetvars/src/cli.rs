//! Clap derive structures for the `fleetvars` CLI.
//!
//! Only clap and clap_complete may be used here: `build.rs` includes this
//! file directly to render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetvars -- reconcile balena environment variables
#[derive(Debug, Parser)]
#[command(
    name = "fleetvars",
    version,
    about = "Reconcile balena fleet, service, and device environment variables",
    long_about = "Create, read, update, and delete environment variables scoped to a\n\
        balena fleet, a fleet's service, or a single device.\n\n\
        Every change is one listing followed by at most one write; nothing\n\
        is retried and nothing is rolled back.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "FLEETVARS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile; must be https)
    #[arg(long, env = "FLEETVARS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// API token (overrides keyring, token file, and profile)
    #[arg(long, env = "FLEETVARS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETVARS_OUTPUT",
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

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FLEETVARS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
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
    /// Manage fleet, service, and device variables
    #[command(alias = "var", alias = "v")]
    Vars(VarsArgs),

    /// Look up a fleet
    Fleet(FleetArgs),

    /// Look up a device and its tags
    #[command(alias = "dev")]
    Device(DeviceArgs),

    /// List the services of a fleet
    Services(ServicesArgs),

    /// Verify that the configured token is accepted
    Check,

    /// Inspect CLI configuration and store tokens
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Scope selection ──────────────────────────────────────────────────

/// Which parent the variables belong to.
///
/// `--fleet` alone selects fleet variables; `--service` with `--fleet`
/// selects a service by name, even an all-digit one; `--service` alone
/// must be a numeric service id; `--device` selects a device by uuid.
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// Fleet id or slug (e.g. 42 or myorg/sensors)
    #[arg(long, short = 'f')]
    pub fleet: Option<String>,

    /// Service name looked up in --fleet; without --fleet, a numeric service id
    #[arg(long, short = 's', conflicts_with = "device")]
    pub service: Option<String>,

    /// Device uuid
    #[arg(long, short = 'd', conflicts_with = "fleet")]
    pub device: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VARIABLES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VarsArgs {
    #[command(subcommand)]
    pub command: VarsCommand,
}

#[derive(Debug, Subcommand)]
pub enum VarsCommand {
    /// List every variable under a scope
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Mask values in table and plain output
        #[arg(long)]
        sensitive: bool,
    },

    /// Show one variable
    Get {
        /// Variable name
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Mask the value in table and plain output
        #[arg(long)]
        sensitive: bool,
    },

    /// Create the variable, or update it if it already exists
    Set {
        name: String,
        value: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Create a variable; fails if the name is taken
    Create {
        name: String,
        value: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Update an existing variable; fails if it does not exist
    Update {
        name: String,
        value: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Delete a variable
    #[command(alias = "rm")]
    Delete {
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Look up a variable or listing by identity
    /// (e.g. fleet-variable:42:DEBUG or fleet-variable:42)
    Inspect {
        identity: String,

        /// Mask values in table and plain output
        #[arg(long)]
        sensitive: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  READ-ONLY LOOKUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FleetArgs {
    #[command(subcommand)]
    pub command: FleetCommand,
}

#[derive(Debug, Subcommand)]
pub enum FleetCommand {
    /// Get fleet details
    Get {
        /// Fleet id or slug
        fleet: String,
    },
}

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Get device details
    Get {
        /// Device uuid
        uuid: String,
    },

    /// List device tags
    Tags {
        /// Device uuid
        uuid: String,
    },
}

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List services of a fleet
    #[command(alias = "ls")]
    List {
        /// Fleet id or slug
        #[arg(long, short = 'f')]
        fleet: String,
    },
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
    /// Print the config file path
    Path,

    /// Display the loaded configuration (tokens masked)
    Show,

    /// Store an API token in the system keyring for the active profile
    SetToken {
        /// Token value (prompted for when omitted)
        #[arg(long)]
        value: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
