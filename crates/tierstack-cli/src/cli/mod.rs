//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "tierstack",
    bin_name = "tierstack",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Compose a multi-tier web stack into deployable cloud templates",
    long_about = "tierstack validates a flat stack configuration and wires the \
                  network, database, email, certificate and web tiers into \
                  one template per topology.",
    after_help = "EXAMPLES:\n\
        \x20 tierstack init --prefix Shop\n\
        \x20 tierstack validate\n\
        \x20 tierstack synth --out cdk.out\n\
        \x20 tierstack outputs --format csv\n\
        \x20 tierstack completions bash > /usr/share/bash-completion/completions/tierstack",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render every topology and write the templates.
    #[command(
        visible_alias = "s",
        about = "Synthesize templates",
        after_help = "EXAMPLES:\n\
            \x20 tierstack synth\n\
            \x20 tierstack synth --out build/cdk.out --force\n\
            \x20 tierstack synth --dry-run"
    )]
    Synth(SynthArgs),

    /// Validate the stack configuration and print the effective settings.
    #[command(
        visible_alias = "v",
        about = "Validate the stack configuration",
        after_help = "EXAMPLES:\n\
            \x20 tierstack validate\n\
            \x20 tierstack validate --format json\n\
            \x20 tierstack --stack-config prod.toml validate"
    )]
    Validate(ValidateArgs),

    /// List the outputs every topology declares.
    #[command(
        visible_alias = "o",
        about = "List topology outputs",
        after_help = "EXAMPLES:\n\
            \x20 tierstack outputs\n\
            \x20 tierstack outputs --format json\n\
            \x20 tierstack outputs --exported --format csv"
    )]
    Outputs(OutputsArgs),

    /// Write a sample stack configuration.
    #[command(
        about = "Create a sample stack configuration",
        after_help = "EXAMPLES:\n\
            \x20 tierstack init\n\
            \x20 tierstack init --prefix Shop\n\
            \x20 tierstack init --path stack.config.json --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 tierstack completions bash > ~/.local/share/bash-completion/completions/tierstack\n\
            \x20 tierstack completions zsh  > ~/.zfunc/_tierstack\n\
            \x20 tierstack completions fish > ~/.config/fish/completions/tierstack.fish"
    )]
    Completions(CompletionsArgs),
}

// ── synth ─────────────────────────────────────────────────────────────────────

/// Arguments for `tierstack synth`.
#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Output directory; defaults to the configured output directory.
    #[arg(
        short = 'o',
        long = "out",
        value_name = "DIR",
        help = "Output directory (default: cdk.out)"
    )]
    pub out: Option<PathBuf>,

    /// Replace an existing output directory (destructive).
    #[arg(long = "force", help = "Replace an existing output directory")]
    pub force: bool,

    /// Skip the confirmation prompt when replacing.
    #[arg(short = 'y', long = "yes", help = "Do not ask before replacing")]
    pub yes: bool,

    /// Render without writing any files.
    #[arg(long = "dry-run", help = "Show what would be written without writing")]
    pub dry_run: bool,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `tierstack validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub format: ValidateFormat,
}

/// Output format for the `validate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateFormat {
    /// Human-readable summary.
    Text,
    /// The effective configuration as JSON.
    Json,
}

// ── outputs ───────────────────────────────────────────────────────────────────

/// Arguments for `tierstack outputs`.
#[derive(Debug, Args)]
pub struct OutputsArgs {
    /// Only list outputs that carry an export name.
    #[arg(long = "exported", help = "Only show exported outputs")]
    pub exported: bool,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: OutputsFormat,
}

/// Output format for the `outputs` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputsFormat {
    /// Human-readable table grouped by topology.
    Table,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `tierstack init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name prefix written into the sample.
    #[arg(
        short = 'p',
        long = "prefix",
        value_name = "PREFIX",
        default_value = "Acme",
        help = "Name prefix for every topology"
    )]
    pub prefix: String,

    /// Where to write; defaults to the stack configuration path.
    #[arg(long = "path", value_name = "FILE", help = "Destination file")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing file")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `tierstack completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
