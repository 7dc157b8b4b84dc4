pub mod common;
pub mod configure;
pub mod json_output;
pub mod me;
pub mod printer;
pub mod projects;
pub mod root;
pub mod run;
pub mod secrets;
pub mod update;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use keyline::error::Result;
use keyline::version;

#[derive(Parser)]
#[command(
    name = "keyline",
    about = "The official Keyline CLI",
    disable_version_flag = true
)]
pub struct Cli {
    /// Get the version of the Keyline CLI
    #[arg(short = 'v', long)]
    pub version: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Keyline token
    #[arg(short = 't', long, global = true)]
    pub token: Option<String>,

    /// The host address for the Keyline API [default: https://api.keyline.dev]
    #[arg(long, global = true)]
    pub api_host: Option<String>,

    /// The host address for the Keyline Dashboard [default: https://dashboard.keyline.dev]
    #[arg(long, global = true)]
    pub dashboard_host: Option<String>,

    /// Disable checking for Keyline CLI updates
    #[arg(long, global = true)]
    pub no_check_version: bool,

    /// Do not verify the validity of TLS certificates on HTTP requests (not recommended)
    #[arg(long, global = true)]
    pub no_verify_tls: bool,

    /// Disable http timeout
    #[arg(long, global = true)]
    pub no_timeout: bool,

    /// Max http request duration
    #[arg(long, global = true, default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Do not read config from the environment
    #[arg(long, global = true)]
    pub no_read_env: bool,

    /// The directory to scope your config to
    #[arg(long, global = true, default_value = ".")]
    pub scope: String,

    /// Config file [default: ~/.keyline/keyline.toml]
    #[arg(long, global = true)]
    pub configuration: Option<PathBuf>,

    /// Output json
    #[arg(long, global = true)]
    pub json: bool,

    /// Output additional information
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output active configuration
    #[arg(long, global = true)]
    pub print_config: bool,

    /// Disable output of info messages
    #[arg(long, global = true)]
    pub silent: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get info about your current token
    Me,

    /// List projects
    Projects,

    /// Manage secrets
    Secrets(SecretsArgs),

    /// Run a command with secrets injected into the environment
    Run {
        #[command(flatten)]
        target: TargetArgs,
        /// Command and arguments to run
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// View and edit the CLI configuration
    Configure(ConfigureArgs),

    /// Update the Keyline CLI
    Update {
        /// Install the latest version even if it is not newer
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Commands whose stdout is consumed by other programs.
    pub fn skips_version_check(&self) -> bool {
        matches!(
            self,
            Commands::Run { .. }
                | Commands::Update { .. }
                | Commands::Secrets(SecretsArgs {
                    command: Some(SecretsCommands::Download { .. })
                        | Some(SecretsCommands::Get { plain: true, .. }),
                    ..
                })
                | Commands::Configure(ConfigureArgs {
                    command: Some(ConfigureCommands::Get { plain: true, .. }),
                    ..
                })
        )
    }

    /// `secrets download --no-file` writes secrets to stdout.
    pub fn forces_silent(&self) -> bool {
        matches!(
            self,
            Commands::Secrets(SecretsArgs {
                command: Some(SecretsCommands::Download { no_file: true, .. }),
                ..
            })
        )
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Project (e.g. backend)
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    /// Config (e.g. dev)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct SecretsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Only print the secret names
    #[arg(long)]
    pub only_names: bool,

    /// Print the raw secret values without processing references
    #[arg(long)]
    pub raw: bool,

    #[command(subcommand)]
    pub command: Option<SecretsCommands>,
}

#[derive(Subcommand)]
pub enum SecretsCommands {
    /// Get the value of one or more secrets
    Get {
        /// Secret names
        #[arg(required = true)]
        names: Vec<String>,
        /// Print values without formatting, one per line
        #[arg(long)]
        plain: bool,
        /// Print the raw secret values without processing references
        #[arg(long)]
        raw: bool,
    },

    /// Set the value of one or more secrets (NAME=VALUE)
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Delete one or more secrets
    Delete {
        /// Secret names
        #[arg(required = true)]
        names: Vec<String>,
        /// Proceed without confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Download a config's secrets for later use
    Download {
        /// File format
        #[arg(long, value_enum, default_value_t = DownloadFormat::Json)]
        format: DownloadFormat,
        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print secrets to stdout instead of writing a file (implies --silent)
        #[arg(long)]
        no_file: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloadFormat {
    Json,
    Env,
    Yaml,
}

impl DownloadFormat {
    pub fn default_filename(&self) -> &'static str {
        match self {
            DownloadFormat::Json => "keyline.json",
            DownloadFormat::Env => ".env",
            DownloadFormat::Yaml => "keyline.yaml",
        }
    }
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Show options for every scope
    #[arg(long)]
    pub all: bool,

    #[command(subcommand)]
    pub command: Option<ConfigureCommands>,
}

#[derive(Subcommand)]
pub enum ConfigureCommands {
    /// Get the active value of one or more options
    Get {
        #[arg(required = true)]
        keys: Vec<String>,
        /// Print values without formatting, one per line
        #[arg(long)]
        plain: bool,
    },

    /// Set one or more options for the scope (KEY=VALUE)
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Unset one or more options for the scope
    Unset {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Delete the entire configuration
    Reset {
        /// Proceed without confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run the pre-run hooks, then the selected subcommand.
pub fn execute(cli: Cli) -> Result<()> {
    if cli.version {
        println!("{}", version::PROGRAM_VERSION);
        return Ok(());
    }

    let ctx = root::prerun(&cli)?;

    match &cli.command {
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
        Some(Commands::Me) => me::run(&ctx),
        Some(Commands::Projects) => projects::run(&ctx),
        Some(Commands::Secrets(args)) => secrets::run(&ctx, args),
        Some(Commands::Run { target, command }) => run::run(&ctx, target, command),
        Some(Commands::Configure(args)) => configure::run(ctx, args),
        Some(Commands::Update { force }) => update::run(&ctx, *force),
    }
}
