use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use waypost_core::cli::{self, ReportFormat, SettingsArgs};
use waypost_core::identity::RouteId;
use waypost_core::logging::{default_log_mode, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "waypost",
    version,
    about = "Waypost: route config compiler for the Traefik file provider"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter settings file and config directory
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Write system middlewares, migrate old objects, apply settings fleet-wide
    Bootstrap {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// List every route
    List {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Probe each backend for reachability
        #[arg(long)]
        probe: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a route description (JSON) and exit
    Check {
        path: PathBuf,

        /// Plain text output
        #[arg(short, long, conflicts_with = "json")]
        plain: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one route
    Get {
        #[command(flatten)]
        settings: SettingsArgs,

        id: String,

        /// Print the stored object instead of the description
        #[arg(long)]
        yaml: bool,
    },

    /// Create a route from a description file
    Add {
        #[command(flatten)]
        settings: SettingsArgs,

        path: PathBuf,
    },

    /// Replace a route; the file must carry its id
    Update {
        #[command(flatten)]
        settings: SettingsArgs,

        path: PathBuf,
    },

    /// Remove a route
    Delete {
        #[command(flatten)]
        settings: SettingsArgs,

        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(default_log_mode());

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = cli::error_hint(&err) {
                eprintln!();
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init { path } => cli::init(&path),

        Command::Bootstrap { settings } => cli::bootstrap(&settings.resolve()?),

        Command::List {
            settings,
            probe,
            json,
        } => cli::list(&settings.resolve()?.server.manager(), probe, json),

        Command::Check { path, plain, json } => {
            cli::check(&path, ReportFormat::from_flags(plain, json))
        }

        Command::Get { settings, id, yaml } => cli::get(
            &settings.resolve()?.server.manager(),
            &RouteId::new(id),
            yaml,
        ),

        Command::Add { settings, path } => cli::add(&settings.resolve()?.server.manager(), &path),

        Command::Update { settings, path } => {
            cli::update(&settings.resolve()?.server.manager(), &path)
        }

        Command::Delete { settings, id } => {
            cli::delete(&settings.resolve()?.server.manager(), &RouteId::new(id))
        }
    }
}
