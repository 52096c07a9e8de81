//! CLI entry point for qualys-am — a Qualys Asset Management client.
//!
//! Resolves credentials from flags, environment, and config file, then
//! dispatches to the selected subcommand (`clean`, `tag`, `sweep`).
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (config, transport, API contract)
//! - 2: argument validation error (clap handles this automatically)

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qualys_am::client::QualysClient;
use qualys_am::config::{self, FileConfig};
use qualys_am::envelope::Criteria;
use qualys_am::hostassets::{self, SweepPlan};
use qualys_am::tags;

#[derive(Parser)]
#[command(version, about = "Qualys Asset Management helper for basic actions", long_about = None)]
struct Cli {
    /// Username for basic auth. Required unless supplied via environment
    /// or config file.
    #[arg(long, env = "QUALYS_USERNAME", global = true)]
    username: Option<String>,

    /// Password for basic auth. Prefer setting via the QUALYS_PASSWORD
    /// environment variable to avoid exposing the password in process
    /// listings and shell history.
    #[arg(long, env = "QUALYS_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Base API URL. Defaults to the US platform 2 host.
    #[arg(long, env = "QUALYS_API_URL", global = true)]
    api_url: Option<String>,

    /// Config file (default lookup: ./qualys-am.toml, then ~/.qualys-am.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Turn on debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deactivate and uninstall a host by id
    Clean {
        /// The host asset id to remove.
        host_id: String,
    },

    /// Create a tag, optionally attaching it to a host by IP address
    Tag {
        /// Name of the tag.
        #[arg(long)]
        name: String,

        /// Color of the tag.
        #[arg(long, default_value = "#FFFFFF")]
        color: String,

        /// IP address of a host to tag with the new tag.
        #[arg(long)]
        tag_addr: Option<String>,

        /// Reuse an existing tag with the same name instead of failing.
        /// There is no color guarantee when reusing.
        #[arg(long)]
        idempotent: bool,
    },

    /// Run criteria-based cleanup actions against a name filter
    Sweep {
        /// The name value the equality filter matches on (asset name for
        /// deactivate/uninstall, tag name for delete-tag).
        #[arg(long)]
        name: String,

        #[command(flatten)]
        actions: SweepActions,

        /// Stop at the first failing action instead of attempting the rest.
        #[arg(long)]
        stop_on_error: bool,
    },
}

/// Action flags for `sweep` — at least one must be set per invocation.
///
/// Clap enforces this at parse time via the `group` attribute; with no
/// action flag the command would be a silent no-op.
#[derive(clap::Args)]
#[group(required = true, multiple = true)]
struct SweepActions {
    /// Deactivate the agent modules on matching assets.
    #[arg(long)]
    deactivate: bool,

    /// Uninstall the agent from matching assets.
    #[arg(long)]
    uninstall: bool,

    /// Delete matching tags.
    #[arg(long)]
    delete_tag: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "qualys_am=debug" } else { "qualys_am=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = match FileConfig::load(cli.config.as_deref()) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let settings = match config::resolve(cli.username, cli.password, cli.api_url, &file) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let client = QualysClient::with_base_url(settings.credentials, &settings.api_url);

    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &QualysClient, command: Command) -> qualys_am::error::Result<()> {
    match command {
        Command::Clean { host_id } => {
            println!("Cleaning out id: {host_id}");
            hostassets::clean_by_id(client, &host_id).await?;
            println!("Successfully removed id: {host_id}");
            Ok(())
        }
        Command::Tag {
            name,
            color,
            tag_addr,
            idempotent,
        } => {
            let tag = tags::ensure_tag(client, &name, &color, idempotent).await?;
            if tag.created {
                println!("Successfully created tag {name} with id {}", tag.id);
            } else {
                println!("Tag '{}' found, skipping creation", tag.id);
            }
            if let Some(addr) = tag_addr {
                let host_id = tags::tag_asset_by_address(client, &addr, &tag.id).await?;
                println!("Tagged host {host_id} with tag {}", tag.id);
            }
            Ok(())
        }
        Command::Sweep {
            name,
            actions,
            stop_on_error,
        } => {
            let plan = SweepPlan {
                deactivate: actions.deactivate,
                uninstall: actions.uninstall,
                delete_tag: actions.delete_tag,
                stop_on_error,
            };
            hostassets::clean_by_criteria(client, &Criteria::equals("name", &name), &plan).await?;
            println!("Cleanup actions completed for name: {name}");
            Ok(())
        }
    }
}
