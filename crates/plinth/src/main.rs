use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::error;

use plinth_core::kernel::bootstrap::Application;
use plinth_core::kernel::error::Result as KernelResult;
use plinth_core::plugin_system::orchestrator::ResolutionResult;

// --- Import Core Plugins for Static Registration ---
use core_logging::LoggingPlugin;
use status_pages::StatusPagesPlugin;
// --- End Core Plugin Imports ---

/// Plinth: a plugin-driven application host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Directory scanned for plugin.json manifests before resolving
    #[arg(long)]
    plugin_dir: Option<PathBuf>,

    /// Bound each lifecycle hook to this many seconds during boot
    #[arg(long)]
    hook_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Resolve the activation order without running any lifecycle hook
    Resolve {},
    /// Run a full boot: install, load and register every active plugin
    Boot {},
}

#[derive(Subcommand, Debug)]
enum PluginCommand {
    /// List known plugins
    List {},
}

async fn build_application(args: &CliArgs) -> KernelResult<Application> {
    let mut app = match args.hook_timeout {
        Some(seconds) => Application::with_hook_timeout(Duration::from_secs(seconds)),
        None => Application::new(),
    };

    // Statically registered core plugins.
    app.register_plugin(Arc::new(LoggingPlugin))?;
    app.register_plugin(Arc::new(StatusPagesPlugin))?;

    if let Some(dir) = &args.plugin_dir {
        let merged = app.load_manifest_dir(dir).await?;
        println!("Merged {} manifest(s) from {}", merged, dir.display());
    }
    Ok(app)
}

fn print_result(result: &ResolutionResult) {
    println!("Activated ({}):", result.activated.len());
    for name in &result.activated {
        println!("  {}", name);
    }
    if !result.excluded.is_empty() {
        println!("Excluded ({}):", result.excluded.len());
        for exclusion in &result.excluded {
            println!("  {} ({})", exclusion.plugin, exclusion.reason);
        }
    }
    if !result.routes.is_empty() {
        println!("Routes:");
        for (owner, route) in &result.routes {
            println!("  {} {} -> {} [{}]", route.method, route.path, route.handler, owner);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let mut app = match build_application(&args).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &args.command {
        Commands::Plugin { command } => match command {
            PluginCommand::List {} => {
                for name in app.plugin_names() {
                    // Descriptor exists for every known name.
                    if let Some(descriptor) = app.descriptor(&name) {
                        let state = if descriptor.active { "active" } else { "inactive" };
                        println!("{} {} ({})", name, descriptor.version, state);
                    }
                }
                ExitCode::SUCCESS
            }
        },
        Commands::Resolve {} => match app.plan() {
            Ok(plan) => {
                println!("Resolved order:");
                for name in &plan.order {
                    println!("  {}", name);
                }
                for exclusion in &plan.excluded {
                    println!("Excluded: {} ({})", exclusion.plugin, exclusion.reason);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                // A cycle must block startup loudly, not proceed partially.
                error!("Resolution failed: {}", e);
                eprintln!("Resolution failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Boot {} => match app.boot().await {
            Ok(result) => {
                print_result(&result);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Boot failed: {}", e);
                eprintln!("Boot failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
