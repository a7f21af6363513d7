use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config;
use crate::hook;
use crate::hook::runner::FailurePolicy;

/// Root CLI for postgen
#[derive(Parser)]
#[command(name = "postgen")]
#[command(about = "Post-generation hook for templated project skeletons")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full hook: directory skeleton, then every codegen step
    Run {
        /// Application name substituted for `{app}` in step definitions
        app_name: String,
        /// Project root (defaults to the current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// Attempt every phase even after a failure instead of stopping
        #[arg(long)]
        keep_going: bool,
        /// Print the resolved plan without creating or running anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the directory skeleton only
    Dirs {
        /// Project root (defaults to the current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
    },
    /// Run the codegen steps only
    Codegen {
        /// Application name substituted for `{app}` in step definitions
        app_name: String,
        /// Project root (defaults to the current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// Attempt every step even after a failure instead of stopping
        #[arg(long)]
        keep_going: bool,
        /// Print the resolved steps without running anything
        #[arg(long)]
        dry_run: bool,
        /// Run only the named steps, keeping plan order (repeatable)
        #[arg(long)]
        only: Vec<String>,
    },
    /// Write a starter postgen.yml into the project root
    InitConfig {
        /// Project root (defaults to the current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
    },
}

/// Dispatch after parse
pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            app_name,
            project_root,
            keep_going,
            dry_run,
        } => {
            let result = hook::resolve_root(project_root).and_then(|root| {
                hook::run_full(
                    &root,
                    &app_name,
                    FailurePolicy::from_keep_going(keep_going),
                    dry_run,
                )
            });
            if let Err(e) = result {
                eprintln!("error (run): {e}");
                std::process::exit(1);
            }
        }
        Commands::Dirs { project_root } => {
            let result = hook::resolve_root(project_root).and_then(|root| hook::run_dirs(&root));
            if let Err(e) = result {
                eprintln!("error (dirs): {e}");
                std::process::exit(1);
            }
        }
        Commands::Codegen {
            app_name,
            project_root,
            keep_going,
            dry_run,
            only,
        } => {
            let result = hook::resolve_root(project_root).and_then(|root| {
                hook::run_codegen(
                    &root,
                    &app_name,
                    FailurePolicy::from_keep_going(keep_going),
                    dry_run,
                    &only,
                )
            });
            if let Err(e) = result {
                eprintln!("error (codegen): {e}");
                std::process::exit(1);
            }
        }
        Commands::InitConfig { project_root } => {
            let result = hook::resolve_root(project_root)
                .and_then(|root| config::write_starter_config(&root).map(|_| ()));
            if let Err(e) = result {
                eprintln!("error (init-config): {e}");
                std::process::exit(1);
            }
        }
    }
}
