pub mod dirs;
pub mod plan;
pub mod runner;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config;
use crate::hook::plan::{CodegenStep, HookPlan};
use crate::hook::runner::FailurePolicy;

/// Resolve the project root: an explicit flag wins, otherwise the current
/// directory (the template engine invokes the hook with cwd already set to
/// the freshly generated project).
pub fn resolve_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(root) => {
            if !root.is_dir() {
                bail!("project root {} is not a directory", root.display());
            }
            Ok(root)
        }
        None => std::env::current_dir().context("resolving current directory as project root"),
    }
}

/// Full hook: directory skeleton, then every codegen step.
pub fn run_full(root: &Path, app_name: &str, policy: FailurePolicy, dry_run: bool) -> Result<()> {
    let plan = load_plan(root, app_name)?;

    if dry_run {
        print_plan(root, &plan);
        return Ok(());
    }

    let outcomes = dirs::init_dirs(root, &plan.dirs);
    let failed = dirs::failed_paths(&outcomes);
    if !failed.is_empty() && policy == FailurePolicy::FailFast {
        bail!("could not create skeleton directories: {}", failed.join(", "));
    }

    runner::run_steps(&plan.steps, policy)?;

    if !failed.is_empty() {
        bail!("could not create skeleton directories: {}", failed.join(", "));
    }

    println!("Post-generation hook finished.");
    Ok(())
}

/// Directory skeleton only. Every entry is attempted; the command fails if
/// any entry could not be created.
pub fn run_dirs(root: &Path) -> Result<()> {
    let config = config::load_hook_config_from_dir(root)?;
    if let Some(cfg) = &config {
        println!("Using hook config at {}", cfg.path.display());
    }

    let list = plan::dir_list(config.as_ref().map(|c| &c.data));
    let outcomes = dirs::init_dirs(root, &list);
    let failed = dirs::failed_paths(&outcomes);
    if !failed.is_empty() {
        bail!("could not create skeleton directories: {}", failed.join(", "));
    }
    Ok(())
}

/// Codegen steps only, optionally restricted to the labels in `only`.
pub fn run_codegen(
    root: &Path,
    app_name: &str,
    policy: FailurePolicy,
    dry_run: bool,
    only: &[String],
) -> Result<()> {
    let plan = load_plan(root, app_name)?;
    let steps = plan::filter_steps(plan.steps, only)?;

    if dry_run {
        print_steps(&steps);
        return Ok(());
    }

    runner::run_steps(&steps, policy)
}

fn load_plan(root: &Path, app_name: &str) -> Result<HookPlan> {
    let config = config::load_hook_config_from_dir(root)?;
    if let Some(cfg) = &config {
        println!("Using hook config at {}", cfg.path.display());
    }
    plan::build_plan(root, app_name, config.as_ref().map(|c| &c.data))
}

fn print_plan(root: &Path, plan: &HookPlan) {
    println!("Resolved hook plan for {}:", root.display());
    for line in plan::plan_lines(plan) {
        println!("  {line}");
    }
    println!("Dry run: nothing was created or executed.");
}

fn print_steps(steps: &[CodegenStep]) {
    println!("Resolved codegen steps:");
    for step in steps {
        println!("  {}", plan::step_line(step));
    }
    println!("Dry run: nothing was executed.");
}
