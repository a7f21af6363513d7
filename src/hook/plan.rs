use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::{HookConfig, StepSpec};

/// Directories created under every generated project root.
pub const DEFAULT_DIRS: &[&str] = &["logs", "docs", "docs/api", "docs/wiki"];

/// Placeholder replaced by the application name in step definitions.
pub const APP_PLACEHOLDER: &str = "{app}";

/// Default codegen steps: build-tool targets in the project root, then the
/// DI wire generator inside the application's command-entrypoint directory.
const DEFAULT_STEPS: &[(&str, &str, Option<&str>)] = &[
    ("api", "make api", None),
    ("config", "make config", None),
    ("wire", "wire", Some("cmd/{app}")),
];

/// One external codegen invocation, fully resolved. Steps are data, not
/// code: the runner never needs to know which tool it is launching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenStep {
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
    /// Absolute working directory, already joined with the project root.
    pub workdir: PathBuf,
}

impl CodegenStep {
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote_for_display(&self.program));
        for arg in &self.args {
            parts.push(quote_for_display(arg));
        }
        parts.join(" ")
    }
}

/// Resolved hook plan: skeleton directories plus ordered codegen steps.
#[derive(Debug, Clone)]
pub struct HookPlan {
    pub dirs: Vec<String>,
    pub steps: Vec<CodegenStep>,
}

pub fn build_plan(root: &Path, app_name: &str, config: Option<&HookConfig>) -> Result<HookPlan> {
    Ok(HookPlan {
        dirs: dir_list(config),
        steps: build_steps(root, app_name, config)?,
    })
}

pub fn dir_list(config: Option<&HookConfig>) -> Vec<String> {
    match config.and_then(|c| c.dirs.as_ref()) {
        Some(dirs) => dirs.clone(),
        None => DEFAULT_DIRS.iter().map(|d| d.to_string()).collect(),
    }
}

pub fn build_steps(
    root: &Path,
    app_name: &str,
    config: Option<&HookConfig>,
) -> Result<Vec<CodegenStep>> {
    let app = validate_app_name(app_name)?;

    if let Some(specs) = config.and_then(|c| c.steps.as_ref()) {
        return specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| step_from_spec(root, app, idx, spec))
            .collect();
    }

    DEFAULT_STEPS
        .iter()
        .map(|(label, line, workdir)| build_step(root, app, label, line, *workdir))
        .collect()
}

/// Restrict `steps` to the labels in `only`, keeping plan order. An unknown
/// label is an error rather than a silent no-op.
pub fn filter_steps(steps: Vec<CodegenStep>, only: &[String]) -> Result<Vec<CodegenStep>> {
    if only.is_empty() {
        return Ok(steps);
    }

    for name in only {
        if !steps.iter().any(|s| s.label == *name) {
            let available: Vec<&str> = steps.iter().map(|s| s.label.as_str()).collect();
            bail!(
                "no codegen step named `{name}`; available steps: {}",
                available.join(", ")
            );
        }
    }

    Ok(steps
        .into_iter()
        .filter(|s| only.contains(&s.label))
        .collect())
}

pub fn plan_lines(plan: &HookPlan) -> Vec<String> {
    let mut lines = Vec::with_capacity(plan.steps.len() + 1);
    lines.push(format!("dirs: {}", plan.dirs.join(", ")));
    for step in &plan.steps {
        lines.push(step_line(step));
    }
    lines
}

pub fn step_line(step: &CodegenStep) -> String {
    format!(
        "[{}] {} (in {})",
        step.label,
        step.render(),
        step.workdir.display()
    )
}

pub fn substitute_app(input: &str, app: &str) -> String {
    input.replace(APP_PLACEHOLDER, app)
}

fn step_from_spec(root: &Path, app: &str, idx: usize, spec: &StepSpec) -> Result<CodegenStep> {
    match spec {
        StepSpec::Command(line) => build_step(root, app, &format!("step{}", idx + 1), line, None),
        StepSpec::Detailed { name, run, workdir } => {
            let label = name.clone().unwrap_or_else(|| format!("step{}", idx + 1));
            build_step(root, app, &label, run, workdir.as_deref())
        }
    }
}

fn build_step(
    root: &Path,
    app: &str,
    label: &str,
    line: &str,
    workdir: Option<&str>,
) -> Result<CodegenStep> {
    let line = substitute_app(line, app);
    let (program, args) =
        split_command(&line).with_context(|| format!("in codegen step `{label}`"))?;

    let workdir = match workdir {
        Some(rel) => root.join(substitute_app(rel, app)),
        None => root.to_path_buf(),
    };

    Ok(CodegenStep {
        label: label.to_string(),
        program,
        args,
        workdir,
    })
}

fn validate_app_name(app_name: &str) -> Result<&str> {
    let app = app_name.trim();
    if app.is_empty() {
        bail!("application name must be non-empty");
    }
    if app.contains(['/', '\\']) || app.contains(char::is_whitespace) {
        bail!("application name `{app}` must be a single path segment (no separators or whitespace)");
    }
    Ok(app)
}

fn split_command(line: &str) -> Result<(String, Vec<String>)> {
    let mut parts = line.split_whitespace().map(|s| s.to_string());
    let Some(program) = parts.next() else {
        bail!("empty command line");
    };
    Ok((program, parts.collect()))
}

fn quote_for_display(input: &str) -> String {
    if input.is_empty() {
        return "\"\"".to_string();
    }

    if input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '='))
    {
        return input.to_string();
    }

    format!("\"{}\"", input.replace('\\', "\\\\").replace('"', "\\\""))
}
