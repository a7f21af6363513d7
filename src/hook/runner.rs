use std::fmt;
use std::io;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::hook::plan::{CodegenStep, step_line};
use crate::utils::{exe, shell};

/// How the runner treats a failing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing phase (default).
    FailFast,
    /// Attempt every phase, report failures, exit nonzero at the end.
    KeepGoing,
}

impl FailurePolicy {
    pub fn from_keep_going(keep_going: bool) -> Self {
        if keep_going {
            Self::KeepGoing
        } else {
            Self::FailFast
        }
    }
}

/// Why a single codegen step failed.
#[derive(Debug)]
pub enum StepError {
    /// Executable not found on PATH, caught before launch.
    MissingExecutable { program: String },
    /// Step working directory does not exist.
    MissingWorkdir { workdir: PathBuf },
    /// The child process could not be launched.
    Spawn { source: io::Error },
    /// The child ran and exited nonzero.
    Exit { code: Option<i32> },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::MissingExecutable { program } => {
                write!(f, "executable `{program}` not found on PATH")
            }
            StepError::MissingWorkdir { workdir } => {
                write!(f, "working directory {} does not exist", workdir.display())
            }
            StepError::Spawn { source } => write!(f, "failed to launch: {source}"),
            StepError::Exit { code: Some(code) } => write!(f, "exited with code {code}"),
            StepError::Exit { code: None } => write!(f, "terminated by signal"),
        }
    }
}

/// Run `steps` in order, blocking on each child before launching the next.
pub fn run_steps(steps: &[CodegenStep], policy: FailurePolicy) -> Result<()> {
    if steps.is_empty() {
        println!("No codegen steps to run.");
        return Ok(());
    }

    let mut failures: Vec<(String, StepError)> = Vec::new();
    for (idx, step) in steps.iter().enumerate() {
        println!("step {} of {}: {}", idx + 1, steps.len(), step_line(step));
        if let Err(err) = execute_step(step) {
            eprintln!("[{}] {err}", step.label);
            match policy {
                FailurePolicy::FailFast => bail!("codegen step `{}` failed: {err}", step.label),
                FailurePolicy::KeepGoing => failures.push((step.label.clone(), err)),
            }
        }
    }

    if failures.is_empty() {
        println!("All {} codegen steps completed.", steps.len());
        return Ok(());
    }

    eprintln!(
        "Codegen finished with {} of {} steps failing:",
        failures.len(),
        steps.len()
    );
    for (label, err) in &failures {
        eprintln!("  {label}: {err}");
    }
    bail!("{} of {} codegen steps failed", failures.len(), steps.len())
}

fn execute_step(step: &CodegenStep) -> Result<(), StepError> {
    if exe::find_executable(&step.program).is_none() {
        return Err(StepError::MissingExecutable {
            program: step.program.clone(),
        });
    }
    if !step.workdir.is_dir() {
        return Err(StepError::MissingWorkdir {
            workdir: step.workdir.clone(),
        });
    }

    let status = shell::spawn_and_wait(&step.program, &step.args, &step.workdir)
        .map_err(|source| StepError::Spawn { source })?;

    if !status.success() {
        return Err(StepError::Exit {
            code: status.code(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("set executable bit");
        path
    }

    fn step(label: &str, program: String, workdir: PathBuf) -> CodegenStep {
        CodegenStep {
            label: label.to_string(),
            program,
            args: Vec::new(),
            workdir,
        }
    }

    #[test]
    fn missing_executable_is_caught_before_spawn() {
        let tmp = tempdir().expect("tempdir");
        let s = step(
            "gen",
            "postgen-no-such-tool".to_string(),
            tmp.path().to_path_buf(),
        );

        let err = execute_step(&s).expect_err("must fail");
        assert!(matches!(err, StepError::MissingExecutable { .. }));
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_workdir_is_caught_before_spawn() {
        let tmp = tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "ok-tool", "exit 0");
        let s = step(
            "gen",
            script.to_string_lossy().into_owned(),
            tmp.path().join("nope"),
        );

        let err = execute_step(&s).expect_err("must fail");
        assert!(matches!(err, StepError::MissingWorkdir { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_becomes_a_step_error() {
        let tmp = tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "fail-tool", "exit 3");
        let s = step(
            "gen",
            script.to_string_lossy().into_owned(),
            tmp.path().to_path_buf(),
        );

        let err = execute_step(&s).expect_err("must fail");
        assert!(matches!(err, StepError::Exit { code: Some(3) }));
    }

    #[cfg(unix)]
    #[test]
    fn keep_going_attempts_every_step_and_still_errors() {
        let tmp = tempdir().expect("tempdir");
        let failing = write_script(tmp.path(), "fail-tool", "exit 1");
        let marker = tmp.path().join("second-ran");
        let passing = write_script(
            tmp.path(),
            "ok-tool",
            &format!("touch '{}'", marker.display()),
        );

        let steps = vec![
            step(
                "first",
                failing.to_string_lossy().into_owned(),
                tmp.path().to_path_buf(),
            ),
            step(
                "second",
                passing.to_string_lossy().into_owned(),
                tmp.path().to_path_buf(),
            ),
        ];

        let err = run_steps(&steps, FailurePolicy::KeepGoing).expect_err("must fail");
        assert!(err.to_string().contains("1 of 2"));
        assert!(marker.exists(), "second step should still have run");
    }

    #[cfg(unix)]
    #[test]
    fn fail_fast_skips_the_remaining_steps() {
        let tmp = tempdir().expect("tempdir");
        let failing = write_script(tmp.path(), "fail-tool", "exit 1");
        let marker = tmp.path().join("second-ran");
        let passing = write_script(
            tmp.path(),
            "ok-tool",
            &format!("touch '{}'", marker.display()),
        );

        let steps = vec![
            step(
                "first",
                failing.to_string_lossy().into_owned(),
                tmp.path().to_path_buf(),
            ),
            step(
                "second",
                passing.to_string_lossy().into_owned(),
                tmp.path().to_path_buf(),
            ),
        ];

        let err = run_steps(&steps, FailurePolicy::FailFast).expect_err("must fail");
        assert!(err.to_string().contains("first"));
        assert!(!marker.exists(), "second step must not have run");
    }
}
