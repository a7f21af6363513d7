use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Launch `program` with `args` in `workdir`, inheriting the parent's
/// standard streams, and block until the child exits.
pub fn spawn_and_wait(program: &str, args: &[String], workdir: &Path) -> std::io::Result<ExitStatus> {
    Command::new(program)
        .args(args)
        .current_dir(workdir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
}
