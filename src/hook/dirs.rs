use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one entry in the skeleton directory list.
#[derive(Debug)]
pub struct DirOutcome {
    pub path: PathBuf,
    pub result: DirResult,
}

#[derive(Debug)]
pub enum DirResult {
    Created,
    AlreadyExists,
    Failed(std::io::Error),
}

/// Ensure every listed directory exists under `root`, creating intermediate
/// parents as needed. Every entry is attempted; a failure never stops the
/// sweep. One line is printed per entry.
pub fn init_dirs(root: &Path, dirs: &[String]) -> Vec<DirOutcome> {
    let mut outcomes = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let full_path = root.join(dir);
        let result = if full_path.is_dir() {
            DirResult::AlreadyExists
        } else {
            match fs::create_dir_all(&full_path) {
                Ok(()) => DirResult::Created,
                Err(e) => DirResult::Failed(e),
            }
        };

        match &result {
            DirResult::Created => println!("Created directory: {}", full_path.display()),
            DirResult::AlreadyExists => {
                println!("Directory already exists: {}", full_path.display());
            }
            DirResult::Failed(e) => println!("Error creating {}: {e}", full_path.display()),
        }

        outcomes.push(DirOutcome { path: full_path, result });
    }
    outcomes
}

/// Display form of every failed path, for error reporting.
pub fn failed_paths(outcomes: &[DirOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter(|o| matches!(o.result, DirResult::Failed(_)))
        .map(|o| o.path.display().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn skeleton() -> Vec<String> {
        ["logs", "docs", "docs/api", "docs/wiki"]
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn creating_the_skeleton_twice_is_idempotent() {
        let tmp = tempdir().expect("tempdir");
        let dirs = skeleton();

        let first = init_dirs(tmp.path(), &dirs);
        assert!(failed_paths(&first).is_empty());
        assert!(first.iter().all(|o| matches!(o.result, DirResult::Created)));

        let second = init_dirs(tmp.path(), &dirs);
        assert!(failed_paths(&second).is_empty());
        assert!(
            second
                .iter()
                .all(|o| matches!(o.result, DirResult::AlreadyExists))
        );

        for dir in &dirs {
            assert!(tmp.path().join(dir).is_dir(), "missing {dir}");
        }
    }

    #[test]
    fn a_blocked_path_does_not_stop_the_sweep() {
        let tmp = tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("logs"), b"a file in the way").expect("blocking file");

        let outcomes = init_dirs(tmp.path(), &skeleton());
        assert_eq!(outcomes.len(), 4, "every entry must be attempted");
        assert!(matches!(outcomes[0].result, DirResult::Failed(_)));

        let failed = failed_paths(&outcomes);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].ends_with("logs"), "failed path was: {failed:?}");

        assert!(tmp.path().join("docs").is_dir());
        assert!(tmp.path().join("docs/api").is_dir());
        assert!(tmp.path().join("docs/wiki").is_dir());
    }
}
