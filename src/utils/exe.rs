use std::path::PathBuf;

/// Resolve `program` against PATH. Also accepts explicit paths, which are
/// checked directly for existence and the executable bit.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::fs;
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;

    struct EnvGuard {
        key: &'static str,
        original: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
            let original = std::env::var_os(key);
            // SAFETY: tests that mutate env vars use `#[serial]`, so there is no
            // concurrent mutation in this process.
            unsafe { std::env::set_var(key, value) };
            Self { key, original }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(value) => {
                    // SAFETY: restoration runs in the same serial test context.
                    unsafe { std::env::set_var(self.key, value) };
                }
                None => {
                    // SAFETY: restoration runs in the same serial test context.
                    unsafe { std::env::remove_var(self.key) };
                }
            }
        }
    }

    fn create_fake_tool(dir: &Path, name: &str) -> PathBuf {
        fs::create_dir_all(dir).expect("create fake bin dir");

        #[cfg(windows)]
        let path = dir.join(format!("{name}.cmd"));
        #[cfg(not(windows))]
        let path = dir.join(name);

        #[cfg(windows)]
        fs::write(&path, "@echo off\r\nexit /b 0\r\n").expect("write fake tool");

        #[cfg(not(windows))]
        {
            fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write fake tool");
            let mut perms = fs::metadata(&path).expect("metadata").permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).expect("set executable bit");
        }

        path
    }

    fn prepend_path(dir: &Path) -> EnvGuard {
        let mut path = OsString::from(dir.as_os_str());
        if let Some(existing) = std::env::var_os("PATH") {
            path.push(if cfg!(windows) { ";" } else { ":" });
            path.push(existing);
        }
        EnvGuard::set("PATH", path)
    }

    #[test]
    #[serial]
    fn finds_a_tool_on_a_prepended_path() {
        let tmp = tempdir().expect("tempdir");
        let fakebin = tmp.path().join("fakebin");
        create_fake_tool(&fakebin, "postgen-fake-tool");
        let _path = prepend_path(&fakebin);

        let resolved = find_executable("postgen-fake-tool").expect("resolved");
        let file_name = resolved
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name");
        assert!(file_name.starts_with("postgen-fake-tool"));
    }

    #[test]
    fn missing_tool_resolves_to_none() {
        assert!(find_executable("postgen-definitely-missing-tool").is_none());
    }
}
