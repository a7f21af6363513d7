use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

const CONFIG_FILES: &[&str] = &["postgen.yml", "postgen.yaml", "postgen.toml"];

/// App name baked into the sandbox skeleton, so `run demo-svc` works out of
/// the box.
const SANDBOX_APP: &str = "demo-svc";

fn sandbox_dir() -> PathBuf {
    PathBuf::from("dev-sandbox")
}

fn stub_bin_dir() -> PathBuf {
    sandbox_dir().join("stub-bin")
}

/// Lay out the shape of a freshly generated project: the app entrypoint dir
/// the wire step runs in, plus stub `make`/`wire` tools so codegen steps
/// have something to hit.
fn ensure_sandbox() -> io::Result<()> {
    fs::create_dir_all(sandbox_dir().join("cmd").join(SANDBOX_APP))?;
    write_stub_tool("make")?;
    write_stub_tool("wire")?;
    sync_config_files()?;
    Ok(())
}

fn write_stub_tool(name: &str) -> io::Result<()> {
    let bin = stub_bin_dir();
    fs::create_dir_all(&bin)?;

    #[cfg(windows)]
    {
        let path = bin.join(format!("{name}.cmd"));
        fs::write(
            &path,
            format!("@echo off\r\necho [stub {name}] %* (cwd: %CD%)\r\nexit /b 0\r\n"),
        )?;
    }

    #[cfg(not(windows))]
    {
        use std::os::unix::fs::PermissionsExt;

        let path = bin.join(name);
        fs::write(
            &path,
            format!("#!/bin/sh\necho \"[stub {name}] $* (cwd: $PWD)\"\nexit 0\n"),
        )?;
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

fn reset_sandbox() -> io::Result<()> {
    let dir = sandbox_dir();
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    ensure_sandbox()
}

/// Copy any postgen config next to this crate into the sandbox, so editing
/// the repo-level file drives the sandboxed hook.
fn sync_config_files() -> io::Result<()> {
    let sandbox = sandbox_dir();
    for file in CONFIG_FILES {
        let src = Path::new(file);
        let dst = sandbox.join(file);
        if src.exists() {
            fs::copy(src, &dst)?;
        } else if dst.exists() {
            fs::remove_file(&dst)?;
        }
    }
    Ok(())
}

fn stub_path_env() -> OsString {
    let stub = stub_bin_dir();
    let stub_abs = stub.canonicalize().unwrap_or(stub);
    let mut path = OsString::from(stub_abs.as_os_str());
    if let Some(existing) = std::env::var_os("PATH") {
        path.push(if cfg!(windows) { ";" } else { ":" });
        path.push(existing);
    }
    path
}

fn run_hook_in_sandbox(input: &str) -> io::Result<i32> {
    let parts: Vec<String> = input.split_whitespace().map(|s| s.to_string()).collect();
    if parts.is_empty() {
        return Ok(0);
    }

    sync_config_files()?;

    let sandbox = sandbox_dir();
    let sandbox_abs = sandbox.canonicalize().unwrap_or_else(|_| sandbox.clone());

    let mut cmd = Command::new("cargo");
    cmd.arg("run")
        .arg("--bin")
        .arg("postgen-cli")
        .arg("--")
        .current_dir(&sandbox)
        .env("POSTGEN_PROJECT_ROOT", &sandbox_abs)
        .env("PATH", stub_path_env())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    for p in &parts {
        cmd.arg(p);
    }

    eprintln!("[dev] running in sandbox: postgen {}", parts.join(" "));
    let status = cmd.status()?;
    Ok(status.code().unwrap_or(1))
}

fn normalize_for_internal(raw: &str) -> String {
    raw.trim().trim_matches(':').to_lowercase()
}

#[derive(Clone, Copy, Debug)]
struct WatchConfig {
    debounce_ms: u64,
}

struct WatchState {
    enabled: bool,
    last_cmd: Option<String>,
    _watcher: Option<RecommendedWatcher>, // keep watcher alive
}

impl WatchState {
    fn new() -> Self {
        Self {
            enabled: false,
            last_cmd: None,
            _watcher: None,
        }
    }
}

/// Watch only the repo-level config files; watching the sandbox itself
/// would re-trigger on the hook's own writes.
fn setup_watcher(tx: Sender<()>) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(ev) = res {
            let interesting = matches!(
                ev.kind,
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
            );
            if interesting {
                let _ = tx.send(());
            }
        }
    })?;

    for file in CONFIG_FILES {
        let path = Path::new(file);
        if path.exists() {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }
    }

    Ok(watcher)
}

fn drain_with_debounce(rx: &Receiver<()>, debounce_ms: u64) {
    let deadline = Instant::now() + Duration::from_millis(debounce_ms);
    while Instant::now() < deadline {
        if rx.recv_timeout(Duration::from_millis(40)).is_ok() {
            // keep draining within window
        }
    }
}

fn main() {
    if let Err(e) = ensure_sandbox() {
        eprintln!("[dev] failed to prepare sandbox: {e}");
        std::process::exit(1);
    }

    println!(
        "postgen-dev — sandbox project at {} (app name: {SANDBOX_APP})",
        sandbox_dir().to_string_lossy()
    );
    println!("Type ':reset'/'reset', ':exit'/'exit', ':watch [on|off]', ':help'.\n");

    let cfg = WatchConfig { debounce_ms: 500 };
    let (tx, rx) = channel::<()>();
    let mut state = WatchState::new();

    match setup_watcher(tx.clone()) {
        Ok(w) => state._watcher = Some(w),
        Err(e) => eprintln!("[dev] watcher init failed (disabled): {e}"),
    }

    loop {
        if state.enabled && rx.recv_timeout(Duration::from_millis(10)).is_ok() {
            drain_with_debounce(&rx, cfg.debounce_ms);
            if let Some(cmd) = state.last_cmd.as_ref() {
                eprintln!("[dev] config change detected — re-running: {cmd}");
                match run_hook_in_sandbox(cmd) {
                    Ok(code) if code != 0 => eprintln!("[dev] postgen exited with code {code}"),
                    Ok(_) => {}
                    Err(e) => eprintln!("[dev] failed to run postgen: {e}"),
                }
            } else {
                eprintln!("[dev] config change detected but no previous command.");
            }
        }

        print!("postgen-dev> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            continue;
        }
        let raw_input = line.trim();
        if raw_input.is_empty() {
            continue;
        }

        let internal = normalize_for_internal(raw_input);

        match internal.as_str() {
            "exit" | "quit" | "q" => {
                println!("[dev] bye");
                break;
            }
            "reset" => match reset_sandbox() {
                Ok(_) => println!("[dev] sandbox reset"),
                Err(e) => eprintln!("[dev] reset failed: {e}"),
            },
            "help" => {
                println!(
                    "[dev] commands:
  - :reset | reset            rebuild the sandbox project from scratch
  - :exit  | exit | quit      quit
  - :watch                    show watch status
  - :watch on                 re-run the last command when postgen.yml changes
  - :watch off                disable the config watcher
  - :help  | help             show this help
  - any other text            run 'postgen <args>' inside dev-sandbox
      e.g. `run {SANDBOX_APP}`, `dirs`, `codegen {SANDBOX_APP} --dry-run`"
                );
            }
            "watch" => println!(
                "[dev] watch is {}",
                if state.enabled { "ON" } else { "OFF" }
            ),
            "watch on" | "watch:on" => {
                state.enabled = true;
                println!("[dev] watch ON");
            }
            "watch off" | "watch:off" => {
                state.enabled = false;
                println!("[dev] watch OFF");
            }
            _ => {
                state.last_cmd = Some(raw_input.to_string());
                match run_hook_in_sandbox(raw_input) {
                    Ok(code) if code != 0 => eprintln!("[dev] postgen exited with code {code}"),
                    Ok(_) => {}
                    Err(e) => eprintln!("[dev] failed to run postgen: {e}"),
                }
            }
        }
    }
}
