mod cli;
mod config;
mod hook;
mod utils;

fn main() {
    if let Ok(root) = std::env::var("POSTGEN_PROJECT_ROOT") {
        if let Err(e) = std::env::set_current_dir(&root) {
            eprintln!("warning: failed to switch to project root at {root}: {e}");
        }
    }
    cli::run();
}
