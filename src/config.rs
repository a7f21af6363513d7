use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Hook config candidates, checked in order inside the project root.
const CONFIG_CANDIDATES: &[(&str, ConfigFormat)] = &[
    ("postgen.yml", ConfigFormat::Yaml),
    ("postgen.yaml", ConfigFormat::Yaml),
    ("postgen.toml", ConfigFormat::Toml),
];

#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

#[derive(Debug, Clone)]
pub struct LoadedHookConfig {
    pub path: PathBuf,
    pub data: HookConfig,
}

/// Per-project overrides for the hook. A missing section falls back to the
/// built-in defaults in `hook::plan`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HookConfig {
    #[serde(default)]
    pub dirs: Option<Vec<String>>,
    #[serde(default)]
    pub steps: Option<Vec<StepSpec>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StepSpec {
    /// Bare command line, run in the project root.
    Command(String),
    /// Named step with an optional working directory relative to the root.
    Detailed {
        #[serde(default)]
        name: Option<String>,
        run: String,
        #[serde(default)]
        workdir: Option<String>,
    },
}

pub fn load_hook_config_from_dir(base_dir: &Path) -> Result<Option<LoadedHookConfig>> {
    for (file, format) in CONFIG_CANDIDATES {
        let path = base_dir.join(file);
        if !path.exists() {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading hook config at {}", path.display()))?;
        let data = match format {
            ConfigFormat::Yaml => parse_yaml_str(&content)
                .with_context(|| format!("parsing YAML hook config at {}", path.display()))?,
            ConfigFormat::Toml => parse_toml_str(&content)
                .with_context(|| format!("parsing TOML hook config at {}", path.display()))?,
        };
        return Ok(Some(LoadedHookConfig { path, data }));
    }
    Ok(None)
}

pub(crate) fn parse_yaml_str(content: &str) -> Result<HookConfig> {
    Ok(serde_yaml::from_str(content)?)
}

pub(crate) fn parse_toml_str(content: &str) -> Result<HookConfig> {
    Ok(toml::from_str(content)?)
}

/// Starter config written by `postgen init-config`. Mirrors the built-in
/// defaults so a generated project can pin and edit its own hook steps.
pub const STARTER_CONFIG: &str = r#"# postgen hook configuration.
# Delete a section to fall back to the built-in defaults.
dirs:
  - logs
  - docs
  - docs/api
  - docs/wiki

steps:
  - name: api
    run: "make api"
  - name: config
    run: "make config"
  - name: wire
    run: "wire"
    workdir: "cmd/{app}"
"#;

pub fn write_starter_config(root: &Path) -> Result<PathBuf> {
    for (file, _) in CONFIG_CANDIDATES {
        let existing = root.join(file);
        if existing.exists() {
            println!("Hook config already exists at {}", existing.display());
            return Ok(existing);
        }
    }

    let path = root.join(CONFIG_CANDIDATES[0].0);
    fs::write(&path, STARTER_CONFIG.as_bytes())
        .with_context(|| format!("writing starter hook config at {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(path)
}
