/// Configuration system for botdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** from [`schema::DashConfig::default()`]
/// 2. **User global config** at `~/.botdash/config.toml`
/// 3. **Project local config** at `.botdash.toml` in the working directory
/// 4. **Environment variables** `BOTDASH_*` (highest precedence)
///
/// File layers are merged key by key: a project file that only sets
/// `server.base_url` keeps the global file's `poll.interval_ms`.
///
/// # Usage
///
/// ```rust,ignore
/// use botdash::config;
///
/// let cfg = config::load();
/// let client = RemoteConfigClient::from_config(&cfg.server);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> DashConfig {
    let layers = [global_config_path(), project_config_path()];
    let mut config = load_layers(layers.iter().flatten().map(PathBuf::as_path));
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing files are skipped. A malformed file is skipped with a warning so
/// that a typo never keeps the dashboard from starting.
fn load_layers<'a>(paths: impl IntoIterator<Item = &'a Path>) -> DashConfig {
    let mut merged = toml::Table::new();
    for path in paths {
        if let Some(layer) = read_toml_table(path) {
            merge_tables(&mut merged, layer);
        }
    }
    match toml::Value::Table(merged).try_into() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "merged config has invalid values, using defaults");
            DashConfig::default()
        }
    }
}

fn read_toml_table(path: &Path) -> Option<toml::Table> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Deep-merge `overlay` into `base`. Nested tables merge; other values
/// replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.botdash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".botdash").join("config.toml"))
}

/// Path to the project local config: `.botdash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".botdash.toml"))
}

pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment overrides using `lookup` to read variables.
///
/// Supported variables:
/// - `BOTDASH_URL` — bot API origin
/// - `BOTDASH_TIMEOUT_MS` — request timeout
/// - `BOTDASH_POLL_INTERVAL_MS` — poll period
/// - `BOTDASH_NOTIFICATION_TTL_MS` — notification lifetime
/// - `BOTDASH_COLOR` — colored output (`1`/`true`/`yes`/`on`)
///
/// Unparseable numbers are ignored.
fn apply_env_overrides(config: &mut DashConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("BOTDASH_URL")
        && !val.trim().is_empty()
    {
        config.server.base_url = val.trim().to_string();
    }
    if let Some(ms) = lookup("BOTDASH_TIMEOUT_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
        config.server.timeout_ms = ms;
    }
    if let Some(ms) = lookup("BOTDASH_POLL_INTERVAL_MS").and_then(|v| v.trim().parse::<u64>().ok())
    {
        config.poll.interval_ms = ms;
    }
    if let Some(ms) =
        lookup("BOTDASH_NOTIFICATION_TTL_MS").and_then(|v| v.trim().parse::<u64>().ok())
    {
        config.notifications.ttl_ms = ms;
    }
    if let Some(val) = lookup("BOTDASH_COLOR") {
        config.render.color = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / show
// ---------------------------------------------------------------------------

/// Write the annotated defaults to `~/.botdash/config.toml`.
///
/// Fails if the file exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, DashConfig::default_toml()).context("failed to write config file")?;
    Ok(())
}

/// Set a dotted key such as `server.base_url` in the global config file.
///
/// Starts from the serialized defaults when the file does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    set_value_in_file(&path, key, value)?;
    Ok(path)
}

fn set_value_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DashConfig::default())
            .context("failed to serialize default config")?
    };
    let mut root: toml::Value = toml::from_str(&content).context("failed to parse config file")?;

    set_toml_value(&mut root, key, value)?;

    // Reject writes that would leave the file undeserializable.
    let _: DashConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;
    Ok(())
}

/// Set a value in a TOML tree using a dotted key path. The new value takes
/// the type of the value it replaces.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must look like 'section.key', got '{key}'");
    };

    let mut current = root;
    for part in section.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }
    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .trim()
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// The effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    render_config(&load())
}

pub fn render_config(config: &DashConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
