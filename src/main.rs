use anyhow::Result;
use botdash::api::types::{Presence, ToggleId};
use botdash::{config, logging};
use clap::{Parser, Subcommand};

mod cli;

#[derive(Debug, Parser)]
#[command(name = "botdash")]
#[command(about = "Terminal control panel for a chat bot's admin API")]
struct App {
    /// Bot API base URL, overriding config and BOTDASH_URL
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard: polls the bot and reads commands from stdin
    Watch,
    /// Fetch config and stats once and print them
    Show {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Flip a toggle: autoresponder or autoemoji
    Toggle { toggle: ToggleId },
    /// Set the bot's presence: online, idle, dnd or invisible
    Status {
        presence: Presence,
        /// Custom status text sent along with the presence
        #[arg(long)]
        text: Option<String>,
    },
    /// Stop the running auto pressure process
    StopPressure,
    /// Save prefix, auto response phrase and auto emoji
    Save {
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        phrase: Option<String>,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// List the action ids accepted by `watch`
    Actions,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.botdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a key such as server.base_url in the global config
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut cfg = config::load();
    if let Some(url) = app.url {
        cfg.server.base_url = url;
    }
    logging::init(&cfg.logging.level);
    if !cfg.render.color {
        colored::control::set_override(false);
    }

    match app.command {
        Commands::Watch => cli::run_watch(&cfg),
        Commands::Show { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_show(&cfg, fmt)
        }
        Commands::Toggle { toggle } => cli::run_toggle(&cfg, toggle),
        Commands::Status { presence, text } => cli::run_status(&cfg, presence, text),
        Commands::StopPressure => cli::run_stop_pressure(&cfg),
        Commands::Save {
            prefix,
            phrase,
            emoji,
        } => cli::run_save(
            &cfg,
            cli::SaveArgs {
                prefix,
                phrase,
                emoji,
            },
        ),
        Commands::Actions => {
            cli::run_actions();
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigCommand::Show => cli::run_config_show(),
            ConfigCommand::Init { force } => cli::run_config_init(force),
            ConfigCommand::Set { key, value } => cli::run_config_set(&key, &value),
        },
    }
}
