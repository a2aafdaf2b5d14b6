mod app;
mod clock;
mod config;
mod event;
mod logging;
mod migrate;
mod notes;
mod settings;
mod sidebar;
mod store;
mod system_stats;
mod tui;
mod ui;
mod widgets;

use clap::{Parser, Subcommand};
use config::Config;
use settings::persist;

#[derive(Parser)]
#[command(name = "dashbar", about = "A TUI sidebar of small time and note widgets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured sidebars
    Ls,
    /// Migrate the sidebars file to the current format and print the result
    Migrate {
        /// Rewrite the file in place instead of printing
        #[arg(long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        None => {
            logging::init(config.behavior.debug_logging);
            tui::install_panic_hook();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(app::App::run(config))
        }
        Some(Commands::Ls) => {
            let persisted = persist::load().unwrap_or_default();
            for (view_type, sidebar) in &persisted.sidebars {
                println!(
                    "{}: \"{}\", {} widgets",
                    view_type,
                    sidebar.title,
                    sidebar.widgets.len()
                );
            }
            Ok(())
        }
        Some(Commands::Migrate { write }) => {
            let path = persist::config_file_path();
            let json = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
            let raw: serde_json::Value = serde_json::from_str(&json)?;
            let migrated = migrate::migrate(raw);
            if write {
                std::fs::write(&path, serde_json::to_string_pretty(&migrated)?)?;
                println!("migrated {}", path.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&migrated)?);
            }
            Ok(())
        }
    }
}
