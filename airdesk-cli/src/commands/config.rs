use airdesk_core::Settings;
use airdesk_core::config::ENV_PREFIX;
use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a commented config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show where settings come from and what they resolve to
    Show,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let config_path = Settings::config_path()?;

    match command {
        ConfigCommand::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Pass --force to overwrite it.",
                    config_path.display()
                );
            }
            Settings::create_default_config(&config_path)?;
            println!("{} {}", "Wrote".green(), config_path.display());
            Ok(())
        }
        ConfigCommand::Show => {
            println!("{}", "Paths".bold());
            println!("  Config:       {}", config_path.display());
            println!("  Environment:  {ENV_PREFIX}_*");
            println!();

            println!("{}", "Settings".bold());
            match Settings::load() {
                Ok(settings) => {
                    println!("  API URL:      {}", settings.api_url);
                    println!("  API key:      {}", "(set)".dimmed());
                    println!("  View:         {}", settings.view);
                    println!("  Page size:    {}", settings.effective_page_size());
                    println!("  Max pages:    {}", settings.max_pages);
                    println!(
                        "  Tables:       {}, {}, {}",
                        settings.tables.contacts,
                        settings.tables.agents,
                        settings.tables.appointments
                    );
                }
                Err(e) => println!("  {}", e.to_string().red()),
            }
            Ok(())
        }
    }
}
