use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sierrabravo")]
#[command(author, version, about = "Telegram bot for Iranian gold and tether prices, with a Mini App backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve the webhook, the Mini App API and the static page (default)
    Run {
        /// Port to listen on, overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Public URL, overrides WEBHOOK_URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Remove the webhook registration
    DeleteWebhook,

    /// Publish the command menu
    RegisterCommands,

    /// Scrape the market page once and print the summary as JSON
    Scrape,

    /// Append a valid `hash` to an init-data query string, for testing the Mini App API
    Sign {
        /// Query string without `hash`, e.g. `auth_date=1700000000&user=...`
        #[arg(long)]
        data: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
