use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_BASE_URL;

/// Options shared by both command line tools.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[arg(
        long,
        env = "MONDO_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of the Mondo API"
    )]
    pub base_url: String,

    #[arg(long, env = "MONDO_CLIENT_ID", help = "Mondo OAuth client ID")]
    pub client_id: String,

    #[arg(long, env = "MONDO_CLIENT_SECRET", help = "Mondo OAuth client secret")]
    pub client_secret: String,

    #[arg(
        long,
        help = "The log directory e.g. '/var/logs'. If this is not provided, only logs out to stderr."
    )]
    pub log_dir: Option<String>,

    #[arg(short, long, help = "Print debug logs to stderr")]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Interactive shell for your Mondo account", long_about = None)]
pub struct MondoctlArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(
        long,
        env = "MONDO_USERNAME",
        help = "Email used to log in. Prompted for when not set."
    )]
    pub username: Option<String>,

    #[arg(
        long,
        env = "MONDO_PASSWORD",
        hide_env_values = true,
        help = "Password used to log in. Prompted for when not set."
    )]
    pub password: Option<String>,

    #[arg(long, help = "File the command history is kept in")]
    pub history_file: Option<String>,
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Prints your Mondo transactions and manages webhooks", long_about = None)]
pub struct BanktermArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, env = "MONDO_USERNAME")]
    pub username: String,

    #[arg(long, env = "MONDO_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(subcommand)]
    pub command: Option<BanktermCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BanktermCommand {
    /// Print the most recent page of transactions (default)
    Transactions {
        #[arg(long, default_value_t = 100usize)]
        limit: usize,
    },
    /// Register a webhook for the first account
    RegisterWebhook {
        #[arg(long)]
        url: String,
    },
    /// List the webhooks registered for the first account
    ListWebhooks,
    /// Delete a webhook by id
    DeleteWebhook {
        #[arg(long)]
        id: String,
    },
    /// Push a basic item into the account feed. Feed items cannot be deleted.
    Feed {
        #[arg(long)]
        title: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        body: String,
    },
}
