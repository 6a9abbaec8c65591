use std::{error::Error, process::ExitCode};

use clap::Parser;
use mondo::{
    AuthenticatedClient, Authenticator, ClientConfig, Credentials, FeedItem,
    cli::{
        args::{BanktermArgs, BanktermCommand},
        render::{transactions_table_with_ids, webhooks_table},
    },
    logging::setup_logging,
};

async fn first_account_id(client: &AuthenticatedClient) -> Result<String, Box<dyn Error>> {
    let accounts = client.list_accounts().await?;
    match accounts.into_iter().next() {
        Some(account) => Ok(account.id),
        None => Err("No accounts with Mondo found :( Sign up!".into()),
    }
}

async fn run(args: BanktermArgs) -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::new(&args.common.base_url)?;
    let credentials = Credentials::new(
        &args.common.client_id,
        &args.common.client_secret,
        &args.username,
        &args.password,
    );

    let client = Authenticator::new(config).login(&credentials).await?;
    tracing::info!("Authenticated with Mondo successfully!");

    let command = args
        .command
        .unwrap_or(BanktermCommand::Transactions { limit: 100 });

    match command {
        BanktermCommand::Transactions { limit } => {
            let account_id = first_account_id(&client).await?;
            let transactions = client
                .list_transactions(&account_id, None, None, limit)
                .await?;
            if transactions.is_empty() {
                tracing::warn!("No transactions found. Sorry!");
                return Ok(());
            }
            println!("{}", transactions_table_with_ids(&transactions).render());
        }
        BanktermCommand::RegisterWebhook { url } => {
            let account_id = first_account_id(&client).await?;
            let webhook = client.register_webhook(&account_id, &url).await?;
            println!("registered webhook {} for {}", webhook.id, webhook.url);
        }
        BanktermCommand::ListWebhooks => {
            let account_id = first_account_id(&client).await?;
            let webhooks = client.list_webhooks(&account_id).await?;
            println!("{}", webhooks_table(&webhooks).render());
        }
        BanktermCommand::DeleteWebhook { id } => {
            client.delete_webhook(&id).await?;
            println!("deleted webhook {}", id);
        }
        BanktermCommand::Feed {
            title,
            image_url,
            body,
        } => {
            let account_id = first_account_id(&client).await?;
            let item = FeedItem {
                title,
                image_url,
                body,
                ..FeedItem::default()
            };
            client.create_feed_item(&account_id, &item).await?;
            println!("feed item created");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = BanktermArgs::parse();

    setup_logging(
        args.common.log_dir.as_deref(),
        "bankterm.log",
        args.common.verbose,
    );

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("bankterm failed: {}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
