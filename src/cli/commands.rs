use std::{num::ParseIntError, str::FromStr};

use thiserror::Error;

use crate::{
    auth::{Authenticator, Credentials},
    cli::render::{render_balance, transactions_table},
    client::AuthenticatedClient,
    domain::Transaction,
    error::MondoError,
    pagination::list_all_transactions,
};

const DEFAULT_LIST_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("not a valid command: {0}")]
    Unknown(String),

    #[error("invalid key=value parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid sort order '{0}', expected asc or desc")]
    InvalidSort(String),

    #[error("invalid number of results: {0}")]
    InvalidCount(#[from] ParseIntError),
}

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Mondo(#[from] MondoError),

    #[error("not logged in to mondo. login first!")]
    NotLoggedIn,

    #[error("no accounts with mondo found")]
    NoAccounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: SortOrder,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub limit: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            category: None,
            merchant: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListOptions {
    fn parse<'a>(fields: impl Iterator<Item = &'a str>) -> Result<Self, CommandError> {
        let mut options = ListOptions::default();
        for field in fields {
            let (key, value) = match field.split_once('=') {
                Some((key, value)) if !key.is_empty() && !value.contains('=') => (key, value),
                _ => return Err(CommandError::InvalidParameter(field.to_string())),
            };

            match key {
                "sort" => {
                    options.sort = match value {
                        "asc" => SortOrder::Ascending,
                        "desc" => SortOrder::Descending,
                        other => return Err(CommandError::InvalidSort(other.to_string())),
                    }
                }
                "category" => options.category = Some(value.to_string()),
                "merchant" => options.merchant = Some(value.to_string()),
                "n" => options.limit = value.parse()?,
                other => tracing::debug!("Ignoring unknown ls parameter {}", other),
            }
        }
        Ok(options)
    }

    /// Filters, sorts and truncates a copy of `transactions`.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let merchant = self.merchant.as_ref().map(|m| m.to_lowercase());

        let mut filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|t| {
                self.category
                    .as_ref()
                    .is_none_or(|category| t.category.contains(category.as_str()))
            })
            .filter(|t| {
                merchant.as_ref().is_none_or(|merchant| {
                    t.merchant_name()
                        .is_some_and(|name| name.to_lowercase().contains(merchant.as_str()))
                })
            })
            .cloned()
            .collect();

        match self.sort {
            SortOrder::Ascending => filtered.sort_by(|a, b| a.created.cmp(&b.created)),
            SortOrder::Descending => filtered.sort_by(|a, b| b.created.cmp(&a.created)),
        }

        filtered.truncate(self.limit);
        filtered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Balance,
    Ls(ListOptions),
    History,
    Help,
    Quit,
}

/// Names the REPL accepts, in the order `help` lists them.
pub const COMMAND_NAMES: [&str; 7] = ["login", "balance", "ls", "history", "help", "quit", "exit"];

/// Completes the command name under the cursor. Only the first word is
/// completed; `ls` parameters are free-form.
pub fn complete_command(line: &str, pos: usize) -> (usize, Vec<String>) {
    let before = line.get(..pos).unwrap_or(line);
    let start = before.len() - before.trim_start().len();
    let word = &before[start..];

    if word.contains(char::is_whitespace) {
        return (pos, Vec::new());
    }

    let candidates = COMMAND_NAMES
        .iter()
        .filter(|name| name.starts_with(word))
        .map(|name| name.to_string())
        .collect();
    (start, candidates)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let name = fields.next().ok_or(CommandError::Empty)?;

        match name {
            "login" => Ok(Command::Login),
            "balance" => Ok(Command::Balance),
            "ls" => Ok(Command::Ls(ListOptions::parse(fields)?)),
            "history" => Ok(Command::History),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

pub fn help_text() -> String {
    [
        ("login", "login to mondo"),
        ("balance", "returns your current balance"),
        (
            "ls",
            "list transactions. this command takes a list of key value pairs for filtering.\n\
             \tyou can filter on transaction fields, sorting order and number of results returned\n\
             \te.g.:\n\n\
             \tls sort=desc n=100\n\
             \tls sort=asc n=10 category=eating_out merchant=pret",
        ),
        ("history", "lists previously entered commands"),
        ("help", "lists the help"),
        ("quit", "leaves mondoctl"),
    ]
    .iter()
    .map(|(name, help)| format!("{}\t{}\n", name, help))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Everything the REPL knows between commands: the logged-in client, the
/// selected account and the transactions fetched so far.
#[derive(Debug, Default)]
pub struct ReplState {
    client: Option<AuthenticatedClient>,
    account_id: Option<String>,
    transactions: Option<Vec<Transaction>>,
}

impl ReplState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a client exists and its token has not expired.
    pub fn is_logged_in(&self) -> bool {
        self.client.as_ref().is_some_and(|client| client.is_valid())
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Authenticates and selects the first account.
    pub async fn login(
        &mut self,
        authenticator: &Authenticator,
        credentials: &Credentials,
    ) -> Result<(), ReplError> {
        let client = authenticator.login(credentials).await?;
        let account = client
            .list_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ReplError::NoAccounts)?;

        tracing::info!("Selected account id={}", account.id);

        self.account_id = Some(account.id);
        self.client = Some(client);
        self.transactions = None;
        Ok(())
    }

    fn session(&self) -> Result<(&AuthenticatedClient, &str), ReplError> {
        match (&self.client, &self.account_id) {
            (Some(client), Some(account_id)) if client.is_valid() => Ok((client, account_id)),
            _ => Err(ReplError::NotLoggedIn),
        }
    }

    pub async fn balance(&self) -> Result<String, ReplError> {
        let (client, account_id) = self.session()?;
        let balance = client.get_balance(account_id).await?;
        Ok(render_balance(&balance))
    }

    /// Loads every transaction on first use, then answers from memory.
    pub async fn list(&mut self, options: &ListOptions) -> Result<String, ReplError> {
        if self.transactions.is_none() {
            let (client, account_id) = self.session()?;
            let transactions = list_all_transactions(client, account_id).await?;
            self.transactions = Some(transactions);
        } else {
            self.session()?;
        }

        let transactions = self.transactions.as_deref().unwrap_or_default();
        let matching = options.apply(transactions);
        if matching.is_empty() {
            return Ok(String::from("no matching transactions found"));
        }
        Ok(transactions_table(&matching).render())
    }

    /// Runs commands that only need the state. `login`, `history` and `quit`
    /// need the terminal and are handled by the caller.
    pub async fn execute(&mut self, command: &Command) -> Result<Option<String>, ReplError> {
        match command {
            Command::Balance => self.balance().await.map(Some),
            Command::Ls(options) => self.list(options).await.map(Some),
            Command::Help => Ok(Some(help_text())),
            Command::Login | Command::History | Command::Quit => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::Merchant;

    #[test]
    fn completes_command_names_from_prefix() {
        assert_eq!(
            complete_command("h", 1),
            (0, vec!["history".to_string(), "help".to_string()])
        );
        assert_eq!(complete_command("  ba", 4), (2, vec!["balance".to_string()]));
        assert_eq!(complete_command("zz", 2), (0, Vec::<String>::new()));
        assert_eq!(complete_command("", 0).1.len(), COMMAND_NAMES.len());
    }

    #[test]
    fn does_not_complete_arguments() {
        assert_eq!(complete_command("ls so", 5), (5, Vec::<String>::new()));
    }

    #[test]
    fn every_completion_parses() {
        for name in COMMAND_NAMES {
            assert!(name.parse::<Command>().is_ok(), "{} should parse", name);
        }
    }

    fn transaction(id: &str, day: u32, category: &str, merchant: &str) -> Transaction {
        Transaction {
            id: id.into(),
            account_id: "acc_1".into(),
            amount: -100,
            account_balance: 1000,
            currency: "GBP".into(),
            category: category.into(),
            created: Utc.with_ymd_and_hms(2015, 8, day, 12, 0, 0).unwrap(),
            description: String::new(),
            notes: String::new(),
            settled: None,
            is_load: false,
            merchant: Some(Merchant {
                name: merchant.into(),
                ..Merchant::default()
            }),
            metadata: Default::default(),
            attachments: Vec::new(),
        }
    }

    fn ids(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("balance".parse::<Command>().unwrap(), Command::Balance);
        assert_eq!("  help  ".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("ls".parse::<Command>().unwrap(), Command::Ls(ListOptions::default()));
        assert!(matches!("".parse::<Command>(), Err(CommandError::Empty)));
        assert!(matches!(
            "transfer".parse::<Command>(),
            Err(CommandError::Unknown(name)) if name == "transfer"
        ));
    }

    #[test]
    fn parses_ls_parameters() {
        let command: Command = "ls sort=desc   n=10 category=eating_out merchant=Pret"
            .parse()
            .unwrap();

        assert_eq!(
            command,
            Command::Ls(ListOptions {
                sort: SortOrder::Descending,
                category: Some("eating_out".into()),
                merchant: Some("Pret".into()),
                limit: 10,
            })
        );
    }

    #[test]
    fn rejects_bad_ls_parameters() {
        assert!(matches!(
            "ls sort".parse::<Command>(),
            Err(CommandError::InvalidParameter(_))
        ));
        assert!(matches!(
            "ls a=b=c".parse::<Command>(),
            Err(CommandError::InvalidParameter(_))
        ));
        assert!(matches!(
            "ls n=ten".parse::<Command>(),
            Err(CommandError::InvalidCount(_))
        ));
        assert!(matches!(
            "ls sort=sideways".parse::<Command>(),
            Err(CommandError::InvalidSort(_))
        ));
    }

    #[test]
    fn filters_sorts_and_limits() {
        let transactions = vec![
            transaction("tx_1", 1, "eating_out", "Pret A Manger"),
            transaction("tx_2", 2, "groceries", "Tesco"),
            transaction("tx_3", 3, "eating_out", "Leon"),
            transaction("tx_4", 4, "eating_out", "PRET"),
        ];

        let options = ListOptions {
            category: Some("eating".into()),
            ..ListOptions::default()
        };
        assert_eq!(ids(&options.apply(&transactions)), ["tx_1", "tx_3", "tx_4"]);

        let options = ListOptions {
            merchant: Some("pret".into()),
            sort: SortOrder::Descending,
            ..ListOptions::default()
        };
        assert_eq!(ids(&options.apply(&transactions)), ["tx_4", "tx_1"]);

        let options = ListOptions {
            limit: 2,
            sort: SortOrder::Descending,
            ..ListOptions::default()
        };
        assert_eq!(ids(&options.apply(&transactions)), ["tx_4", "tx_3"]);
    }

    #[tokio::test]
    async fn commands_need_a_login() {
        let mut state = ReplState::new();

        assert!(!state.is_logged_in());
        assert!(matches!(
            state.execute(&Command::Balance).await,
            Err(ReplError::NotLoggedIn)
        ));
        assert!(matches!(
            state.execute(&Command::Ls(ListOptions::default())).await,
            Err(ReplError::NotLoggedIn)
        ));
        assert!(state.execute(&Command::Help).await.unwrap().is_some());
        assert!(state.execute(&Command::Quit).await.unwrap().is_none());
    }
}
