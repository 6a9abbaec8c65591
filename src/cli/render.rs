//! Console formatting. This is the only place minor units become currency strings.

use crate::domain::{Balance, Transaction, Webhook};

const TIME_FORMAT: &str = "%d %b %y %H:%M %Z";

pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "GBP" => Some("£"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        _ => None,
    }
}

/// Formats an amount in minor units, e.g. `-510` GBP becomes `-£5.10`.
pub fn format_amount(minor_units: i64, currency: &str) -> String {
    format_magnitude(minor_units < 0, minor_units.unsigned_abs(), currency)
}

fn format_magnitude(negative: bool, abs: u64, currency: &str) -> String {
    let sign = if negative { "-" } else { "" };
    let major = abs / 100;
    let minor = abs % 100;

    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}.{:02}", sign, symbol, major, minor),
        None => format!("{}{}.{:02} {}", sign, major, minor, currency),
    }
}

pub fn render_balance(balance: &Balance) -> String {
    format!(
        "your balance is {} - you've spent {} so far today!",
        format_amount(balance.balance, &balance.currency),
        format_magnitude(false, balance.spend_today.unsigned_abs(), &balance.currency)
    )
}

/// Left-aligned ASCII table.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(i) {
                    Some(existing) => *existing = (*existing).max(width),
                    None => widths.push(width),
                }
            }
        }

        let separator = widths.iter().fold(String::from("+"), |mut line, width| {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
            line
        });

        let mut out = String::new();
        out.push_str(&separator);
        out.push('\n');
        out.push_str(&render_line(&self.headers, &widths));
        out.push_str(&separator);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
        }
        out.push_str(&separator);
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padding = width - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(padding + 1));
        line.push('|');
    }
    line.push('\n');
    line
}

fn display_merchant(transaction: &Transaction) -> String {
    // Top-ups and internal transfers have no merchant.
    if transaction.category == "mondo" {
        return String::from("Mondo");
    }
    transaction.merchant_name().unwrap_or_default().to_string()
}

/// The table printed by the `ls` command.
pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = Table::new(["Merchant Name", "Time", "Amount", "Category", "Balance"]);
    for transaction in transactions {
        table.push_row(vec![
            display_merchant(transaction),
            transaction.created.format(TIME_FORMAT).to_string(),
            format_amount(transaction.amount, &transaction.currency),
            transaction.category.clone(),
            format_amount(transaction.account_balance, &transaction.currency),
        ]);
    }
    table
}

/// Like [`transactions_table`] but keyed by transaction id.
pub fn transactions_table_with_ids(transactions: &[Transaction]) -> Table {
    let mut table = Table::new(["ID", "Time", "Merchant Name", "Amount", "Category", "Balance"]);
    for transaction in transactions {
        table.push_row(vec![
            transaction.id.clone(),
            transaction.created.to_rfc3339(),
            display_merchant(transaction),
            format_amount(transaction.amount, &transaction.currency),
            transaction.category.clone(),
            format_amount(transaction.account_balance, &transaction.currency),
        ]);
    }
    table
}

pub fn webhooks_table(webhooks: &[Webhook]) -> Table {
    let mut table = Table::new(["ID", "Account", "URL"]);
    for webhook in webhooks {
        table.push_row(vec![
            webhook.id.clone(),
            webhook.account_id.clone(),
            webhook.url.clone(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::Merchant;

    fn transaction(category: &str, merchant: Option<&str>, amount: i64) -> Transaction {
        Transaction {
            id: "tx_1".into(),
            account_id: "acc_1".into(),
            amount,
            account_balance: 12334,
            currency: "GBP".into(),
            category: category.into(),
            created: Utc.with_ymd_and_hms(2015, 8, 23, 16, 15, 3).unwrap(),
            description: String::new(),
            notes: String::new(),
            settled: None,
            is_load: false,
            merchant: merchant.map(|name| Merchant {
                name: name.into(),
                ..Merchant::default()
            }),
            metadata: Default::default(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn formats_minor_units_with_symbol() {
        assert_eq!(format_amount(-510, "GBP"), "-£5.10");
        assert_eq!(format_amount(13013, "GBP"), "£130.13");
        assert_eq!(format_amount(5, "USD"), "$0.05");
        assert_eq!(format_amount(-100, "JPY"), "-1.00 JPY");
        assert_eq!(format_amount(i64::MIN, "GBP"), "-£92233720368547758.08");
    }

    #[test]
    fn renders_balance_sentence() {
        let balance = Balance {
            balance: 5000,
            currency: "GBP".into(),
            spend_today: -1250,
        };
        assert_eq!(
            render_balance(&balance),
            "your balance is £50.00 - you've spent £12.50 so far today!"
        );
    }

    #[test]
    fn renders_extreme_spend_without_overflow() {
        let balance = Balance {
            balance: 0,
            currency: "GBP".into(),
            spend_today: i64::MIN,
        };
        assert_eq!(
            render_balance(&balance),
            "your balance is £0.00 - you've spent £92233720368547758.08 so far today!"
        );
    }

    #[test]
    fn renders_aligned_table() {
        let mut table = Table::new(["A", "Long header"]);
        table.push_row(vec!["value".into(), "x".into()]);

        assert_eq!(
            table.render(),
            "+-------+-------------+\n\
             | A     | Long header |\n\
             +-------+-------------+\n\
             | value | x           |\n\
             +-------+-------------+"
        );
    }

    #[test]
    fn transaction_rows_name_internal_transfers() {
        let rendered = transactions_table(&[
            transaction("mondo", None, 10000),
            transaction("eating_out", Some("Pret"), -450),
        ])
        .render();

        assert!(rendered.contains("| Mondo "));
        assert!(rendered.contains("| Pret "));
        assert!(rendered.contains("-£4.50"));
        assert!(rendered.contains("23 Aug 15 16:15 UTC"));
    }
}
