use futures::{Stream, TryStreamExt, stream};

use crate::{client::AuthenticatedClient, domain::Transaction, error::Result};

pub const PAGE_SIZE: usize = 100;

enum Cursor {
    Start,
    After(String),
    Done,
}

/// Pages of transactions in server order, oldest first.
///
/// A full page continues from the id of its last transaction; the first page
/// shorter than [`PAGE_SIZE`] is the last one. Each request is only sent once
/// the previous page has been consumed.
pub fn transaction_pages<'a>(
    client: &'a AuthenticatedClient,
    account_id: &'a str,
) -> impl Stream<Item = Result<Vec<Transaction>>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| {
        next_page(client, account_id, cursor)
    })
}

async fn next_page(
    client: &AuthenticatedClient,
    account_id: &str,
    cursor: Cursor,
) -> Result<Option<(Vec<Transaction>, Cursor)>> {
    let since = match cursor {
        Cursor::Done => return Ok(None),
        Cursor::Start => None,
        Cursor::After(id) => Some(id),
    };

    let page = client
        .list_transactions(account_id, since.as_deref(), None, PAGE_SIZE)
        .await?;

    let next = match page.last() {
        Some(last) if page.len() == PAGE_SIZE => Cursor::After(last.id.clone()),
        _ => Cursor::Done,
    };

    tracing::debug!(
        "Fetched page of {} transactions for account_id={}",
        page.len(),
        account_id
    );

    Ok(Some((page, next)))
}

pub async fn list_all_transactions(
    client: &AuthenticatedClient,
    account_id: &str,
) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = transaction_pages(client, account_id)
        .try_concat()
        .await?;

    tracing::info!(
        "Retrieved {} transactions for account_id={}",
        transactions.len(),
        account_id
    );

    Ok(transactions)
}
