use std::future::Future;

use crate::{Res, types::Paging, warning};

/// Collects every item of a paginated listing.
///
/// `fetch` is called with `(offset, limit)` where `offset` is the number of
/// items collected so far, and the walk ends once the reported total equals
/// that number. Pages are concatenated in server order.
///
/// The server's total is not always consistent with the pages it actually
/// hands out. The first page fixes the request budget at
/// `ceil(total / limit) + 2`; totals reported by later pages never raise it.
/// Past the budget the walk stops with a warning and returns what it has.
///
/// # Arguments
///
/// * `label` - Name of the listing, used in the warning
/// * `limit` - Page size, raised to 1 when zero
/// * `fetch` - Requests one page for `(offset, limit)`
///
/// # Returns
///
/// Every collected item in server order.
///
/// # Errors
///
/// The first failing page request aborts the walk. Items collected before it
/// are dropped and only the error is returned.
///
/// # Example
///
/// ```ignore
/// let items = walk("tracks of Metal 1", 100, |offset, limit| {
///     client.list_playlist_tracks(&playlist.id, offset, limit)
/// })
/// .await?;
/// ```
pub async fn walk<T, F, Fut>(label: &str, limit: usize, mut fetch: F) -> Res<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Res<Paging<T>>>,
{
    let limit = limit.max(1);
    let mut items: Vec<T> = Vec::new();
    let mut total: Option<usize> = None;
    let mut budget: Option<usize> = None;
    let mut attempts = 0;

    while total != Some(items.len()) {
        if let (Some(total), Some(budget)) = (total, budget) {
            if attempts >= budget {
                warning!(
                    "Listing {} stopped after {} requests with {} of {} items, the reported total looks inconsistent",
                    label,
                    attempts,
                    items.len(),
                    total
                );
                break;
            }
        }

        let page = fetch(items.len(), limit).await?;
        attempts += 1;
        budget.get_or_insert_with(|| attempt_budget(page.total, limit));
        total = Some(page.total);
        items.extend(page.items);
    }

    Ok(items)
}

/// Number of page requests a walk may make for a listing of `total` items.
pub fn attempt_budget(total: usize, limit: usize) -> usize {
    total.div_ceil(limit.max(1)) + 2
}
