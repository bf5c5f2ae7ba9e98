//! Pagination aggregation for listing calls
//!
//! Drives a paged listing to completion: request a page, append its items in
//! server order, follow the continuation token until none remains. Each page
//! request is already retry-wrapped by the caller so every page gets an
//! independent retry budget, but a page that fails terminally aborts the
//! whole listing - the caller never observes a partial result.

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::error::Result;

/// Page size requested for file listings (Drive caps at 1000; 500 keeps
/// response bodies a manageable size).
pub const PAGE_SIZE: u32 = 500;

/// One page of a listing response.
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Fetch every page of a listing and return the items as one sequence.
///
/// `fetch_page` receives the continuation token (`None` for the first page)
/// and performs one retry-wrapped page request. Page `n + 1` is never
/// requested before page `n`'s items have been appended.
pub async fn fetch_all<'f, T>(
    mut fetch_page: impl FnMut(Option<String>) -> BoxFuture<'f, Result<Page<T>>>,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = fetch_page(page_token.take()).await?;
        pages += 1;
        items.extend(page.items);
        debug!(pages, fetched = items.len(), "fetched listing page");

        match page.next_page_token {
            None => {
                info!(pages, fetched = items.len(), "listing complete");
                return Ok(items);
            }
            token @ Some(_) => page_token = token,
        }
    }
}
