//! Fully materialize a table the record store only serves in pages.

use crate::client::AirtableClient;
use crate::error::{AirdeskError, AirdeskResult};
use crate::query::ListQuery;
use crate::record::Record;
use crate::response::ApiResponse;

/// Follows continuation offsets until the server stops sending one.
///
/// Requests are strictly sequential. `max_pages` bounds the loop so a server
/// that never stops returning an offset cannot keep us here forever.
#[derive(Clone)]
pub struct Paginator<'a> {
    client: &'a AirtableClient,
    max_pages: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a AirtableClient, max_pages: usize) -> Self {
        Self {
            client,
            max_pages: max_pages.max(1),
        }
    }

    /// Every record of `table` matching `query`, in server order.
    ///
    /// Any offset already set on `query` is ignored; the walk always starts at
    /// the first page. The envelope metadata is that of the last page.
    #[tracing::instrument(skip(self, query), fields(max_pages = self.max_pages))]
    pub async fn fetch_all(
        &self,
        table: &str,
        query: &ListQuery,
    ) -> AirdeskResult<ApiResponse<Vec<Record>>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages == self.max_pages {
                tracing::warn!(pages, "page limit reached with an offset still pending");
                return Err(AirdeskError::PageLimitExceeded(pages));
            }

            let page_query = query.at_offset(offset.take());
            let response = self.client.list_page(table, &page_query).await?;
            pages += 1;

            let (page, envelope) = response.split();
            tracing::debug!(
                page = pages,
                records = page.records.len(),
                more = page.offset.is_some(),
                "fetched page"
            );
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => return Ok(envelope.map(|()| records)),
            }
        }
    }
}
