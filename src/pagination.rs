//! Cursor-based lazy pagination.
//!
//! A [`Paginator`] hides a multi-page listing behind a single sequence.
//! Pages are fetched only when the consumer asks for an item that is not
//! already buffered, so taking the first few results never triggers
//! requests for later pages.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, Stream};

use crate::error::{AppDistError, Result};

/// One page of a listing as returned by the server.
#[derive(Debug, Clone)]
pub struct CursorPage<T> {
    /// The items on this page, in server order.
    pub items: Vec<T>,
    /// Cursor for the next page. `None` or empty ends the listing.
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    /// Create a page from items and an optional next cursor.
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    /// Returns true if the server indicated another page follows.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_cursor.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Something that can fetch one page given the previous page's cursor.
///
/// Implemented per vendor: App Store Connect follows `links.next`,
/// Firebase sends `pageToken`.
#[async_trait]
pub trait PageSource: Send {
    /// The item type yielded by the listing.
    type Item: Send;

    /// Fetch a page. `cursor` is `None` for the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn fetch_page(&mut self, cursor: Option<&str>) -> Result<CursorPage<Self::Item>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    NotStarted,
    More(String),
    Exhausted,
}

/// Lazy, single-pass, non-restartable sequence over a paged listing.
///
/// Each call to [`Paginator::next`] either returns a buffered item or
/// suspends on exactly one page fetch. Once the listing is exhausted, the
/// limit is reached or a fetch fails, every further call returns
/// `Ok(None)` without touching the network.
pub struct Paginator<S: PageSource> {
    source: S,
    buffer: VecDeque<S::Item>,
    state: State,
    limit: Option<usize>,
    yielded: usize,
    pages_fetched: usize,
}

impl<S: PageSource> std::fmt::Debug for Paginator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("state", &self.state)
            .field("limit", &self.limit)
            .field("yielded", &self.yielded)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

impl<S: PageSource> Paginator<S> {
    /// Create a paginator with no result limit.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
            state: State::NotStarted,
            limit: None,
            yielded: 0,
            pages_fetched: 0,
        }
    }

    /// Create a paginator that stops after `limit` items.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::InvalidParameter`] if `limit` is zero.
    pub fn with_limit(source: S, limit: Option<usize>) -> Result<Self> {
        if limit == Some(0) {
            return Err(AppDistError::InvalidParameter(
                "limit must be a positive number".to_string(),
            ));
        }
        let mut paginator = Self::new(source);
        paginator.limit = limit;
        Ok(paginator)
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Number of items handed out so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Returns the next item, fetching a new page if the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns the page fetch error. The paginator is exhausted afterwards.
    pub async fn next(&mut self) -> Result<Option<S::Item>> {
        if self.limit.is_some_and(|limit| self.yielded >= limit) {
            self.finish();
            return Ok(None);
        }

        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.yielded += 1;
                return Ok(Some(item));
            }

            let cursor = match &self.state {
                State::Exhausted => return Ok(None),
                State::NotStarted => None,
                State::More(cursor) => Some(cursor.clone()),
            };

            let page = match self.source.fetch_page(cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    self.finish();
                    return Err(e);
                }
            };
            self.pages_fetched += 1;

            self.state = match page.next_cursor {
                Some(next) if !next.is_empty() => State::More(next),
                _ => State::Exhausted,
            };
            // An empty page with a cursor is legitimate; loop and fetch on.
            self.buffer.extend(page.items);
        }
    }

    /// Drain the remaining items into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first page fetch error.
    pub async fn collect_all(mut self) -> Result<Vec<S::Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Convert into a [`Stream`] of results.
    ///
    /// The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<S::Item>> + Send
    where
        S: 'static,
        S::Item: 'static,
    {
        stream::unfold(Some(self), |paginator| async move {
            let mut paginator = paginator?;
            match paginator.next().await {
                Ok(Some(item)) => Some((Ok(item), Some(paginator))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    fn finish(&mut self) {
        self.state = State::Exhausted;
        self.buffer.clear();
    }
}
