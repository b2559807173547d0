//! Generic Firebase App Distribution resource manager.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{Instrument, Span};

use crate::client::{ApiSession, QueryParams};
use crate::error::{log_failure, Result};
use crate::filter::Filter;
use crate::pagination::{CursorPage, PageSource, Paginator};
use crate::resource::Resource;

const VENDOR: &str = "Firebase";

/// A resource listed under a parent path, e.g. releases under an app.
pub trait FirebaseResource: Resource {
    /// Path segment of the collection and key of the items in a listing.
    const COLLECTION: &'static str;

    /// Identifier of the owning resource.
    type Parent: ParentIdentifier + Sync;

    /// Query parameters accepted by the listing endpoint.
    type Query: Filter + Default + Send + Sync;
}

/// Something that resolves to a parent resource path.
pub trait ParentIdentifier {
    /// Relative path of the parent, without leading slash.
    ///
    /// # Errors
    ///
    /// Returns a local validation error if a component is empty.
    fn path(&self) -> Result<String>;
}

/// Listing façade over one Firebase resource type.
pub struct ResourceManager<R: FirebaseResource> {
    session: ApiSession,
    span: Span,
    _resource: PhantomData<fn() -> R>,
}

impl<R: FirebaseResource> Clone for ResourceManager<R> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            span: self.span.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: FirebaseResource> fmt::Debug for ResourceManager<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("collection", &R::COLLECTION)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<R: FirebaseResource> ResourceManager<R> {
    pub fn new(session: ApiSession, span: Span) -> Self {
        Self {
            session,
            span,
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    /// Lazily list the resources under `parent`.
    ///
    /// # Errors
    ///
    /// Returns a local validation error if the parent or query is invalid
    /// or `limit` is zero.
    pub fn paginate(
        &self,
        parent: &R::Parent,
        query: &R::Query,
        limit: Option<usize>,
    ) -> Result<Paginator<TokenPageSource<R>>> {
        let path = format!("{}/{}", parent.path()?, R::COLLECTION);
        let source = TokenPageSource {
            session: self.session.clone(),
            span: self.span.clone(),
            path,
            params: query.query_params()?,
            _resource: PhantomData,
        };
        Paginator::with_limit(source, limit)
    }
}

/// Page source driven by Google's `pageToken` / `nextPageToken` pair.
pub struct TokenPageSource<R: FirebaseResource> {
    session: ApiSession,
    span: Span,
    path: String,
    params: QueryParams,
    _resource: PhantomData<fn() -> R>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

impl<R: FirebaseResource> TokenPageSource<R> {
    async fn request(&self, cursor: Option<&str>) -> Result<CursorPage<R>> {
        let mut params = self.params.clone();
        if let Some(token) = cursor {
            params.push(("pageToken".to_string(), token.to_string()));
        }

        let mut response: ListResponse = self.session.get(&self.path, &params).await?;
        let items = match response.rest.remove(R::COLLECTION) {
            Some(Value::Null) | None => Vec::new(),
            Some(items) => serde_json::from_value(items)?,
        };
        let next = response.next_page_token.filter(|t| !t.is_empty());
        Ok(CursorPage::new(items, next))
    }
}

#[async_trait]
impl<R: FirebaseResource> PageSource for TokenPageSource<R> {
    type Item = R;

    async fn fetch_page(&mut self, cursor: Option<&str>) -> Result<CursorPage<R>> {
        self.request(cursor)
            .instrument(self.span.clone())
            .await
            .inspect_err(|e| log_failure(&self.span, VENDOR, "list", R::LABEL, e))
    }
}
