//! Generic App Store Connect resource manager.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{Instrument, Span};

use super::resource::{Attributes, CreatePayload, Document, Entity, ListDocument, UpdatePayload};
use crate::client::{ApiSession, QueryParams};
use crate::error::{log_failure, require_non_empty, AppDistError, Result};
use crate::filter::Filter;
use crate::pagination::{CursorPage, PageSource, Paginator};
use crate::resource::Resource;

/// Default page size requested from list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page size the API accepts.
const MAX_PAGE_SIZE: usize = 200;

const VENDOR: &str = "App Store Connect";

/// CRUD façade over one App Store Connect resource type.
///
/// Stateless between calls: it only holds the shared session and the span
/// failures are logged in. Resource families with natural-key operations
/// add inherent methods on their concrete instantiation (see
/// [`BetaBuildLocalizations`](super::BetaBuildLocalizations)).
pub struct ResourceManager<A: Attributes> {
    session: ApiSession,
    span: Span,
    _attributes: PhantomData<fn() -> A>,
}

impl<A: Attributes> Clone for ResourceManager<A> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            span: self.span.clone(),
            _attributes: PhantomData,
        }
    }
}

impl<A: Attributes> fmt::Debug for ResourceManager<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("resource_type", &A::RESOURCE_TYPE)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<A: Attributes> ResourceManager<A> {
    /// Create a manager bound to `session`, logging failures inside `span`.
    pub fn new(session: ApiSession, span: Span) -> Self {
        Self {
            session,
            span,
            _attributes: PhantomData,
        }
    }

    /// Replace the span failures are logged in.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The session requests are issued through.
    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    fn collection_path() -> &'static str {
        A::RESOURCE_TYPE.as_str()
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", Self::collection_path(), urlencoding::encode(id))
    }

    async fn logged<T>(
        &self,
        action: &str,
        request: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        request
            .instrument(self.span.clone())
            .await
            .inspect_err(|e| log_failure(&self.span, VENDOR, action, Entity::<A>::LABEL, e))
    }

    /// Create a resource with one POST and return it flagged as created.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn create_resource<B>(
        &self,
        attributes: &B,
        relationships: &Map<String, Value>,
    ) -> Result<Entity<A>>
    where
        B: Serialize + Sync,
    {
        let payload = CreatePayload::new(A::RESOURCE_TYPE, attributes, relationships);
        let request = self
            .session
            .post::<_, Document<Entity<A>>>(Self::collection_path(), &payload);
        let document = self.logged("create", request).await?;
        Ok(document.data.mark_created())
    }

    /// Fetch one resource by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is empty or the request fails.
    pub async fn read(&self, id: &str) -> Result<Entity<A>> {
        require_non_empty("resource id", id)?;
        let path = Self::item_path(id);
        let query = QueryParams::new();
        let request = self.session.get::<Document<Entity<A>>>(&path, &query);
        Ok(self.logged("read", request).await?.data)
    }

    /// Patch the given attributes of a resource with one PATCH.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is empty or the request fails.
    pub async fn update<B>(&self, id: &str, attributes: &B) -> Result<Entity<A>>
    where
        B: Serialize + Sync,
    {
        require_non_empty("resource id", id)?;
        let payload = UpdatePayload::new(id, A::RESOURCE_TYPE, attributes);
        let path = Self::item_path(id);
        let request = self.session.patch::<_, Document<Entity<A>>>(&path, &payload);
        Ok(self.logged("modify", request).await?.data)
    }

    /// Delete a resource with one DELETE.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is empty or the request fails.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        require_non_empty("resource id", id)?;
        let path = Self::item_path(id);
        let request = self.session.delete(&path);
        self.logged("delete", request).await
    }

    /// List resources matching `filter`.
    ///
    /// Nothing is requested until the returned paginator is polled.
    ///
    /// # Errors
    ///
    /// Returns a local validation error if the filter is invalid.
    pub fn list(&self, filter: &A::Filter) -> Result<Paginator<LinksPageSource<A>>> {
        self.list_with_limit(filter, None)
    }

    /// List at most `limit` resources matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a local validation error if the filter is invalid or
    /// `limit` is zero.
    pub fn list_with_limit(
        &self,
        filter: &A::Filter,
        limit: Option<usize>,
    ) -> Result<Paginator<LinksPageSource<A>>> {
        let mut params = filter.query_params()?;
        let page_size = limit.map_or(DEFAULT_PAGE_SIZE, |l| l.min(MAX_PAGE_SIZE));
        params.push(("limit".to_string(), page_size.to_string()));

        let source = LinksPageSource {
            session: self.session.clone(),
            span: self.span.clone(),
            path: Self::collection_path(),
            params,
            _attributes: PhantomData,
        };
        Paginator::with_limit(source, limit)
    }

    /// Resolve a natural key to exactly one resource.
    ///
    /// Issues a single lookup listing. `key` only names the lookup in
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::NotFound`] if nothing matches and
    /// [`AppDistError::Ambiguous`] if more than one resource matches.
    pub async fn find_one(&self, filter: &A::Filter, key: &str) -> Result<Entity<A>> {
        let mut matches = self.list_with_limit(filter, Some(2))?;
        let first = matches.next().await?;
        let second = matches.next().await?;

        match (first, second) {
            (Some(entity), None) => Ok(entity),
            (None, _) => Err(AppDistError::NotFound {
                entity_type: Entity::<A>::LABEL,
                id: key.to_string(),
            }),
            (Some(_), Some(_)) => Err(AppDistError::Ambiguous {
                entity_type: Entity::<A>::LABEL,
                key: key.to_string(),
            }),
        }
    }
}

/// Page source following JSON:API `links.next` URLs.
///
/// The first request goes to the collection path with the filter
/// parameters; later requests use the absolute `next` link as-is, since it
/// already carries every parameter.
pub struct LinksPageSource<A: Attributes> {
    session: ApiSession,
    span: Span,
    path: &'static str,
    params: QueryParams,
    _attributes: PhantomData<fn() -> A>,
}

#[async_trait]
impl<A: Attributes> PageSource for LinksPageSource<A> {
    type Item = Entity<A>;

    async fn fetch_page(&mut self, cursor: Option<&str>) -> Result<CursorPage<Entity<A>>> {
        let result = match cursor {
            None => {
                self.session
                    .get::<ListDocument<Entity<A>>>(self.path, &self.params)
                    .instrument(self.span.clone())
                    .await
            }
            Some(next) => {
                self.session
                    .get::<ListDocument<Entity<A>>>(next, &Vec::new())
                    .instrument(self.span.clone())
                    .await
            }
        };
        let document =
            result.inspect_err(|e| log_failure(&self.span, VENDOR, "list", Entity::<A>::LABEL, e))?;

        let next_cursor = document.links.and_then(|links| links.next);
        Ok(CursorPage::new(document.data, next_cursor))
    }
}
