//! Search service - read-only queries over the record store

use crate::{
    config::SearchConfig,
    db::BusinessStore,
    models::{normalize_registration_number, Business, BusinessPage, SearchResult},
    Error, Result,
};
use std::sync::Arc;

pub struct SearchService {
    store: Arc<dyn BusinessStore>,
    config: SearchConfig,
}

fn search_failed(operation: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| Error::SearchFailed(format!("{operation}: {e}"))
}

impl SearchService {
    pub fn new(store: Arc<dyn BusinessStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    /// Case-insensitive substring search on business name.
    ///
    /// Verified businesses come first, then alphabetical by name. When the
    /// match set is small and the query long enough, up to
    /// `suggestion_limit` alternative names are offered.
    pub async fn search_by_name(&self, query: &str, limit: Option<u32>) -> Result<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Query parameter is required".into()));
        }
        let limit = self.effective_limit(limit)?;

        let businesses = self
            .store
            .search_by_name(query, i64::from(limit))
            .await
            .map_err(search_failed("search by name"))?;

        let suggestions = if businesses.len() < self.config.suggestion_threshold {
            self.suggestions(query).await?
        } else {
            Vec::new()
        };

        tracing::debug!(
            query,
            limit,
            returned = businesses.len(),
            suggestions = suggestions.len(),
            "Name search completed"
        );

        Ok(SearchResult {
            total: businesses.len() as i64,
            businesses,
            suggestions,
        })
    }

    /// Exact, case-insensitive lookup on registration number.
    pub async fn search_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<SearchResult> {
        let normalized = normalize_registration_number(registration_number);
        if normalized.is_empty() {
            return Err(Error::Validation("Query parameter is required".into()));
        }

        let business = self
            .store
            .find_by_registration_number(&normalized)
            .await
            .map_err(search_failed("search by registration number"))?;

        let businesses: Vec<Business> = business.into_iter().collect();
        Ok(SearchResult {
            total: businesses.len() as i64,
            businesses,
            suggestions: Vec::new(),
        })
    }

    pub async fn get_business_by_id(&self, id: &str) -> Result<Option<Business>> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        self.store
            .get(id)
            .await
            .map_err(search_failed("get business"))
    }

    /// Paginated listing, verified first then most recently updated.
    ///
    /// `total` is the full record count, not the page length.
    pub async fn list_all(&self, page: u32, page_size: Option<u32>) -> Result<BusinessPage> {
        if page == 0 {
            return Err(Error::Validation("page must be >= 1".into()));
        }
        let page_size = match page_size {
            Some(0) => return Err(Error::Validation("pageSize must be >= 1".into())),
            Some(size) => size.min(self.config.max_page_size),
            None => self.config.default_page_size,
        };
        let offset = i64::from(page - 1) * i64::from(page_size);

        let (businesses, total) = tokio::try_join!(
            self.store.list(offset, i64::from(page_size)),
            self.store.count(None),
        )
        .map_err(search_failed("list businesses"))?;

        Ok(BusinessPage {
            businesses,
            total,
            page,
            page_size,
        })
    }

    fn effective_limit(&self, limit: Option<u32>) -> Result<u32> {
        match limit {
            Some(0) => Err(Error::Validation("limit must be >= 1".into())),
            Some(limit) => Ok(limit.min(self.config.max_limit)),
            None => Ok(self.config.default_limit),
        }
    }

    /// Names sharing the query's leading characters, or whose business type
    /// contains the whole query. Ordered alphabetically.
    async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        let min_len = self.config.suggestion_min_query_len;
        if query.chars().count() < min_len {
            return Ok(Vec::new());
        }
        let prefix: String = query.chars().take(min_len).collect();

        self.store
            .suggest_names(&prefix, query, i64::from(self.config.suggestion_limit))
            .await
            .map_err(search_failed("suggestions"))
    }
}
