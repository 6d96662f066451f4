//! Search endpoints.
//!
//! Covers: novel search, mature novel search, user search, single novel lookup.

use crate::client::{Fetcher, NarouClient};
use crate::error::Result;
use crate::parse::parse_search_response;
use crate::query;
use crate::schema::{GetNovelRequest, NovelSearchRequest, R18SearchRequest, UserSearchRequest};
use crate::types::{Record, SearchResponse};

impl<F: Fetcher> NarouClient<F> {
    /// Search standard novels.
    pub async fn search_novels(&self, req: &NovelSearchRequest) -> Result<SearchResponse> {
        let body = self
            .get(&self.endpoints.novel, &query::novel_search(req))
            .await?;
        parse_search_response(&body)
    }

    /// Search the mature-content sites.
    pub async fn search_r18(&self, req: &R18SearchRequest) -> Result<SearchResponse> {
        let body = self
            .get(&self.endpoints.novel18, &query::r18_search(req))
            .await?;
        parse_search_response(&body)
    }

    /// Search authors.
    pub async fn search_users(&self, req: &UserSearchRequest) -> Result<SearchResponse> {
        let body = self
            .get(&self.endpoints.user, &query::user_search(req))
            .await?;
        parse_search_response(&body)
    }

    /// Fetch one novel by ncode. `Ok(None)` when nothing matched.
    pub async fn get_novel(&self, req: &GetNovelRequest) -> Result<Option<Record>> {
        let body = self
            .get(
                &self.endpoints.novel,
                &query::novel_detail(&req.ncode, &req.fields),
            )
            .await?;
        Ok(parse_search_response(&body)?.values.into_iter().next())
    }
}
