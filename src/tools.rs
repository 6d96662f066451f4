//! Tool handlers.
//!
//! Each handler runs one validated request against the client and renders
//! the result as content blocks: a summary line followed by one JSON block
//! per record. `get_novel` yields a single JSON block, or a fixed message
//! when nothing matched.

use crate::client::{Fetcher, NarouClient};
use crate::error::{NarouError, Result};
use crate::process::{
    self, enrich_novel, enrich_r18, filter_by_genre, paginate, HistoryFilter, Window,
};
use crate::query;
use crate::ranking::{today_jst, RankingQuery};
use crate::schema::{
    GetNovelRequest, NovelSearchRequest, R18SearchRequest, RankingHistoryRequest, RankingRequest,
    UserSearchRequest, ValidatedRequest,
};
use crate::types::Record;
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Registered tool names, in declaration order.
pub const TOOL_NAMES: [&str; 6] = [
    "get_novel",
    "search_novels",
    "get_ranking",
    "search_r18_novels",
    "search_users",
    "get_ranking_history",
];

/// Reply of `get_novel` when no record matched.
pub const NOVEL_NOT_FOUND: &str = "小説が見つかりませんでした。";

/// One block of tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Summary or status line.
    Text(String),
    /// One record, rendered pretty-printed.
    Json(Value),
}

impl Content {
    fn record(record: Record) -> Self {
        Self::Json(Value::Object(record))
    }

    /// The block as plain text.
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Json(v) => format!("{v:#}"),
        }
    }

    /// The block as an MCP text content item.
    pub fn to_mcp(&self) -> Value {
        json!({ "type": "text", "text": self.text() })
    }
}

/// Validate `args` for the named tool and run it.
///
/// Validation happens before any remote call.
pub async fn call_tool<F: Fetcher>(
    client: &NarouClient<F>,
    name: &str,
    args: &Value,
) -> Result<Vec<Content>> {
    let request = ValidatedRequest::parse(name, args)
        .ok_or_else(|| NarouError::UnknownTool(name.to_string()))??;
    tracing::debug!(tool = name, "running tool");
    run(client, &request).await
}

/// Run an already validated request.
pub async fn run<F: Fetcher>(
    client: &NarouClient<F>,
    request: &ValidatedRequest,
) -> Result<Vec<Content>> {
    match request {
        ValidatedRequest::GetNovel(req) => get_novel(client, req).await,
        ValidatedRequest::SearchNovels(req) => search_novels(client, req).await,
        ValidatedRequest::GetRanking(req) => get_ranking(client, req).await,
        ValidatedRequest::SearchR18Novels(req) => search_r18_novels(client, req).await,
        ValidatedRequest::SearchUsers(req) => search_users(client, req).await,
        ValidatedRequest::GetRankingHistory(req) => get_ranking_history(client, req).await,
    }
}

/// Fetch one novel by N-code.
pub async fn get_novel<F: Fetcher>(
    client: &NarouClient<F>,
    req: &GetNovelRequest,
) -> Result<Vec<Content>> {
    Ok(match client.get_novel(req).await? {
        Some(novel) => vec![Content::record(enrich_novel(&novel))],
        None => vec![Content::Text(NOVEL_NOT_FOUND.to_string())],
    })
}

/// Search general-audience novels.
pub async fn search_novels<F: Fetcher>(
    client: &NarouClient<F>,
    req: &NovelSearchRequest,
) -> Result<Vec<Content>> {
    let result = client.search_novels(req).await?;
    let window = Window::new(
        result.allcount,
        u64::from(req.start.unwrap_or(1)),
        result.values.len(),
    );
    let mut content = vec![Content::Text(process::search_summary("検索結果", window))];
    content.extend(
        result
            .values
            .iter()
            .map(|novel| Content::record(enrich_novel(novel))),
    );
    Ok(content)
}

/// Ranking with novel details, dated today (JST) unless a date is given.
pub async fn get_ranking<F: Fetcher>(
    client: &NarouClient<F>,
    req: &RankingRequest,
) -> Result<Vec<Content>> {
    get_ranking_on(client, req, today_jst()).await
}

/// A filtered, paginated ranking.
#[derive(Debug, Clone)]
pub struct RankingPage {
    pub ranking: RankingQuery,
    pub genre_filtered: bool,
    /// Rows left after the genre filter, before pagination.
    pub total: usize,
    pub rows: Vec<Record>,
}

/// Fetch a ranking, filter it by genre, then cut the requested window.
pub async fn ranking_page<F: Fetcher>(
    client: &NarouClient<F>,
    req: &RankingRequest,
    today: NaiveDate,
) -> Result<RankingPage> {
    let ranking = RankingQuery::resolve(req.date, req.ranking_type, today);
    let genre_filtered = req.genre.is_some() || req.big_genre.is_some();
    let fields = query::ranking_fields(&req.fields, genre_filtered);

    let rows = client.ranking(&ranking, &fields).await?;
    let rows = filter_by_genre(rows, req.genre, req.big_genre);
    let total = rows.len();
    Ok(RankingPage {
        ranking,
        genre_filtered,
        total,
        rows: paginate(rows, req.offset, req.limit),
    })
}

/// [`get_ranking`] with an explicit "today" for requests without a date.
pub async fn get_ranking_on<F: Fetcher>(
    client: &NarouClient<F>,
    req: &RankingRequest,
    today: NaiveDate,
) -> Result<Vec<Content>> {
    let page = ranking_page(client, req, today).await?;
    let summary = process::ranking_summary(
        req.date.map(|_| page.ranking.date),
        page.ranking.kind,
        page.genre_filtered,
        Window::from_offset(page.total, req.offset, page.rows.len()),
    );
    let mut content = vec![Content::Text(summary)];
    content.extend(page.rows.iter().map(|novel| Content::record(enrich_novel(novel))));
    Ok(content)
}

/// Search the mature-content sites.
pub async fn search_r18_novels<F: Fetcher>(
    client: &NarouClient<F>,
    req: &R18SearchRequest,
) -> Result<Vec<Content>> {
    let result = client.search_r18(req).await?;
    let window = Window::new(
        result.allcount,
        u64::from(req.start.unwrap_or(1)),
        result.values.len(),
    );
    let mut content = vec![Content::Text(process::search_summary("R18検索結果", window))];
    content.extend(
        result
            .values
            .iter()
            .map(|novel| Content::record(enrich_r18(novel))),
    );
    Ok(content)
}

/// Search authors.
pub async fn search_users<F: Fetcher>(
    client: &NarouClient<F>,
    req: &UserSearchRequest,
) -> Result<Vec<Content>> {
    let result = client.search_users(req).await?;
    let window = Window::new(
        result.allcount,
        u64::from(req.start.unwrap_or(1)),
        result.values.len(),
    );
    let mut content = vec![Content::Text(process::search_summary(
        "ユーザー検索結果",
        window,
    ))];
    content.extend(result.values.into_iter().map(Content::record));
    Ok(content)
}

/// Ranking appearances of one novel, newest first.
pub async fn get_ranking_history<F: Fetcher>(
    client: &NarouClient<F>,
    req: &RankingHistoryRequest,
) -> Result<Vec<Content>> {
    let filter = HistoryFilter {
        ranking_type: req.ranking_type,
        date_from: req.date_from,
        date_to: req.date_to,
    };
    let entries = filter.apply(client.ranking_history(&req.ncode).await?);
    let total = entries.len();
    let page = paginate(entries, req.offset, req.limit);

    let window = Window::from_offset(total, req.offset, page.len());
    let mut content = vec![Content::Text(process::history_summary(&filter, window))];
    for entry in &page {
        content.push(Content::Json(serde_json::to_value(entry)?));
    }
    Ok(content)
}
