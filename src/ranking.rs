//! Ranking endpoints and aggregation-date rules.
//!
//! The remote ranking is addressed by an `rtype` tag, `YYYYMMDD-x`, whose
//! date must fall on the period's aggregation boundary:
//!
//! | Period    | Anchor                                   |
//! |-----------|------------------------------------------|
//! | daily     | the date itself                          |
//! | weekly    | the most recent Tuesday on or before it  |
//! | monthly   | day 1 of its month                       |
//! | quarterly | day 1 of its month                       |

use crate::client::{Fetcher, NarouClient};
use crate::error::Result;
use crate::parse::{parse_rank_history, parse_rank_list, parse_search_response};
use crate::query;
use crate::types::{Field, RankEntry, RankingHistoryEntry, RankingType, Record};
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use serde_json::Value;
use std::collections::HashMap;

/// Weekday on which weekly rankings are aggregated.
pub const WEEKLY_ANCHOR: Weekday = Weekday::Tue;

/// Ranked novels looked up per detail request.
const DETAIL_CHUNK: usize = 100;

/// Snap `date` to the aggregation boundary of `kind`. Idempotent.
pub fn anchor_date(date: NaiveDate, kind: RankingType) -> NaiveDate {
    match kind {
        RankingType::Daily => date,
        RankingType::Weekly => {
            let since = date.weekday().num_days_from_monday() + 7
                - WEEKLY_ANCHOR.num_days_from_monday();
            date.checked_sub_days(Days::new(u64::from(since % 7)))
                .unwrap_or(date)
        }
        RankingType::Monthly | RankingType::Quarterly => date.with_day(1).unwrap_or(date),
    }
}

/// Today's date in Japan, where the rankings are aggregated.
pub fn today_jst() -> NaiveDate {
    (Utc::now() + chrono::Duration::hours(9)).date_naive()
}

/// A resolved ranking address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingQuery {
    pub date: NaiveDate,
    pub kind: RankingType,
}

impl RankingQuery {
    /// Resolve the optional date and period of a request.
    ///
    /// With both given the date is anchored. A date alone is used as-is
    /// for the daily ranking. Without a date, `today` is anchored for the
    /// requested period (daily by default).
    pub fn resolve(date: Option<NaiveDate>, kind: Option<RankingType>, today: NaiveDate) -> Self {
        match (date, kind) {
            (Some(date), Some(kind)) => Self {
                date: anchor_date(date, kind),
                kind,
            },
            (Some(date), None) => Self {
                date,
                kind: RankingType::Daily,
            },
            (None, kind) => {
                let kind = kind.unwrap_or(RankingType::Daily);
                Self {
                    date: anchor_date(today, kind),
                    kind,
                }
            }
        }
    }

    /// The `YYYYMMDD-x` tag.
    pub fn rtype(&self) -> String {
        format!("{}-{}", self.date.format("%Y%m%d"), self.kind.code())
    }
}

impl<F: Fetcher> NarouClient<F> {
    /// Raw ranking rows for one period.
    pub async fn rank_list(&self, ranking: &RankingQuery) -> Result<Vec<RankEntry>> {
        let body = self
            .get(&self.endpoints.rank_get, &query::rank_get(&ranking.rtype()))
            .await?;
        parse_rank_list(&body)
    }

    /// Ranking rows joined with novel details, in rank order.
    ///
    /// Details are looked up in sequential batches. A ranked novel with no
    /// details left (deleted, for instance) keeps only its ranking columns.
    pub async fn ranking(&self, ranking: &RankingQuery, fields: &[Field]) -> Result<Vec<Record>> {
        let ranks = self.rank_list(ranking).await?;
        tracing::debug!(rtype = %ranking.rtype(), rows = ranks.len(), "fetched ranking");

        let mut details: HashMap<String, Record> = HashMap::with_capacity(ranks.len());
        for chunk in ranks.chunks(DETAIL_CHUNK) {
            let ncodes: Vec<&str> = chunk.iter().map(|r| r.ncode.as_str()).collect();
            let body = self
                .get(&self.endpoints.novel, &query::ranking_details(&ncodes, fields))
                .await?;
            for record in parse_search_response(&body)?.values {
                if let Some(ncode) = record.get("ncode").and_then(Value::as_str) {
                    details.insert(ncode.to_ascii_uppercase(), record);
                }
            }
        }

        Ok(ranks
            .into_iter()
            .map(|entry| merge_rank(entry, &mut details))
            .collect())
    }

    /// Every ranking appearance of one novel, as returned by the remote.
    pub async fn ranking_history(&self, ncode: &str) -> Result<Vec<RankingHistoryEntry>> {
        let body = self
            .get(&self.endpoints.rank_in, &query::rank_in(ncode))
            .await?;
        parse_rank_history(&body)
    }
}

fn merge_rank(entry: RankEntry, details: &mut HashMap<String, Record>) -> Record {
    let mut record = details
        .remove(&entry.ncode.to_ascii_uppercase())
        .unwrap_or_default();
    record
        .entry("ncode")
        .or_insert_with(|| Value::from(entry.ncode.clone()));
    record.insert("rank".to_string(), Value::from(entry.rank));
    record.insert("pt".to_string(), Value::from(entry.pt));
    record
}
