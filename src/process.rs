//! Client-side post-processing of remote results.
//!
//! The remote cannot filter rankings by genre nor ranking history by
//! period or date, so those filters run here. Pagination always applies to
//! the filtered (and, for history, sorted) collection.

use crate::catalog;
use crate::types::{BigGenre, Genre, RankingHistoryEntry, RankingType, Record};
use chrono::NaiveDate;
use serde_json::Value;

/// Detail page of a standard novel.
pub fn novel_url(ncode: &str) -> String {
    format!("https://ncode.syosetu.com/{ncode}/")
}

/// Detail page of a mature novel.
pub fn r18_url(ncode: &str) -> String {
    format!("https://novel18.syosetu.com/{ncode}/")
}

fn code(record: &Record, key: &str) -> Option<u32> {
    record
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|c| u32::try_from(c).ok())
}

fn ncode(record: &Record) -> Option<&str> {
    record
        .get("ncode")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Keep records whose genre codes match every requested constraint.
pub fn filter_by_genre(
    records: Vec<Record>,
    genre: Option<Genre>,
    big_genre: Option<BigGenre>,
) -> Vec<Record> {
    if genre.is_none() && big_genre.is_none() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| genre.map_or(true, |g| code(r, "genre") == Some(g.code())))
        .filter(|r| big_genre.map_or(true, |g| code(r, "biggenre") == Some(g.code())))
        .collect()
}

/// Period and inclusive date bounds applied to a ranking history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub ranking_type: Option<RankingType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl HistoryFilter {
    /// Whether any criterion is set.
    pub fn is_active(&self) -> bool {
        self.ranking_type.is_some() || self.date_from.is_some() || self.date_to.is_some()
    }

    fn accepts(&self, entry: &RankingHistoryEntry) -> bool {
        self.ranking_type.map_or(true, |t| entry.ranking_type == t)
            && self.date_from.map_or(true, |from| entry.date >= from)
            && self.date_to.map_or(true, |to| entry.date <= to)
    }

    /// Filter, then sort by date, most recent first.
    pub fn apply(&self, entries: Vec<RankingHistoryEntry>) -> Vec<RankingHistoryEntry> {
        let mut kept: Vec<_> = entries.into_iter().filter(|e| self.accepts(e)).collect();
        kept.sort_by(|a, b| b.date.cmp(&a.date));
        kept
    }
}

/// `slice(offset, offset + limit)`.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

/// Copy of a standard novel record with its URL and genre labels.
///
/// A derived key is omitted when its source code is absent or unmapped.
pub fn enrich_novel(record: &Record) -> Record {
    let mut enriched = record.clone();
    if let Some(ncode) = ncode(record) {
        enriched.insert("url".into(), Value::from(novel_url(ncode)));
    }
    if let Some(label) = code(record, "genre").and_then(|c| catalog::genres().label_for_code(c)) {
        enriched.insert("genreNotation".into(), Value::from(label));
    }
    if let Some(label) =
        code(record, "biggenre").and_then(|c| catalog::big_genres().label_for_code(c))
    {
        enriched.insert("bigGenreNotation".into(), Value::from(label));
    }
    enriched
}

/// Copy of a mature novel record with its URL and site label.
pub fn enrich_r18(record: &Record) -> Record {
    let mut enriched = record.clone();
    if let Some(ncode) = ncode(record) {
        enriched.insert("url".into(), Value::from(r18_url(ncode)));
    }
    if let Some(label) = code(record, "nocgenre").and_then(|c| catalog::r18_sites().label_for_code(c))
    {
        enriched.insert("site".into(), Value::from(label));
    }
    enriched
}

/// The 1-based window of results actually returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Matches before pagination.
    pub total: u64,
    /// 1-based index of the first returned item.
    pub first: u64,
    pub returned: usize,
}

impl Window {
    /// Window starting at the 1-based position `first`.
    pub fn new(total: u64, first: u64, returned: usize) -> Self {
        Self {
            total,
            first,
            returned,
        }
    }

    /// Window of an offset slice over `total` items.
    pub fn from_offset(total: usize, offset: usize, returned: usize) -> Self {
        Self::new(total as u64, offset as u64 + 1, returned)
    }

    /// `{total}件中 {first}〜{last}件目`, or just the total when nothing was returned.
    pub fn describe(&self) -> String {
        if self.returned == 0 {
            return format!("{}件中 0件", self.total);
        }
        let last = self.first + self.returned as u64 - 1;
        format!("{}件中 {}〜{}件目", self.total, self.first, last)
    }
}

/// Summary line of a search result.
pub fn search_summary(prefix: &str, window: Window) -> String {
    format!("{prefix}: {}", window.describe())
}

/// Summary of a ranking page.
///
/// `date` is the aggregation date when the caller chose one.
pub fn ranking_summary(
    date: Option<NaiveDate>,
    kind: RankingType,
    genre_filtered: bool,
    window: Window,
) -> String {
    let period = catalog::ranking_types().to_label(kind);
    let head = match date {
        Some(date) => format!("集計日: {date} ({period})"),
        None => format!("最新ランキング ({period})"),
    };
    let filter = if genre_filtered {
        " ジャンルフィルタ適用後"
    } else {
        ""
    };
    format!("{head}{filter}: {}", window.describe())
}

/// Summary of a ranking history page, naming any active filters.
pub fn history_summary(filter: &HistoryFilter, window: Window) -> String {
    let mut summary = format!("ランキング履歴結果: {}", window.describe());
    if !filter.is_active() {
        return summary;
    }
    let mut notes = Vec::new();
    if let Some(kind) = filter.ranking_type {
        notes.push(format!("種別: {}", catalog::ranking_types().to_label(kind)));
    }
    if filter.date_from.is_some() || filter.date_to.is_some() {
        let from = filter.date_from.map(|d| d.to_string()).unwrap_or_default();
        let to = filter.date_to.map(|d| d.to_string()).unwrap_or_default();
        notes.push(format!("期間: {from}〜{to}"));
    }
    summary.push_str(&format!(" [{}]", notes.join(", ")));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn history(y: i32, m: u32, d: u32, kind: RankingType) -> RankingHistoryEntry {
        RankingHistoryEntry {
            rtype: format!("{:04}{:02}{:02}-{}", y, m, d, kind.code()),
            date: date(y, m, d),
            ranking_type: kind,
            pt: 100,
            rank: 1,
        }
    }

    #[test]
    fn test_history_scenario() {
        let entries = vec![
            history(2023, 1, 1, RankingType::Weekly),
            history(2023, 6, 1, RankingType::Monthly),
            history(2024, 1, 1, RankingType::Weekly),
        ];
        let filter = HistoryFilter {
            ranking_type: Some(RankingType::Weekly),
            ..Default::default()
        };
        let kept = filter.apply(entries);
        let dates: Vec<_> = kept.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2023, 1, 1)]);
    }

    #[test]
    fn test_history_date_bounds_are_inclusive() {
        let entries = vec![
            history(2023, 1, 1, RankingType::Daily),
            history(2023, 6, 1, RankingType::Monthly),
            history(2024, 1, 1, RankingType::Weekly),
        ];
        let filter = HistoryFilter {
            date_from: Some(date(2023, 6, 1)),
            date_to: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert_eq!(filter.apply(entries.clone()).len(), 2);

        let filter = HistoryFilter {
            date_to: Some(date(2023, 6, 1)),
            ..Default::default()
        };
        let kept = filter.apply(entries);
        assert_eq!(kept[0].date, date(2023, 6, 1));
        assert_eq!(kept[1].date, date(2023, 1, 1));
    }

    #[test]
    fn test_unfiltered_history_still_sorted() {
        let entries = vec![
            history(2022, 5, 1, RankingType::Daily),
            history(2024, 5, 1, RankingType::Daily),
            history(2023, 5, 1, RankingType::Daily),
        ];
        let kept = HistoryFilter::default().apply(entries);
        assert_eq!(kept[0].date, date(2024, 5, 1));
        assert_eq!(kept[2].date, date(2022, 5, 1));
    }

    #[test]
    fn test_genre_filter_then_paginate() {
        let records: Vec<Record> = (0..10)
            .map(|i| {
                let genre = if i % 3 == 0 { 201 } else { 101 };
                record(json!({ "ncode": format!("N{:04}AA", i), "genre": genre, "biggenre": genre / 100 }))
            })
            .collect();

        let filtered = filter_by_genre(records.clone(), Some(Genre::FantasyHigh), None);
        assert_eq!(filtered.len(), 4);
        let page = paginate(filtered, 0, 5);
        assert_eq!(page.len(), 4);
        assert!(page.iter().all(|r| r["genre"] == 201));

        let filtered = filter_by_genre(records.clone(), None, Some(BigGenre::Renai));
        assert_eq!(filtered.len(), 6);
        let page = paginate(filtered, 5, 5);
        assert_eq!(page.len(), 1);

        let none = filter_by_genre(records, Some(Genre::FantasyHigh), Some(BigGenre::Renai));
        assert!(none.is_empty());
    }

    #[test]
    fn test_genre_filter_drops_records_without_codes() {
        let records = vec![record(json!({ "ncode": "N0001AA" }))];
        assert!(filter_by_genre(records.clone(), Some(Genre::FantasyHigh), None).is_empty());
        assert_eq!(filter_by_genre(records, None, None).len(), 1);
    }

    #[test]
    fn test_enrich_novel() {
        let raw = record(json!({ "ncode": "N9669BK", "genre": 201, "biggenre": 2 }));
        let enriched = enrich_novel(&raw);
        assert_eq!(enriched["url"], "https://ncode.syosetu.com/N9669BK/");
        assert_eq!(enriched["genreNotation"], "ハイファンタジー〔ファンタジー〕");
        assert_eq!(enriched["bigGenreNotation"], "ファンタジー");
        assert!(raw.get("url").is_none());
    }

    #[test]
    fn test_enrich_omits_unmapped_labels() {
        let enriched = enrich_novel(&record(json!({ "ncode": "N0001AA", "genre": 0, "biggenre": 0 })));
        assert!(enriched.get("genreNotation").is_none());
        assert!(enriched.get("bigGenreNotation").is_none());

        let enriched = enrich_novel(&record(json!({ "title": "x" })));
        assert!(enriched.get("url").is_none());
    }

    #[test]
    fn test_enrich_r18() {
        let enriched = enrich_r18(&record(json!({ "ncode": "N1234AB", "nocgenre": 2 })));
        assert_eq!(enriched["url"], "https://novel18.syosetu.com/N1234AB/");
        assert_eq!(enriched["site"], "ムーンライトノベルズ(女性向け)");
        assert!(enriched.get("genreNotation").is_none());
    }

    #[test]
    fn test_window_describe() {
        assert_eq!(Window::new(1234, 1, 20).describe(), "1234件中 1〜20件目");
        assert_eq!(Window::new(1234, 21, 20).describe(), "1234件中 21〜40件目");
        assert_eq!(Window::new(0, 1, 0).describe(), "0件中 0件");
        assert_eq!(Window::from_offset(12, 10, 2).describe(), "12件中 11〜12件目");
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            search_summary("検索結果", Window::new(3, 1, 3)),
            "検索結果: 3件中 1〜3件目"
        );
        assert_eq!(
            ranking_summary(Some(date(2024, 3, 12)), RankingType::Weekly, true, Window::from_offset(4, 0, 4)),
            "集計日: 2024-03-12 (週間) ジャンルフィルタ適用後: 4件中 1〜4件目"
        );
        assert_eq!(
            ranking_summary(None, RankingType::Daily, false, Window::from_offset(300, 0, 10)),
            "最新ランキング (日間): 300件中 1〜10件目"
        );

        let filter = HistoryFilter {
            ranking_type: Some(RankingType::Weekly),
            date_from: Some(date(2023, 1, 1)),
            date_to: None,
        };
        assert_eq!(
            history_summary(&filter, Window::from_offset(2, 0, 2)),
            "ランキング履歴結果: 2件中 1〜2件目 [種別: 週間, 期間: 2023-01-01〜]"
        );
        assert_eq!(
            history_summary(&HistoryFilter::default(), Window::from_offset(0, 0, 0)),
            "ランキング履歴結果: 0件中 0件"
        );
    }
}
