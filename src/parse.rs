//! Narou API response parsing.

use crate::error::{NarouError, Result};
use crate::types::{RankEntry, RankingHistoryEntry, RankingType, Record, SearchResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// Custom deserializer for counters that may arrive as numbers or numeric strings.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or numeric string")
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(v).map_err(|_| E::custom(format!("negative count: {v}")))
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("not a count: {v:?}")))
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

/// Row of `/rank/rankget/`.
#[derive(Debug, Deserialize)]
struct RawRank {
    ncode: String,
    #[serde(deserialize_with = "deserialize_count")]
    pt: u64,
    #[serde(deserialize_with = "deserialize_count")]
    rank: u64,
}

/// Row of `/rank/rankin/`.
#[derive(Debug, Deserialize)]
struct RawRankIn {
    rtype: String,
    #[serde(deserialize_with = "deserialize_count")]
    pt: u64,
    #[serde(deserialize_with = "deserialize_count")]
    rank: u64,
}

fn invalid(what: &str, e: impl std::fmt::Display) -> NarouError {
    NarouError::Parse(format!("Invalid {what} response: {e}"))
}

/// Parse a search response: a count header followed by records.
///
/// The remote returns `[{"allcount": N}, record, ...]`. An empty array is
/// treated as zero results.
pub fn parse_search_response(json: &str) -> Result<SearchResponse> {
    let value: Value = serde_json::from_str(json).map_err(|e| invalid("search", e))?;
    let Value::Array(items) = value else {
        return Err(invalid("search", "expected a JSON array"));
    };
    let mut items = items.into_iter();

    let allcount = match items.next() {
        None => 0,
        Some(Value::Object(header)) => header
            .get("allcount")
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid("search", "missing allcount header"))?,
        Some(_) => return Err(invalid("search", "header is not an object")),
    };

    let values = items
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(invalid("search", "record is not an object")),
        })
        .collect::<Result<Vec<Record>>>()?;

    Ok(SearchResponse { allcount, values })
}

/// Parse a ranking list.
pub fn parse_rank_list(json: &str) -> Result<Vec<RankEntry>> {
    let rows: Vec<RawRank> = serde_json::from_str(json).map_err(|e| invalid("ranking", e))?;
    rows.into_iter()
        .map(|row| {
            Ok(RankEntry {
                ncode: row.ncode,
                pt: row.pt,
                rank: u32::try_from(row.rank).map_err(|e| invalid("ranking", e))?,
            })
        })
        .collect()
}

/// Parse the ranking history of one novel.
///
/// Each `rtype` tag (`YYYYMMDD-x`) is split into its date and period.
pub fn parse_rank_history(json: &str) -> Result<Vec<RankingHistoryEntry>> {
    let rows: Vec<RawRankIn> =
        serde_json::from_str(json).map_err(|e| invalid("ranking history", e))?;
    rows.into_iter()
        .map(|row| {
            let (date, ranking_type) = split_rtype(&row.rtype)?;
            Ok(RankingHistoryEntry {
                rtype: row.rtype,
                date,
                ranking_type,
                pt: row.pt,
                rank: u32::try_from(row.rank).map_err(|e| invalid("ranking history", e))?,
            })
        })
        .collect()
}

fn split_rtype(rtype: &str) -> Result<(NaiveDate, RankingType)> {
    let bad = || invalid("ranking history", format!("malformed rtype {rtype:?}"));
    let (date, kind) = rtype.split_once('-').ok_or_else(bad)?;
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| bad())?;
    let kind = RankingType::ALL
        .iter()
        .copied()
        .find(|t| t.code() == kind)
        .ok_or_else(bad)?;
    Ok((date, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SEARCH: &str = r#"[
        {"allcount": 1234},
        {"ncode": "N9669BK", "title": "無職転生", "genre": 201, "biggenre": 2},
        {"ncode": "N4830BU", "title": "本好きの下剋上", "genre": 201, "biggenre": 2}
    ]"#;

    #[test]
    fn test_parse_search_response() {
        let result = parse_search_response(SAMPLE_SEARCH).unwrap();
        assert_eq!(result.allcount, 1234);
        assert_eq!(result.values.len(), 2);
        assert_eq!(result.values[0]["ncode"], "N9669BK");
        assert_eq!(result.values[1]["genre"], 201);
    }

    #[test]
    fn test_parse_search_response_empty() {
        let result = parse_search_response("[]").unwrap();
        assert_eq!(result.allcount, 0);
        assert!(result.values.is_empty());

        let result = parse_search_response(r#"[{"allcount": 0}]"#).unwrap();
        assert_eq!(result.allcount, 0);
    }

    #[test]
    fn test_parse_search_response_rejects_malformed() {
        assert!(matches!(
            parse_search_response(r#"{"error": "x"}"#),
            Err(NarouError::Parse(_))
        ));
        assert!(parse_search_response(r#"[{"count": 1}]"#).is_err());
        assert!(parse_search_response("<html>").is_err());
    }

    #[test]
    fn test_parse_rank_list() {
        let json = r#"[{"ncode":"N1111AA","pt":5000,"rank":1},{"ncode":"N2222BB","pt":"4800","rank":2}]"#;
        let ranks = parse_rank_list(json).unwrap();
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[0].ncode, "N1111AA");
        assert_eq!(ranks[1].pt, 4800);
        assert_eq!(ranks[1].rank, 2);
    }

    #[test]
    fn test_parse_rank_history() {
        let json = r#"[
            {"rtype":"20230101-w","pt":120,"rank":3},
            {"rtype":"20230601-m","pt":900,"rank":15}
        ]"#;
        let history = parse_rank_history(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(history[0].ranking_type, RankingType::Weekly);
        assert_eq!(history[1].ranking_type, RankingType::Monthly);
        assert_eq!(history[1].rtype, "20230601-m");
    }

    #[test]
    fn test_parse_rank_history_rejects_bad_rtype() {
        assert!(parse_rank_history(r#"[{"rtype":"2023-w","pt":1,"rank":1}]"#).is_err());
        assert!(parse_rank_history(r#"[{"rtype":"20230101-y","pt":1,"rank":1}]"#).is_err());
        assert!(parse_rank_history(r#"[{"rtype":"20230101","pt":1,"rank":1}]"#).is_err());
    }
}
