//! Validated tool inputs.
//!
//! Each tool's raw JSON arguments are parsed into one request type here:
//! labels are translated through the [`catalog`](crate::catalog), numeric
//! bounds and patterns are checked, and documented defaults are filled in.
//! The first violated constraint stops parsing.
//!
//! Optional fields follow one of three policies:
//! - absent stays `None` and the remote default applies (filters, ranges, flags);
//! - absent takes a fixed default (fields, order, limit, search targets, offsets);
//! - present is passed through.

use crate::catalog::{self, LabelMap, Notation, DEFAULT_FIELDS, DEFAULT_R18_FIELDS};
use crate::error::{ValidationError, ValidationKind};
use crate::types::{
    BigGenre, Buntai, DateFilter, Field, Genre, NovelType, Order, R18Field, R18Site, Range,
    RankingType, UserField, UserOrder,
};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Pattern a novel identifier must match.
pub const NCODE_PATTERN: &str = "^[nN][0-9]{4}[a-zA-Z]{1,2}$";

static NCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NCODE_PATTERN).expect("NCODE_PATTERN is a valid regex"));

/// Offset of Japan Standard Time from UTC, in seconds.
const JST_OFFSET_SECS: i64 = 9 * 60 * 60;

pub const SEARCH_LIMIT_MAX: u64 = 500;
pub const SEARCH_START_MAX: u64 = 2000;
pub const RANKING_LIMIT_MAX: u64 = 300;
pub const RANKING_OFFSET_MAX: u64 = 299;
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const DEFAULT_RANKING_LIMIT: usize = 10;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

type Validated<T> = Result<T, ValidationError>;

/// Which parts of a novel the search word is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTargets {
    pub title: bool,
    pub outline: bool,
    pub keyword: bool,
    pub author: bool,
}

impl Default for SearchTargets {
    fn default() -> Self {
        Self {
            title: true,
            outline: true,
            keyword: true,
            author: true,
        }
    }
}

/// Input of `get_novel`.
#[derive(Debug, Clone, PartialEq)]
pub struct GetNovelRequest {
    pub ncode: String,
    pub fields: Vec<Field>,
}

/// Input of `search_novels`.
#[derive(Debug, Clone, PartialEq)]
pub struct NovelSearchRequest {
    pub word: Option<String>,
    pub notword: Option<String>,
    pub ncode: Option<Vec<String>>,
    pub user_id: Option<Vec<u64>>,

    pub genre: Option<Genre>,
    pub not_genre: Option<Genre>,
    pub big_genre: Option<BigGenre>,
    pub not_big_genre: Option<BigGenre>,

    pub novel_type: Option<NovelType>,
    pub buntai: Option<Buntai>,

    pub length: Option<Range>,
    pub time: Option<Range>,
    pub kaiwaritu: Option<Range>,
    pub sasie: Option<Range>,

    pub last_update: Option<DateFilter>,
    pub last_novel_update: Option<DateFilter>,

    pub is_r15: Option<bool>,
    pub is_bl: Option<bool>,
    pub is_gl: Option<bool>,
    pub is_zankoku: Option<bool>,
    pub is_tensei: Option<bool>,
    pub is_tenni: Option<bool>,
    pub is_stop: Option<bool>,
    pub is_pickup: bool,
    pub is_tt: bool,

    pub targets: SearchTargets,

    pub fields: Vec<Field>,
    pub order: Order,
    pub limit: u32,
    /// 1-based start position.
    pub start: Option<u32>,
}

/// Input of `get_ranking`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRequest {
    pub date: Option<NaiveDate>,
    pub ranking_type: Option<RankingType>,
    pub fields: Vec<Field>,
    pub genre: Option<Genre>,
    pub big_genre: Option<BigGenre>,
    pub limit: usize,
    /// 0-based offset into the filtered ranking.
    pub offset: usize,
}

/// Input of `search_r18_novels`.
#[derive(Debug, Clone, PartialEq)]
pub struct R18SearchRequest {
    pub word: Option<String>,
    pub fields: Vec<R18Field>,
    pub site: Option<R18Site>,
    pub order: Order,
    pub novel_type: Option<NovelType>,
    pub limit: u32,
    pub start: Option<u32>,
}

/// Input of `search_users`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSearchRequest {
    pub word: Option<String>,
    pub notword: Option<String>,
    pub user_id: Option<u64>,
    pub name1st: Option<String>,
    pub min_novel: Option<u64>,
    pub max_novel: Option<u64>,
    pub min_review: Option<u64>,
    pub max_review: Option<u64>,
    /// `None` leaves the remote default field set.
    pub fields: Option<Vec<UserField>>,
    pub order: UserOrder,
    pub limit: u32,
    pub start: Option<u32>,
}

/// Input of `get_ranking_history`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingHistoryRequest {
    pub ncode: String,
    pub limit: usize,
    pub offset: usize,
    pub ranking_type: Option<RankingType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A parsed tool call, one variant per tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedRequest {
    GetNovel(GetNovelRequest),
    SearchNovels(Box<NovelSearchRequest>),
    GetRanking(RankingRequest),
    SearchR18Novels(R18SearchRequest),
    SearchUsers(UserSearchRequest),
    GetRankingHistory(RankingHistoryRequest),
}

impl ValidatedRequest {
    /// Parse the arguments of the named tool. `None` for an unknown tool.
    pub fn parse(tool: &str, args: &Value) -> Option<Validated<Self>> {
        let parsed = match tool {
            "get_novel" => GetNovelRequest::from_args(args).map(Self::GetNovel),
            "search_novels" => {
                NovelSearchRequest::from_args(args).map(|r| Self::SearchNovels(Box::new(r)))
            }
            "get_ranking" => RankingRequest::from_args(args).map(Self::GetRanking),
            "search_r18_novels" => R18SearchRequest::from_args(args).map(Self::SearchR18Novels),
            "search_users" => UserSearchRequest::from_args(args).map(Self::SearchUsers),
            "get_ranking_history" => {
                RankingHistoryRequest::from_args(args).map(Self::GetRankingHistory)
            }
            _ => return None,
        };
        Some(parsed)
    }
}

impl GetNovelRequest {
    /// Validate tool arguments.
    pub fn from_args(args: &Value) -> Validated<Self> {
        let args = Args::new(args)?;
        Ok(Self {
            ncode: args.ncode("ncode")?,
            fields: args
                .labels("fields", catalog::fields())?
                .unwrap_or_else(|| DEFAULT_FIELDS.to_vec()),
        })
    }
}

impl NovelSearchRequest {
    /// Validate tool arguments.
    pub fn from_args(args: &Value) -> Validated<Self> {
        let args = Args::new(args)?;
        Ok(Self {
            word: args.opt_str("word")?,
            notword: args.opt_str("notword")?,
            ncode: args.str_or_list("ncode")?,
            user_id: args.int_or_list("userId")?,

            genre: args.label("genre", catalog::genres())?,
            not_genre: args.label("notGenre", catalog::genres())?,
            big_genre: args.label("bigGenre", catalog::big_genres())?,
            not_big_genre: args.label("notBigGenre", catalog::big_genres())?,

            novel_type: args.label("novelType", catalog::novel_types())?,
            buntai: args.label("buntai", catalog::buntai())?,

            length: args.range("minLength", "maxLength")?,
            time: args.range("minTime", "maxTime")?,
            kaiwaritu: args.range("minKaiwaritu", "maxKaiwaritu")?,
            sasie: args.range("minSasie", "maxSasie")?,

            last_update: args.date_filter("lastUpdateFrom", "lastUpdateTo")?,
            last_novel_update: args.date_filter("lastNovelUpdateFrom", "lastNovelUpdateTo")?,

            is_r15: args.opt_bool("isR15")?,
            is_bl: args.opt_bool("isBL")?,
            is_gl: args.opt_bool("isGL")?,
            is_zankoku: args.opt_bool("isZankoku")?,
            is_tensei: args.opt_bool("isTensei")?,
            is_tenni: args.opt_bool("isTenni")?,
            is_stop: args.opt_bool("isStop")?,
            is_pickup: args.opt_bool("isPickup")?.unwrap_or(false),
            is_tt: args.opt_bool("isTT")?.unwrap_or(false),

            targets: SearchTargets {
                title: args.opt_bool("byTitle")?.unwrap_or(true),
                outline: args.opt_bool("byOutline")?.unwrap_or(true),
                keyword: args.opt_bool("byKeyword")?.unwrap_or(true),
                author: args.opt_bool("byAuthor")?.unwrap_or(true),
            },

            fields: args
                .labels("fields", catalog::fields())?
                .unwrap_or_else(|| DEFAULT_FIELDS.to_vec()),
            order: args.label("order", catalog::orders())?.unwrap_or(Order::New),
            limit: args.search_limit()?,
            start: args.search_start()?,
        })
    }
}

impl RankingRequest {
    /// Validate tool arguments.
    pub fn from_args(args: &Value) -> Validated<Self> {
        let args = Args::new(args)?;
        Ok(Self {
            date: args.date("date")?,
            ranking_type: args.label("rankingType", catalog::ranking_types())?,
            fields: args
                .labels("fields", catalog::fields())?
                .unwrap_or_else(|| DEFAULT_FIELDS.to_vec()),
            genre: args.label("genre", catalog::genres())?,
            big_genre: args.label("bigGenre", catalog::big_genres())?,
            limit: args
                .bounded("limit", 1, Some(RANKING_LIMIT_MAX))?
                .map_or(DEFAULT_RANKING_LIMIT, |n| n as usize),
            offset: args
                .bounded("offset", 0, Some(RANKING_OFFSET_MAX))?
                .map_or(0, |n| n as usize),
        })
    }
}

impl R18SearchRequest {
    /// Validate tool arguments.
    pub fn from_args(args: &Value) -> Validated<Self> {
        let args = Args::new(args)?;
        Ok(Self {
            word: args.opt_str("word")?,
            fields: args
                .labels("fields", catalog::r18_fields())?
                .unwrap_or_else(|| DEFAULT_R18_FIELDS.to_vec()),
            site: args.label("r18Site", catalog::r18_sites())?,
            order: args.label("order", catalog::orders())?.unwrap_or(Order::New),
            novel_type: args.label("novelType", catalog::novel_types())?,
            limit: args.search_limit()?,
            start: args.search_start()?,
        })
    }
}

impl UserSearchRequest {
    /// Validate tool arguments.
    pub fn from_args(args: &Value) -> Validated<Self> {
        let args = Args::new(args)?;
        Ok(Self {
            word: args.opt_str("word")?,
            notword: args.opt_str("notword")?,
            user_id: args.bounded("userId", 0, None)?,
            name1st: args.opt_str("name1st")?,
            min_novel: args.bounded("minNovel", 0, None)?,
            max_novel: args.bounded("maxNovel", 0, None)?,
            min_review: args.bounded("minReview", 0, None)?,
            max_review: args.bounded("maxReview", 0, None)?,
            fields: args.labels("fields", catalog::user_fields())?,
            order: args
                .label("order", catalog::user_orders())?
                .unwrap_or(UserOrder::New),
            limit: args.search_limit()?,
            start: args.search_start()?,
        })
    }
}

impl RankingHistoryRequest {
    /// Validate tool arguments.
    pub fn from_args(args: &Value) -> Validated<Self> {
        let args = Args::new(args)?;
        Ok(Self {
            ncode: args.ncode("ncode")?,
            limit: args
                .bounded("limit", 1, None)?
                .map_or(DEFAULT_HISTORY_LIMIT, |n| n as usize),
            offset: args.bounded("offset", 0, None)?.map_or(0, |n| n as usize),
            ranking_type: args.label("rankingType", catalog::ranking_types())?,
            date_from: args.date("dateFrom")?,
            date_to: args.date("dateTo")?,
        })
    }
}

/// Typed accessors over a tool's argument object.
struct Args<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    fn new(value: &'a Value) -> Validated<Self> {
        match value {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            _ => Err(ValidationError::new(
                "arguments",
                ValidationKind::Type { expected: "object" },
            )),
        }
    }

    /// Explicit `null` counts as absent.
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.map?.get(name).filter(|v| !v.is_null())
    }

    fn type_error(name: &str, expected: &'static str) -> ValidationError {
        ValidationError::new(name, ValidationKind::Type { expected })
    }

    /// Empty strings count as absent.
    fn opt_str(&self, name: &str) -> Validated<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Self::type_error(name, "string")),
        }
    }

    fn opt_bool(&self, name: &str) -> Validated<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Self::type_error(name, "boolean")),
        }
    }

    fn integer(name: &str, value: &Value) -> Validated<i128> {
        value
            .as_i64()
            .map(i128::from)
            .or_else(|| value.as_u64().map(i128::from))
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i128)
            })
            .ok_or_else(|| Self::type_error(name, "integer"))
    }

    /// An optional integer within `[min, max]`.
    fn bounded(&self, name: &str, min: u64, max: Option<u64>) -> Validated<Option<u64>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let n = Self::integer(name, value)?;
        let too_low = n < i128::from(min);
        let too_high = max.is_some_and(|m| n > i128::from(m));
        if too_low || too_high {
            return Err(ValidationError::new(name, ValidationKind::Range { min, max }));
        }
        Ok(Some(n as u64))
    }

    fn search_limit(&self) -> Validated<u32> {
        Ok(self
            .bounded("limit", 1, Some(SEARCH_LIMIT_MAX))?
            .map_or(DEFAULT_SEARCH_LIMIT, |n| n as u32))
    }

    fn search_start(&self) -> Validated<Option<u32>> {
        Ok(self
            .bounded("start", 1, Some(SEARCH_START_MAX))?
            .map(|n| n as u32))
    }

    fn range(&self, min: &str, max: &str) -> Validated<Option<Range>> {
        Ok(Range::from_bounds(
            self.bounded(min, 0, None)?,
            self.bounded(max, 0, None)?,
        ))
    }

    fn str_or_list(&self, name: &str) -> Validated<Option<Vec<String>>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => {
                let list = items
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| Self::type_error(name, "string or array of strings"))
                    })
                    .collect::<Validated<Vec<_>>>()?;
                Ok((!list.is_empty()).then_some(list))
            }
            Some(_) => Err(Self::type_error(name, "string or array of strings")),
        }
    }

    fn int_or_list(&self, name: &str) -> Validated<Option<Vec<u64>>> {
        let check = |v: &Value| -> Validated<u64> {
            let n = Self::integer(name, v)?;
            u64::try_from(n)
                .map_err(|_| ValidationError::new(name, ValidationKind::Range { min: 0, max: None }))
        };
        match self.get(name) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let list = items.iter().map(check).collect::<Validated<Vec<_>>>()?;
                Ok((!list.is_empty()).then_some(list))
            }
            Some(v) => Ok(Some(vec![check(v)?])),
        }
    }

    fn label<C: Notation>(&self, name: &str, map: &LabelMap<C>) -> Validated<Option<C>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => map
                .to_code(s)
                .map(Some)
                .map_err(|e| ValidationError::new(name, ValidationKind::UnknownLabel(e))),
            Some(_) => Err(Self::type_error(name, "string label")),
        }
    }

    fn labels<C: Notation>(&self, name: &str, map: &LabelMap<C>) -> Validated<Option<Vec<C>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| Self::type_error(name, "array of string labels"))?;
        let labels = items
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| Self::type_error(name, "array of string labels"))
            })
            .collect::<Validated<Vec<_>>>()?;
        map.to_codes(&labels)
            .map(Some)
            .map_err(|e| ValidationError::new(name, ValidationKind::UnknownLabel(e)))
    }

    fn ncode(&self, name: &str) -> Validated<String> {
        let value = self
            .opt_str(name)?
            .ok_or_else(|| ValidationError::new(name, ValidationKind::Missing))?;
        if !NCODE_RE.is_match(&value) {
            return Err(ValidationError::new(
                name,
                ValidationKind::Pattern {
                    pattern: NCODE_PATTERN,
                },
            ));
        }
        Ok(value)
    }

    fn date(&self, name: &str) -> Validated<Option<NaiveDate>> {
        let Some(s) = self.opt_str(name)? else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ValidationError::new(
                    name,
                    ValidationKind::Format {
                        expected: "YYYY-MM-DD",
                    },
                )
            })
    }

    /// Both ends become a unix-second pair; a lone start is sent verbatim.
    fn date_filter(&self, from: &str, to: &str) -> Validated<Option<DateFilter>> {
        let from_value = self.opt_str(from)?;
        let to_value = self.opt_str(to)?;
        match (from_value, to_value) {
            (Some(f), Some(t)) => Ok(Some(DateFilter::Between(
                jst_timestamp(from, &f)?,
                jst_timestamp(to, &t)?,
            ))),
            (Some(f), None) => Ok(Some(DateFilter::Cutoff(f))),
            (None, _) => Ok(None),
        }
    }
}

/// Parse a Japan-local `YYYY-MM-DD[ HH:MM:SS]` into unix seconds.
fn jst_timestamp(field: &str, s: &str) -> Validated<i64> {
    let parsed = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            ValidationError::new(
                field,
                ValidationKind::Format {
                    expected: "YYYY-MM-DD HH:MM:SS",
                },
            )
        })?;
    Ok(parsed.and_utc().timestamp() - JST_OFFSET_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RANGE_MAX;
    use serde_json::json;

    #[test]
    fn test_empty_novel_search_defaults() {
        let req = NovelSearchRequest::from_args(&json!({})).unwrap();
        assert_eq!(req.fields, DEFAULT_FIELDS.to_vec());
        assert_eq!(req.order, Order::New);
        assert_eq!(req.targets, SearchTargets::default());
        assert!(req.targets.title && req.targets.outline && req.targets.keyword && req.targets.author);
        assert_eq!(req.limit, 20);
        assert_eq!(req.start, None);
        assert_eq!(req.genre, None);
        assert_eq!(req.length, None);
        assert_eq!(req.is_r15, None);
    }

    #[test]
    fn test_null_arguments_are_empty() {
        let req = NovelSearchRequest::from_args(&Value::Null).unwrap();
        assert_eq!(req.order, Order::New);
        assert!(NovelSearchRequest::from_args(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_range_normalization() {
        let req = NovelSearchRequest::from_args(&json!({ "minLength": 1000 })).unwrap();
        assert_eq!(req.length, Some(Range { min: 1000, max: RANGE_MAX }));

        let req = NovelSearchRequest::from_args(&json!({ "maxLength": 50000 })).unwrap();
        assert_eq!(req.length, Some(Range { min: 0, max: 50000 }));

        let req =
            NovelSearchRequest::from_args(&json!({ "minLength": 1000, "maxLength": 50000 })).unwrap();
        assert_eq!(req.length, Some(Range { min: 1000, max: 50000 }));

        let req = NovelSearchRequest::from_args(&json!({ "maxKaiwaritu": 30 })).unwrap();
        assert_eq!(req.kaiwaritu, Some(Range { min: 0, max: 30 }));
        assert_eq!(req.sasie, None);
    }

    #[test]
    fn test_search_limit_bounds() {
        for tool_args in [json!({ "limit": 0 }), json!({ "limit": 501 })] {
            let err = NovelSearchRequest::from_args(&tool_args).unwrap_err();
            assert_eq!(err.field, "limit");
            assert_eq!(err.kind, ValidationKind::Range { min: 1, max: Some(500) });
            assert!(UserSearchRequest::from_args(&tool_args).is_err());
            assert!(R18SearchRequest::from_args(&tool_args).is_err());
        }
        let req = NovelSearchRequest::from_args(&json!({ "limit": 500 })).unwrap();
        assert_eq!(req.limit, 500);
    }

    #[test]
    fn test_start_is_one_based_and_offsets_are_zero_based() {
        let err = NovelSearchRequest::from_args(&json!({ "start": 0 })).unwrap_err();
        assert_eq!(err.field, "start");
        assert!(UserSearchRequest::from_args(&json!({ "start": 0 })).is_err());
        assert!(R18SearchRequest::from_args(&json!({ "start": 0 })).is_err());

        let ranking = RankingRequest::from_args(&json!({ "offset": 0 })).unwrap();
        assert_eq!(ranking.offset, 0);
        let history =
            RankingHistoryRequest::from_args(&json!({ "ncode": "n1234ab", "offset": 0 })).unwrap();
        assert_eq!(history.offset, 0);
    }

    #[test]
    fn test_ranking_bounds_and_defaults() {
        let req = RankingRequest::from_args(&json!({})).unwrap();
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset, 0);
        assert_eq!(req.fields, DEFAULT_FIELDS.to_vec());
        assert!(RankingRequest::from_args(&json!({ "limit": 301 })).is_err());
        assert!(RankingRequest::from_args(&json!({ "offset": 300 })).is_err());
        assert!(RankingRequest::from_args(&json!({ "limit": 300, "offset": 299 })).is_ok());
    }

    #[test]
    fn test_ranking_history_defaults() {
        let req = RankingHistoryRequest::from_args(&json!({ "ncode": "N9669BK" })).unwrap();
        assert_eq!(req.limit, 50);
        assert_eq!(req.offset, 0);
        assert_eq!(req.ranking_type, None);
        assert!(RankingHistoryRequest::from_args(&json!({ "ncode": "n9669bk", "limit": 0 })).is_err());
        let req =
            RankingHistoryRequest::from_args(&json!({ "ncode": "n9669bk", "limit": 100000 })).unwrap();
        assert_eq!(req.limit, 100000);
    }

    #[test]
    fn test_ncode_pattern() {
        for ok in ["n1234a", "N1234AB", "n0000zz"] {
            assert!(GetNovelRequest::from_args(&json!({ "ncode": ok })).is_ok(), "{ok}");
        }
        for bad in ["x1234ab", "n123ab", "n1234abc", "n1234", ""] {
            let err = GetNovelRequest::from_args(&json!({ "ncode": bad })).unwrap_err();
            assert_eq!(err.field, "ncode", "{bad}");
        }
        let err = GetNovelRequest::from_args(&json!({})).unwrap_err();
        assert_eq!(err.kind, ValidationKind::Missing);
        let err = GetNovelRequest::from_args(&json!({ "ncode": "n12345a" })).unwrap_err();
        assert!(matches!(err.kind, ValidationKind::Pattern { .. }));
    }

    #[test]
    fn test_label_translation() {
        let req = NovelSearchRequest::from_args(&json!({
            "genre": "異世界〔恋愛〕",
            "notBigGenre": "SF",
            "order": "日間ポイントの高い順",
            "novelType": "連載中",
            "buntai": "字下げあり+改行普通",
            "fields": ["小説名", "作者名", "文字数"],
        }))
        .unwrap();
        assert_eq!(req.genre, Some(Genre::RenaiIsekai));
        assert_eq!(req.not_big_genre, Some(BigGenre::Sf));
        assert_eq!(req.order, Order::DailyPoint);
        assert_eq!(req.novel_type, Some(NovelType::RensaiNow));
        assert_eq!(req.buntai, Some(Buntai::JisageKaigyoHutsuu));
        assert_eq!(req.fields, vec![Field::Title, Field::Writer, Field::Length]);
    }

    #[test]
    fn test_unknown_labels_rejected() {
        let err = NovelSearchRequest::from_args(&json!({ "genre": "無効なジャンル" })).unwrap_err();
        assert_eq!(err.field, "genre");
        assert!(matches!(err.kind, ValidationKind::UnknownLabel(_)));

        let err = NovelSearchRequest::from_args(&json!({ "fields": ["小説名", "無効なフィールド"] }))
            .unwrap_err();
        assert_eq!(err.field, "fields");

        let err = R18SearchRequest::from_args(&json!({ "fields": ["ジャンル"] })).unwrap_err();
        assert_eq!(err.field, "fields");

        assert!(UserSearchRequest::from_args(&json!({ "order": "新着更新順" })).is_err());
        assert!(RankingRequest::from_args(&json!({ "rankingType": "年間" })).is_err());
    }

    #[test]
    fn test_user_search_defaults() {
        let req = UserSearchRequest::from_args(&json!({ "minNovel": 3 })).unwrap();
        assert_eq!(req.order, UserOrder::New);
        assert_eq!(req.fields, None);
        assert_eq!(req.min_novel, Some(3));
        assert_eq!(req.max_novel, None);

        let req = UserSearchRequest::from_args(&json!({ "fields": ["ユーザー名", "小説投稿数"] })).unwrap();
        assert_eq!(req.fields, Some(vec![UserField::Name, UserField::NovelCnt]));
    }

    #[test]
    fn test_r18_defaults() {
        let req = R18SearchRequest::from_args(&json!({ "r18Site": "ノクターンノベルズ(男性向け)" })).unwrap();
        assert_eq!(req.fields, DEFAULT_R18_FIELDS.to_vec());
        assert_eq!(req.site, Some(R18Site::Nocturne));
        assert_eq!(req.order, Order::New);
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let req = NovelSearchRequest::from_args(&json!({ "word": "", "ncode": "" })).unwrap();
        assert_eq!(req.word, None);
        assert_eq!(req.ncode, None);
    }

    #[test]
    fn test_identifier_lists() {
        let req = NovelSearchRequest::from_args(&json!({
            "ncode": ["n1111aa", "n2222bb"],
            "userId": 42,
        }))
        .unwrap();
        assert_eq!(req.ncode, Some(vec!["n1111aa".to_string(), "n2222bb".to_string()]));
        assert_eq!(req.user_id, Some(vec![42]));
        assert!(NovelSearchRequest::from_args(&json!({ "userId": [1, "x"] })).is_err());
    }

    #[test]
    fn test_date_filters() {
        let req = NovelSearchRequest::from_args(&json!({
            "lastUpdateFrom": "2024-01-01 00:00:00",
            "lastUpdateTo": "2024-01-02",
            "lastNovelUpdateFrom": "thisweek",
        }))
        .unwrap();
        // 2024-01-01T00:00:00+09:00
        assert_eq!(
            req.last_update,
            Some(DateFilter::Between(1_704_034_800, 1_704_121_200))
        );
        assert_eq!(
            req.last_novel_update,
            Some(DateFilter::Cutoff("thisweek".to_string()))
        );

        let req = NovelSearchRequest::from_args(&json!({ "lastUpdateTo": "2024-01-02" })).unwrap();
        assert_eq!(req.last_update, None);

        let err = NovelSearchRequest::from_args(&json!({
            "lastUpdateFrom": "yesterday",
            "lastUpdateTo": "2024-01-02",
        }))
        .unwrap_err();
        assert_eq!(err.field, "lastUpdateFrom");
    }

    #[test]
    fn test_ranking_date_format() {
        let req = RankingRequest::from_args(&json!({ "date": "2024-03-15", "rankingType": "週間" })).unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(req.ranking_type, Some(RankingType::Weekly));

        let err = RankingRequest::from_args(&json!({ "date": "2024/03/15" })).unwrap_err();
        assert!(matches!(err.kind, ValidationKind::Format { .. }));
    }

    #[test]
    fn test_wrong_types_rejected() {
        assert!(NovelSearchRequest::from_args(&json!({ "limit": "20" })).is_err());
        assert!(NovelSearchRequest::from_args(&json!({ "limit": 20.5 })).is_err());
        assert!(NovelSearchRequest::from_args(&json!({ "limit": 20.0 })).is_ok());
        assert!(NovelSearchRequest::from_args(&json!({ "isR15": "yes" })).is_err());
        assert!(NovelSearchRequest::from_args(&json!({ "fields": "小説名" })).is_err());
        assert!(NovelSearchRequest::from_args(&json!({ "minLength": -1 })).is_err());
    }

    #[test]
    fn test_validated_request_dispatch() {
        let parsed = ValidatedRequest::parse("get_ranking", &json!({})).unwrap().unwrap();
        assert!(matches!(parsed, ValidatedRequest::GetRanking(_)));
        assert!(ValidatedRequest::parse("unknown_tool", &json!({})).is_none());
        assert!(ValidatedRequest::parse("get_novel", &json!({})).unwrap().is_err());
    }
}
