//! Query-string builders for the Narou API.
//!
//! Every builder here is pure: it turns a validated request into the
//! ordered list of query parameters the remote endpoint expects. The
//! client only joins them onto an endpoint URL.
//!
//! # Example
//!
//! ```
//! use narou_mcp::query::ApiQuery;
//!
//! let query = ApiQuery::new().set("word", "勇者").set("lim", 5);
//! assert_eq!(query.get("out"), Some("json"));
//! assert_eq!(query.get("lim"), Some("5"));
//! ```

use crate::catalog::Notation;
use crate::schema::{
    NovelSearchRequest, R18SearchRequest, SearchTargets, UserSearchRequest,
};
use crate::types::Field;
use std::fmt::Display;
use url::Url;

/// Ordered query parameters for one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiQuery {
    params: Vec<(&'static str, String)>,
}

impl Default for ApiQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiQuery {
    /// Start a query. JSON output is always requested.
    pub fn new() -> Self {
        Self {
            params: vec![("out", "json".to_string())],
        }
    }

    /// Set a parameter, replacing any earlier value.
    pub fn set(mut self, key: &'static str, value: impl Display) -> Self {
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Set a parameter only when a value is present.
    pub fn set_opt<T: Display>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Set `key=1` when `on` holds.
    pub fn flag(self, key: &'static str, on: bool) -> Self {
        if on {
            self.set(key, 1)
        } else {
            self
        }
    }

    /// A tri-state filter: `Some(true)` sets `yes`, `Some(false)` sets `no`.
    pub fn either(self, yes: &'static str, no: &'static str, value: Option<bool>) -> Self {
        match value {
            Some(true) => self.set(yes, 1),
            Some(false) => self.set(no, 1),
            None => self,
        }
    }

    /// Hyphen-join a list of values; skipped when empty.
    pub fn joined<T: Display>(self, key: &'static str, values: &[T]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("-");
        self.set(key, joined)
    }

    /// Current value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All parameters in insertion order.
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Append the parameters to an endpoint URL.
    pub fn apply(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        url
    }
}

fn codes<C: Notation>(values: &[C]) -> Vec<C::Code> {
    values.iter().map(|v| v.code()).collect()
}

fn targets(query: ApiQuery, targets: SearchTargets) -> ApiQuery {
    query
        .set("title", u8::from(targets.title))
        .set("ex", u8::from(targets.outline))
        .set("keyword", u8::from(targets.keyword))
        .set("wname", u8::from(targets.author))
}

/// Standard novel search.
pub fn novel_search(req: &NovelSearchRequest) -> ApiQuery {
    let query = ApiQuery::new()
        .set_opt("word", req.word.as_deref())
        .set_opt("notword", req.notword.as_deref());
    let query = targets(query, req.targets);

    let query = query
        .joined("ncode", req.ncode.as_deref().unwrap_or_default())
        .joined("userid", req.user_id.as_deref().unwrap_or_default())
        .set_opt("genre", req.genre.map(|g| g.code()))
        .set_opt("notgenre", req.not_genre.map(|g| g.code()))
        .set_opt("biggenre", req.big_genre.map(|g| g.code()))
        .set_opt("notbiggenre", req.not_big_genre.map(|g| g.code()))
        .set_opt("type", req.novel_type.map(|t| t.code()))
        .set_opt("buntai", req.buntai.map(|b| b.code()))
        .set_opt("length", req.length)
        .set_opt("time", req.time)
        .set_opt("kaiwaritu", req.kaiwaritu)
        .set_opt("sasie", req.sasie)
        .set_opt("lastup", req.last_update.as_ref())
        .set_opt("lastupdate", req.last_novel_update.as_ref());

    let query = query
        .either("isr15", "notr15", req.is_r15)
        .either("isbl", "notbl", req.is_bl)
        .either("isgl", "notgl", req.is_gl)
        .either("iszankoku", "notzankoku", req.is_zankoku)
        .either("istensei", "nottensei", req.is_tensei)
        .either("istenni", "nottenni", req.is_tenni)
        .set_opt("stop", req.is_stop.map(|only| if only { 2 } else { 1 }))
        .flag("ispickup", req.is_pickup)
        .flag("istt", req.is_tt);

    query
        .joined("of", &codes(&req.fields))
        .set("order", req.order.code())
        .set("lim", req.limit)
        .set_opt("st", req.start)
        .set("opt", "weekly")
}

/// Mature novel search.
pub fn r18_search(req: &R18SearchRequest) -> ApiQuery {
    ApiQuery::new()
        .set_opt("word", req.word.as_deref())
        .joined("of", &codes(&req.fields))
        .set_opt("nocgenre", req.site.map(|s| s.code()))
        .set("order", req.order.code())
        .set_opt("type", req.novel_type.map(|t| t.code()))
        .set("lim", req.limit)
        .set_opt("st", req.start)
        .set("opt", "weekly")
}

/// Author search.
pub fn user_search(req: &UserSearchRequest) -> ApiQuery {
    ApiQuery::new()
        .set_opt("word", req.word.as_deref())
        .set_opt("notword", req.notword.as_deref())
        .set_opt("userid", req.user_id)
        .set_opt("name1st", req.name1st.as_deref())
        .set_opt("minnovel", req.min_novel)
        .set_opt("maxnovel", req.max_novel)
        .set_opt("minreview", req.min_review)
        .set_opt("maxreview", req.max_review)
        .joined("of", &codes(req.fields.as_deref().unwrap_or_default()))
        .set("order", req.order.code())
        .set("lim", req.limit)
        .set_opt("st", req.start)
}

/// Lookup of a single novel by ncode.
pub fn novel_detail(ncode: &str, fields: &[Field]) -> ApiQuery {
    ApiQuery::new()
        .set("ncode", ncode)
        .joined("of", &codes(fields))
        .set("lim", 1)
        .set("opt", "weekly")
}

/// Batched lookup of ranked novels.
pub fn ranking_details<S: AsRef<str>>(ncodes: &[S], fields: &[Field]) -> ApiQuery {
    let joined: Vec<&str> = ncodes.iter().map(AsRef::as_ref).collect();
    ApiQuery::new()
        .joined("ncode", &joined)
        .joined("of", &codes(fields))
        .set("lim", joined.len().max(1))
        .set("opt", "weekly")
}

/// Ranking list for one `YYYYMMDD-x` tag.
pub fn rank_get(rtype: &str) -> ApiQuery {
    ApiQuery::new().set("rtype", rtype)
}

/// Past ranking appearances of one novel.
pub fn rank_in(ncode: &str) -> ApiQuery {
    ApiQuery::new().set("ncode", ncode)
}

/// Fields to request when joining ranking rows with novel details.
///
/// The ncode is always needed for the join. Genre codes are added when a
/// genre filter will run over the details. Order is preserved and
/// duplicates dropped.
pub fn ranking_fields(requested: &[Field], genre_filter: bool) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::with_capacity(requested.len() + 3);
    let mut push = |f: Field| {
        if !fields.contains(&f) {
            fields.push(f);
        }
    };
    requested.iter().copied().for_each(&mut push);
    push(Field::Ncode);
    if genre_filter {
        push(Field::Genre);
        push(Field::BigGenre);
    }
    fields
}
