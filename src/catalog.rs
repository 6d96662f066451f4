//! Enumeration catalog: human-readable labels to API codes and back.
//!
//! Each table is built once, on first use, by inverting the code-to-label
//! declarations in [`types`](crate::types). Duplicate labels or codes are
//! rejected at construction so lookups in either direction are unambiguous.
//!
//! ```
//! use narou_mcp::catalog;
//! use narou_mcp::types::Genre;
//!
//! let genre = catalog::genres().to_code("異世界〔恋愛〕").unwrap();
//! assert_eq!(genre, Genre::RenaiIsekai);
//! assert_eq!(catalog::genres().to_label(genre), "異世界〔恋愛〕");
//! ```

use crate::types::{
    BigGenre, Buntai, Field, Genre, NovelType, Order, R18Field, R18Site, RankingType, UserField,
    UserOrder,
};
use std::fmt;
use std::sync::LazyLock;

/// An enumeration whose values carry a remote code and a display label.
pub trait Notation: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Remote code type (integer or short string).
    type Code: Copy + PartialEq + fmt::Display;

    /// Name of the vocabulary, used in error messages.
    const DOMAIN: &'static str;

    fn all() -> &'static [Self];
    fn code(self) -> Self::Code;
    fn notation(self) -> &'static str;
}

/// A label that has no mapping in its table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {domain} label \"{label}\" (expected one of: {})", .expected.join(", "))]
pub struct UnknownLabel {
    pub domain: &'static str,
    pub label: String,
    pub expected: Vec<&'static str>,
}

/// Ordered, immutable label/code table for one vocabulary.
#[derive(Debug)]
pub struct LabelMap<C: Notation> {
    entries: Vec<(&'static str, C)>,
}

impl<C: Notation> LabelMap<C> {
    /// Build the table from the enumeration's declarations.
    ///
    /// # Panics
    ///
    /// Panics if two values share a label or a code.
    pub fn build() -> Self {
        let mut entries: Vec<(&'static str, C)> = Vec::with_capacity(C::all().len());
        for &value in C::all() {
            let label = value.notation();
            assert!(
                !entries.iter().any(|(l, _)| *l == label),
                "duplicate {} label: {}",
                C::DOMAIN,
                label
            );
            assert!(
                !entries.iter().any(|(_, c)| c.code() == value.code()),
                "duplicate {} code: {}",
                C::DOMAIN,
                value.code()
            );
            entries.push((label, value));
        }
        Self { entries }
    }

    /// Name of this vocabulary.
    pub fn domain(&self) -> &'static str {
        C::DOMAIN
    }

    /// Translate a label into its value.
    pub fn to_code(&self, label: &str) -> Result<C, UnknownLabel> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .ok_or_else(|| UnknownLabel {
                domain: C::DOMAIN,
                label: label.to_string(),
                expected: self.labels().collect(),
            })
    }

    /// Translate a list of labels, preserving order and failing on the first unknown one.
    pub fn to_codes<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<C>, UnknownLabel> {
        labels.iter().map(|l| self.to_code(l.as_ref())).collect()
    }

    /// Display label of a value.
    pub fn to_label(&self, value: C) -> &'static str {
        value.notation()
    }

    /// Reverse lookup from a raw remote code, `None` when unmapped.
    pub fn label_for_code(&self, code: C::Code) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, c)| c.code() == code)
            .map(|(l, _)| *l)
    }

    /// Labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(l, _)| *l)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static GENRES: LazyLock<LabelMap<Genre>> = LazyLock::new(LabelMap::build);
static BIG_GENRES: LazyLock<LabelMap<BigGenre>> = LazyLock::new(LabelMap::build);
static ORDERS: LazyLock<LabelMap<Order>> = LazyLock::new(LabelMap::build);
static NOVEL_TYPES: LazyLock<LabelMap<NovelType>> = LazyLock::new(LabelMap::build);
static RANKING_TYPES: LazyLock<LabelMap<RankingType>> = LazyLock::new(LabelMap::build);
static R18_SITES: LazyLock<LabelMap<R18Site>> = LazyLock::new(LabelMap::build);
static USER_ORDERS: LazyLock<LabelMap<UserOrder>> = LazyLock::new(LabelMap::build);
static BUNTAI: LazyLock<LabelMap<Buntai>> = LazyLock::new(LabelMap::build);
static FIELDS: LazyLock<LabelMap<Field>> = LazyLock::new(LabelMap::build);
static R18_FIELDS: LazyLock<LabelMap<R18Field>> = LazyLock::new(LabelMap::build);
static USER_FIELDS: LazyLock<LabelMap<UserField>> = LazyLock::new(LabelMap::build);

/// Fine-grained genres.
pub fn genres() -> &'static LabelMap<Genre> {
    &GENRES
}

/// Top-level genres.
pub fn big_genres() -> &'static LabelMap<BigGenre> {
    &BIG_GENRES
}

/// Result orders of the novel searches.
pub fn orders() -> &'static LabelMap<Order> {
    &ORDERS
}

/// Serial, completed and short-story filters.
pub fn novel_types() -> &'static LabelMap<NovelType> {
    &NOVEL_TYPES
}

/// Ranking periods.
pub fn ranking_types() -> &'static LabelMap<RankingType> {
    &RANKING_TYPES
}

/// Mature-content sites.
pub fn r18_sites() -> &'static LabelMap<R18Site> {
    &R18_SITES
}

/// Result orders of the user search.
pub fn user_orders() -> &'static LabelMap<UserOrder> {
    &USER_ORDERS
}

/// Writing-style filters.
pub fn buntai() -> &'static LabelMap<Buntai> {
    &BUNTAI
}

/// Field vocabulary of the standard novel search.
pub fn fields() -> &'static LabelMap<Field> {
    &FIELDS
}

/// Field vocabulary of the mature novel search.
pub fn r18_fields() -> &'static LabelMap<R18Field> {
    &R18_FIELDS
}

/// Field vocabulary of the user search.
pub fn user_fields() -> &'static LabelMap<UserField> {
    &USER_FIELDS
}

/// Fields requested when a standard search names none.
pub const DEFAULT_FIELDS: [Field; 8] = [
    Field::Ncode,
    Field::Title,
    Field::Writer,
    Field::Keyword,
    Field::Genre,
    Field::AllPoint,
    Field::NovelType,
    Field::Length,
];

/// Fields requested when a mature search names none.
pub const DEFAULT_R18_FIELDS: [R18Field; 8] = [
    R18Field::Ncode,
    R18Field::Title,
    R18Field::Writer,
    R18Field::Keyword,
    R18Field::NocGenre,
    R18Field::AllPoint,
    R18Field::NovelType,
    R18Field::Length,
];
