//! Public types for the Narou client.
//!
//! Every remote enumeration is declared once, pairing the API code with its
//! human-readable Japanese label. The [`catalog`](crate::catalog) builds its
//! lookup tables from these declarations.

use crate::catalog::Notation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Largest bound sent for an open-ended range (2^53 - 1).
pub const RANGE_MAX: u64 = 9_007_199_254_740_991;

macro_rules! notation_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $code_ty:ty, $domain:literal {
            $($variant:ident = $code:expr => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Code understood by the Narou API.
            pub fn code(self) -> $code_ty {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl Notation for $name {
            type Code = $code_ty;
            const DOMAIN: &'static str = $domain;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn code(self) -> $code_ty {
                $name::code(self)
            }

            fn notation(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

notation_enum! {
    /// Novel genre.
    Genre: u32, "genre" {
        RenaiIsekai = 101 => "異世界〔恋愛〕",
        RenaiGenjitsusekai = 102 => "現実世界〔恋愛〕",
        FantasyHigh = 201 => "ハイファンタジー〔ファンタジー〕",
        FantasyLow = 202 => "ローファンタジー〔ファンタジー〕",
        BungeiJyunbungei = 301 => "純文学〔文芸〕",
        BungeiHumanDrama = 302 => "ヒューマンドラマ〔文芸〕",
        BungeiHistory = 303 => "歴史〔文芸〕",
        BungeiSuiri = 304 => "推理〔文芸〕",
        BungeiHorror = 305 => "ホラー〔文芸〕",
        BungeiAction = 306 => "アクション〔文芸〕",
        BungeiComedy = 307 => "コメディー〔文芸〕",
        SfVrgame = 401 => "VRゲーム〔SF〕",
        SfSpace = 402 => "宇宙〔SF〕",
        SfKuusoukagaku = 403 => "空想科学〔SF〕",
        SfPanic = 404 => "パニック〔SF〕",
        SonotaDouwa = 9901 => "童話〔その他〕",
        SonotaShi = 9902 => "詩〔その他〕",
        SonotaEssei = 9903 => "エッセイ〔その他〕",
        SonotaReplay = 9904 => "リプレイ〔その他〕",
        SonotaSonota = 9999 => "その他〔その他〕",
        NonGenre = 9801 => "ノンジャンル〔ノンジャンル〕",
    }
}

notation_enum! {
    /// Top-level genre group.
    BigGenre: u32, "bigGenre" {
        Renai = 1 => "恋愛",
        Fantasy = 2 => "ファンタジー",
        Bungei = 3 => "文芸",
        Sf = 4 => "SF",
        Sonota = 99 => "その他",
        NonGenre = 98 => "ノンジャンル",
    }
}

notation_enum! {
    /// Search result ordering.
    Order: &'static str, "order" {
        FavoriteNovelCount = "favnovelcnt" => "ブックマーク数の多い順",
        ReviewCount = "reviewcnt" => "レビュー数の多い順",
        HyokaDesc = "hyoka" => "総合ポイントの高い順",
        HyokaAsc = "hyokaasc" => "総合ポイントの低い順",
        ImpressionCount = "impressioncnt" => "感想の多い順",
        HyokaCountDesc = "hyokacnt" => "評価者数の多い順",
        HyokaCountAsc = "hyokacntasc" => "評価者数の少ない順",
        Weekly = "weekly" => "週間ユニークユーザの多い順",
        LengthDesc = "lengthdesc" => "小説本文の文字数が多い順",
        LengthAsc = "lengthasc" => "小説本文の文字数が少ない順",
        NCodeDesc = "ncodedesc" => "Nコードが新しい順",
        New = "new" => "新着更新順",
        Old = "old" => "古い順",
        DailyPoint = "dailypoint" => "日間ポイントの高い順",
        WeeklyPoint = "weeklypoint" => "週間ポイントの高い順",
        MonthlyPoint = "monthlypoint" => "月間ポイントの高い順",
        QuarterPoint = "quarterpoint" => "四半期ポイントの高い順",
        YearlyPoint = "yearlypoint" => "年間ポイントの高い順",
        GeneralFirstUp = "generalfirstup" => "初回掲載順",
    }
}

notation_enum! {
    /// Novel type filter.
    NovelType: &'static str, "novelType" {
        Short = "t" => "短編",
        RensaiNow = "r" => "連載中",
        RensaiEnd = "er" => "完結済連載小説",
        Rensai = "re" => "すべての連載小説",
        ShortAndRensai = "ter" => "短編と完結済連載小説",
    }
}

notation_enum! {
    /// Ranking aggregation period.
    RankingType: &'static str, "rankingType" {
        Daily = "d" => "日間",
        Weekly = "w" => "週間",
        Monthly = "m" => "月間",
        Quarterly = "q" => "四半期",
    }
}

notation_enum! {
    /// Mature-content publishing site.
    R18Site: u32, "r18Site" {
        Nocturne = 1 => "ノクターンノベルズ(男性向け)",
        MoonLight = 2 => "ムーンライトノベルズ(女性向け)",
        MoonLightBl = 3 => "ムーンライトノベルズ(BL)",
        Midnight = 4 => "ミッドナイトノベルズ(大人向け)",
    }
}

notation_enum! {
    /// User search ordering.
    UserOrder: &'static str, "userOrder" {
        New = "new" => "ユーザIDの新しい順",
        NovelCount = "novelcnt" => "小説投稿数の多い順",
        ReviewCount = "reviewcnt" => "レビュー投稿数の多い順",
        NovelLength = "novellength" => "小説累計文字数の多い順",
        SumGlobalPoint = "sumglobalpoint" => "総合評価ポイントの合計の多い順",
        Old = "old" => "ユーザIDの古い順",
    }
}

notation_enum! {
    /// Writing style (indentation and line breaks).
    Buntai: u32, "buntai" {
        NoJisageKaigyouOoi = 1 => "字下げなし+改行多い",
        NoJisageKaigyoHutsuu = 2 => "字下げなし+改行普通",
        JisageKaigyoOoi = 4 => "字下げあり+改行多い",
        JisageKaigyoHutsuu = 6 => "字下げあり+改行普通",
    }
}

notation_enum! {
    /// Output field of the standard novel search.
    Field: &'static str, "fields" {
        Title = "t" => "小説名",
        Ncode = "n" => "Nコード",
        UserId = "u" => "作者のユーザID",
        Writer = "w" => "作者名",
        Story = "s" => "あらすじ",
        BigGenre = "bg" => "大ジャンル",
        Genre = "g" => "ジャンル",
        Keyword = "k" => "キーワード",
        GeneralFirstUp = "gf" => "初回掲載日",
        GeneralLastUp = "gl" => "最終掲載日",
        NovelType = "nt" => "小説タイプ",
        End = "e" => "連載状態",
        GeneralAllNo = "ga" => "全掲載部分数",
        Length = "l" => "文字数",
        Time = "ti" => "読了時間",
        IsStop = "i" => "長期連載停止中",
        IsR15 = "ir" => "R15",
        IsBl = "ibl" => "ボーイズラブ",
        IsGl = "igl" => "ガールズラブ",
        IsZankoku = "izk" => "残酷な描写あり",
        IsTensei = "its" => "異世界転生",
        IsTenni = "iti" => "異世界転移",
        GlobalPoint = "gp" => "総合評価ポイント",
        DailyPoint = "dp" => "日間ポイント",
        WeeklyPoint = "wp" => "週間ポイント",
        MonthlyPoint = "mp" => "月間ポイント",
        QuarterPoint = "qp" => "四半期ポイント",
        YearlyPoint = "yp" => "年間ポイント",
        FavNovelCnt = "f" => "ブックマーク数",
        ImpressionCnt = "imp" => "感想数",
        ReviewCnt = "r" => "レビュー数",
        AllPoint = "a" => "評価ポイント",
        AllHyokaCnt = "ah" => "評価者数",
        SasieCnt = "sa" => "挿絵の数",
        Kaiwaritu = "ka" => "会話率",
        NovelUpdatedAt = "nu" => "小説の更新日時",
        UpdatedAt = "ua" => "最終更新日時",
    }
}

notation_enum! {
    /// Output field of the mature novel search.
    R18Field: &'static str, "r18Fields" {
        Title = "t" => "小説名",
        Ncode = "n" => "Nコード",
        UserId = "u" => "作者のユーザID",
        Writer = "w" => "作者名",
        Story = "s" => "あらすじ",
        NocGenre = "ng" => "掲載サイト",
        Keyword = "k" => "キーワード",
        GeneralFirstUp = "gf" => "初回掲載日",
        GeneralLastUp = "gl" => "最終掲載日",
        NovelType = "nt" => "小説タイプ",
        End = "e" => "連載状態",
        GeneralAllNo = "ga" => "全掲載部分数",
        Length = "l" => "文字数",
        Time = "ti" => "読了時間",
        IsStop = "i" => "長期連載停止中",
        IsBl = "ibl" => "ボーイズラブ",
        IsGl = "igl" => "ガールズラブ",
        IsZankoku = "izk" => "残酷な描写あり",
        IsTensei = "its" => "異世界転生",
        IsTenni = "iti" => "異世界転移",
        GlobalPoint = "gp" => "総合評価ポイント",
        DailyPoint = "dp" => "日間ポイント",
        WeeklyPoint = "wp" => "週間ポイント",
        MonthlyPoint = "mp" => "月間ポイント",
        QuarterPoint = "qp" => "四半期ポイント",
        YearlyPoint = "yp" => "年間ポイント",
        FavNovelCnt = "f" => "R18ブックマーク数",
        ImpressionCnt = "imp" => "感想数",
        ReviewCnt = "r" => "レビュー数",
        AllPoint = "a" => "評価ポイント",
        AllHyokaCnt = "ah" => "評価者数",
        SasieCnt = "sa" => "挿絵の数",
        Kaiwaritu = "ka" => "会話率",
        NovelUpdatedAt = "nu" => "小説の更新日時",
        UpdatedAt = "ua" => "最終更新日時",
    }
}

notation_enum! {
    /// Output field of the user search.
    UserField: &'static str, "userFields" {
        UserId = "u" => "ユーザーID",
        Name = "n" => "ユーザー名",
        Yomikata = "y" => "ユーザー名のフリガナ",
        Name1st = "1" => "ユーザー名のフリガナの頭文字",
        NovelCnt = "nc" => "小説投稿数",
        ReviewCnt = "rc" => "レビュー投稿数",
        NovelLength = "nl" => "小説累計文字数",
        SumGlobalPoint = "sg" => "総合評価ポイントの合計",
    }
}

impl Serialize for RankingType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// An inclusive numeric range sent as `min-max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: u64,
    pub max: u64,
}

impl Range {
    /// Normalize independent bounds.
    ///
    /// A missing lower bound floors at 0 and a missing upper bound ceils at
    /// [`RANGE_MAX`]. Returns `None` when neither bound is given.
    pub fn from_bounds(min: Option<u64>, max: Option<u64>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self {
            min: min.unwrap_or(0),
            max: max.unwrap_or(RANGE_MAX),
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Filter on an update timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    /// Both ends given, as unix seconds.
    Between(i64, i64),
    /// Only the start given; sent verbatim (e.g. `thisweek`, `lastmonth`).
    Cutoff(String),
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Between(from, to) => write!(f, "{}-{}", from, to),
            Self::Cutoff(s) => f.write_str(s),
        }
    }
}

/// A single record returned by the remote API, keyed by field name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Paginated search response from the Narou API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching records (may exceed `values.len()`).
    pub allcount: u64,
    /// Records in the returned window.
    pub values: Vec<Record>,
}

/// One row of a ranking list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub ncode: String,
    pub pt: u64,
    pub rank: u32,
}

/// One past ranking appearance of a novel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingHistoryEntry {
    /// Raw `YYYYMMDD-x` tag from the API.
    pub rtype: String,
    /// Aggregation date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub ranking_type: RankingType,
    pub pt: u64,
    pub rank: u32,
}
