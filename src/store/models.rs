use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RSS取り込み側が書き込む記事ドキュメント。本ワーカーからは読み取り専用。
///
/// `pub_date` は配信元サイトごとの生フォーマットのまま保持されており、
/// 正規化は集計時に行う。`category` を持たない記事も存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub pub_date: Option<String>,
    pub category: Option<String>,
}

impl Article {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        pub_date: Option<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            pub_date,
            category,
        }
    }
}

/// スコア降順で確定済みのキーワード列。読み手側で並べ替えは行わない。
pub type RankedKeywords = Vec<(String, f64)>;

/// 全体トレンドの最新スナップショット。論理キーは単一で、更新は全置換。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalRanking {
    pub captured_at: DateTime<Utc>,
    pub keywords: RankedKeywords,
}

/// カテゴリ単位のトレンドスナップショット。カテゴリごとに1レコードのみ保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub category: String,
    pub captured_at: DateTime<Utc>,
    pub keywords: RankedKeywords,
}
