//! コーパス全走査による時間バケット単位のキーワード頻度集計。

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::store::Article;

use super::dates::parse_pub_date;
use super::extract::KeywordExtractor;

/// 集計の時間粒度。週は ISO 週（月曜始まり）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported time interval: choose 'day' or 'week'")]
pub struct GranularityParseError;

impl FromStr for Granularity {
    type Err = GranularityParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            _ => Err(GranularityParseError),
        }
    }
}

impl Granularity {
    /// 指定時刻が属するバケットの開始日を返す。週粒度は月曜に丸める。
    #[must_use]
    pub fn bucket_for(self, at: DateTime<Utc>) -> NaiveDate {
        let date = at.date_naive();
        match self {
            Self::Day => date,
            Self::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
        }
    }
}

/// キーワード → 出現回数。決定的な順序のため BTreeMap を使う。
pub type KeywordCounts = BTreeMap<String, u64>;

/// バケット開始日 → キーワード頻度。
pub type BucketedCounts = BTreeMap<NaiveDate, KeywordCounts>;

/// スキャン統計。ジョブログとメトリクスに流す。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned: u64,
    pub missing_fields: u64,
    pub unparseable_dates: u64,
}

impl ScanStats {
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.missing_fields + self.unparseable_dates
    }
}

/// 記事列を時間バケットへ集計する。
///
/// タイトルまたは pubDate を欠く記事、pubDate が正規化できない記事は
/// 集計から除外する。カウントは抽出列の出現ごとに1加算（タイトル内の
/// 重複を除去しない）。
pub async fn keywords_by_time(
    articles: &[Article],
    extractor: &KeywordExtractor,
    granularity: Granularity,
) -> (BucketedCounts, ScanStats) {
    let mut buckets = BucketedCounts::new();
    let mut stats = ScanStats::default();

    for article in articles {
        stats.scanned += 1;

        let raw_date = article.pub_date.as_deref().unwrap_or("");
        if article.title.is_empty() || raw_date.is_empty() {
            stats.missing_fields += 1;
            continue;
        }

        let Some(published_at) = parse_pub_date(raw_date) else {
            stats.unparseable_dates += 1;
            continue;
        };

        let bucket = granularity.bucket_for(published_at);
        let counts = buckets.entry(bucket).or_default();
        for keyword in extractor.extract(&article.title).await {
            *counts.entry(keyword).or_insert(0) += 1;
        }
    }

    (buckets, stats)
}
