//! 全体トップキーワードを許可リストとして、カテゴリ別のトレンドを再計算する。

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::store::Article;
use crate::store::models::RankedKeywords;

use super::aggregate::{KeywordCounts, ScanStats};
use super::dates::parse_pub_date;
use super::extract::KeywordExtractor;
use super::score::trend_score;

/// カテゴリを持たない記事の振り分け先。記事自体は捨てない。
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// カテゴリ集計の時間窓。バケット数ではなく絶対時刻のカットオフで区切る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryWindows {
    /// これ以降（含む）が直近。
    pub recent_cutoff: DateTime<Utc>,
    /// これ以降（含む）かつ直近カットオフ未満が履歴。それより古い記事は無視。
    pub historical_cutoff: DateTime<Utc>,
}

impl CategoryWindows {
    /// `now` を終端として直近 `recent_days` 日／履歴 `historical_days` 日の窓を張る。
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>, recent_days: i64, historical_days: i64) -> Self {
        Self {
            recent_cutoff: now - Duration::days(recent_days),
            historical_cutoff: now - Duration::days(historical_days),
        }
    }
}

/// カテゴリ別ランキングの計算結果。
pub type CategoryRankings = BTreeMap<String, RankedKeywords>;

/// 記事列をカテゴリごとの直近／履歴カウンタへ振り分け、トレンドスコアを計算する。
///
/// 各タイトルの抽出結果は許可リストとの積集合を取った**集合**として数える
/// （タイトル内の重複はカテゴリ集計では1回の出現として扱う）。スコア式は
/// 全体ランキングと同一で、カテゴリごとにスコア降順・最大 `cap` 件に丸める。
pub async fn categorize(
    articles: &[Article],
    extractor: &KeywordExtractor,
    allow_list: &HashSet<String>,
    windows: CategoryWindows,
    cap: usize,
) -> (CategoryRankings, ScanStats) {
    let mut recent: BTreeMap<String, KeywordCounts> = BTreeMap::new();
    let mut historical: BTreeMap<String, KeywordCounts> = BTreeMap::new();
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

        let side = if published_at >= windows.recent_cutoff {
            &mut recent
        } else if published_at >= windows.historical_cutoff {
            &mut historical
        } else {
            continue;
        };

        let category = article
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY);

        let keywords: BTreeSet<String> = extractor
            .extract(&article.title)
            .await
            .into_iter()
            .filter(|keyword| allow_list.contains(keyword))
            .collect();

        let counts = side.entry(category.to_string()).or_default();
        for keyword in keywords {
            *counts.entry(keyword).or_insert(0) += 1;
        }
    }

    let mut rankings = CategoryRankings::new();
    for (category, recent_counts) in recent {
        let historical_counts = historical.get(&category);

        let mut ranked: RankedKeywords = recent_counts
            .iter()
            .map(|(keyword, &recent_count)| {
                let historical_count = historical_counts
                    .and_then(|counts| counts.get(keyword))
                    .copied()
                    .unwrap_or(0);
                (keyword.clone(), trend_score(recent_count, historical_count))
            })
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(cap);
        rankings.insert(category, ranked);
    }

    (rankings, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stopwords::StopwordSet;
    use crate::test_support::WordAnnotator;
    use std::sync::Arc;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(Arc::new(WordAnnotator), Arc::new(StopwordSet::default()))
    }

    fn allow(words: &[&str]) -> HashSet<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    fn utc(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts)
            .expect("valid rfc3339 timestamp")
            .with_timezone(&Utc)
    }

    fn article(title: &str, pub_date: &str, category: Option<&str>) -> Article {
        Article::new(
            title,
            Some(pub_date.to_string()),
            category.map(str::to_string),
        )
    }

    fn windows() -> CategoryWindows {
        CategoryWindows::ending_at(utc("2025-01-15T00:00:00Z"), 7, 14)
    }

    #[tokio::test]
    async fn scores_recent_against_historical_per_category() {
        let mut articles = Vec::new();
        // 10 recent mentions, 2025-01-08..14
        for day in 8..=14 {
            articles.push(article(
                "bầu_cử",
                &format!("2025-01-{day:02} 09:00:00"),
                Some("chinh-tri"),
            ));
        }
        for day in 8..=10 {
            articles.push(article(
                "bầu_cử",
                &format!("2025-01-{day:02} 18:00:00"),
                Some("chinh-tri"),
            ));
        }
        // 5 historical mentions, 2025-01-01..05
        for day in 1..=5 {
            articles.push(article(
                "bầu_cử",
                &format!("2025-01-{day:02} 09:00:00"),
                Some("chinh-tri"),
            ));
        }

        let (rankings, stats) = categorize(
            &articles,
            &extractor(),
            &allow(&["bầu_cử"]),
            windows(),
            500,
        )
        .await;

        assert_eq!(stats.scanned, 15);
        assert_eq!(
            rankings["chinh-tri"],
            vec![("bầu_cử".to_string(), (10.0 - 5.0) / 5.0)]
        );
    }

    #[tokio::test]
    async fn only_allow_listed_keywords_survive() {
        let articles = vec![article(
            "bầu_cử giá_vàng",
            "2025-01-10 09:00:00",
            Some("kinh-doanh"),
        )];

        let (rankings, _) = categorize(
            &articles,
            &extractor(),
            &allow(&["giá_vàng"]),
            windows(),
            500,
        )
        .await;

        let keywords: Vec<&str> = rankings["kinh-doanh"]
            .iter()
            .map(|(keyword, _)| keyword.as_str())
            .collect();
        assert_eq!(keywords, vec!["giá_vàng"]);
    }

    #[tokio::test]
    async fn duplicate_keywords_count_once_per_title() {
        let articles = vec![article(
            "bầu_cử bầu_cử bầu_cử",
            "2025-01-10 09:00:00",
            Some("chinh-tri"),
        )];

        let (rankings, _) = categorize(
            &articles,
            &extractor(),
            &allow(&["bầu_cử"]),
            windows(),
            500,
        )
        .await;

        assert_eq!(rankings["chinh-tri"], vec![("bầu_cử".to_string(), 1.0)]);
    }

    #[tokio::test]
    async fn uncategorized_articles_fall_back_to_unknown() {
        let articles = vec![
            article("bầu_cử", "2025-01-10 09:00:00", None),
            article("bầu_cử", "2025-01-10 10:00:00", Some("")),
        ];

        let (rankings, _) = categorize(
            &articles,
            &extractor(),
            &allow(&["bầu_cử"]),
            windows(),
            500,
        )
        .await;

        assert_eq!(
            rankings[UNKNOWN_CATEGORY],
            vec![("bầu_cử".to_string(), 2.0)]
        );
    }

    #[tokio::test]
    async fn window_boundaries_are_inclusive_exclusive() {
        let articles = vec![
            // exactly the recent cutoff → recent
            article("bầu_cử", "2025-01-08 00:00:00", Some("chinh-tri")),
            // exactly the historical cutoff → historical
            article("bầu_cử", "2025-01-01 00:00:00", Some("chinh-tri")),
            // older than both windows → ignored
            article("bầu_cử", "2024-12-25 00:00:00", Some("chinh-tri")),
        ];

        let (rankings, _) = categorize(
            &articles,
            &extractor(),
            &allow(&["bầu_cử"]),
            windows(),
            500,
        )
        .await;

        // r=1 h=1 → (1-1)/1 = 0.0; the pre-window article never counts
        assert_eq!(rankings["chinh-tri"], vec![("bầu_cử".to_string(), 0.0)]);
    }

    #[tokio::test]
    async fn output_is_capped_per_category() {
        let articles = vec![article(
            "anh_một anh_hai anh_ba",
            "2025-01-10 09:00:00",
            Some("van-hoa"),
        )];

        let (rankings, _) = categorize(
            &articles,
            &extractor(),
            &allow(&["anh_một", "anh_hai", "anh_ba"]),
            windows(),
            2,
        )
        .await;

        assert_eq!(rankings["van-hoa"].len(), 2);
    }

    #[tokio::test]
    async fn historical_only_categories_produce_no_ranking() {
        let articles = vec![article("bầu_cử", "2025-01-02 09:00:00", Some("chinh-tri"))];

        let (rankings, _) = categorize(
            &articles,
            &extractor(),
            &allow(&["bầu_cử"]),
            windows(),
            500,
        )
        .await;

        assert!(rankings.is_empty());
    }
}
