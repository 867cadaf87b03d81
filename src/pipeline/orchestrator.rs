//! コーパス走査・スコア計算・キャッシュ置換をまとめるパイプライン本体。

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::observability::metrics::Metrics;
use crate::scheduler::JobContext;
use crate::store::models::{CategoryRanking, GlobalRanking};
use crate::store::NewsStore;

use super::aggregate::{self, BucketedCounts, Granularity, ScanStats};
use super::categorize::{self, CategoryWindows};
use super::extract::KeywordExtractor;
use super::score::identify_trending;

/// パイプラインが参照する設定値の抜粋。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub global_top_n: usize,
    pub category_top_n: usize,
    pub recent_window_intervals: usize,
    pub category_recent_days: i64,
    pub category_historical_days: i64,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            global_top_n: config.global_top_n(),
            category_top_n: config.category_top_n(),
            recent_window_intervals: config.recent_window_intervals(),
            category_recent_days: config.category_recent_days(),
            category_historical_days: config.category_historical_days(),
        }
    }
}

/// トレンドキーワード計算パイプライン。
///
/// 状態はストアとメトリクスのみ。再計算はスケジューラまたは管理エンドポイント
/// からのみ駆動され、読み取り経路からは呼ばれない（`keywords_by_time` を除く）。
pub struct TrendingPipeline {
    settings: PipelineSettings,
    store: Arc<dyn NewsStore>,
    extractor: Arc<KeywordExtractor>,
    metrics: Arc<Metrics>,
}

impl TrendingPipeline {
    #[must_use]
    pub fn new(
        settings: PipelineSettings,
        store: Arc<dyn NewsStore>,
        extractor: Arc<KeywordExtractor>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            settings,
            store,
            extractor,
            metrics,
        }
    }

    /// 指定粒度でコーパス全体を集計する。オンデマンドAPIからも使う同期走査。
    ///
    /// # Errors
    /// ストアから記事一覧を取得できない場合はエラーを返す。
    pub async fn keywords_by_time(&self, granularity: Granularity) -> Result<BucketedCounts> {
        let articles = self
            .store
            .fetch_articles()
            .await
            .context("failed to fetch article corpus")?;

        let (buckets, stats) =
            aggregate::keywords_by_time(&articles, &self.extractor, granularity).await;
        self.record_scan(stats);

        Ok(buckets)
    }

    /// 全体トレンドランキングを再計算し、キャッシュを置き換える。
    ///
    /// # Errors
    /// コーパス取得またはキャッシュ置換に失敗した場合はエラーを返す。
    pub async fn refresh_global(&self, job: &JobContext) -> Result<usize> {
        info!(job_id = %job.job_id, "starting global trending refresh");

        let buckets = self.keywords_by_time(Granularity::Day).await?;
        let mut keywords = identify_trending(&buckets, self.settings.recent_window_intervals);
        keywords.truncate(self.settings.global_top_n);

        let ranking = GlobalRanking {
            captured_at: Utc::now(),
            keywords,
        };
        self.store
            .replace_global_ranking(&ranking)
            .await
            .context("failed to replace global ranking")?;

        let stored = ranking.keywords.len();
        self.metrics.global_keywords_current.set(stored as f64);
        info!(
            job_id = %job.job_id,
            keywords = stored,
            intervals = buckets.len(),
            "global trending refresh completed"
        );
        Ok(stored)
    }

    /// 全体トップキーワードを許可リストにして、カテゴリ別ランキングを再計算する。
    ///
    /// 全体ランキングが未計算の場合は何もせず 0 を返す（次の全体リフレッシュ後の
    /// 実行に委ねる）。
    ///
    /// # Errors
    /// コーパス取得またはキャッシュ置換に失敗した場合はエラーを返す。
    pub async fn refresh_categories(&self, job: &JobContext) -> Result<usize> {
        let Some(global) = self
            .store
            .latest_global_ranking()
            .await
            .context("failed to fetch global ranking")?
        else {
            warn!(job_id = %job.job_id, "no precomputed global ranking yet, skipping category partition");
            return Ok(0);
        };

        let allow_list: HashSet<String> = global
            .keywords
            .into_iter()
            .map(|(keyword, _)| keyword)
            .collect();
        info!(
            job_id = %job.job_id,
            allow_list = allow_list.len(),
            "starting category partition refresh"
        );

        let articles = self
            .store
            .fetch_articles()
            .await
            .context("failed to fetch article corpus")?;

        let windows = CategoryWindows::ending_at(
            Utc::now(),
            self.settings.category_recent_days,
            self.settings.category_historical_days,
        );
        let (rankings, stats) = categorize::categorize(
            &articles,
            &self.extractor,
            &allow_list,
            windows,
            self.settings.category_top_n,
        )
        .await;
        self.record_scan(stats);

        let captured_at = Utc::now();
        let records: Vec<CategoryRanking> = rankings
            .into_iter()
            .map(|(category, keywords)| CategoryRanking {
                category,
                captured_at,
                keywords,
            })
            .collect();

        self.store
            .replace_category_rankings(&records)
            .await
            .context("failed to replace category rankings")?;

        let stored = records.len();
        self.metrics.category_records_current.set(stored as f64);
        info!(
            job_id = %job.job_id,
            categories = stored,
            "category partition refresh completed"
        );
        Ok(stored)
    }

    fn record_scan(&self, stats: ScanStats) {
        self.metrics.articles_scanned.inc_by(stats.scanned as f64);
        self.metrics.articles_skipped.inc_by(stats.skipped() as f64);
        debug!(
            scanned = stats.scanned,
            missing_fields = stats.missing_fields,
            unparseable_dates = stats.unparseable_dates,
            "corpus scan finished"
        );
    }
}
