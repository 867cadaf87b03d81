/// Prometheusメトリクス定義。
use prometheus::{
    Counter, Gauge, Histogram, Registry, register_counter_with_registry,
    register_gauge_with_registry, register_histogram_with_registry,
};
use std::sync::Arc;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub articles_scanned: Counter,
    pub articles_skipped: Counter,
    pub annotation_failures: Counter,
    pub jobs_completed: Counter,
    pub jobs_failed: Counter,

    // ヒストグラム
    pub global_job_duration: Histogram,
    pub category_job_duration: Histogram,

    // ゲージ
    pub global_keywords_current: Gauge,
    pub category_records_current: Gauge,
}

impl Metrics {
    /// 指定されたレジストリにメトリクスを登録して生成する。
    ///
    /// # Errors
    /// 同名メトリクスの二重登録などで登録に失敗した場合はエラーを返す。
    pub fn new(registry: Arc<Registry>) -> prometheus::Result<Self> {
        let registry = registry.as_ref();

        let articles_scanned = register_counter_with_registry!(
            "trend_articles_scanned_total",
            "Number of article documents visited by corpus scans.",
            registry
        )?;
        let articles_skipped = register_counter_with_registry!(
            "trend_articles_skipped_total",
            "Articles dropped from aggregation (missing fields or unparseable pubDate).",
            registry
        )?;
        let annotation_failures = register_counter_with_registry!(
            "trend_annotation_failures_total",
            "Annotator calls that failed and yielded an empty token list.",
            registry
        )?;
        let jobs_completed = register_counter_with_registry!(
            "trend_jobs_completed_total",
            "Refresh jobs that finished successfully.",
            registry
        )?;
        let jobs_failed = register_counter_with_registry!(
            "trend_jobs_failed_total",
            "Refresh jobs that aborted with an error.",
            registry
        )?;

        let global_job_duration = register_histogram_with_registry!(
            "trend_global_job_duration_seconds",
            "Wall clock duration of the global trending refresh job.",
            registry
        )?;
        let category_job_duration = register_histogram_with_registry!(
            "trend_category_job_duration_seconds",
            "Wall clock duration of the category partition refresh job.",
            registry
        )?;

        let global_keywords_current = register_gauge_with_registry!(
            "trend_global_keywords_current",
            "Keyword count stored in the latest global ranking record.",
            registry
        )?;
        let category_records_current = register_gauge_with_registry!(
            "trend_category_records_current",
            "Category ranking records stored by the latest partition run.",
            registry
        )?;

        Ok(Self {
            articles_scanned,
            articles_skipped,
            annotation_failures,
            jobs_completed,
            jobs_failed,
            global_job_duration,
            category_job_duration,
            global_keywords_current,
            category_records_current,
        })
    }
}
