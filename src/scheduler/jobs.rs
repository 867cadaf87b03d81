use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use uuid::Uuid;

use crate::observability::metrics::Metrics;
use crate::pipeline::TrendingPipeline;

/// 1回のリフレッシュ実行を識別するコンテキスト。
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: Uuid,
}

impl JobContext {
    #[must_use]
    pub fn new(job_id: Uuid) -> Self {
        Self { job_id }
    }
}

/// リフレッシュジョブの実行窓口。デーモンと管理エンドポイントの双方から使う。
#[derive(Clone)]
pub struct Scheduler {
    pipeline: Arc<TrendingPipeline>,
    metrics: Arc<Metrics>,
}

impl Scheduler {
    #[must_use]
    pub fn new(pipeline: Arc<TrendingPipeline>, metrics: Arc<Metrics>) -> Self {
        Self { pipeline, metrics }
    }

    /// 全体トレンドのリフレッシュを1回実行する。
    ///
    /// # Errors
    /// パイプラインの実行に失敗した場合はエラーを返す。失敗は記録され、
    /// 次のスケジュール実行で再試行される。
    pub async fn run_global_job(&self, context: JobContext) -> Result<()> {
        let started = Instant::now();
        match self.pipeline.refresh_global(&context).await {
            Ok(stored) => {
                self.metrics.jobs_completed.inc();
                self.metrics
                    .global_job_duration
                    .observe(started.elapsed().as_secs_f64());
                tracing::info!(
                    job_id = %context.job_id,
                    keywords = stored,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "global trending job finished"
                );
                Ok(())
            }
            Err(error) => {
                self.metrics.jobs_failed.inc();
                tracing::error!(job_id = %context.job_id, error = %error, "global trending job failed");
                Err(error)
            }
        }
    }

    /// カテゴリ別ランキングのリフレッシュを1回実行する。
    ///
    /// # Errors
    /// パイプラインの実行に失敗した場合はエラーを返す。
    pub async fn run_category_job(&self, context: JobContext) -> Result<()> {
        let started = Instant::now();
        match self.pipeline.refresh_categories(&context).await {
            Ok(stored) => {
                self.metrics.jobs_completed.inc();
                self.metrics
                    .category_job_duration
                    .observe(started.elapsed().as_secs_f64());
                tracing::info!(
                    job_id = %context.job_id,
                    categories = stored,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "category partition job finished"
                );
                Ok(())
            }
            Err(error) => {
                self.metrics.jobs_failed.inc();
                tracing::error!(job_id = %context.job_id, error = %error, "category partition job failed");
                Err(error)
            }
        }
    }
}
