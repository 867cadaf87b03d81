use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::scheduler::{JobContext, Scheduler};

#[derive(Debug, Clone, Copy)]
enum JobKind {
    Global,
    Category,
}

impl JobKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global_trending",
            Self::Category => "category_partition",
        }
    }
}

/// 全体トレンドとカテゴリ分割の定期リフレッシュデーモンを起動する。
///
/// それぞれのデーモンは自分のループ内でジョブを `await` するため、同種ジョブが
/// 自分自身と並走することはない。2種のジョブ同士の交錯はキャッシュ置換が論理
/// キー単位のトランザクションであるため安全。
pub fn spawn_refresh_daemons(
    scheduler: Scheduler,
    config: &Config,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let global = RefreshDaemon::new(
        scheduler.clone(),
        config.global_refresh_interval(),
        JobKind::Global,
    )
    .spawn();
    let category = RefreshDaemon::new(
        scheduler,
        config.category_refresh_interval(),
        JobKind::Category,
    )
    .spawn();
    (global, category)
}

struct RefreshDaemon {
    scheduler: Scheduler,
    period: Duration,
    kind: JobKind,
}

impl RefreshDaemon {
    fn new(scheduler: Scheduler, period: Duration, kind: JobKind) -> Self {
        Self {
            scheduler,
            period,
            kind,
        }
    }

    fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        info!(
            kind = self.kind.as_str(),
            period_seconds = self.period.as_secs(),
            "refresh daemon started"
        );

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let job = JobContext::new(Uuid::new_v4());
            let job_id = job.job_id;
            let result = match self.kind {
                JobKind::Global => self.scheduler.run_global_job(job).await,
                JobKind::Category => self.scheduler.run_category_job(job).await,
            };

            if let Err(error) = result {
                error!(
                    %job_id,
                    kind = self.kind.as_str(),
                    error = %error,
                    "scheduled refresh failed, retrying on next tick"
                );
            }
        }
    }
}
