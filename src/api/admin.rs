use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{app::AppState, scheduler::JobContext};

#[derive(Debug, Serialize)]
struct RefreshResponse {
    job_id: Uuid,
    status: &'static str,
}

/// スケジュールを待たずにリフレッシュを1回実行する。
///
/// 全体トレンド→カテゴリ分割の順でバックグラウンド実行し、受理応答を即返す。
pub(crate) async fn trigger_refresh(State(state): State<AppState>) -> impl IntoResponse {
    state.telemetry().record_manual_refresh_invocation();

    let job_id = Uuid::new_v4();
    let scheduler = state.scheduler().clone();

    tokio::spawn(async move {
        if let Err(error) = scheduler.run_global_job(JobContext::new(job_id)).await {
            error!(%job_id, error = ?error, "manual global refresh failed");
            return;
        }
        if let Err(error) = scheduler.run_category_job(JobContext::new(job_id)).await {
            error!(%job_id, error = ?error, "manual category refresh failed");
            return;
        }
        info!(%job_id, "manual refresh completed");
    });

    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            job_id,
            status: "accepted",
        }),
    )
        .into_response()
}
