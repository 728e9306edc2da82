pub mod metrics;
pub mod monitor;
pub mod process;
pub mod system;

pub use metrics::get_metrics;
pub use monitor::{cpu, disk, memory, monitor, uptime};
pub use process::{list_processes, ranked_processes};
pub use system::{filesystems, system};

use actix_web::{web, HttpResponse, Responder};

use crate::state::{AppState, AppStateInner};

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}

pub(crate) fn error_response(message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "status": "error",
        "message": message.to_string()
    }))
}

/// 在阻塞线程池中执行内核读取，避免占用 actix worker
pub(crate) async fn run_blocking<T, F>(data: &web::Data<AppState>, job: F) -> Result<T, HttpResponse>
where
    F: FnOnce(&AppStateInner) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = data.get_ref().clone();
    tokio::task::spawn_blocking(move || job(&state))
        .await
        .map_err(|e| {
            log::error!("Blocking collection task failed: {}", e);
            error_response("collection task failed")
        })
}
