use actix_web::{web, HttpResponse, Responder};

use crate::api::run_blocking;
use crate::metrics::METRICS;
use crate::state::AppState;

/// 先采集一次快照刷新 gauge，再输出 Prometheus 文本格式
pub async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.collector.collect()).await {
        Ok(snapshot) => METRICS.observe(&snapshot),
        Err(resp) => return resp,
    }

    match METRICS.render() {
        Ok(metrics_text) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(metrics_text),
        Err(e) => {
            log::error!("Failed to render metrics: {}", e);
            HttpResponse::InternalServerError().body("Failed to render metrics")
        }
    }
}
