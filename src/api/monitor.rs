use actix_web::{web, HttpResponse, Responder};

use crate::api::{error_response, run_blocking};
use crate::metrics::METRICS;
use crate::state::AppState;

/// 完整快照
pub async fn monitor(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.collector.collect()).await {
        Ok(snapshot) => {
            METRICS.observe(&snapshot);
            HttpResponse::Ok().json(snapshot)
        }
        Err(resp) => resp,
    }
}

pub async fn cpu(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.collector.cpu_usage()).await {
        Ok(cpu) => HttpResponse::Ok().json(serde_json::json!({ "cpu": cpu })),
        Err(resp) => resp,
    }
}

pub async fn memory(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.collector.memory()).await {
        Ok(Ok(mem)) => HttpResponse::Ok().json(serde_json::json!({
            "memory": mem.percent,
            "total": mem.total,
            "used": mem.used,
            "free": mem.free
        })),
        Ok(Err(e)) => {
            log::error!("Memory probe failed: {:#}", e);
            error_response(format!("{:#}", e))
        }
        Err(resp) => resp,
    }
}

pub async fn uptime(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.collector.uptime()).await {
        Ok(Ok(seconds)) => HttpResponse::Ok().json(serde_json::json!({ "uptime": seconds })),
        Ok(Err(e)) => {
            log::error!("Uptime probe failed: {:#}", e);
            error_response(format!("{:#}", e))
        }
        Err(resp) => resp,
    }
}

pub async fn disk(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.collector.disk()).await {
        Ok(Ok(disk)) => HttpResponse::Ok().json(serde_json::json!({
            "disk": disk.percent,
            "total": disk.total,
            "used": disk.used,
            "free": disk.free
        })),
        Ok(Err(e)) => {
            log::error!("Disk probe failed: {:#}", e);
            error_response(format!("{:#}", e))
        }
        Err(resp) => resp,
    }
}
