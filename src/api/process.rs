use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::api::{error_response, run_blocking};
use crate::services::{CommandFilter, ProcessSource};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessQuery {
    /// 命令行过滤，正则无效时按子串匹配
    pub filter: Option<String>,
}

/// 扫描 /proc 得到的进程列表
pub async fn list_processes(
    data: web::Data<AppState>,
    query: web::Query<ProcessQuery>,
) -> impl Responder {
    let filter = query.into_inner().filter.filter(|f| !f.is_empty());

    let result = run_blocking(&data, move |state| {
        let processes = state.collector.processes()?;
        Ok::<_, anyhow::Error>(match filter {
            Some(pattern) => CommandFilter::new(&pattern).apply(processes),
            None => processes,
        })
    })
    .await;

    match result {
        Ok(Ok(processes)) => HttpResponse::Ok().json(processes),
        Ok(Err(e)) => {
            log::error!("Process scan failed: {:#}", e);
            error_response(format!("{:#}", e))
        }
        Err(resp) => resp,
    }
}

/// 按 CPU 占用排序的进程列表
pub async fn ranked_processes(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| state.ranked.enumerate(None)).await {
        Ok(Ok(processes)) => HttpResponse::Ok().json(processes),
        Ok(Err(e)) => {
            log::error!("Ranked process listing failed: {:#}", e);
            error_response("ps failed")
        }
        Err(resp) => resp,
    }
}
