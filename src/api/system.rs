use actix_web::{web, HttpResponse, Responder};

use crate::api::{error_response, run_blocking};
use crate::services::system_info;
use crate::state::AppState;

pub async fn system(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |state| system_info::system_info(&state.os_release)).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(resp) => resp,
    }
}

pub async fn filesystems(data: web::Data<AppState>) -> impl Responder {
    match run_blocking(&data, |_| system_info::filesystem_summary()).await {
        Ok(Ok(rows)) => HttpResponse::Ok().json(rows),
        Ok(Err(e)) => {
            log::error!("df failed: {:#}", e);
            error_response(format!("{:#}", e))
        }
        Err(resp) => resp,
    }
}
