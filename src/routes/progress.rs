use crate::models::QuizProgress;
use crate::routes::{authenticate, error_response, internal_error, AppState};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/progress")
            .route(web::get().to(get_progress))
            .route(web::put().to(save_progress))
            .route(web::delete().to(delete_progress)),
    );
}

async fn get_progress(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.postgres.get_progress(&caller.uid).await {
        Ok(Some(progress)) => HttpResponse::Ok().json(progress),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "No saved progress"),
        Err(e) => internal_error("progress_lookup_failed", e),
    }
}

/// Save a partially completed questionnaire
///
/// PUT /api/v1/progress
async fn save_progress(
    state: web::Data<AppState>,
    body: web::Json<QuizProgress>,
    req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let question_count = state.bank.question_count();
    if body.answers.len() != question_count {
        return error_response(
            StatusCode::BAD_REQUEST,
            "answer_count_mismatch",
            format!("Expected {} answer slots, got {}", question_count, body.answers.len()),
        );
    }
    if body.current_question_index >= question_count {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_question_index",
            format!("Question index must be below {}", question_count),
        );
    }
    if let Err(errors) = body.user_info.validate() {
        return error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string());
    }

    match state.postgres.save_progress(&caller.uid, &body).await {
        Ok(()) => HttpResponse::Ok().json(body.into_inner()),
        Err(e) => internal_error("progress_save_failed", e),
    }
}

async fn delete_progress(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.postgres.delete_progress(&caller.uid).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => internal_error("progress_delete_failed", e),
    }
}
