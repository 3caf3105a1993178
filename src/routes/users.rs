use crate::core::code::encode_answers;
use crate::models::{LocaleQuery, PublicProfileResponse, SubmitQuizRequest, UserData, UserResponse};
use crate::routes::{authenticate, error_response, internal_error, request_locale, AppState};
use crate::i18n::Locale;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::post().to(submit_quiz))
        .route("/users/me", web::get().to(get_me))
        .route("/users/code/{code}", web::get().to(get_by_code));
}

fn user_response(state: &AppState, user: UserData, locale: Locale) -> HttpResponse {
    let share_token = match encode_answers(&user.answer_data()) {
        Ok(token) => token,
        Err(e) => return internal_error("share_token_failed", e),
    };
    let share_message = state.bank.translate(
        locale,
        "user_result_share_message_text",
        &[("code", user.code.clone())],
    );

    HttpResponse::Ok().json(UserResponse {
        user,
        share_token,
        share_message,
    })
}

/// Submit a completed questionnaire
///
/// POST /api/v1/users
///
/// Request body:
/// ```json
/// {
///   "userInfo": { "name": "string", "age": 30, "gender": "female", "country": "IT" },
///   "answers": [1, 0, 1]
/// }
/// ```
async fn submit_quiz(
    state: web::Data<AppState>,
    body: web::Json<SubmitQuizRequest>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    if let Err(errors) = body.validate() {
        tracing::info!("Validation failed for quiz submission: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string());
    }

    let expected = state.bank.question_count();
    if body.answers.len() != expected {
        return error_response(
            StatusCode::BAD_REQUEST,
            "answer_count_mismatch",
            format!("Expected {} answers, got {}", expected, body.answers.len()),
        );
    }

    let SubmitQuizRequest { user_info, answers } = body.into_inner();
    let user = match state
        .users
        .submit(
            &caller.uid,
            user_info,
            answers,
            state.settings.matching.code_generation_attempts,
        )
        .await
    {
        Ok(user) => user,
        Err(e) => return internal_error("submit_failed", e),
    };

    // The saved draft is obsolete once the quiz is stored
    if let Err(e) = state.postgres.delete_progress(&caller.uid).await {
        tracing::warn!("Failed to clear quiz progress for {}: {}", caller.uid, e);
    }

    user_response(&state, user, request_locale(query.locale.as_deref(), &req))
}

/// The caller's own record
///
/// GET /api/v1/users/me
async fn get_me(
    state: web::Data<AppState>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.users.by_uid(&caller.uid).await {
        Ok(Some(user)) => user_response(&state, user, request_locale(query.locale.as_deref(), &req)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "No questionnaire stored for this account",
        ),
        Err(e) => internal_error("lookup_failed", e),
    }
}

/// Public profile behind a code
///
/// GET /api/v1/users/code/{code}
async fn get_by_code(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let locale = request_locale(query.locale.as_deref(), &req);

    match state.users.by_code(&path).await {
        Ok(Some(user)) => HttpResponse::Ok().json(PublicProfileResponse {
            code: user.code,
            user_info: user.user_info,
        }),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "code_not_found",
            state.bank.translate(locale, "comparison_error_search_code_not_found", &[]),
        ),
        Err(e) => internal_error("lookup_failed", e),
    }
}
