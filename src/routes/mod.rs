// Route exports
pub mod admin;
pub mod chat;
pub mod compatibility;
pub mod health;
pub mod progress;
pub mod questions;
pub mod users;

use crate::config::Settings;
use crate::core::{export::ExportError, FilterError, Matcher, SearchError};
use crate::i18n::{Locale, QuestionBank};
use crate::models::ErrorResponse;
use crate::services::{AuthError, AuthUser, PostgresClient, TokenVerifier, UserDirectory};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserDirectory>,
    pub postgres: Arc<PostgresClient>,
    pub auth: Arc<TokenVerifier>,
    pub bank: Arc<QuestionBank>,
    pub matcher: Matcher,
    pub settings: Arc<Settings>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(questions::configure)
            .configure(users::configure)
            .configure(progress::configure)
            .configure(compatibility::configure)
            .configure(chat::configure)
            .configure(admin::configure),
    );
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn internal_error(error: &str, cause: impl std::fmt::Display) -> HttpResponse {
    tracing::error!("{}: {}", error, cause);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, error, cause.to_string())
}

/// `?locale=` first, then the first tag of `Accept-Language`
pub(crate) fn request_locale(requested: Option<&str>, req: &HttpRequest) -> Locale {
    let header_value = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or(tag));

    requested
        .and_then(|l| l.parse().ok())
        .unwrap_or_else(|| Locale::resolve(header_value))
}

fn authorization(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

fn unauthorized(e: AuthError) -> HttpResponse {
    tracing::debug!("Rejected credentials: {}", e);
    error_response(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string())
}

/// Caller identity; 401 when the token is missing or invalid
pub(crate) fn authenticate(state: &AppState, req: &HttpRequest) -> Result<AuthUser, HttpResponse> {
    state.auth.verify_header(authorization(req)).map_err(unauthorized)
}

/// Caller identity when a token is sent; a bad token is still a 401
pub(crate) fn optional_user(state: &AppState, req: &HttpRequest) -> Result<Option<AuthUser>, HttpResponse> {
    match authorization(req) {
        None => Ok(None),
        Some(value) => state.auth.verify_header(Some(value)).map(Some).map_err(unauthorized),
    }
}

pub(crate) fn require_admin(state: &AppState, req: &HttpRequest) -> Result<AuthUser, HttpResponse> {
    let user = authenticate(state, req)?;
    if !state.auth.is_admin(&user) {
        tracing::warn!("Non-admin {} tried to reach {}", user.uid, req.path());
        return Err(error_response(StatusCode::FORBIDDEN, "forbidden", "Administrator access required"));
    }
    Ok(user)
}

pub(crate) fn filter_error_response(bank: &QuestionBank, locale: Locale, e: &FilterError) -> HttpResponse {
    let message = match e {
        FilterError::InvalidQuestionNumber(_) => {
            bank.translate(locale, "admin_filter_error_invalid_numbers", &[])
        }
        FilterError::QuestionOutOfRange { question_count, .. } => bank.translate(
            locale,
            "admin_filter_error_out_of_range",
            &[("questionCount", question_count.to_string())],
        ),
        FilterError::InvalidAgeRange { .. } => bank.translate(locale, "admin_filter_error_age_range", &[]),
    };
    error_response(StatusCode::BAD_REQUEST, "invalid_filter", message)
}

pub(crate) fn search_error_response(bank: &QuestionBank, locale: Locale, e: &SearchError) -> HttpResponse {
    match e {
        SearchError::InvalidCode => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_code",
            bank.translate(locale, "comparison_error_invalid_code", &[]),
        ),
        SearchError::SameCode => error_response(
            StatusCode::BAD_REQUEST,
            "same_code",
            bank.translate(locale, "comparison_error_same_code", &[]),
        ),
        SearchError::UnknownCode(_) => error_response(
            StatusCode::NOT_FOUND,
            "code_not_found",
            bank.translate(locale, "comparison_error_search_code_not_found", &[]),
        ),
        SearchError::Filter(filter) => filter_error_response(bank, locale, filter),
        SearchError::Scoring(scoring) => internal_error("scoring_failed", scoring),
    }
}

pub(crate) fn export_error_response(bank: &QuestionBank, locale: Locale, e: &ExportError) -> HttpResponse {
    match e {
        ExportError::Empty => error_response(
            StatusCode::BAD_REQUEST,
            "nothing_to_export",
            bank.translate(locale, "export_error_empty", &[]),
        ),
        ExportError::QuestionOutOfRange(number) => filter_error_response(
            bank,
            locale,
            &FilterError::QuestionOutOfRange {
                number: *number,
                question_count: bank.question_count(),
            },
        ),
    }
}
