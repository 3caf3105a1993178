use crate::core::export::{archive_csv, filtered_users_csv, user_answers_csv, CsvFile};
use crate::core::{ArchiveCriteria, ArchiveFilter};
use crate::i18n::Locale;
use crate::models::{ArchiveResponse, FilterResponse, LocaleQuery, UserData};
use crate::routes::{
    error_response, export_error_response, filter_error_response, internal_error, request_locale,
    require_admin, AppState,
};
use actix_web::http::header::ContentDisposition;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/users", web::get().to(list_users))
        .route("/admin/users/filter", web::post().to(filter_users))
        .route("/admin/users/filter/export", web::post().to(export_filtered))
        .route("/admin/users/export", web::get().to(export_archive))
        .route("/admin/users/{uid}/export", web::get().to(export_user));
}

fn csv_response(file: CsvFile) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition::attachment(file.filename))
        .body(file.content)
}

async fn load_archive(state: &AppState) -> Result<Vec<UserData>, HttpResponse> {
    state
        .users
        .archive()
        .await
        .map_err(|e| internal_error("archive_unavailable", e))
}

/// Validate the criteria and run the filter over the archive
async fn run_filter(
    state: &AppState,
    criteria: &ArchiveCriteria,
    locale: Locale,
) -> Result<(ArchiveFilter, Vec<UserData>), HttpResponse> {
    let filter = ArchiveFilter::new(criteria, state.bank.question_count())
        .map_err(|e| filter_error_response(&state.bank, locale, &e))?;
    let archive = load_archive(state).await?;
    let users = filter.apply(&archive);

    tracing::info!(
        "Archive filter on questions {:?}: {} of {} users",
        filter.question_numbers(),
        users.len(),
        archive.len()
    );
    Ok((filter, users))
}

/// Full archive
///
/// GET /api/v1/admin/users
async fn list_users(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(response) = require_admin(&state, &req) {
        return response;
    }

    match load_archive(&state).await {
        Ok(users) => HttpResponse::Ok().json(ArchiveResponse {
            total: users.len(),
            users,
        }),
        Err(response) => response,
    }
}

/// Filter the archive by answer pattern and demographics
///
/// POST /api/v1/admin/users/filter?locale=en
///
/// Request body:
/// ```json
/// {
///   "answer": 1,
///   "questions": "3, 7, 12",
///   "gender": "female",
///   "minAge": 25,
///   "maxAge": 40,
///   "countries": ["IT"]
/// }
/// ```
async fn filter_users(
    state: web::Data<AppState>,
    body: web::Json<ArchiveCriteria>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &req) {
        return response;
    }
    let locale = request_locale(query.locale.as_deref(), &req);

    match run_filter(&state, &body, locale).await {
        Ok((filter, users)) => HttpResponse::Ok().json(FilterResponse {
            total: users.len(),
            users,
            question_numbers: filter.question_numbers().to_vec(),
        }),
        Err(response) => response,
    }
}

/// Filtered archive as CSV with localized labels
///
/// POST /api/v1/admin/users/filter/export?locale=en
async fn export_filtered(
    state: web::Data<AppState>,
    body: web::Json<ArchiveCriteria>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &req) {
        return response;
    }
    let locale = request_locale(query.locale.as_deref(), &req);

    let (filter, users) = match run_filter(&state, &body, locale).await {
        Ok(result) => result,
        Err(response) => return response,
    };

    match filtered_users_csv(
        &users,
        filter.question_numbers(),
        state.bank.questions(locale),
        &state.bank.export_labels(locale),
        &state.settings.countries,
    ) {
        Ok(file) => csv_response(file),
        Err(e) => export_error_response(&state.bank, locale, &e),
    }
}

/// Full archive as CSV with raw 0/1 answers
///
/// GET /api/v1/admin/users/export
async fn export_archive(
    state: web::Data<AppState>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &req) {
        return response;
    }
    let locale = request_locale(query.locale.as_deref(), &req);

    let archive = match load_archive(&state).await {
        Ok(archive) => archive,
        Err(response) => return response,
    };

    match archive_csv(&archive, state.bank.questions(locale), &state.settings.countries) {
        Ok(file) => csv_response(file),
        Err(e) => export_error_response(&state.bank, locale, &e),
    }
}

/// One respondent's answers as CSV
///
/// GET /api/v1/admin/users/{uid}/export?locale=en
async fn export_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &req) {
        return response;
    }
    let locale = request_locale(query.locale.as_deref(), &req);

    match state.users.by_uid(&path).await {
        Ok(Some(user)) => csv_response(user_answers_csv(
            &user,
            state.bank.questions(locale),
            &state.bank.export_labels(locale),
        )),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "User not found"),
        Err(e) => internal_error("lookup_failed", e),
    }
}
