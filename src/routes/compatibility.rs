use crate::core::{
    code::{decode_answers, normalize_code},
    find_by_code, calculate_compatibility, summarize, SearchError,
};
use crate::i18n::Locale;
use crate::models::{
    CompareRequest, CompareResponse, CompatibilityReport, DecodeRequest, LocaleQuery, ReportsQuery,
    SearchRequest, SearchResponse,
};
use crate::routes::{
    authenticate, error_response, internal_error, optional_user, request_locale, search_error_response,
    AppState,
};
use crate::services::AuthUser;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

const DEFAULT_REPORT_LIMIT: i64 = 50;
const MAX_REPORT_LIMIT: i64 = 200;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/compatibility/compare", web::post().to(compare_codes))
        .route("/compatibility/decode", web::post().to(compare_tokens))
        .route("/compatibility/search", web::post().to(search_partners))
        .service(
            web::resource("/reports")
                .route(web::get().to(list_reports))
                .route(web::delete().to(clear_reports)),
        );
}

/// Summarize a report and store it in the viewer's history when signed in
async fn report_response(
    state: &AppState,
    viewer: Option<AuthUser>,
    report: CompatibilityReport,
) -> HttpResponse {
    let summary = summarize(&report, &state.settings.scoring.thresholds());

    let saved = match viewer {
        Some(viewer) => match state.postgres.add_report(&viewer.uid, &report).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Failed to store report for {}: {}", viewer.uid, e);
                false
            }
        },
        None => false,
    };

    HttpResponse::Ok().json(CompareResponse {
        report,
        summary,
        saved,
    })
}

/// Compare two public codes
///
/// POST /api/v1/compatibility/compare
///
/// Request body:
/// ```json
/// { "code1": "ABCD2345", "code2": "WXYZ6789" }
/// ```
async fn compare_codes(
    state: web::Data<AppState>,
    body: web::Json<CompareRequest>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let locale = request_locale(query.locale.as_deref(), &req);
    let viewer = match optional_user(&state, &req) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    if body.validate().is_err() {
        return search_error_response(&state.bank, locale, &SearchError::InvalidCode);
    }

    let archive = match state.users.archive().await {
        Ok(archive) => archive,
        Err(e) => return internal_error("archive_unavailable", e),
    };

    let questions = state.bank.questions(Locale::En);
    let report = match state
        .matcher
        .compare_codes(&body.code1, &body.code2, &archive, questions)
    {
        Ok(report) => report,
        Err(e) => return search_error_response(&state.bank, locale, &e),
    };

    tracing::info!(
        "Compared {} with {}: {}%",
        report.user1_code,
        report.user2_code,
        report.overall_score
    );

    report_response(&state, viewer, report).await
}

/// Compare two share tokens without touching the archive
///
/// POST /api/v1/compatibility/decode
async fn compare_tokens(
    state: web::Data<AppState>,
    body: web::Json<DecodeRequest>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let locale = request_locale(query.locale.as_deref(), &req);
    let viewer = match optional_user(&state, &req) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let questions = state.bank.questions(Locale::En);
    let decoded = (
        decode_answers(&body.token1, questions.len()),
        decode_answers(&body.token2, questions.len()),
    );
    let (data1, data2) = match decoded {
        (Some(data1), Some(data2)) => (data1, data2),
        _ => return search_error_response(&state.bank, locale, &SearchError::InvalidCode),
    };
    if data1.code.eq_ignore_ascii_case(&data2.code) {
        return search_error_response(&state.bank, locale, &SearchError::SameCode);
    }

    match calculate_compatibility(&data1, &data2, questions) {
        Ok(report) => report_response(&state, viewer, report).await,
        Err(e) => search_error_response(&state.bank, locale, &SearchError::from(e)),
    }
}

/// Rank the archive against the respondent holding `code`
///
/// POST /api/v1/compatibility/search
///
/// Request body:
/// ```json
/// {
///   "code": "ABCD2345",
///   "minCompatibility": 35,
///   "gender": "any",
///   "minAge": 18,
///   "maxAge": 99,
///   "countries": ["IT", "FR"],
///   "limit": 50
/// }
/// ```
async fn search_partners(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let locale = request_locale(query.locale.as_deref(), &req);

    let Some(code) = normalize_code(&body.code) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "code_required",
            state.bank.translate(locale, "comparison_error_search_code_required", &[]),
        );
    };

    let archive = match state.users.archive().await {
        Ok(archive) => archive,
        Err(e) => return internal_error("archive_unavailable", e),
    };

    let Some(reference) = find_by_code(&archive, &code) else {
        return search_error_response(&state.bank, locale, &SearchError::UnknownCode(code));
    };

    let result = match state.matcher.search(
        reference,
        &archive,
        state.bank.questions(Locale::En),
        &body.criteria,
    ) {
        Ok(result) => result,
        Err(e) => return search_error_response(&state.bank, locale, &e),
    };

    tracing::info!(
        "Partner search for {}: {} matches from {} candidates",
        code,
        result.matches.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(SearchResponse {
        returned: result.matches.len(),
        total_candidates: result.total_candidates,
        matches: result.matches,
    })
}

/// Report history, newest first
///
/// GET /api/v1/reports?limit=50
async fn list_reports(
    state: web::Data<AppState>,
    query: web::Query<ReportsQuery>,
    req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT).clamp(1, MAX_REPORT_LIMIT);
    match state.postgres.list_reports(&caller.uid, limit).await {
        Ok(reports) => HttpResponse::Ok().json(serde_json::json!({ "reports": reports })),
        Err(e) => internal_error("reports_unavailable", e),
    }
}

async fn clear_reports(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.postgres.clear_reports(&caller.uid).await {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({ "removed": removed })),
        Err(e) => internal_error("reports_clear_failed", e),
    }
}
