use crate::models::{LocaleQuery, QuestionView, QuestionsResponse};
use crate::routes::{request_locale, AppState};
use actix_web::{web, HttpRequest, HttpResponse, Responder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/questions", web::get().to(list_questions));
}

/// Questionnaire for a locale
///
/// GET /api/v1/questions?locale=it
async fn list_questions(
    state: web::Data<AppState>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let locale = request_locale(query.locale.as_deref(), &req);
    let bank = &state.bank;

    let questions = bank
        .questions(locale)
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionView {
            number: index + 1,
            category: question.category,
            category_name: bank.category_name(locale, question.category).to_string(),
            text: question.text.clone(),
        })
        .collect();

    HttpResponse::Ok().json(QuestionsResponse {
        locale: locale.code().to_string(),
        questions,
        categories: bank.category_names(locale),
        coupons: state.settings.coupons.clone(),
    })
}
