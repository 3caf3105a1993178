use crate::core::{calculate_compatibility, conversation::validate_message_text};
use crate::i18n::Locale;
use crate::models::{ConversationsResponse, LocaleQuery, MessagesResponse, SendMessageRequest, SendMessageResponse};
use crate::routes::{authenticate, error_response, internal_error, request_locale, AppState};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/chat/conversations", web::get().to(list_conversations))
        .route("/chat/conversations/{id}/messages", web::get().to(list_messages))
        .route("/chat/messages", web::post().to(send_message));
}

/// The caller's conversations, most recently active first
///
/// GET /api/v1/chat/conversations
async fn list_conversations(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.postgres.list_conversations(&caller.uid).await {
        Ok(conversations) => HttpResponse::Ok().json(ConversationsResponse { conversations }),
        Err(e) => internal_error("conversations_unavailable", e),
    }
}

/// Messages of one conversation, oldest first; participants only
///
/// GET /api/v1/chat/conversations/{id}/messages
async fn list_messages(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let conversation_id = path.into_inner();

    let conversation = match state.postgres.get_conversation(&conversation_id).await {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, "not_found", "Conversation not found");
        }
        Err(e) => return internal_error("conversation_unavailable", e),
    };

    if !conversation.has_participant(&caller.uid) {
        tracing::warn!("{} tried to read conversation {}", caller.uid, conversation_id);
        return error_response(StatusCode::FORBIDDEN, "forbidden", "Not a participant of this conversation");
    }

    match state.postgres.list_messages(&conversation_id).await {
        Ok(messages) => HttpResponse::Ok().json(MessagesResponse {
            conversation_id,
            messages,
        }),
        Err(e) => internal_error("messages_unavailable", e),
    }
}

/// Send a message to the respondent behind a code
///
/// POST /api/v1/chat/messages
///
/// Request body:
/// ```json
/// { "recipientCode": "WXYZ6789", "text": "Hi!" }
/// ```
async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<SendMessageRequest>,
    query: web::Query<LocaleQuery>,
    req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let locale = request_locale(query.locale.as_deref(), &req);

    let Some(text) = validate_message_text(&body.text) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_message",
            "Message text must be between 1 and 2000 characters",
        );
    };

    let sender = match state.users.by_uid(&caller.uid).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "quiz_not_completed",
                "Complete the questionnaire before starting a conversation",
            );
        }
        Err(e) => return internal_error("lookup_failed", e),
    };

    let recipient = match state.users.by_code(&body.recipient_code).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "code_not_found",
                state.bank.translate(locale, "comparison_error_search_code_not_found", &[]),
            );
        }
        Err(e) => return internal_error("lookup_failed", e),
    };

    if recipient.uid == sender.uid {
        return error_response(
            StatusCode::BAD_REQUEST,
            "same_code",
            state.bank.translate(locale, "comparison_error_same_code", &[]),
        );
    }

    let score = match calculate_compatibility(
        &sender.answer_data(),
        &recipient.answer_data(),
        state.bank.questions(Locale::En),
    ) {
        Ok(report) => report.overall_score,
        Err(e) => return internal_error("scoring_failed", e),
    };

    match state.postgres.send_message(&sender, &recipient, text, score).await {
        Ok((conversation, message)) => HttpResponse::Ok().json(SendMessageResponse { conversation, message }),
        Err(e) => internal_error("send_failed", e),
    }
}
