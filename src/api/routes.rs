//! HTTP endpoints for the web, admin and SMS surfaces.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{
        Query, State,
        rejection::{FormRejection, JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::{AdminSnapshot, OrderFilter, TriageFilter};
use crate::commands::{OrderDraft, validate_symptoms};
use crate::error::{Result, ServiceError};
use crate::records::{OrderStatus, Source};
use crate::service::{OrderUpdate, TriageService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TriageService>,
}

/// Build the Axum router with every public, admin and SMS route.
pub fn app_routes(service: Arc<TriageService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/health", get(health))
        .route("/api/ai-opinion", post(ai_opinion))
        .route("/api/order", post(create_order))
        .route("/api/admin/doctor-requests", get(list_doctor_requests))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/orders/update", post(update_order))
        .route("/api/sms", post(twilio_sms))
        .route("/api/sms-local", post(local_sms))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn bad_json(rejection: JsonRejection) -> ServiceError {
    ServiceError::validation(format!("Invalid request body: {}", rejection.body_text()))
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "message": "ShasthoBondhu backend running"
    }))
}

// ── Web ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpinionRequest {
    #[serde(default)]
    symptoms_bn: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

async fn ai_opinion(
    State(state): State<AppState>,
    body: std::result::Result<Json<OpinionRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = body.map_err(bad_json)?;
    let symptoms = validate_symptoms(body.symptoms_bn.as_deref())?;
    let phone = body
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let outcome = state
        .service
        .submit_triage(Source::Web, symptoms, phone)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "aiReply": outcome.reply_for(Source::Web),
        "requestId": outcome.id(),
        "urgency": outcome.urgency(),
    })))
}

async fn create_order(
    State(state): State<AppState>,
    body: std::result::Result<Json<OrderDraft>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(draft) = body.map_err(bad_json)?;
    let order = draft.validate()?;
    let record = state.service.submit_order(Source::Web, order).await?;
    Ok(Json(json!({ "ok": true, "orderId": record.id })))
}

// ── Admin ───────────────────────────────────────────────────────────────

fn bad_query(rejection: QueryRejection) -> ServiceError {
    ServiceError::validation(format!("Invalid query: {}", rejection.body_text()))
}

async fn list_doctor_requests(
    State(state): State<AppState>,
    filter: std::result::Result<Query<TriageFilter>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(filter) = filter.map_err(bad_query)?;
    let snapshot = AdminSnapshot::load(&state.service).await?;
    let requests = snapshot.triage_view(&filter)?;
    Ok(Json(json!({ "ok": true, "requests": requests })))
}

async fn list_orders(
    State(state): State<AppState>,
    filter: std::result::Result<Query<OrderFilter>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(filter) = filter.map_err(bad_query)?;
    let snapshot = AdminSnapshot::load(&state.service).await?;
    let orders = snapshot.order_view(&filter)?;
    Ok(Json(json!({ "ok": true, "orders": orders })))
}

#[derive(Deserialize)]
struct UpdateOrderRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    /// Absent leaves the assignee alone; any supplied value, `null` included, is stored as sent.
    #[serde(default, deserialize_with = "present")]
    assigned_to: Option<Option<String>>,
}

/// Distinguish an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateOrderRequest {
    fn into_parts(self) -> Result<(Uuid, OrderUpdate)> {
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::validation("Missing order id."))?;

        // Ids that cannot be UUIDs cannot exist in the store.
        let id = Uuid::parse_str(&id).map_err(|_| ServiceError::NotFound {
            entity: "Order".to_string(),
            id: id.clone(),
        })?;

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| ServiceError::validation(format!("Invalid status: {e}")))?,
            ),
        };

        Ok((
            id,
            OrderUpdate {
                status,
                assigned_to: self.assigned_to,
            },
        ))
    }
}

async fn update_order(
    State(state): State<AppState>,
    body: std::result::Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = body.map_err(bad_json)?;
    let (id, update) = body.into_parts()?;
    let updated = state.service.update_order(id, update).await?;
    Ok(Json(json!({ "ok": true, "updated": updated })))
}

// ── SMS ─────────────────────────────────────────────────────────────────

/// Twilio webhook payload (form-encoded, capitalized field names).
#[derive(Deserialize)]
struct TwilioWebhook {
    #[serde(rename = "From", default)]
    from: Option<String>,
    #[serde(rename = "Body", default)]
    body: Option<String>,
}

fn present_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn twilio_sms(
    State(state): State<AppState>,
    form: std::result::Result<Form<TwilioWebhook>, FormRejection>,
) -> impl IntoResponse {
    let Ok(Form(form)) = form else {
        warn!("Rejected unreadable SMS webhook payload");
        return (StatusCode::BAD_REQUEST, "Invalid SMS");
    };
    let (Some(from), Some(body)) = (present_text(form.from), present_text(form.body)) else {
        warn!("Rejected SMS webhook without sender or body");
        return (StatusCode::BAD_REQUEST, "Invalid SMS");
    };

    let reply = state.service.handle_sms(Source::Sms, &from, &body).await;
    state.service.deliver_sms(&from, &reply).await;
    (StatusCode::OK, "OK")
}

#[derive(Deserialize)]
struct LocalSmsRequest {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

async fn local_sms(
    State(state): State<AppState>,
    body: std::result::Result<Json<LocalSmsRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = body.map_err(bad_json)?;
    let (Some(from), Some(message)) = (present_text(body.from), present_text(body.message))
    else {
        return Err(ServiceError::validation("Invalid SMS"));
    };

    let reply = state
        .service
        .handle_sms(Source::SmsLocal, &from, &message)
        .await;
    info!(from = %from, "Local gateway reply returned inline");
    Ok(Json(json!({ "ok": true, "reply": reply })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::channels::NoopSender;
    use crate::error::LlmError;
    use crate::llm::{CompletionRequest, CompletionResponse, LlmProvider};
    use crate::records::UrgencyLevel;
    use crate::store::Stores;

    const URGENT_REPLY: &str = "FULL_ADVICE:\nজরুরিতা: দ্রুত (Urgent)\n২৪ ঘণ্টার মধ্যে ডাক্তার দেখান।\nSMS_SUMMARY:\nদ্রুত ডাক্তার দেখান।";

    struct StubLlm(Option<&'static str>);

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LlmError> {
            match self.0 {
                Some(text) => Ok(CompletionResponse {
                    content: text.to_string(),
                }),
                None => Err(LlmError::RequestFailed {
                    provider: "stub".into(),
                    reason: "500 upstream down".into(),
                }),
            }
        }
    }

    fn app(reply: Option<&'static str>) -> (Router, Arc<TriageService>, TempDir) {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(TriageService::new(
            Arc::new(StubLlm(reply)),
            Arc::new(NoopSender),
            Stores::open(dir.path()),
        ));
        (app_routes(service.clone()), service, dir)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _svc, _dir) = app(None);
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn ai_opinion_returns_advice_and_persists() {
        let (app, svc, _dir) = app(Some(URGENT_REPLY));
        let response = app
            .oneshot(post_json(
                "/api/ai-opinion",
                json!({"symptomsBn": "বুকে ব্যথা ২ দিন", "phone": "01711111111"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["urgency"], "urgent");
        assert!(body["aiReply"].as_str().unwrap().starts_with("জরুরিতা"));

        let records = svc.list_triage_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(body["requestId"], records[0].id.to_string());
        assert_eq!(records[0].urgency, UrgencyLevel::Urgent);
        assert_eq!(records[0].phone.as_deref(), Some("01711111111"));
    }

    #[tokio::test]
    async fn ai_opinion_rejects_short_symptoms() {
        let (app, svc, _dir) = app(Some(URGENT_REPLY));
        let response = app
            .oneshot(post_json("/api/ai-opinion", json!({"symptomsBn": "জ্বর"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Please provide symptoms in Bangla.");
        assert!(svc.list_triage_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ai_failure_is_500_with_details() {
        let (app, svc, _dir) = app(None);
        let response = app
            .oneshot(post_json(
                "/api/ai-opinion",
                json!({"symptomsBn": "জ্বর ৩ দিন মাথাব্যথা"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert_eq!(body["error"], "AI service failed.");
        assert!(body["details"].as_str().unwrap().contains("upstream down"));
        assert!(svc.list_triage_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (app, _svc, _dir) = app(None);
        let request = Request::post("/api/order")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["ok"], false);
    }

    #[tokio::test]
    async fn order_requires_fields() {
        let (app, _svc, _dir) = app(None);
        let response = app
            .oneshot(post_json(
                "/api/order",
                json!({"phone": "017", "address": "Rangamati", "items": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Missing required fields.");
    }

    #[tokio::test]
    async fn fractional_quantity_is_a_named_validation_error() {
        let (app, svc, _dir) = app(None);
        let response = app
            .oneshot(post_json(
                "/api/order",
                json!({
                    "phone": "017",
                    "address": "Rangamati",
                    "items": [{"name": "ORS", "qty": 1.5}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = read_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.contains("qty"), "unexpected error: {error}");
        assert!(svc.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn order_then_update_then_filter() {
        let (app, svc, _dir) = app(None);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/order",
                json!({
                    "name": "Rahim",
                    "phone": "01700000000",
                    "address": "Rangamati",
                    "items": [{"name": "Paracetamol", "qty": 2}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let order_id = read_json(response).await["orderId"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/admin/orders/update",
                json!({"id": order_id, "status": "confirmed", "assigned_to": "Karim"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["updated"]["status"], "confirmed");
        assert_eq!(body["updated"]["assigned_to"], "Karim");

        // Status-only update leaves the assignee.
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/admin/orders/update",
                json!({"id": order_id, "status": "out-for-delivery"}),
            ))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["updated"]["assigned_to"], "Karim");

        // An explicit empty assignee is stored as sent.
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/admin/orders/update",
                json!({"id": order_id, "assigned_to": ""}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["updated"]["assigned_to"], "");
        assert_eq!(body["updated"]["status"], "out-for-delivery");

        let response = app
            .oneshot(
                Request::get("/api/admin/orders?status=out-for-delivery&q=rangamati")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["orders"].as_array().unwrap().len(), 1);

        let stored = svc.list_orders().await.unwrap();
        assert_eq!(stored[0].status, OrderStatus::OutForDelivery);
        assert_eq!(stored[0].assigned_to.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn update_errors() {
        let (app, _svc, _dir) = app(None);

        let response = app
            .clone()
            .oneshot(post_json("/api/admin/orders/update", json!({"status": "confirmed"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Missing order id.");

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/admin/orders/update",
                json!({"id": Uuid::new_v4(), "status": "confirmed"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["error"], "Order not found.");

        let response = app
            .oneshot(post_json(
                "/api/admin/orders/update",
                json!({"id": "abc", "status": "confirmed"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn update_body_distinguishes_null_from_missing() {
        let id = Uuid::new_v4();

        let body: UpdateOrderRequest =
            serde_json::from_value(json!({"id": id.to_string(), "status": ""})).unwrap();
        let (_, update) = body.into_parts().unwrap();
        assert_eq!(update, OrderUpdate::default());

        let body: UpdateOrderRequest =
            serde_json::from_value(json!({"id": id.to_string(), "assigned_to": null})).unwrap();
        let (_, update) = body.into_parts().unwrap();
        assert_eq!(update.assigned_to, Some(None));

        let body: UpdateOrderRequest =
            serde_json::from_value(json!({"id": id.to_string(), "assigned_to": ""})).unwrap();
        let (_, update) = body.into_parts().unwrap();
        assert_eq!(update.assigned_to, Some(Some(String::new())));

        let body: UpdateOrderRequest =
            serde_json::from_value(json!({"id": id.to_string(), "status": "lost"})).unwrap();
        assert!(matches!(body.into_parts(), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn twilio_webhook_requires_from_and_body() {
        let (app, _svc, _dir) = app(None);
        let request = Request::post("/api/sms")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("From=%2B8801711111111"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Invalid SMS");
    }

    #[tokio::test]
    async fn twilio_webhook_saves_order() {
        let (app, svc, _dir) = app(None);
        let request = Request::post("/api/sms")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("From=%2B8801711111111&Body=MED+ORS+3"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let orders = svc.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].source, Source::Sms);
        assert_eq!(orders[0].items_summary(), "ORS×3");
    }

    #[tokio::test]
    async fn local_gateway_gets_reply_inline() {
        let (app, svc, _dir) = app(Some(URGENT_REPLY));
        let response = app
            .oneshot(post_json(
                "/api/sms-local",
                json!({"from": "+8801722222222", "message": "help জ্বর ৩ দিন কাশি"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["reply"], "দ্রুত ডাক্তার দেখান।");

        let records = svc.list_triage_records().await.unwrap();
        assert_eq!(records[0].source, Source::SmsLocal);
    }

    #[tokio::test]
    async fn local_gateway_rejects_missing_message() {
        let (app, _svc, _dir) = app(None);
        let response = app
            .oneshot(post_json("/api/sms-local", json!({"from": "+880"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
