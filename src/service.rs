//! Request orchestrator shared by every channel.
//!
//! Flow for triage:
//! 1. AI call (symptoms in, two-section text out)
//! 2. Split into full advice + SMS summary
//! 3. Classify urgency from the full advice
//! 4. Persist the record, reply in the channel's format
//!
//! SMS entry points never fail: every outcome, including internal errors,
//! becomes a reply text so the inbound transport always gets an acknowledgement.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::channels::{SmsDelivery, SmsSender};
use crate::commands::replies::{self, SMS_ORDER_ADDRESS, UNRECOGNIZED_HELP};
use crate::commands::{Command, ValidOrder, parse_command, validate_symptoms};
use crate::error::{LlmError, Result, ServiceError, StoreError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::records::{OrderRecord, OrderStatus, Source, TriageRecord, UrgencyLevel};
use crate::store::Stores;
use crate::triage::prompts::{TRIAGE_SYSTEM_PROMPT, triage_user_prompt};
use crate::triage::{Advice, classify_urgency, split_advice};

/// Low temperature keeps the two-section format stable.
const TRIAGE_TEMPERATURE: f32 = 0.2;

const TRIAGE_MAX_TOKENS: u32 = 700;

/// Result of a successful triage submission.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    /// The persisted record (its `ai_reply` is the full advice).
    pub record: TriageRecord,
    /// SMS-safe summary of the same advice.
    pub sms_summary: String,
}

impl TriageOutcome {
    pub fn id(&self) -> Uuid {
        self.record.id
    }

    pub fn urgency(&self) -> UrgencyLevel {
        self.record.urgency
    }

    /// Text to send back on `channel`: full advice on the web, summary over SMS.
    pub fn reply_for(&self, channel: Source) -> &str {
        if channel.is_sms() {
            &self.sms_summary
        } else {
            &self.record.ai_reply
        }
    }
}

/// Admin patch for an order. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    /// `Some(None)` clears the assignee; `None` leaves it alone.
    pub assigned_to: Option<Option<String>>,
}

impl OrderUpdate {
    fn apply(self, order: &mut OrderRecord) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            order.assigned_to = assigned_to;
        }
    }
}

/// Composes the AI provider, SMS transport and record stores.
pub struct TriageService {
    llm: Arc<dyn LlmProvider>,
    sms: Arc<dyn SmsSender>,
    stores: Stores,
}

impl TriageService {
    pub fn new(llm: Arc<dyn LlmProvider>, sms: Arc<dyn SmsSender>, stores: Stores) -> Self {
        Self { llm, sms, stores }
    }

    /// Ask the AI for advice on `symptoms` and split the answer.
    pub async fn request_advice(&self, symptoms: &str) -> std::result::Result<Advice, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(TRIAGE_SYSTEM_PROMPT),
            ChatMessage::user(triage_user_prompt(symptoms)),
        ])
        .with_temperature(TRIAGE_TEMPERATURE)
        .with_max_tokens(TRIAGE_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        Ok(split_advice(&response.content))
    }

    /// Triage `symptoms` and persist the result.
    ///
    /// Nothing is persisted when the AI call fails.
    pub async fn submit_triage(
        &self,
        channel: Source,
        symptoms: &str,
        phone: Option<String>,
    ) -> Result<TriageOutcome> {
        let symptoms = validate_symptoms(Some(symptoms))?;

        let advice = self.request_advice(symptoms).await.map_err(|e| {
            error!(channel = %channel, error = %e, "AI triage call failed");
            ServiceError::from(e)
        })?;
        let urgency = classify_urgency(&advice.full_advice);

        let record = TriageRecord::new(channel, phone, symptoms, advice.full_advice, urgency);
        let record = self.stores.triage.append(record).await?;

        info!(
            id = %record.id,
            channel = %channel,
            urgency = %urgency,
            "Triage record saved"
        );

        Ok(TriageOutcome {
            record,
            sms_summary: advice.sms_summary,
        })
    }

    /// Persist a new `pending`, unassigned order.
    pub async fn submit_order(&self, channel: Source, order: ValidOrder) -> Result<OrderRecord> {
        let record = OrderRecord::new(channel, order.name, order.phone, order.address, order.items);
        let record = self.stores.orders.append(record).await?;

        info!(
            id = %record.id,
            channel = %channel,
            items = %record.items_summary(),
            "Order saved"
        );

        Ok(record)
    }

    /// Apply an admin update to the order with `id`.
    pub async fn update_order(&self, id: Uuid, update: OrderUpdate) -> Result<OrderRecord> {
        let updated = self
            .stores
            .orders
            .find_and_update(id, |order| update.apply(order))
            .await
            .map_err(|e| match e {
                StoreError::NotFound { id, .. } => ServiceError::NotFound {
                    entity: "Order".to_string(),
                    id,
                },
                other => ServiceError::from(other),
            })?;

        info!(
            id = %updated.id,
            status = %updated.status,
            assigned_to = ?updated.assigned_to,
            "Order updated"
        );
        Ok(updated)
    }

    pub async fn list_triage_records(&self) -> Result<Vec<TriageRecord>> {
        Ok(self.stores.triage.list().await?)
    }

    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>> {
        Ok(self.stores.orders.list().await?)
    }

    /// Handle one inbound SMS and produce the reply text.
    ///
    /// Never fails: internal errors are logged and answered with an apology.
    pub async fn handle_sms(&self, channel: Source, from: &str, body: &str) -> String {
        let command = parse_command(body);
        info!(channel = %channel, from = %from, command = command.label(), "Inbound SMS");

        let result = match command {
            Command::Triage { symptoms } => self
                .submit_triage(channel, &symptoms, Some(from.to_string()))
                .await
                .map(|outcome| outcome.reply_for(channel).to_string()),
            Command::Order { items } => {
                let order = ValidOrder {
                    name: None,
                    phone: from.to_string(),
                    address: SMS_ORDER_ADDRESS.to_string(),
                    items,
                };
                self.submit_order(channel, order)
                    .await
                    .map(|record| replies::order_confirmation(record.id))
            }
            other => Ok(other.usage_hint().unwrap_or(UNRECOGNIZED_HELP).to_string()),
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                error!(channel = %channel, from = %from, error = %e, "SMS processing failed");
                replies::SERVICE_APOLOGY.to_string()
            }
        }
    }

    /// Send `text` to `to` over the configured transport. Failures are logged only.
    pub async fn deliver_sms(&self, to: &str, text: &str) {
        match self.sms.send(to, text).await {
            Ok(SmsDelivery::Sent { sid }) => {
                info!(to = %to, sid = ?sid, transport = self.sms.name(), "SMS reply delivered");
            }
            Ok(SmsDelivery::Skipped) => {}
            Err(e) => {
                warn!(to = %to, transport = self.sms.name(), error = %e, "SMS reply failed");
            }
        }
    }
}
