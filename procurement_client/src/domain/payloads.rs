use crate::domain::entities::{Locale, Role, ThemePreference};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

// Serializing in the domain layer leaks the wire format, but the payloads are
// exactly what the backend accepts so the duplication is not worth it.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub org_name: String,
    pub role: Role,
}

// Omitted fields keep their stored value; the backend has no way to clear them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_preference: Option<ThemePreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestCreate {
    pub title: String,
    pub description: String,
    pub budget_cents: i64,
    pub currency: String,
    pub deadline_date: NaiveDate,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteCreate {
    pub request_id: Uuid,
    pub amount_cents: i64,
    pub timeline_days: i64,
    pub terms: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardPayload {
    pub winning_quote_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageCreate {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InviteCreate {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionPrompt {
    pub context_type: String,
    pub context_id: String,
    pub prompt: String,
}
