use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{
    AuditEntry, AwardOutcome, DealItem, Invite, InvoiceItem, Me, Message, Notification,
    Paginated, QuoteItem, RequestItem, StatusMessage, Suggestion, User,
};
use crate::domain::errors::ApiError;
use crate::domain::payloads::{
    InviteCreate, LoginPayload, MessageCreate, ProfileUpdate, QuoteCreate, QuotePatch,
    RegisterPayload, RequestCreate, RequestPatch, SuggestionPrompt,
};
use crate::domain::queries::{AuditQuery, DealQuery, PageQuery, QuoteQuery, RequestQuery};

pub type ApiResult<T> = Result<T, ApiError>;

// Port for every backend call the front end makes. Use cases depend on this
// trait, not on the HTTP facade.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    async fn login(&self, payload: &LoginPayload) -> ApiResult<User>;
    async fn register(&self, payload: &RegisterPayload) -> ApiResult<User>;
    async fn logout(&self) -> ApiResult<StatusMessage>;
    async fn me(&self) -> ApiResult<Me>;
    async fn profile(&self) -> ApiResult<User>;
    async fn update_profile(&self, payload: &ProfileUpdate) -> ApiResult<User>;

    async fn list_requests(&self, query: &RequestQuery) -> ApiResult<Paginated<RequestItem>>;
    async fn get_request(&self, id: Uuid) -> ApiResult<RequestItem>;
    async fn create_request(&self, payload: &RequestCreate) -> ApiResult<RequestItem>;
    async fn patch_request(&self, id: Uuid, payload: &RequestPatch) -> ApiResult<RequestItem>;
    async fn publish_request(&self, id: Uuid) -> ApiResult<RequestItem>;
    async fn shortlist_request(&self, id: Uuid) -> ApiResult<RequestItem>;
    async fn award_request(&self, id: Uuid, winning_quote_id: Uuid) -> ApiResult<AwardOutcome>;

    async fn list_quotes(&self, query: &QuoteQuery) -> ApiResult<Paginated<QuoteItem>>;
    async fn create_quote(&self, payload: &QuoteCreate) -> ApiResult<QuoteItem>;
    async fn patch_quote(&self, id: Uuid, payload: &QuotePatch) -> ApiResult<QuoteItem>;
    async fn withdraw_quote(&self, id: Uuid) -> ApiResult<QuoteItem>;

    async fn list_deals(&self, query: &DealQuery) -> ApiResult<Paginated<DealItem>>;
    async fn get_deal(&self, id: Uuid) -> ApiResult<DealItem>;
    async fn create_invoice(&self, deal_id: Uuid) -> ApiResult<InvoiceItem>;
    async fn mark_paid(&self, deal_id: Uuid) -> ApiResult<DealItem>;
    async fn list_messages(&self, deal_id: Uuid) -> ApiResult<Vec<Message>>;
    async fn post_message(&self, deal_id: Uuid, payload: &MessageCreate) -> ApiResult<Message>;

    async fn list_audit(&self, query: &AuditQuery) -> ApiResult<Paginated<AuditEntry>>;
    async fn list_notifications(&self, page: PageQuery) -> ApiResult<Paginated<Notification>>;
    async fn mark_notification_read(&self, id: Uuid) -> ApiResult<Notification>;
    async fn list_invites(&self) -> ApiResult<Vec<Invite>>;
    async fn create_invite(&self, payload: &InviteCreate) -> ApiResult<Invite>;
    async fn accept_invite(&self, id: Uuid) -> ApiResult<Invite>;
    async fn suggest(&self, prompt: &SuggestionPrompt) -> ApiResult<Suggestion>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default()
    }
}
