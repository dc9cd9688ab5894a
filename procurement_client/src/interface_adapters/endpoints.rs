use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{
    AuditEntry, AwardOutcome, DealItem, Invite, InvoiceItem, Me, Message, Notification,
    Paginated, QuoteItem, RequestItem, StatusMessage, Suggestion, User,
};
use crate::domain::payloads::{
    AwardPayload, InviteCreate, LoginPayload, MessageCreate, ProfileUpdate, QuoteCreate,
    QuotePatch, RegisterPayload, RequestCreate, RequestPatch, SuggestionPrompt,
};
use crate::domain::queries::{AuditQuery, DealQuery, PageQuery, QuoteQuery, RequestQuery};
use crate::domain::{ApiResult, MarketplaceApi};
use crate::interface_adapters::clients::api::{ApiClient, RequestOptions};
use crate::interface_adapters::protocol::{
    IDEMPOTENCY_KEY_HEADER, audit_pairs, deal_pairs, page_pairs, paths, publish_idempotency_key,
    quote_pairs, request_pairs,
};

// Every endpoint is a one-line mapping onto the facade.
#[async_trait]
impl MarketplaceApi for ApiClient {
    async fn login(&self, payload: &LoginPayload) -> ApiResult<User> {
        let options = RequestOptions::post().json(payload)?;
        self.request(paths::LOGIN, options).await
    }

    async fn register(&self, payload: &RegisterPayload) -> ApiResult<User> {
        let options = RequestOptions::post().json(payload)?;
        self.request(paths::REGISTER, options).await
    }

    async fn logout(&self) -> ApiResult<StatusMessage> {
        self.request(paths::LOGOUT, RequestOptions::post()).await
    }

    async fn me(&self) -> ApiResult<Me> {
        self.request(paths::ME, RequestOptions::get()).await
    }

    async fn profile(&self) -> ApiResult<User> {
        self.request(paths::PROFILE, RequestOptions::get()).await
    }

    async fn update_profile(&self, payload: &ProfileUpdate) -> ApiResult<User> {
        let options = RequestOptions::patch().json(payload)?;
        self.request(paths::PROFILE, options).await
    }

    async fn list_requests(&self, query: &RequestQuery) -> ApiResult<Paginated<RequestItem>> {
        let options = RequestOptions::get().query(request_pairs(query));
        self.request(paths::REQUESTS, options).await
    }

    async fn get_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        self.request(&paths::request(id), RequestOptions::get()).await
    }

    async fn create_request(&self, payload: &RequestCreate) -> ApiResult<RequestItem> {
        let options = RequestOptions::post().json(payload)?;
        self.request(paths::REQUESTS, options).await
    }

    async fn patch_request(&self, id: Uuid, payload: &RequestPatch) -> ApiResult<RequestItem> {
        let options = RequestOptions::patch().json(payload)?;
        self.request(&paths::request(id), options).await
    }

    async fn publish_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        let options =
            RequestOptions::post().header(IDEMPOTENCY_KEY_HEADER, publish_idempotency_key(id));
        self.request(&paths::request_action(id, "publish"), options).await
    }

    async fn shortlist_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        let path = paths::request_action(id, "shortlist");
        self.request(&path, RequestOptions::post()).await
    }

    async fn award_request(&self, id: Uuid, winning_quote_id: Uuid) -> ApiResult<AwardOutcome> {
        let options = RequestOptions::post().json(&AwardPayload { winning_quote_id })?;
        self.request(&paths::request_action(id, "award"), options).await
    }

    async fn list_quotes(&self, query: &QuoteQuery) -> ApiResult<Paginated<QuoteItem>> {
        let options = RequestOptions::get().query(quote_pairs(query));
        self.request(paths::QUOTES, options).await
    }

    async fn create_quote(&self, payload: &QuoteCreate) -> ApiResult<QuoteItem> {
        let options = RequestOptions::post().json(payload)?;
        self.request(paths::QUOTES, options).await
    }

    async fn patch_quote(&self, id: Uuid, payload: &QuotePatch) -> ApiResult<QuoteItem> {
        let options = RequestOptions::patch().json(payload)?;
        self.request(&paths::quote(id), options).await
    }

    async fn withdraw_quote(&self, id: Uuid) -> ApiResult<QuoteItem> {
        let path = paths::quote_withdraw(id);
        self.request(&path, RequestOptions::post()).await
    }

    async fn list_deals(&self, query: &DealQuery) -> ApiResult<Paginated<DealItem>> {
        let options = RequestOptions::get().query(deal_pairs(query));
        self.request(paths::DEALS, options).await
    }

    async fn get_deal(&self, id: Uuid) -> ApiResult<DealItem> {
        self.request(&paths::deal(id), RequestOptions::get()).await
    }

    async fn create_invoice(&self, deal_id: Uuid) -> ApiResult<InvoiceItem> {
        let path = paths::deal_action(deal_id, "create-invoice");
        self.request(&path, RequestOptions::post()).await
    }

    async fn mark_paid(&self, deal_id: Uuid) -> ApiResult<DealItem> {
        let path = paths::deal_action(deal_id, "mark-paid");
        self.request(&path, RequestOptions::post()).await
    }

    async fn list_messages(&self, deal_id: Uuid) -> ApiResult<Vec<Message>> {
        let path = paths::deal_action(deal_id, "messages");
        self.request(&path, RequestOptions::get()).await
    }

    async fn post_message(&self, deal_id: Uuid, payload: &MessageCreate) -> ApiResult<Message> {
        let options = RequestOptions::post().json(payload)?;
        self.request(&paths::deal_action(deal_id, "messages"), options).await
    }

    async fn list_audit(&self, query: &AuditQuery) -> ApiResult<Paginated<AuditEntry>> {
        let options = RequestOptions::get().query(audit_pairs(query));
        self.request(paths::AUDIT, options).await
    }

    async fn list_notifications(&self, page: PageQuery) -> ApiResult<Paginated<Notification>> {
        let options = RequestOptions::get().query(page_pairs(page));
        self.request(paths::NOTIFICATIONS, options).await
    }

    async fn mark_notification_read(&self, id: Uuid) -> ApiResult<Notification> {
        let path = paths::notification_read(id);
        self.request(&path, RequestOptions::post()).await
    }

    async fn list_invites(&self) -> ApiResult<Vec<Invite>> {
        self.request(paths::INVITES, RequestOptions::get()).await
    }

    async fn create_invite(&self, payload: &InviteCreate) -> ApiResult<Invite> {
        let options = RequestOptions::post().json(payload)?;
        self.request(paths::INVITES, options).await
    }

    async fn accept_invite(&self, id: Uuid) -> ApiResult<Invite> {
        let path = paths::invite_accept(id);
        self.request(&path, RequestOptions::post()).await
    }

    async fn suggest(&self, prompt: &SuggestionPrompt) -> ApiResult<Suggestion> {
        let options = RequestOptions::post().json(prompt)?;
        self.request(paths::SUGGEST, options).await
    }
}
