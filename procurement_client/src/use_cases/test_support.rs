use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    AuditEntry, AwardOutcome, DealItem, DealStatus, Invite, InvoiceItem, InvoiceStatus, Locale,
    Me, Message, Notification, Organization, Paginated, QuoteItem, QuoteStatus, RequestItem,
    RequestStatus, Role, StatusMessage, Suggestion, ThemePreference, User,
};
use crate::domain::payloads::{
    InviteCreate, LoginPayload, MessageCreate, ProfileUpdate, QuoteCreate, QuotePatch,
    RegisterPayload, RequestCreate, RequestPatch, SuggestionPrompt,
};
use crate::domain::queries::{AuditQuery, DealQuery, PageQuery, QuoteQuery, RequestQuery};
use crate::domain::{ApiError, ApiResult, Clock, MarketplaceApi};

// Clock shared between a test and the gate it drives.
#[derive(Clone)]
pub(crate) struct SharedClock(Arc<AtomicU64>);

impl SharedClock {
    pub(crate) fn at(millis: u64) -> Self {
        Self(Arc::new(AtomicU64::new(millis)))
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for SharedClock {
    fn now_epoch_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 18, 9, 30, 0)
        .single()
        .expect("fixed timestamp")
}

pub(crate) fn me_for(role: Role) -> Me {
    let org_id = Uuid::new_v4();
    Me {
        user: User {
            id: Uuid::new_v4(),
            org_id,
            email: format!("{}@acme.test", role.as_str().to_lowercase()),
            role,
            display_name: None,
            avatar_url: None,
            theme_preference: ThemePreference::Dark,
            locale: Locale::En,
            created_at: Some(timestamp()),
        },
        organization: Organization {
            id: org_id,
            name: "Acme".to_string(),
        },
    }
}

pub(crate) fn request_fixture(status: RequestStatus) -> RequestItem {
    RequestItem {
        id: Uuid::new_v4(),
        buyer_org_id: Uuid::new_v4(),
        title: "Security audit".to_string(),
        description: "Annual SOC2 readiness review".to_string(),
        budget_cents: 100_000,
        currency: "USD".to_string(),
        deadline_date: NaiveDate::from_ymd_opt(2026, 12, 1).expect("valid date"),
        tags: vec!["security".to_string()],
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub(crate) fn quote_fixture(request_id: Uuid, amount_cents: i64) -> QuoteItem {
    QuoteItem {
        id: Uuid::new_v4(),
        request_id,
        vendor_org_id: Uuid::new_v4(),
        amount_cents,
        timeline_days: 14,
        terms: "Standard implementation support.".to_string(),
        status: QuoteStatus::Submitted,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub(crate) fn deal_fixture(id: Uuid, status: DealStatus) -> DealItem {
    DealItem {
        id,
        buyer_org_id: Uuid::new_v4(),
        vendor_org_id: Uuid::new_v4(),
        request_id: Uuid::new_v4(),
        winning_quote_id: Some(Uuid::new_v4()),
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn page_of<T>(items: Vec<T>, page: PageQuery) -> Paginated<T> {
    let total = items.len() as u64;
    Paginated {
        items,
        page: page.page,
        page_size: page.page_size,
        total,
    }
}

// In-memory port that records every call by name. A configured failure is
// returned from every call; otherwise calls echo their input back as records.
#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<String>>,
    me: Option<Me>,
    failure: Option<ApiError>,
    delay: Option<Duration>,
    requests: Vec<RequestItem>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_me(mut self, me: Me) -> Self {
        self.me = Some(me);
        self
    }

    pub(crate) fn failing_with(mut self, failure: ApiError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_requests(mut self, requests: Vec<RequestItem>) -> Self {
        self.requests = requests;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    async fn record(&self, call: impl Into<String>) -> ApiResult<()> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(call.into());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn find_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        self.requests
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(ApiError::Http {
                status: 404,
                message: "Request not found".to_string(),
            })
    }
}

#[async_trait]
impl MarketplaceApi for FakeApi {
    async fn login(&self, payload: &LoginPayload) -> ApiResult<User> {
        self.record(format!("login:{}", payload.email)).await?;
        Ok(me_for(Role::Buyer).user)
    }

    async fn register(&self, payload: &RegisterPayload) -> ApiResult<User> {
        self.record(format!("register:{}", payload.email)).await?;
        Ok(me_for(payload.role).user)
    }

    async fn logout(&self) -> ApiResult<StatusMessage> {
        self.record("logout").await?;
        Ok(StatusMessage {
            message: "Logged out".to_string(),
        })
    }

    async fn me(&self) -> ApiResult<Me> {
        self.record("me").await?;
        self.me.clone().ok_or(ApiError::Http {
            status: 401,
            message: "Not authenticated".to_string(),
        })
    }

    async fn profile(&self) -> ApiResult<User> {
        self.record("profile").await?;
        Ok(me_for(Role::Buyer).user)
    }

    async fn update_profile(&self, payload: &ProfileUpdate) -> ApiResult<User> {
        self.record("update_profile").await?;
        let mut user = me_for(Role::Buyer).user;
        user.display_name = payload.display_name.clone();
        user.avatar_url = payload.avatar_url.clone();
        Ok(user)
    }

    async fn list_requests(&self, query: &RequestQuery) -> ApiResult<Paginated<RequestItem>> {
        match query.status {
            Some(status) => self.record(format!("list_requests:{status}")).await?,
            None => self.record("list_requests").await?,
        }
        let items = self
            .requests
            .iter()
            .filter(|item| query.status.is_none_or(|status| item.status == status))
            .cloned()
            .collect();
        Ok(page_of(items, query.page))
    }

    async fn get_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        self.record(format!("get_request:{id}")).await?;
        self.find_request(id)
    }

    async fn create_request(&self, payload: &RequestCreate) -> ApiResult<RequestItem> {
        self.record("create_request").await?;
        let mut item = request_fixture(RequestStatus::Draft);
        item.title = payload.title.clone();
        item.description = payload.description.clone();
        item.budget_cents = payload.budget_cents;
        item.deadline_date = payload.deadline_date;
        item.tags = payload.tags.clone();
        Ok(item)
    }

    async fn patch_request(&self, id: Uuid, _payload: &RequestPatch) -> ApiResult<RequestItem> {
        self.record(format!("patch_request:{id}")).await?;
        self.find_request(id)
    }

    async fn publish_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        self.record(format!("publish_request:{id}")).await?;
        let mut item = request_fixture(RequestStatus::Quoting);
        item.id = id;
        Ok(item)
    }

    async fn shortlist_request(&self, id: Uuid) -> ApiResult<RequestItem> {
        self.record(format!("shortlist_request:{id}")).await?;
        let mut item = request_fixture(RequestStatus::Shortlist);
        item.id = id;
        Ok(item)
    }

    async fn award_request(&self, id: Uuid, winning_quote_id: Uuid) -> ApiResult<AwardOutcome> {
        self.record(format!("award_request:{id}:{winning_quote_id}"))
            .await?;
        Ok(AwardOutcome {
            deal_id: Uuid::new_v4(),
        })
    }

    async fn list_quotes(&self, query: &QuoteQuery) -> ApiResult<Paginated<QuoteItem>> {
        self.record("list_quotes").await?;
        Ok(page_of(Vec::new(), query.page))
    }

    async fn create_quote(&self, payload: &QuoteCreate) -> ApiResult<QuoteItem> {
        self.record("create_quote").await?;
        Ok(quote_fixture(payload.request_id, payload.amount_cents))
    }

    async fn patch_quote(&self, id: Uuid, _payload: &QuotePatch) -> ApiResult<QuoteItem> {
        self.record(format!("patch_quote:{id}")).await?;
        Ok(quote_fixture(Uuid::new_v4(), 1))
    }

    async fn withdraw_quote(&self, id: Uuid) -> ApiResult<QuoteItem> {
        self.record(format!("withdraw_quote:{id}")).await?;
        let mut quote = quote_fixture(Uuid::new_v4(), 1);
        quote.id = id;
        quote.status = QuoteStatus::Withdrawn;
        Ok(quote)
    }

    async fn list_deals(&self, query: &DealQuery) -> ApiResult<Paginated<DealItem>> {
        self.record("list_deals").await?;
        Ok(page_of(
            vec![deal_fixture(Uuid::new_v4(), DealStatus::Negotiation)],
            query.page,
        ))
    }

    async fn get_deal(&self, id: Uuid) -> ApiResult<DealItem> {
        self.record(format!("get_deal:{id}")).await?;
        Ok(deal_fixture(id, DealStatus::Negotiation))
    }

    async fn create_invoice(&self, deal_id: Uuid) -> ApiResult<InvoiceItem> {
        self.record(format!("create_invoice:{deal_id}")).await?;
        Ok(InvoiceItem {
            id: Uuid::new_v4(),
            deal_id,
            amount_cents: 120_000,
            currency: "USD".to_string(),
            status: InvoiceStatus::Sent,
            issued_at: Some(timestamp()),
            paid_at: None,
        })
    }

    async fn mark_paid(&self, deal_id: Uuid) -> ApiResult<DealItem> {
        self.record(format!("mark_paid:{deal_id}")).await?;
        Ok(deal_fixture(deal_id, DealStatus::Paid))
    }

    async fn list_messages(&self, deal_id: Uuid) -> ApiResult<Vec<Message>> {
        self.record(format!("list_messages:{deal_id}")).await?;
        Ok(Vec::new())
    }

    async fn post_message(&self, deal_id: Uuid, payload: &MessageCreate) -> ApiResult<Message> {
        self.record(format!("post_message:{deal_id}")).await?;
        Ok(Message {
            id: Uuid::new_v4(),
            deal_id: Some(deal_id),
            sender_user_id: Uuid::new_v4(),
            body: payload.body.clone(),
            created_at: timestamp(),
        })
    }

    async fn list_audit(&self, query: &AuditQuery) -> ApiResult<Paginated<AuditEntry>> {
        self.record("list_audit").await?;
        Ok(page_of(Vec::new(), query.page))
    }

    async fn list_notifications(&self, page: PageQuery) -> ApiResult<Paginated<Notification>> {
        self.record("list_notifications").await?;
        Ok(page_of(Vec::new(), page))
    }

    async fn mark_notification_read(&self, id: Uuid) -> ApiResult<Notification> {
        self.record(format!("mark_notification_read:{id}")).await?;
        Ok(Notification {
            id,
            org_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "quote.submitted".to_string(),
            payload: serde_json::Value::Null,
            read_at: Some(timestamp()),
            created_at: timestamp(),
        })
    }

    async fn list_invites(&self) -> ApiResult<Vec<Invite>> {
        self.record("list_invites").await?;
        Ok(Vec::new())
    }

    async fn create_invite(&self, payload: &InviteCreate) -> ApiResult<Invite> {
        self.record(format!("create_invite:{}", payload.email))
            .await?;
        Ok(Invite {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            email: payload.email.clone(),
            role: payload.role,
            status: "PENDING".to_string(),
            created_by_user_id: Uuid::new_v4(),
            created_at: timestamp(),
        })
    }

    async fn accept_invite(&self, id: Uuid) -> ApiResult<Invite> {
        self.record(format!("accept_invite:{id}")).await?;
        Ok(Invite {
            id,
            org_id: Uuid::new_v4(),
            email: "viewer@acme.test".to_string(),
            role: Role::Viewer,
            status: "ACCEPTED".to_string(),
            created_by_user_id: Uuid::new_v4(),
            created_at: timestamp(),
        })
    }

    async fn suggest(&self, prompt: &SuggestionPrompt) -> ApiResult<Suggestion> {
        self.record("suggest").await?;
        Ok(Suggestion {
            title: format!("Suggestions for {}", prompt.context_type),
            suggestions: vec!["Clarify acceptance criteria".to_string()],
            disclaimer: "Suggestions are generated.".to_string(),
        })
    }
}
