use uuid::Uuid;

use crate::domain::access::View;
use crate::domain::entities::{
    AuditEntry, AwardOutcome, DealItem, Invite, InvoiceItem, Message, Notification, Paginated,
    QuoteItem, RequestAction, RequestItem, RequestStatus, Role, User,
};
use crate::domain::payloads::{QuotePatch, RequestPatch};
use crate::domain::queries::{AuditQuery, DealQuery, PageQuery, RequestQuery};
use crate::domain::validation::{
    self, NewQuoteForm, NewRequestForm, ProfileForm, validate_invite, validate_message,
    validate_new_quote, validate_new_request, validate_profile, validate_quote_patch,
    validate_request_patch,
};
use crate::domain::{AccessDenied, ApiError, MarketplaceApi, ValidationError};
use crate::use_cases::session::Session;

pub const REQUEST_CREATED: &str = "Request created";
pub const QUOTE_SUBMITTED: &str = "Quote submitted";
pub const QUOTE_WITHDRAWN: &str = "Quote withdrawn";
pub const REQUEST_UPDATED: &str = "Request updated";
pub const QUOTE_UPDATED: &str = "Quote updated";
pub const REQUEST_PUBLISHED: &str = "Request published";
pub const REQUEST_SHORTLISTED: &str = "Request shortlisted";
pub const DEAL_CREATED: &str = "Deal created";
pub const INVOICE_CREATED: &str = "Invoice created";
pub const MARKED_PAID: &str = "Marked as paid";
pub const MESSAGE_SENT: &str = "Message sent";
pub const PROFILE_UPDATED: &str = "Profile updated";
pub const INVITE_SENT: &str = "Invite sent";
pub const INVITE_ACCEPTED: &str = "Invite accepted";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Access(#[from] AccessDenied),
    #[error("cannot {action:?} a request in status {status}")]
    Unavailable {
        action: RequestAction,
        status: RequestStatus,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

// User-facing outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn from_result<T>(result: &Result<T, ActionError>, success: &str) -> Self {
        match result {
            Ok(_) => Notice::Success(success.to_string()),
            Err(err) => Notice::Failure(err.user_message()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Failure(text) => text,
        }
    }
}

// One dashboard panel; each loads and fails on its own.
pub type Panel<T> = Result<Paginated<T>, String>;

#[derive(Debug)]
pub struct Dashboard {
    pub requests: Panel<RequestItem>,
    pub deals: Panel<DealItem>,
    pub audit: Panel<AuditEntry>,
    pub notifications: Panel<Notification>,
}

const DASHBOARD_PAGE: PageQuery = PageQuery {
    page: 1,
    page_size: 5,
};

fn panel<T>(result: Result<Paginated<T>, ApiError>) -> Panel<T> {
    result.map_err(|err| err.user_message())
}

// Actions available to an authenticated session. Every action passes the
// authorization gate and form validation before any call goes out.
pub struct Workspace<A> {
    pub api: A,
    pub session: Session,
}

impl<A> Workspace<A>
where
    A: MarketplaceApi,
{
    pub fn new(api: A, session: Session) -> Self {
        Self { api, session }
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    fn require(&self, view: View) -> Result<(), ActionError> {
        self.session.authorize(view).map_err(|denied| {
            tracing::warn!(role = %denied.role, view = %denied.view, "access denied.");
            ActionError::from(denied)
        })
    }

    fn require_status(item: &RequestItem, action: RequestAction) -> Result<(), ActionError> {
        if item.status.allows(action) {
            Ok(())
        } else {
            Err(ActionError::Unavailable {
                action,
                status: item.status,
            })
        }
    }

    // Panels load concurrently and independently.
    pub async fn dashboard(&self) -> Dashboard {
        let requests = RequestQuery {
            page: DASHBOARD_PAGE,
            ..Default::default()
        };
        let deals = DealQuery {
            page: DASHBOARD_PAGE,
            ..Default::default()
        };
        let audit = AuditQuery {
            page: PageQuery::new(1, 8),
            ..Default::default()
        };

        let (requests, deals, audit, notifications) = tokio::join!(
            self.api.list_requests(&requests),
            self.api.list_deals(&deals),
            self.api.list_audit(&audit),
            self.api.list_notifications(DASHBOARD_PAGE),
        );

        Dashboard {
            requests: panel(requests),
            deals: panel(deals),
            audit: panel(audit),
            notifications: panel(notifications),
        }
    }

    pub async fn browse_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<Paginated<RequestItem>, ActionError> {
        self.require(View::Requests)?;
        Ok(self.api.list_requests(query).await?)
    }

    // Vendors quote against requests that are open for quoting.
    pub async fn open_for_quoting(&self) -> Result<Paginated<RequestItem>, ActionError> {
        self.require(View::SubmitQuote)?;
        let query = RequestQuery {
            status: Some(RequestStatus::Quoting),
            ..Default::default()
        };
        Ok(self.api.list_requests(&query).await?)
    }

    #[tracing::instrument(name = "create_request", skip_all)]
    pub async fn create_request(&self, form: &NewRequestForm) -> Result<RequestItem, ActionError> {
        self.require(View::NewRequest)?;
        let payload = validate_new_request(form)?;
        let created = self.api.create_request(&payload).await?;
        tracing::info!(request_id = %created.id, "request created.");
        Ok(created)
    }

    #[tracing::instrument(name = "submit_quote", skip_all)]
    pub async fn submit_quote(&self, form: &NewQuoteForm) -> Result<QuoteItem, ActionError> {
        self.require(View::SubmitQuote)?;
        let payload = validate_new_quote(form)?;
        let quote = self.api.create_quote(&payload).await?;
        tracing::info!(quote_id = %quote.id, request_id = %quote.request_id, "quote submitted.");
        Ok(quote)
    }

    pub async fn edit_request(
        &self,
        request_id: Uuid,
        patch: &RequestPatch,
    ) -> Result<RequestItem, ActionError> {
        self.require(View::NewRequest)?;
        let patch = validate_request_patch(patch)?;
        Ok(self.api.patch_request(request_id, &patch).await?)
    }

    pub async fn edit_quote(
        &self,
        quote_id: Uuid,
        patch: &QuotePatch,
    ) -> Result<QuoteItem, ActionError> {
        self.require(View::SubmitQuote)?;
        let patch = validate_quote_patch(patch)?;
        Ok(self.api.patch_quote(quote_id, &patch).await?)
    }

    pub async fn withdraw_quote(&self, quote_id: Uuid) -> Result<QuoteItem, ActionError> {
        self.require(View::SubmitQuote)?;
        Ok(self.api.withdraw_quote(quote_id).await?)
    }

    #[tracing::instrument(name = "publish_request", skip_all, fields(request_id = %item.id))]
    pub async fn publish_request(&self, item: &RequestItem) -> Result<RequestItem, ActionError> {
        self.require(View::BuyerActions)?;
        Self::require_status(item, RequestAction::Publish)?;
        Ok(self.api.publish_request(item.id).await?)
    }

    #[tracing::instrument(name = "shortlist_request", skip_all, fields(request_id = %item.id))]
    pub async fn shortlist_request(&self, item: &RequestItem) -> Result<RequestItem, ActionError> {
        self.require(View::BuyerActions)?;
        Self::require_status(item, RequestAction::Shortlist)?;
        Ok(self.api.shortlist_request(item.id).await?)
    }

    #[tracing::instrument(name = "award_request", skip_all, fields(request_id = %item.id))]
    pub async fn award_request(
        &self,
        item: &RequestItem,
        winning_quote_id: Uuid,
    ) -> Result<AwardOutcome, ActionError> {
        self.require(View::BuyerActions)?;
        Self::require_status(item, RequestAction::Award)?;
        let outcome = self.api.award_request(item.id, winning_quote_id).await?;
        tracing::info!(deal_id = %outcome.deal_id, "deal created.");
        Ok(outcome)
    }

    pub async fn create_invoice(&self, deal_id: Uuid) -> Result<InvoiceItem, ActionError> {
        self.require(View::BuyerActions)?;
        Ok(self.api.create_invoice(deal_id).await?)
    }

    pub async fn mark_paid(&self, deal_id: Uuid) -> Result<DealItem, ActionError> {
        self.require(View::BuyerActions)?;
        Ok(self.api.mark_paid(deal_id).await?)
    }

    pub async fn send_message(&self, deal_id: Uuid, body: &str) -> Result<Message, ActionError> {
        self.require(View::Deals)?;
        let payload = validate_message(body)?;
        Ok(self.api.post_message(deal_id, &payload).await?)
    }

    pub async fn update_profile(&self, form: &ProfileForm) -> Result<User, ActionError> {
        self.require(View::Settings)?;
        let payload = validate_profile(form)?;
        Ok(self.api.update_profile(&payload).await?)
    }

    pub async fn invite(&self, email: &str, role: Role) -> Result<Invite, ActionError> {
        self.require(View::ManageInvites)?;
        let payload = validate_invite(email, role)?;
        Ok(self.api.create_invite(&payload).await?)
    }

    pub async fn accept_invite(&self, raw_id: &str) -> Result<Invite, ActionError> {
        self.require(View::Invites)?;
        let id = validation::parse_uuid("invite_id", raw_id)?;
        Ok(self.api.accept_invite(id).await?)
    }
}
