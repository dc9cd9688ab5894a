use crate::domain::queries::{AuditQuery, DealQuery, PageQuery, QuoteQuery, RequestQuery};
use uuid::Uuid;

// Query-string encoding of list filters and the paths of every endpoint.

pub type QueryPairs = Vec<(String, String)>;

fn pair(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

pub fn page_pairs(page: PageQuery) -> QueryPairs {
    vec![pair("page", page.page), pair("page_size", page.page_size)]
}

pub fn request_pairs(query: &RequestQuery) -> QueryPairs {
    let mut pairs = Vec::new();
    if let Some(status) = query.status {
        pairs.push(pair("status", status.as_str()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        pairs.push(pair("search", search));
    }
    pairs.extend(page_pairs(query.page));
    pairs
}

pub fn quote_pairs(query: &QuoteQuery) -> QueryPairs {
    let mut pairs = Vec::new();
    if let Some(request_id) = query.request_id {
        pairs.push(pair("request_id", request_id));
    }
    pairs.extend(page_pairs(query.page));
    pairs
}

pub fn deal_pairs(query: &DealQuery) -> QueryPairs {
    let mut pairs = Vec::new();
    if let Some(status) = query.status {
        pairs.push(pair("status", status.as_str()));
    }
    pairs.extend(page_pairs(query.page));
    pairs
}

pub fn audit_pairs(query: &AuditQuery) -> QueryPairs {
    let mut pairs = Vec::new();
    if let Some(entity) = query.entity.as_deref().filter(|s| !s.is_empty()) {
        pairs.push(pair("entity", entity));
    }
    if let Some(action) = query.action.as_deref().filter(|s| !s.is_empty()) {
        pairs.push(pair("action", action));
    }
    pairs.extend(page_pairs(query.page));
    pairs
}

pub mod paths {
    use super::Uuid;

    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const LOGOUT: &str = "/auth/logout";
    pub const ME: &str = "/auth/me";
    pub const PROFILE: &str = "/auth/profile";
    pub const REQUESTS: &str = "/requests";
    pub const QUOTES: &str = "/quotes";
    pub const DEALS: &str = "/deals";
    pub const AUDIT: &str = "/audit";
    pub const NOTIFICATIONS: &str = "/notifications";
    pub const INVITES: &str = "/invites";
    pub const SUGGEST: &str = "/helper/suggest";

    pub fn request(id: Uuid) -> String {
        format!("{REQUESTS}/{id}")
    }

    pub fn request_action(id: Uuid, action: &str) -> String {
        format!("{REQUESTS}/{id}/{action}")
    }

    pub fn quote(id: Uuid) -> String {
        format!("{QUOTES}/{id}")
    }

    pub fn quote_withdraw(id: Uuid) -> String {
        format!("{QUOTES}/{id}/withdraw")
    }

    pub fn deal(id: Uuid) -> String {
        format!("{DEALS}/{id}")
    }

    pub fn deal_action(id: Uuid, action: &str) -> String {
        format!("{DEALS}/{id}/{action}")
    }

    pub fn notification_read(id: Uuid) -> String {
        format!("{NOTIFICATIONS}/{id}/read")
    }

    pub fn invite_accept(id: Uuid) -> String {
        format!("{INVITES}/{id}/accept")
    }
}

// Publish is retried by users; the key lets the backend collapse duplicates.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

pub fn publish_idempotency_key(request_id: Uuid) -> String {
    format!("pub-{request_id}")
}
