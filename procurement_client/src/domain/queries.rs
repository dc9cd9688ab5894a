use crate::domain::entities::{DealStatus, RequestStatus};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub search: Option<String>,
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteQuery {
    pub request_id: Option<Uuid>,
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealQuery {
    pub status: Option<DealStatus>,
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditQuery {
    pub entity: Option<String>,
    pub action: Option<String>,
    pub page: PageQuery,
}
