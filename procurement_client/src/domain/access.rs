// Single authorization gate for every view and action of the front end.
// Role lists only encode what the backend and the page guards make explicit.

use crate::domain::entities::Role;
use crate::domain::errors::AccessDenied;
use std::fmt;

const ANY_ROLE: &[Role] = &[
    Role::OrgOwner,
    Role::Admin,
    Role::Buyer,
    Role::Vendor,
    Role::Viewer,
];
const BUYER_SIDE: &[Role] = &[Role::OrgOwner, Role::Admin, Role::Buyer];
const VENDOR_SIDE: &[Role] = &[Role::OrgOwner, Role::Admin, Role::Vendor];
const ORG_ADMINS: &[Role] = &[Role::OrgOwner, Role::Admin];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cabinet {
    Buyer,
    Vendor,
    Admin,
    Viewer,
}

impl Cabinet {
    pub fn path(self) -> &'static str {
        match self {
            Cabinet::Buyer => "/cabinet/buyer",
            Cabinet::Vendor => "/cabinet/vendor",
            Cabinet::Admin => "/cabinet/admin",
            Cabinet::Viewer => "/cabinet/viewer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Cabinet(Cabinet),
    Requests,
    NewRequest,
    Quotes,
    SubmitQuote,
    Deals,
    // Request and deal transitions: publish, shortlist, award, invoice, mark paid.
    BuyerActions,
    Audit,
    Settings,
    Notifications,
    Invites,
    ManageInvites,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Dashboard => "dashboard",
            View::Cabinet(cabinet) => cabinet.path(),
            View::Requests => "requests",
            View::NewRequest => "new request",
            View::Quotes => "quotes",
            View::SubmitQuote => "submit quote",
            View::Deals => "deals",
            View::BuyerActions => "buyer actions",
            View::Audit => "audit",
            View::Settings => "settings",
            View::Notifications => "notifications",
            View::Invites => "invites",
            View::ManageInvites => "invite management",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub view: View,
}

pub fn cabinet_for(role: Role) -> Cabinet {
    match role {
        Role::Buyer => Cabinet::Buyer,
        Role::Vendor => Cabinet::Vendor,
        Role::OrgOwner | Role::Admin => Cabinet::Admin,
        Role::Viewer => Cabinet::Viewer,
    }
}

fn allowed_roles(view: View) -> &'static [Role] {
    match view {
        View::Cabinet(Cabinet::Buyer) => &[Role::Buyer],
        View::Cabinet(Cabinet::Vendor) => &[Role::Vendor],
        View::Cabinet(Cabinet::Admin) => ORG_ADMINS,
        View::Cabinet(Cabinet::Viewer) => &[Role::Viewer],
        View::NewRequest | View::BuyerActions => BUYER_SIDE,
        View::SubmitQuote => VENDOR_SIDE,
        View::ManageInvites => ORG_ADMINS,
        View::Dashboard
        | View::Requests
        | View::Quotes
        | View::Deals
        | View::Audit
        | View::Settings
        | View::Notifications
        | View::Invites => ANY_ROLE,
    }
}

pub fn can_open(role: Role, view: View) -> bool {
    allowed_roles(view).contains(&role)
}

pub fn authorize(role: Role, view: View) -> Result<(), AccessDenied> {
    if can_open(role, view) {
        Ok(())
    } else {
        Err(AccessDenied { role, view })
    }
}

pub fn navigation_for(role: Role) -> Vec<NavItem> {
    let cabinet = cabinet_for(role);
    let cabinet_item = NavItem {
        href: cabinet.path(),
        label: "My Cabinet",
        view: View::Cabinet(cabinet),
    };
    let dashboard = NavItem {
        href: "/dashboard",
        label: "Dashboard",
        view: View::Dashboard,
    };
    let requests = NavItem {
        href: "/marketplace/requests",
        label: "Requests",
        view: View::Requests,
    };
    let deals = NavItem {
        href: "/marketplace/deals",
        label: "Deals",
        view: View::Deals,
    };

    match role {
        Role::Viewer => vec![cabinet_item, dashboard, deals, requests],
        _ => vec![cabinet_item, dashboard, requests, deals],
    }
}
