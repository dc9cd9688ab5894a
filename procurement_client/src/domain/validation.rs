// Client-side form validation run before anything is submitted.

use crate::domain::entities::{Locale, Role, ThemePreference};
use crate::domain::errors::ValidationError;
use crate::domain::payloads::{
    InviteCreate, LoginPayload, MessageCreate, ProfileUpdate, QuoteCreate, QuotePatch,
    RegisterPayload, RequestCreate, RequestPatch,
};
use chrono::NaiveDate;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";
const MESSAGE_MAX_CHARS: usize = 5000;
const DISPLAY_NAME_MAX_CHARS: usize = 120;
const AVATAR_MAX_CHARS: usize = 1_500_000;

// Raw form input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct NewRequestForm {
    pub title: String,
    pub description: String,
    pub budget_cents: String,
    pub deadline_date: String,
    pub tags: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewQuoteForm {
    pub request_id: String,
    pub amount_cents: String,
    pub timeline_days: String,
    pub terms: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub display_name: String,
    pub avatar_url: String,
    pub theme_preference: Option<ThemePreference>,
    pub locale: Option<Locale>,
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn require_min(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if char_len(value) < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}

fn require_max(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if char_len(value) > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn positive_integer(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::new(field, "must be a whole number"))?;
    if parsed <= 0 {
        return Err(ValidationError::new(field, "must be positive"));
    }
    Ok(parsed)
}

fn email_like(value: &str) -> Result<String, ValidationError> {
    let email = value.trim().to_lowercase();
    require_min("email", &email, 3)?;
    require_max("email", &email, 320)?;
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ValidationError::new("email", "invalid email format"));
    }
    Ok(email)
}

fn password(value: &str) -> Result<String, ValidationError> {
    require_min("password", value, 8)?;
    require_max("password", value, 128)?;
    Ok(value.to_string())
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::new(field, "must be a valid id"))
}

pub fn validate_new_request(form: &NewRequestForm) -> Result<RequestCreate, ValidationError> {
    let title = form.title.trim();
    require_min("title", title, 3)?;
    require_max("title", title, 255)?;

    let description = form.description.trim();
    require_min("description", description, 10)?;

    let budget_cents = positive_integer("budget_cents", &form.budget_cents)?;

    let deadline = form.deadline_date.trim();
    require_min("deadline_date", deadline, 8)?;
    let deadline_date = NaiveDate::parse_from_str(deadline, "%Y-%m-%d")
        .map_err(|_| ValidationError::new("deadline_date", "must be a date (YYYY-MM-DD)"))?;

    Ok(RequestCreate {
        title: title.to_string(),
        description: description.to_string(),
        budget_cents,
        currency: DEFAULT_CURRENCY.to_string(),
        deadline_date,
        tags: parse_tags(&form.tags),
    })
}

pub fn validate_new_quote(form: &NewQuoteForm) -> Result<QuoteCreate, ValidationError> {
    if form.request_id.trim().is_empty() {
        return Err(ValidationError::new("request_id", "select a request"));
    }
    let request_id = parse_uuid("request_id", &form.request_id)?;
    let amount_cents = positive_integer("amount_cents", &form.amount_cents)?;
    let timeline_days = positive_integer("timeline_days", &form.timeline_days)?;
    let terms = form.terms.trim();
    require_min("terms", terms, 5)?;

    Ok(QuoteCreate {
        request_id,
        amount_cents,
        timeline_days,
        terms: terms.to_string(),
    })
}

// Edits carry only the fields being changed; each present field follows the create rules.
pub fn validate_request_patch(patch: &RequestPatch) -> Result<RequestPatch, ValidationError> {
    let mut clean = patch.clone();
    if let Some(title) = &patch.title {
        let title = title.trim();
        require_min("title", title, 3)?;
        require_max("title", title, 255)?;
        clean.title = Some(title.to_string());
    }
    if let Some(description) = &patch.description {
        let description = description.trim();
        require_min("description", description, 10)?;
        clean.description = Some(description.to_string());
    }
    if patch.budget_cents.is_some_and(|cents| cents <= 0) {
        return Err(ValidationError::new("budget_cents", "must be positive"));
    }
    if clean == RequestPatch::default() {
        return Err(ValidationError::new("request", "nothing to update"));
    }
    Ok(clean)
}

pub fn validate_quote_patch(patch: &QuotePatch) -> Result<QuotePatch, ValidationError> {
    let mut clean = patch.clone();
    if patch.amount_cents.is_some_and(|cents| cents <= 0) {
        return Err(ValidationError::new("amount_cents", "must be positive"));
    }
    if patch.timeline_days.is_some_and(|days| days <= 0) {
        return Err(ValidationError::new("timeline_days", "must be positive"));
    }
    if let Some(terms) = &patch.terms {
        let terms = terms.trim();
        require_min("terms", terms, 5)?;
        clean.terms = Some(terms.to_string());
    }
    if clean == QuotePatch::default() {
        return Err(ValidationError::new("quote", "nothing to update"));
    }
    Ok(clean)
}

pub fn validate_message(body: &str) -> Result<MessageCreate, ValidationError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ValidationError::new("body", "must not be empty"));
    }
    require_max("body", body, MESSAGE_MAX_CHARS)?;
    Ok(MessageCreate {
        body: body.to_string(),
    })
}

pub fn validate_profile(form: &ProfileForm) -> Result<ProfileUpdate, ValidationError> {
    let display_name = match form.display_name.trim() {
        "" => None,
        name => {
            require_max("display_name", name, DISPLAY_NAME_MAX_CHARS)?;
            Some(name.to_string())
        }
    };

    let avatar_url = match form.avatar_url.trim() {
        "" => None,
        url => {
            require_max("avatar_url", url, AVATAR_MAX_CHARS)?;
            let supported = ["data:image/", "http://", "https://"]
                .iter()
                .any(|prefix| url.starts_with(prefix));
            if !supported {
                return Err(ValidationError::new(
                    "avatar_url",
                    "must be an image URL or image data URL",
                ));
            }
            Some(url.to_string())
        }
    };

    Ok(ProfileUpdate {
        display_name,
        avatar_url,
        theme_preference: form.theme_preference,
        locale: form.locale,
    })
}

pub fn validate_login(email: &str, secret: &str) -> Result<LoginPayload, ValidationError> {
    Ok(LoginPayload {
        email: email_like(email)?,
        password: password(secret)?,
    })
}

pub fn validate_register(
    email: &str,
    secret: &str,
    org_name: &str,
    role: Role,
) -> Result<RegisterPayload, ValidationError> {
    if !matches!(role, Role::Buyer | Role::Vendor | Role::Viewer) {
        return Err(ValidationError::new(
            "role",
            "must be one of BUYER, VENDOR, VIEWER",
        ));
    }
    let org_name = org_name.trim();
    require_min("org_name", org_name, 2)?;
    require_max("org_name", org_name, 120)?;

    Ok(RegisterPayload {
        email: email_like(email)?,
        password: password(secret)?,
        org_name: org_name.to_string(),
        role,
    })
}

pub fn validate_invite(email: &str, role: Role) -> Result<InviteCreate, ValidationError> {
    Ok(InviteCreate {
        email: email_like(email)?,
        role,
    })
}
