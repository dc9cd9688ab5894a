// Terminal front end: one command per page action of the marketplace.

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::process::ExitCode;
use uuid::Uuid;

use crate::domain::access::View;
use crate::domain::entities::{
    DealStatus, Locale, RequestItem, RequestStatus, Role, ThemePreference,
};
use crate::domain::payloads::{QuotePatch, RequestPatch, SuggestionPrompt};
use crate::domain::queries::{AuditQuery, DealQuery, PageQuery, QuoteQuery, RequestQuery};
use crate::domain::validation::{
    self, NewQuoteForm, NewRequestForm, ProfileForm, validate_login, validate_register,
};
use crate::domain::{ApiError, MarketplaceApi, SystemClock};
use crate::frameworks::config::{self, ClientConfig};
use crate::frameworks::runtime;
use crate::interface_adapters::clients::ApiClient;
use crate::use_cases::actions::{self, ActionError, Notice, Panel, Workspace};
use crate::use_cases::session::{LOGIN_PATH, SessionFailure, SessionGate, SessionOutcome};

#[derive(Parser, Debug)]
#[command(name = "procurement", version, about = "Procurement marketplace client")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(long, global = true, help = "Override the API base URL")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print the authenticated user.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PROCUREMENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an organization account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PROCUREMENT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        org_name: String,
        #[arg(long, value_parser = parse_wire::<Role>)]
        role: Role,
    },
    /// End the server-side session.
    Logout,
    /// Show the session identity and cabinet.
    Whoami,
    /// Show the navigation for the session role.
    Nav,
    /// Load every dashboard panel.
    Dashboard,
    #[command(subcommand)]
    Requests(RequestsCommand),
    #[command(subcommand)]
    Quotes(QuotesCommand),
    #[command(subcommand)]
    Deals(DealsCommand),
    /// List the organization audit log.
    Audit {
        #[arg(long)]
        entity: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    #[command(subcommand)]
    Invites(InvitesCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Ask the helper for suggestions about a request or deal.
    Suggest {
        #[arg(long, default_value = "request")]
        context_type: String,
        #[arg(long)]
        context_id: String,
        prompt: String,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    page_size: u32,
}

impl From<PageArgs> for PageQuery {
    fn from(args: PageArgs) -> Self {
        PageQuery::new(args.page, args.page_size)
    }
}

#[derive(Subcommand, Debug)]
enum RequestsCommand {
    List {
        #[arg(long, value_parser = parse_wire::<RequestStatus>)]
        status: Option<RequestStatus>,
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        budget_cents: String,
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Change fields of a request; omitted flags are left as they are.
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        budget_cents: Option<i64>,
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,
        #[arg(long)]
        tags: Option<String>,
    },
    Publish {
        id: Uuid,
    },
    Shortlist {
        id: Uuid,
    },
    Award {
        id: Uuid,
        #[arg(long)]
        quote: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum QuotesCommand {
    List {
        #[arg(long)]
        request_id: Option<Uuid>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Requests currently open for quoting.
    Open,
    Submit {
        #[arg(long)]
        request_id: String,
        #[arg(long)]
        amount_cents: String,
        #[arg(long)]
        timeline_days: String,
        #[arg(long)]
        terms: String,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        amount_cents: Option<i64>,
        #[arg(long)]
        timeline_days: Option<i64>,
        #[arg(long)]
        terms: Option<String>,
    },
    Withdraw {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum DealsCommand {
    List {
        #[arg(long, value_parser = parse_wire::<DealStatus>)]
        status: Option<DealStatus>,
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: Uuid,
    },
    Invoice {
        id: Uuid,
    },
    MarkPaid {
        id: Uuid,
    },
    Messages {
        id: Uuid,
    },
    Send {
        id: Uuid,
        body: String,
    },
}

#[derive(Subcommand, Debug)]
enum NotificationsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Read {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum InvitesCommand {
    List,
    Create {
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_wire::<Role>, default_value = "VIEWER")]
        role: Role,
    },
    Accept {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long, default_value = "")]
        display_name: String,
        #[arg(long, default_value = "")]
        avatar_url: String,
        #[arg(long, value_parser = parse_preference::<ThemePreference>)]
        theme: Option<ThemePreference>,
        #[arg(long, value_parser = parse_preference::<Locale>)]
        locale: Option<Locale>,
    },
}

// Accepts wire spellings case-insensitively, e.g. `quoting` for QUOTING.
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let value = Value::String(raw.trim().to_uppercase().replace('-', "_"));
    serde_json::from_value(value).map_err(|_| format!("unknown value `{raw}`"))
}

// Profile preferences travel lowercase, e.g. `Light` for light.
fn parse_preference<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let value = Value::String(raw.trim().to_lowercase());
    serde_json::from_value(value).map_err(|_| format!("unknown value `{raw}`"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("`{raw}` is not YYYY-MM-DD"))
}

fn api_failure(err: ApiError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(
        &self,
        value: &T,
        human: impl FnOnce(&T) -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", human(value));
        }
        Ok(())
    }

    fn notice<T: Serialize>(
        &self,
        result: Result<T, ActionError>,
        success: &str,
    ) -> anyhow::Result<()> {
        let notice = Notice::from_result(&result, success);
        match (result, notice) {
            (Ok(value), Notice::Success(text)) => self.emit(&value, |_| text),
            (_, notice) => bail!("{}", notice.text()),
        }
    }
}

fn lines<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

fn panel_json<T: Serialize>(panel: &Panel<T>) -> Value {
    match panel {
        Ok(page) => serde_json::json!({ "items": page.items, "total": page.total }),
        Err(message) => serde_json::json!({ "error": message }),
    }
}

fn panel_summary<T>(panel: &Panel<T>) -> String {
    match panel {
        Ok(page) => page.total.to_string(),
        Err(message) => format!("failed: {message}"),
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    runtime::init_runtime();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed.");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config: ClientConfig = config::load()?.with_base_url(cli.base_url)?;
    let api = ApiClient::new(&config.api_base_url, config.api_timeout)
        .context("failed to initialize api client")?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        api_timeout_ms = config.api_timeout.as_millis() as u64,
        "api client configured."
    );
    let out = Output { json: cli.json };

    // Commands that do not need an established session.
    match cli.command {
        Command::Login { email, password } => {
            let payload = validate_login(&email, &password)?;
            let user = api.login(&payload).await.map_err(api_failure)?;
            out.emit(&user, |u| format!("signed in as {} ({})", u.email, u.role))
        }
        Command::Register {
            email,
            password,
            org_name,
            role,
        } => {
            let payload = validate_register(&email, &password, &org_name, role)?;
            let user = api.register(&payload).await.map_err(api_failure)?;
            out.emit(&user, |u| format!("registered {} ({})", u.email, u.role))
        }
        command => {
            if let Some(credentials) = &config.credentials {
                let payload = validate_login(&credentials.email, &credentials.password)?;
                api.login(&payload)
                    .await
                    .map_err(|e| anyhow::anyhow!("sign-in failed: {}", e.user_message()))?;
            }
            dispatch(api, command, &out).await
        }
    }
}

async fn dispatch(api: ApiClient, command: Command, out: &Output) -> anyhow::Result<()> {
    let mut gate = SessionGate::new(SystemClock);
    let session = match gate.check(&api).await {
        SessionOutcome::Ready(session) => session,
        SessionOutcome::Blocked { retry_in } => {
            bail!("session check blocked, retry in {} ms", retry_in.as_millis())
        }
        SessionOutcome::Failed(failure) => {
            let reason = match failure {
                SessionFailure::Api(err) => err.user_message(),
                SessionFailure::Failsafe(_) => "session check timed out".to_string(),
            };
            let login = gate.take_login_redirect().unwrap_or(LOGIN_PATH);
            bail!("{reason}; sign in again ({login})")
        }
    };
    let ws = Workspace::new(api, session);

    match command {
        Command::Logout => {
            let message = ws.api.logout().await.map_err(api_failure)?;
            out.emit(&message, |m| m.message.clone())
        }
        Command::Whoami => {
            let session = &ws.session;
            out.emit(&session.me, |me| {
                format!(
                    "{} <{}> {} @ {}\ncabinet: {}",
                    session.display_name(),
                    me.user.email,
                    me.user.role,
                    me.organization.name,
                    session.cabinet().path()
                )
            })
        }
        Command::Nav => {
            let nav: Vec<_> = ws
                .session
                .navigation()
                .into_iter()
                .map(|item| serde_json::json!({ "href": item.href, "label": item.label }))
                .collect();
            out.emit(&nav, |items| {
                lines(items, |item| {
                    let label = item["label"].as_str().unwrap_or_default();
                    let href = item["href"].as_str().unwrap_or_default();
                    format!("{label:<12} {href}")
                })
            })
        }
        Command::Dashboard => {
            let dashboard = ws.dashboard().await;
            let summary = serde_json::json!({
                "requests": panel_json(&dashboard.requests),
                "deals": panel_json(&dashboard.deals),
                "audit": panel_json(&dashboard.audit),
                "notifications": panel_json(&dashboard.notifications),
            });
            out.emit(&summary, |_| {
                format!(
                    "requests: {}\ndeals: {}\naudit: {}\nnotifications: {}",
                    panel_summary(&dashboard.requests),
                    panel_summary(&dashboard.deals),
                    panel_summary(&dashboard.audit),
                    panel_summary(&dashboard.notifications),
                )
            })
        }
        Command::Requests(command) => requests(&ws, command, out).await,
        Command::Quotes(command) => quotes(&ws, command, out).await,
        Command::Deals(command) => deals(&ws, command, out).await,
        Command::Audit {
            entity,
            action,
            page,
        } => {
            ws.session.authorize(View::Audit)?;
            let query = AuditQuery {
                entity,
                action,
                page: page.into(),
            };
            let entries = ws.api.list_audit(&query).await.map_err(api_failure)?;
            out.emit(&entries, |p| {
                lines(&p.items, |e| {
                    let at = e.created_at.to_rfc3339();
                    format!("{at} {} {} {}", e.action, e.entity, e.entity_id)
                })
            })
        }
        Command::Notifications(command) => match command {
            NotificationsCommand::List { page } => {
                let items = ws
                    .api
                    .list_notifications(page.into())
                    .await
                    .map_err(api_failure)?;
                out.emit(&items, |p| {
                    lines(&p.items, |n| {
                        let marker = if n.read_at.is_some() { " " } else { "*" };
                        format!("{marker} {} {} {}", n.id, n.kind, n.created_at.to_rfc3339())
                    })
                })
            }
            NotificationsCommand::Read { id } => {
                let item = ws
                    .api
                    .mark_notification_read(id)
                    .await
                    .map_err(api_failure)?;
                out.emit(&item, |n| format!("notification {} read", n.id))
            }
        },
        Command::Invites(command) => match command {
            InvitesCommand::List => {
                let invites = ws.api.list_invites().await.map_err(api_failure)?;
                out.emit(&invites, |items| {
                    lines(items, |i| format!("{} {} {} {}", i.id, i.email, i.role, i.status))
                })
            }
            InvitesCommand::Create { email, role } => {
                out.notice(ws.invite(&email, role).await, actions::INVITE_SENT)
            }
            InvitesCommand::Accept { id } => {
                out.notice(ws.accept_invite(&id).await, actions::INVITE_ACCEPTED)
            }
        },
        Command::Profile(command) => match command {
            ProfileCommand::Show => {
                let user = ws.api.profile().await.map_err(api_failure)?;
                out.emit(&user, |u| {
                    format!(
                        "{} {} {}",
                        u.email,
                        u.role,
                        u.display_name.as_deref().unwrap_or("-")
                    )
                })
            }
            ProfileCommand::Update {
                display_name,
                avatar_url,
                theme,
                locale,
            } => {
                let form = ProfileForm {
                    display_name,
                    avatar_url,
                    theme_preference: theme,
                    locale,
                };
                out.notice(ws.update_profile(&form).await, actions::PROFILE_UPDATED)
            }
        },
        Command::Suggest {
            context_type,
            context_id,
            prompt,
        } => {
            let prompt = SuggestionPrompt {
                context_type,
                context_id,
                prompt,
            };
            let suggestion = ws.api.suggest(&prompt).await.map_err(api_failure)?;
            out.emit(&suggestion, |s| {
                format!(
                    "{}\n{}\n{}",
                    s.title,
                    lines(&s.suggestions, |line| format!("- {line}")),
                    s.disclaimer
                )
            })
        }
        Command::Login { .. } | Command::Register { .. } => {
            bail!("sign-in commands run without a session")
        }
    }
}

fn request_line(r: &RequestItem) -> String {
    format!(
        "{} [{}] {} {} due {}",
        r.id,
        r.status,
        r.title,
        money(r.budget_cents),
        r.deadline_date
    )
}

async fn requests(
    ws: &Workspace<ApiClient>,
    command: RequestsCommand,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        RequestsCommand::List {
            status,
            search,
            page,
        } => {
            let query = RequestQuery {
                status,
                search,
                page: page.into(),
            };
            let page = ws
                .browse_requests(&query)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            out.emit(&page, |p| lines(&p.items, request_line))
        }
        RequestsCommand::Show { id } => {
            let item = ws.api.get_request(id).await.map_err(api_failure)?;
            out.emit(&item, |r| format!("{}\n{}", request_line(r), r.description))
        }
        RequestsCommand::Create {
            title,
            description,
            budget_cents,
            deadline,
            tags,
        } => {
            let form = NewRequestForm {
                title,
                description,
                budget_cents,
                deadline_date: deadline,
                tags,
            };
            out.notice(ws.create_request(&form).await, actions::REQUEST_CREATED)
        }
        RequestsCommand::Edit {
            id,
            title,
            description,
            budget_cents,
            deadline,
            tags,
        } => {
            let patch = RequestPatch {
                title,
                description,
                budget_cents,
                deadline_date: deadline,
                tags: tags.as_deref().map(validation::parse_tags),
            };
            out.notice(ws.edit_request(id, &patch).await, actions::REQUEST_UPDATED)
        }
        RequestsCommand::Publish { id } => {
            let item = ws.api.get_request(id).await.map_err(api_failure)?;
            out.notice(ws.publish_request(&item).await, actions::REQUEST_PUBLISHED)
        }
        RequestsCommand::Shortlist { id } => {
            let item = ws.api.get_request(id).await.map_err(api_failure)?;
            out.notice(ws.shortlist_request(&item).await, actions::REQUEST_SHORTLISTED)
        }
        RequestsCommand::Award { id, quote } => {
            let item = ws.api.get_request(id).await.map_err(api_failure)?;
            out.notice(ws.award_request(&item, quote).await, actions::DEAL_CREATED)
        }
    }
}

async fn quotes(
    ws: &Workspace<ApiClient>,
    command: QuotesCommand,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        QuotesCommand::List { request_id, page } => {
            ws.session.authorize(View::Quotes)?;
            let query = QuoteQuery {
                request_id,
                page: page.into(),
            };
            let page = ws.api.list_quotes(&query).await.map_err(api_failure)?;
            out.emit(&page, |p| {
                lines(&p.items, |q| {
                    format!(
                        "{} [{}] {} in {} days for {}",
                        q.id,
                        q.status,
                        money(q.amount_cents),
                        q.timeline_days,
                        q.request_id
                    )
                })
            })
        }
        QuotesCommand::Open => {
            let page = ws
                .open_for_quoting()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            out.emit(&page, |p| lines(&p.items, |r| format!("{} {}", r.id, r.title)))
        }
        QuotesCommand::Submit {
            request_id,
            amount_cents,
            timeline_days,
            terms,
        } => {
            let form = NewQuoteForm {
                request_id,
                amount_cents,
                timeline_days,
                terms,
            };
            out.notice(ws.submit_quote(&form).await, actions::QUOTE_SUBMITTED)
        }
        QuotesCommand::Edit {
            id,
            amount_cents,
            timeline_days,
            terms,
        } => {
            let patch = QuotePatch {
                amount_cents,
                timeline_days,
                terms,
            };
            out.notice(ws.edit_quote(id, &patch).await, actions::QUOTE_UPDATED)
        }
        QuotesCommand::Withdraw { id } => {
            out.notice(ws.withdraw_quote(id).await, actions::QUOTE_WITHDRAWN)
        }
    }
}

async fn deals(
    ws: &Workspace<ApiClient>,
    command: DealsCommand,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        DealsCommand::List { status, page } => {
            ws.session.authorize(View::Deals)?;
            let query = DealQuery {
                status,
                page: page.into(),
            };
            let page = ws.api.list_deals(&query).await.map_err(api_failure)?;
            out.emit(&page, |p| {
                lines(&p.items, |d| {
                    format!("{} [{}] request {}", d.id, d.status.as_str(), d.request_id)
                })
            })
        }
        DealsCommand::Show { id } => {
            let deal = ws.api.get_deal(id).await.map_err(api_failure)?;
            out.emit(&deal, |d| {
                format!(
                    "{} [{}]\nbuyer {} vendor {}",
                    d.id,
                    d.status.as_str(),
                    d.buyer_org_id,
                    d.vendor_org_id
                )
            })
        }
        DealsCommand::Invoice { id } => {
            out.notice(ws.create_invoice(id).await, actions::INVOICE_CREATED)
        }
        DealsCommand::MarkPaid { id } => out.notice(ws.mark_paid(id).await, actions::MARKED_PAID),
        DealsCommand::Messages { id } => {
            let messages = ws.api.list_messages(id).await.map_err(api_failure)?;
            out.emit(&messages, |items| {
                lines(items, |m| {
                    let at = m.created_at.to_rfc3339();
                    format!("{at} {}: {}", m.sender_user_id, m.body)
                })
            })
        }
        DealsCommand::Send { id, body } => {
            out.notice(ws.send_message(id, &body).await, actions::MESSAGE_SENT)
        }
    }
}
