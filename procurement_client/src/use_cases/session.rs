use std::time::Duration;

use crate::domain::access::{self, Cabinet, NavItem, View};
use crate::domain::entities::{Me, Role};
use crate::domain::{AccessDenied, ApiError, Clock, MarketplaceApi};

// After a failed session check, further checks are skipped for this long.
pub const AUTH_BLOCK: Duration = Duration::from_secs(5);
// Upper bound on a session check regardless of the facade timeout.
pub const SESSION_FAILSAFE: Duration = Duration::from_secs(12);
pub const LOGIN_PATH: &str = "/login";

// Authenticated identity handed to every view.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub me: Me,
}

impl Session {
    pub fn role(&self) -> Role {
        self.me.user.role
    }

    pub fn authorize(&self, view: View) -> Result<(), AccessDenied> {
        access::authorize(self.role(), view)
    }

    pub fn cabinet(&self) -> Cabinet {
        access::cabinet_for(self.role())
    }

    pub fn navigation(&self) -> Vec<NavItem> {
        access::navigation_for(self.role())
    }

    pub fn display_name(&self) -> &str {
        self.me
            .user
            .display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.me.user.email)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionFailure {
    Api(ApiError),
    Failsafe(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Ready(Session),
    Blocked { retry_in: Duration },
    Failed(SessionFailure),
}

// Explicit session context: block window and redirect guard live here instead
// of in process-wide flags.
pub struct SessionGate<C> {
    clock: C,
    failsafe: Duration,
    blocked_until_ms: Option<u64>,
    redirected: bool,
}

impl<C> SessionGate<C>
where
    C: Clock,
{
    pub fn new(clock: C) -> Self {
        Self::with_failsafe(clock, SESSION_FAILSAFE)
    }

    pub fn with_failsafe(clock: C, failsafe: Duration) -> Self {
        Self {
            clock,
            failsafe,
            blocked_until_ms: None,
            redirected: false,
        }
    }

    fn remaining_block(&self) -> Option<Duration> {
        let now = self.clock.now_epoch_millis();
        self.blocked_until_ms
            .filter(|until| *until > now)
            .map(|until| Duration::from_millis(until - now))
    }

    #[tracing::instrument(name = "session_check", skip_all)]
    pub async fn check<A>(&mut self, api: &A) -> SessionOutcome
    where
        A: MarketplaceApi + ?Sized,
    {
        if let Some(retry_in) = self.remaining_block() {
            tracing::debug!(retry_in_ms = retry_in.as_millis() as u64, "session check blocked.");
            return SessionOutcome::Blocked { retry_in };
        }

        match tokio::time::timeout(self.failsafe, api.me()).await {
            Ok(Ok(me)) => {
                self.blocked_until_ms = None;
                self.redirected = false;
                tracing::info!(role = %me.user.role, "session established.");
                SessionOutcome::Ready(Session { me })
            }
            Ok(Err(err)) => {
                let block_ms = AUTH_BLOCK.as_millis() as u64;
                self.blocked_until_ms = Some(self.clock.now_epoch_millis() + block_ms);
                tracing::warn!(error = %err, "session check failed.");
                SessionOutcome::Failed(SessionFailure::Api(err))
            }
            Err(_) => {
                tracing::warn!(
                    failsafe_ms = self.failsafe.as_millis() as u64,
                    "session check hit failsafe."
                );
                SessionOutcome::Failed(SessionFailure::Failsafe(self.failsafe))
            }
        }
    }

    // One-shot: only the first caller after a failure gets the login redirect.
    pub fn take_login_redirect(&mut self) -> Option<&'static str> {
        if self.redirected {
            return None;
        }
        self.redirected = true;
        Some(LOGIN_PATH)
    }
}
