//! Startup identity check and the per-view guards built on it.
//!
//! `unknown -> probing -> authenticated | anonymous`. Only one probe is ever
//! in flight; concurrent callers await the same one.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::watch;

use crate::auth::{AuthApi, Identity};
use crate::session::{Credential, Session, SessionEvent, SessionMode, SessionStore};

pub const SIGNIN_ROUTE: &str = "/signin";
pub const HOME_ROUTE: &str = "/home";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationState {
    Unknown,
    Probing,
    Authenticated,
    Anonymous,
}

impl HydrationState {
    pub fn is_settled(&self) -> bool {
        matches!(self, HydrationState::Authenticated | HydrationState::Anonymous)
    }
}

/// What a view should do once hydration has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect(&'static str),
}

/// Access requirement of the route being entered, as the router reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Protected,
    PublicOnly,
    Open,
}

type Probe = Shared<BoxFuture<'static, HydrationState>>;

#[derive(Clone)]
pub struct HydrationController {
    inner: Arc<Inner>,
}

struct Inner {
    auth: AuthApi,
    state: watch::Sender<HydrationState>,
    probe: Mutex<Option<Probe>>,
    identity: Mutex<Option<Identity>>,
}

impl HydrationController {
    pub fn new(auth: AuthApi) -> Self {
        let (state, _) = watch::channel(HydrationState::Unknown);
        Self {
            inner: Arc::new(Inner {
                auth,
                state,
                probe: Mutex::new(None),
                identity: Mutex::new(None),
            }),
        }
    }

    fn store(&self) -> &SessionStore {
        self.inner.auth.client().store()
    }

    /// Current state. Once settled it follows the session store, so a later
    /// sign-in or 401 is reflected without another probe.
    pub fn state(&self) -> HydrationState {
        let phase = *self.inner.state.borrow();
        if !phase.is_settled() {
            return phase;
        }
        if self.store().get().is_authenticated() {
            HydrationState::Authenticated
        } else {
            HydrationState::Anonymous
        }
    }

    /// Identity returned by the settled probe, while the visitor is still
    /// authenticated.
    pub fn identity(&self) -> Option<Identity> {
        if self.state() != HydrationState::Authenticated {
            return None;
        }
        self.inner.identity.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Raw phase transitions (`unknown`, `probing`, then a terminal state).
    pub fn subscribe(&self) -> watch::Receiver<HydrationState> {
        self.inner.state.subscribe()
    }

    /// Settle the visitor's identity, joining a probe already in flight.
    ///
    /// After the first probe settles, later calls return its result without
    /// touching the network.
    pub async fn hydrate(&self) -> HydrationState {
        let probe = {
            let mut slot = self.inner.probe.lock().unwrap_or_else(|p| p.into_inner());
            match slot.as_ref() {
                Some(probe) => probe.clone(),
                None => {
                    let probe = self.start_probe();
                    *slot = Some(probe.clone());
                    probe
                }
            }
        };
        probe.await;
        self.state()
    }

    /// Forget a settled result and probe again. Joins the in-flight probe
    /// instead if one is still running.
    pub async fn rehydrate(&self) -> HydrationState {
        {
            let mut slot = self.inner.probe.lock().unwrap_or_else(|p| p.into_inner());
            if slot.as_ref().map_or(false, |probe| probe.peek().is_some()) {
                *slot = None;
            }
        }
        self.hydrate().await
    }

    fn start_probe(&self) -> Probe {
        let inner = Arc::clone(&self.inner);
        // Own task: the store is settled even if every waiter goes away
        let task = tokio::spawn(async move { inner.probe_identity().await });
        async move {
            task.await.unwrap_or_else(|e| {
                tracing::warn!("Hydration task failed: {}", e);
                HydrationState::Anonymous
            })
        }
        .boxed()
        .shared()
    }

    pub async fn guard(&self, access: RouteAccess) -> RouteDecision {
        match access {
            RouteAccess::Protected => self.require_auth().await,
            RouteAccess::PublicOnly => self.public_only().await,
            RouteAccess::Open => RouteDecision::Render,
        }
    }

    /// Render only for an authenticated visitor, otherwise send them to sign in.
    pub async fn require_auth(&self) -> RouteDecision {
        match self.hydrate().await {
            HydrationState::Authenticated => RouteDecision::Render,
            _ => RouteDecision::Redirect(SIGNIN_ROUTE),
        }
    }

    /// Sign-in/sign-up pages: authenticated visitors go home instead.
    pub async fn public_only(&self) -> RouteDecision {
        match self.hydrate().await {
            HydrationState::Authenticated => RouteDecision::Redirect(HOME_ROUTE),
            _ => RouteDecision::Render,
        }
    }
}

impl Inner {
    async fn probe_identity(&self) -> HydrationState {
        let store = self.auth.client().store();
        let session = store.get();

        if session.mode == SessionMode::Token && !session.is_authenticated() {
            return self.settle(HydrationState::Anonymous);
        }

        self.state.send_replace(HydrationState::Probing);
        match self.auth.me().await {
            Ok(Some(identity)) => {
                let current = store.get();
                let Some(credential) = hydrated_credential(&current) else {
                    tracing::info!("Session cleared during identity probe, treating visitor as anonymous");
                    self.clear(store);
                    return self.settle(HydrationState::Anonymous);
                };
                let tenant_id = identity.tenant_id().or(current.tenant_id);
                if let Err(e) = store.set(Some(credential), tenant_id.clone()) {
                    tracing::warn!("Failed to persist hydrated session: {}", e);
                }
                tracing::info!("Hydrated session (tenant: {:?})", tenant_id);
                *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity);
                self.auth
                    .client()
                    .events()
                    .emit(SessionEvent::Established { tenant_id });
                self.settle(HydrationState::Authenticated)
            }
            Ok(None) => {
                self.clear(store);
                self.settle(HydrationState::Anonymous)
            }
            Err(e) => {
                tracing::info!("Identity probe failed, treating visitor as anonymous: {}", e);
                self.clear(store);
                self.settle(HydrationState::Anonymous)
            }
        }
    }

    fn clear(&self, store: &SessionStore) {
        *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = None;
        if let Err(e) = store.clear() {
            tracing::warn!("Failed to persist cleared session: {}", e);
        }
    }

    fn settle(&self, state: HydrationState) -> HydrationState {
        tracing::debug!("Hydration settled: {:?}", state);
        self.state.send_replace(state);
        state
    }
}

/// Credential to keep after a successful identity probe. Only cookie mode
/// may install the sentinel; in token mode a missing credential means the
/// session was cleared while the probe was in flight.
fn hydrated_credential(session: &Session) -> Option<Credential> {
    match (&session.credential, session.mode) {
        (Some(credential), _) => Some(credential.clone()),
        (None, SessionMode::Cookie) => Some(Credential::CookieSession),
        (None, SessionMode::Token) => None,
    }
}
