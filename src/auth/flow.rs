use super::Authorizer;
use super::callback::{CallbackState, callback_router};
use crate::config::OauthResolvedConfig;
use crate::credential::{Credential, CredentialStore};
use crate::error::{OauthError, TubeportError};
use async_trait::async_trait;
use axum::Router;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use url::Url;

/// Lifecycle of one handshake attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingUserAction,
    AwaitingCallback,
    Exchanging,
    Completed,
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingUserAction => "awaiting_user_action",
            FlowState::AwaitingCallback => "awaiting_callback",
            FlowState::Exchanging => "exchanging",
            FlowState::Completed => "completed",
            FlowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Flow state shared between the controller and its callback handler.
#[derive(Clone)]
pub(crate) struct SharedFlowState(Arc<Mutex<FlowState>>);

impl SharedFlowState {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(FlowState::Idle)))
    }

    pub(crate) fn get(&self) -> FlowState {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set(&self, next: FlowState) {
        let mut guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        let previous = *guard;
        *guard = next;
        debug!(from = %previous, to = %next, "authorization flow transition");
    }
}

/// What to do with a freshly obtained credential once the listener is down.
#[async_trait]
pub trait FlowContinuation: Send + Sync {
    type Output: Send;

    async fn on_authorized(&self, credential: &Credential) -> Result<Self::Output, TubeportError>;
}

/// Token-only mode: stop after the credential is stored.
pub struct NoopContinuation;

#[async_trait]
impl FlowContinuation for NoopContinuation {
    type Output = ();

    async fn on_authorized(&self, _credential: &Credential) -> Result<(), TubeportError> {
        Ok(())
    }
}

/// The started half of a flow: the URL for the operator and the router that completes it.
pub struct CallbackSession {
    pub authorization_url: Url,
    pub router: Router,
    completion: oneshot::Receiver<Result<Credential, OauthError>>,
}

impl CallbackSession {
    /// Wait for the callback handler to finish (successfully or not).
    pub async fn wait(self) -> Result<Credential, OauthError> {
        self.completion.await.unwrap_or_else(|_| {
            Err(OauthError::Listener(
                "callback handler dropped the completion signal".to_string(),
            ))
        })
    }
}

/// Drives the loopback redirect handshake and hands the credential to a continuation.
///
/// Authorizer, store and config are owned by the flow and shared with its callback handler;
/// nothing is process-global.
pub struct AuthorizationFlow {
    authorizer: Arc<dyn Authorizer>,
    store: CredentialStore,
    config: OauthResolvedConfig,
    state: SharedFlowState,
}

impl AuthorizationFlow {
    pub fn new(
        authorizer: Arc<dyn Authorizer>,
        store: CredentialStore,
        config: OauthResolvedConfig,
    ) -> Self {
        Self {
            authorizer,
            store,
            config,
            state: SharedFlowState::new(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state.get()
    }

    pub(crate) fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }

    /// `Idle -> AwaitingUserAction`: generate the consent URL and the callback router.
    pub fn begin(&self) -> CallbackSession {
        let pending = self.authorizer.authorize();
        let authorization_url = pending.url.clone();
        let (completion_tx, completion_rx) = oneshot::channel();

        let callback_state = CallbackState::new(
            self.authorizer.clone(),
            self.store.clone(),
            self.state.clone(),
            pending,
            completion_tx,
        );
        self.state.set(FlowState::AwaitingUserAction);

        CallbackSession {
            authorization_url,
            router: callback_router(&self.config.callback_path, callback_state),
            completion: completion_rx,
        }
    }

    /// Bind the configured loopback address and run the flow to completion.
    pub async fn run<C>(&self, continuation: &C) -> Result<C::Output, TubeportError>
    where
        C: FlowContinuation,
    {
        let addr = self.config.listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| OauthError::Bind { addr, source })?;
        self.run_with_listener(listener, continuation).await
    }

    /// Run the flow on an already bound listener.
    ///
    /// Order: the callback stores the credential and answers the browser, the listener is
    /// stopped within the grace period, and only then `continuation` runs with the credential.
    pub async fn run_with_listener<C>(
        &self,
        listener: TcpListener,
        continuation: &C,
    ) -> Result<C::Output, TubeportError>
    where
        C: FlowContinuation,
    {
        let session = self.begin();
        println!(
            "Go to the following link in your browser to authorize access:\n{}",
            session.authorization_url
        );

        let local_addr = listener.local_addr().ok();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = session.router.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });
        self.state.set(FlowState::AwaitingCallback);
        info!(
            listen_addr = ?local_addr,
            callback_path = %self.config.callback_path,
            "OAuth callback listener started; waiting for the browser redirect"
        );

        let outcome = tokio::select! {
            outcome = session.wait() => outcome,
            joined = &mut server => {
                self.state.set(FlowState::Failed);
                let message = match joined {
                    Ok(Ok(())) => "server exited before the callback arrived".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => e.to_string(),
                };
                return Err(OauthError::Listener(message).into());
            }
        };

        let _ = shutdown_tx.send(());
        let grace = self.config.shutdown_grace;
        match tokio::time::timeout(grace, &mut server).await {
            Ok(Ok(Ok(()))) => info!("OAuth callback listener stopped"),
            Ok(Ok(Err(e))) => warn!(error = %e, "OAuth callback listener reported an error on shutdown"),
            Ok(Err(e)) => warn!(error = %e, "OAuth callback listener task failed"),
            Err(_) => {
                server.abort();
                error!(grace = ?grace, "OAuth callback listener did not stop within the grace period");
                return Err(OauthError::ShutdownTimeout(grace).into());
            }
        }

        let credential = outcome?;
        continuation.on_authorized(&credential).await
    }
}
