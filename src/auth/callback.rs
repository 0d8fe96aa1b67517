use super::flow::{FlowState, SharedFlowState};
use super::{Authorizer, PendingAuthorization};
use crate::credential::{Credential, CredentialStore};
use crate::error::OauthError;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use oauth2::AuthorizationCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use subtle::ConstantTimeEq;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

pub(crate) type CompletionSender = oneshot::Sender<Result<Credential, OauthError>>;

/// Everything the callback handler needs, handed over when the flow starts.
///
/// `pending` and `completion` are take-once slots: the first callback consumes both, so any
/// later request finds them empty.
#[derive(Clone)]
pub(crate) struct CallbackState {
    authorizer: Arc<dyn Authorizer>,
    store: CredentialStore,
    flow_state: SharedFlowState,
    pending: Arc<Mutex<Option<PendingAuthorization>>>,
    completion: Arc<Mutex<Option<CompletionSender>>>,
}

impl CallbackState {
    pub(crate) fn new(
        authorizer: Arc<dyn Authorizer>,
        store: CredentialStore,
        flow_state: SharedFlowState,
        pending: PendingAuthorization,
        completion: CompletionSender,
    ) -> Self {
        Self {
            authorizer,
            store,
            flow_state,
            pending: Arc::new(Mutex::new(Some(pending))),
            completion: Arc::new(Mutex::new(Some(completion))),
        }
    }

    fn take_pending(&self) -> Option<PendingAuthorization> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    fn complete(&self, result: Result<Credential, OauthError>) {
        let sender = self
            .completion
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(sender) = sender
            && sender.send(result).is_err()
        {
            warn!("authorization flow stopped waiting before the callback completed");
        }
    }
}

/// Router serving the single loopback callback route at `callback_path`.
pub(crate) fn callback_router(callback_path: &str, state: CallbackState) -> Router {
    Router::new()
        .route(callback_path, get(oauth_callback))
        .with_state(state)
}

/// GET <callback_path>?code=...&state=...
///
/// The exchange runs in its own task: a browser that disconnects mid-exchange must not
/// cancel it, or the consumed attempt would never signal completion.
async fn oauth_callback(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(pending) = state.take_pending() else {
        warn!("callback received after the authorization was already handled");
        let err = OauthError::AlreadyHandled;
        return (err.status_code(), format!("{err}. You can close this window.")).into_response();
    };

    let task_state = state.clone();
    let task = tokio::spawn(async move { finish_callback(&task_state, &params, pending).await });
    match task.await {
        Ok(response) => response,
        Err(e) => {
            state.flow_state.set(FlowState::Failed);
            error!(error = %e, "OAuth callback task failed");
            let err = OauthError::Listener(format!("callback task failed: {e}"));
            let response = (err.status_code(), format!("Authorization failed: {err}")).into_response();
            state.complete(Err(err));
            response
        }
    }
}

async fn finish_callback(
    state: &CallbackState,
    params: &HashMap<String, String>,
    pending: PendingAuthorization,
) -> Response {
    match process_callback(state, params, pending).await {
        Ok(credential) => {
            state.flow_state.set(FlowState::Completed);
            info!(path = %state.store.path().display(), "OAuth callback stored credential successfully");
            let body = format!(
                "Token successfully saved to {}. You can close this window and return to the terminal.",
                state.store.path().display()
            );
            state.complete(Ok(credential));
            (StatusCode::OK, body).into_response()
        }
        Err(err) => {
            state.flow_state.set(FlowState::Failed);
            error!(error = %err, "OAuth callback failed");
            let response = (err.status_code(), format!("Authorization failed: {err}")).into_response();
            state.complete(Err(err));
            response
        }
    }
}

async fn process_callback(
    state: &CallbackState,
    params: &HashMap<String, String>,
    pending: PendingAuthorization,
) -> Result<Credential, OauthError> {
    let code = non_empty(params, "code").ok_or_else(|| OauthError::MissingCode {
        provider_error: non_empty(params, "error").map(str::to_string),
    })?;

    let returned_state = non_empty(params, "state").unwrap_or_default();
    let expected_state = pending.state.secret().as_bytes();
    if !bool::from(returned_state.as_bytes().ct_eq(expected_state)) {
        return Err(OauthError::StateMismatch);
    }

    state.flow_state.set(FlowState::Exchanging);
    let credential = state
        .authorizer
        .exchange_code(AuthorizationCode::new(code.to_string()), pending.pkce_verifier)
        .await?;

    state.store.save(&credential)?;
    Ok(credential)
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
