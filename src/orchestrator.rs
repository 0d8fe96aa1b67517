use crate::auth::{AuthorizationFlow, FlowContinuation, GoogleAuthorizer, NoopContinuation};
use crate::config::{ClientSecret, Config};
use crate::credential::{Credential, CredentialStore};
use crate::error::TubeportError;
use crate::http::build_http_client;
use crate::import::{CsvRecordSource, ImportReport, RecordSource, run_import};
use crate::youtube::{SubscriberFactory, YoutubeClientFactory};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Which path a run took.
#[derive(Debug)]
pub enum RunSummary {
    /// A stored credential was reused; no listener was started.
    ExistingCredential(ImportReport),
    /// The authorization flow ran first and its continuation imported.
    Authorized(ImportReport),
}

impl RunSummary {
    pub fn report(&self) -> &ImportReport {
        match self {
            RunSummary::ExistingCredential(report) | RunSummary::Authorized(report) => report,
        }
    }
}

/// Continuation that imports the input file with the freshly obtained credential.
pub struct ImportContinuation {
    source: Arc<dyn RecordSource>,
    subscribers: Arc<dyn SubscriberFactory>,
}

impl ImportContinuation {
    pub fn new(source: Arc<dyn RecordSource>, subscribers: Arc<dyn SubscriberFactory>) -> Self {
        Self {
            source,
            subscribers,
        }
    }

    /// Read every record, then subscribe row by row. Only an unreadable input is fatal.
    pub async fn import(&self, credential: &Credential) -> Result<ImportReport, TubeportError> {
        let records = self.source.read_all()?;
        let subscriber = self.subscribers.for_credential(credential);
        Ok(run_import(&records, subscriber.as_ref()).await)
    }
}

#[async_trait]
impl FlowContinuation for ImportContinuation {
    type Output = ImportReport;

    async fn on_authorized(&self, credential: &Credential) -> Result<ImportReport, TubeportError> {
        info!("continuing to import subscriptions");
        self.import(credential).await
    }
}

/// Decides at startup whether to reuse the stored credential or authorize first.
pub struct Orchestrator {
    store: CredentialStore,
    flow: AuthorizationFlow,
    import: ImportContinuation,
}

impl Orchestrator {
    pub fn new(store: CredentialStore, flow: AuthorizationFlow, import: ImportContinuation) -> Self {
        Self {
            store,
            flow,
            import,
        }
    }

    /// Wire up the production collaborators. Fails before any network activity on bad config.
    pub fn from_config(cfg: &Config) -> Result<Self, TubeportError> {
        let oauth = cfg.oauth.resolve()?;
        let secret = ClientSecret::from_file(&cfg.files.client_secret)?;
        info!(
            client_id = %secret.client_id,
            redirect_url = %oauth.redirect_url,
            token_file = %cfg.files.token.display(),
            input_file = %cfg.files.subscriptions.display(),
            "configuration loaded"
        );

        let http_client = build_http_client(&cfg.youtube)?;
        let authorizer = GoogleAuthorizer::new(&secret, &oauth, http_client.clone())?;
        let subscribers = YoutubeClientFactory::new(&cfg.youtube, http_client)?;

        let store = CredentialStore::new(&cfg.files.token);
        let flow = AuthorizationFlow::new(Arc::new(authorizer), store.clone(), oauth);
        let import = ImportContinuation::new(
            Arc::new(CsvRecordSource::new(&cfg.files.subscriptions)),
            Arc::new(subscribers),
        );
        Ok(Self::new(store, flow, import))
    }

    /// Import with the stored credential, or authorize first when none is usable.
    ///
    /// The stored credential is not validated remotely. An expired one is refreshed first when
    /// it carries a refresh token; if that fails it is used as is and a revoked token surfaces
    /// as per-row subscribe failures.
    pub async fn run(&self) -> Result<RunSummary, TubeportError> {
        match self.store.load() {
            Ok(credential) => {
                info!(path = %self.store.path().display(), "using stored credential");
                let credential = self.refresh_if_expired(credential).await;
                let report = self.import.import(&credential).await?;
                Ok(RunSummary::ExistingCredential(report))
            }
            Err(reason) => {
                info!(reason = %reason, "no usable credential; starting authorization flow");
                let report = self.flow.run(&self.import).await?;
                Ok(RunSummary::Authorized(report))
            }
        }
    }

    async fn refresh_if_expired(&self, credential: Credential) -> Credential {
        if !credential.is_expired() {
            return credential;
        }
        if credential.refresh_token.is_none() {
            warn!(
                expiry = ?credential.expiry,
                "stored credential has expired and has no refresh token; subscribe calls may be rejected"
            );
            return credential;
        }

        match self.flow.authorizer().refresh(&credential).await {
            Ok(refreshed) => {
                if let Err(e) = self.store.save(&refreshed) {
                    warn!(error = %e, "unable to persist refreshed credential");
                }
                refreshed
            }
            Err(e) => {
                warn!(
                    error = %e,
                    expiry = ?credential.expiry,
                    "refreshing the expired credential failed; using it as is"
                );
                credential
            }
        }
    }

    /// Token-only mode: always run the flow and stop once the credential is stored.
    pub async fn authorize_only(&self) -> Result<(), TubeportError> {
        self.flow.run(&NoopContinuation).await?;
        info!(path = %self.store.path().display(), "credential stored");
        Ok(())
    }
}
