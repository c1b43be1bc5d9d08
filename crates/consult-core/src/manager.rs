//! Consult manager
//!
//! [`ConsultManager`] is the single object the presentation layer talks to.
//! It owns the [`DirectoryFilter`] and the [`CallSession`], and it is the
//! place where a provider id is checked against the catalog before a call is
//! allowed to start.
//!
//! ```text
//! ┌─────────────────────────┐
//! │   Presentation layer    │  query edits, start/end/toggle clicks
//! └───────────┬─────────────┘
//!             │
//! ┌───────────▼─────────────┐
//! │     ConsultManager      │
//! │ ┌──────────┐ ┌────────┐ │
//! │ │Directory │ │ Call   │ │
//! │ │Filter    │ │Session │─┼──▶ MediaDevice
//! │ └──────────┘ └────────┘ │
//! └─────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use docbot_consult_core::{ConsultManager, ProviderId, TargetRejection};
//!
//! # tokio_test::block_on(async {
//! let manager = ConsultManager::builder().build()?;
//!
//! manager.set_query("derm");
//! assert_eq!(manager.visible_providers().len(), 1);
//!
//! // Dermatologist is offline
//! let err = manager.start_call(ProviderId(3)).unwrap_err();
//! assert_eq!(err.rejection(), Some(TargetRejection::ProviderOffline));
//!
//! manager.start_call(ProviderId(1))?;
//! assert!(manager.snapshot().is_in_call());
//! manager.end_call();
//! # Ok::<(), docbot_consult_core::ConsultError>(())
//! # }).unwrap();
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::call::{CallId, CallSession, CallSnapshot, CallSummary};
use crate::config::ConsultConfig;
use crate::directory::DirectoryFilter;
use crate::error::{ConsultError, ConsultResult, TargetRejection};
use crate::events::CallEvent;
use crate::media::{MediaDevice, MockMediaDevice};
use crate::provider::{Provider, ProviderCard, ProviderCatalog, ProviderId};

/// Directory plus call session, wired together
#[derive(Debug)]
pub struct ConsultManager {
    directory: RwLock<DirectoryFilter>,
    session: CallSession,
    config: ConsultConfig,
}

impl ConsultManager {
    /// Start building a manager
    pub fn builder() -> ConsultManagerBuilder {
        ConsultManagerBuilder::new()
    }

    /// Create a manager from its parts
    pub fn new(
        config: ConsultConfig,
        catalog: ProviderCatalog,
        device: Arc<dyn MediaDevice>,
    ) -> ConsultResult<Self> {
        config.validate()?;
        let session = CallSession::new(&config, device);
        tracing::debug!("Consult manager ready with {} providers", catalog.len());
        Ok(Self {
            directory: RwLock::new(DirectoryFilter::new(catalog)),
            session,
            config,
        })
    }

    // ===== DIRECTORY =====

    pub fn set_query(&self, text: impl Into<String>) {
        self.directory.write().set_query(text);
    }

    pub fn clear_query(&self) {
        self.directory.write().clear_query();
    }

    pub fn query(&self) -> String {
        self.directory.read().query().to_string()
    }

    /// Providers matching the current query, in catalog order
    pub fn visible_providers(&self) -> Vec<Provider> {
        self.directory
            .read()
            .visible_providers()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn visible_cards(&self) -> Vec<ProviderCard> {
        self.directory.read().visible_cards()
    }

    pub fn provider(&self, id: ProviderId) -> Option<Provider> {
        self.directory.read().provider(id).cloned()
    }

    /// Size of the whole catalog, regardless of the query
    pub fn provider_count(&self) -> usize {
        self.directory.read().catalog().len()
    }

    // ===== CALL =====

    /// Start a call with an online provider.
    ///
    /// # Errors
    ///
    /// * `InvalidTarget(UnknownProvider)` - no such provider in the catalog
    /// * `InvalidTarget(ProviderOffline)` - the provider is offline
    /// * `InvalidTarget(CallInProgress)` - a call is already running
    pub fn start_call(&self, provider_id: ProviderId) -> ConsultResult<CallId> {
        let reject = |reason: TargetRejection| -> ConsultResult<CallId> {
            tracing::info!("Rejected call to provider {}: {}", provider_id, reason);
            Err(ConsultError::invalid_target(provider_id, reason))
        };

        match self.directory.read().provider(provider_id) {
            None => return reject(TargetRejection::UnknownProvider),
            Some(provider) if !provider.can_call() => {
                return reject(TargetRejection::ProviderOffline)
            }
            Some(_) => {}
        }

        self.session.start(provider_id)
    }

    /// Hang up. Returns `None` if there was no call.
    pub fn end_call(&self) -> Option<CallSummary> {
        self.session.end()
    }

    pub fn toggle_microphone(&self) -> ConsultResult<bool> {
        self.session.toggle_microphone()
    }

    pub fn toggle_camera(&self) -> ConsultResult<bool> {
        self.session.toggle_camera()
    }

    pub fn snapshot(&self) -> CallSnapshot {
        self.session.snapshot()
    }

    /// The provider currently being called, for display
    pub fn active_provider(&self) -> Option<Provider> {
        let id = self.session.target_provider_id()?;
        self.provider(id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.session.subscribe()
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    pub fn config(&self) -> &ConsultConfig {
        &self.config
    }
}

/// Builder for [`ConsultManager`]
///
/// Without an explicit catalog the builder loads `config.providers_path` if
/// set, otherwise the built-in seed. Without an explicit device it falls back
/// to [`MockMediaDevice`].
#[derive(Debug, Default)]
pub struct ConsultManagerBuilder {
    config: ConsultConfig,
    catalog: Option<ProviderCatalog>,
    device: Option<Arc<dyn MediaDevice>>,
}

impl ConsultManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ConsultConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: ProviderCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn providers(self, providers: Vec<Provider>) -> ConsultResult<Self> {
        Ok(self.catalog(ProviderCatalog::new(providers)?))
    }

    pub fn media_device(mut self, device: Arc<dyn MediaDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn build(self) -> ConsultResult<ConsultManager> {
        let catalog = match (self.catalog, &self.config.providers_path) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => ProviderCatalog::from_json_file(path)?,
            (None, None) => ProviderCatalog::seed(),
        };
        let device = self
            .device
            .unwrap_or_else(|| Arc::new(MockMediaDevice::new()));
        ConsultManager::new(self.config, catalog, device)
    }
}
