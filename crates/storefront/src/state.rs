//! Application state shared across handlers.

use std::sync::Arc;

use nexus_core::PricingPolicy;

use crate::config::StorefrontConfig;
use crate::services::{AirtableClient, AirtableError, CatalogService, EmailClient, EmailError};

/// Error building the shared clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("airtable client: {0}")]
    Airtable(#[from] AirtableError),
    #[error("email client: {0}")]
    Email(#[from] EmailError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogService,
    email: Option<EmailClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built from the configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let airtable = config
            .airtable
            .as_ref()
            .map(AirtableClient::new)
            .transpose()?;
        let email = config
            .emailjs
            .as_ref()
            .map(|emailjs| EmailClient::new(emailjs, &config.inboxes))
            .transpose()?;
        let catalog = CatalogService::new(&config.catalog, airtable);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                email,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Email client, if EmailJS is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailClient> {
        self.inner.email.as_ref()
    }

    /// Tax and shipping policy for cart totals.
    #[must_use]
    pub fn pricing(&self) -> &PricingPolicy {
        &self.inner.config.pricing
    }
}
