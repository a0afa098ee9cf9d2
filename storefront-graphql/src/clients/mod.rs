//! Clients for the commerce platform.
//!
//! Resolvers only see the [`Checkout`], [`Catalog`] and [`Messages`] traits.
//! [`Clients::from_configuration`] wires the REST implementations; tests
//! substitute the generated mocks.

mod catalog;
mod checkout;
mod messages;
mod platform;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use self::catalog::RestCatalog;
pub use self::checkout::RestCheckout;
pub use self::messages::PassthroughMessages;
pub use self::messages::RestMessages;
pub(crate) use self::platform::PlatformClient;
use crate::category::CategoryRecord;
use crate::checkout::Item;
use crate::checkout::OrderForm;
use crate::configuration::Configuration;
use crate::configuration::ConfigurationError;
use crate::error::FetchError;
use crate::marketing::MarketingData;

/// The platform's checkout API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Checkout: Send + Sync {
    /// Fetches the order form `order_form_id`.
    async fn order_form(&self, order_form_id: &str) -> Result<OrderForm, FetchError>;

    /// Adds `items` to the order form and returns the updated order form.
    async fn add_item(&self, order_form_id: &str, items: &[Item])
        -> Result<OrderForm, FetchError>;

    /// Replaces the marketing data attached to the order form.
    async fn update_order_form_marketing_data(
        &self,
        order_form_id: &str,
        marketing_data: &MarketingData,
    ) -> Result<(), FetchError>;
}

/// The platform's catalog API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// The category tree, `depth` levels deep.
    async fn categories(&self, depth: usize) -> Result<Vec<CategoryRecord>, FetchError>;

    /// A single category, without its url or children.
    async fn category(&self, id: &str) -> Result<Option<CategoryRecord>, FetchError>;
}

/// Localization of catalog content.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Messages: Send + Sync {
    /// Translates `default` for the entity `entity_id`, falling back to `default`.
    async fn message(
        &self,
        key: &str,
        default: &str,
        entity_id: &str,
    ) -> Result<String, FetchError>;
}

/// The clients available to every resolver.
#[derive(Clone)]
pub struct Clients {
    pub checkout: Arc<dyn Checkout>,
    pub catalog: Arc<dyn Catalog>,
    pub messages: Arc<dyn Messages>,
}

impl Clients {
    pub fn new(
        checkout: Arc<dyn Checkout>,
        catalog: Arc<dyn Catalog>,
        messages: Arc<dyn Messages>,
    ) -> Self {
        Self {
            checkout,
            catalog,
            messages,
        }
    }

    /// REST clients for the configured platform account.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigurationError> {
        let platform = &configuration.platform;
        let base_url = platform.base_url()?;
        tracing::info!(%base_url, "using commerce platform");

        let checkout = RestCheckout::new(PlatformClient::new("checkout", base_url.clone(), platform)?);
        let catalog = RestCatalog::new(PlatformClient::new("catalog", base_url, platform)?);
        let messages: Arc<dyn Messages> = match &configuration.messages.endpoint {
            Some(endpoint) => Arc::new(RestMessages::new(
                PlatformClient::new("messages", endpoint.clone(), platform)?,
                configuration.messages.locale.clone(),
            )),
            None => Arc::new(PassthroughMessages),
        };

        Ok(Self::new(Arc::new(checkout), Arc::new(catalog), messages))
    }
}

impl std::fmt::Debug for Clients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clients").finish_non_exhaustive()
    }
}
