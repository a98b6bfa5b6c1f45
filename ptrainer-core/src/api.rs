//! Entry point to the remote Personal Trainer API.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{Customer, CustomerRef, Entity, Resource, Training};
use crate::sync::{decode_embedded, join_url, HttpTransport, SyncError, Synchronizer, Transport, TransportError};

/// Public demo instance of the customer/training REST service.
pub const DEFAULT_API_URL: &str =
    "https://customer-rest-service-frontend-personaltrainer.2.rahtiapp.fi/api/";

/// Read-only endpoint returning trainings with their customers embedded.
pub const TRAINING_FEED: &str = "gettrainings";

/// Reset URL used when none is configured: `/reset` next to the API root.
pub fn default_reset_url(api_url: &str) -> Result<String, SyncError> {
    join_url(api_url, "../reset")
}

/// An explicitly configured API endpoint.
///
/// Holds no collection state itself; every call to [`Api::customers`] or
/// [`Api::trainings`] hands out an independent [`Synchronizer`].
#[derive(Debug, Clone)]
pub struct Api<C = HttpTransport> {
    transport: C,
    base_url: String,
    reset_url: String,
}

impl Api<HttpTransport> {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        Self::with_transport(HttpTransport::new(), base_url)
    }
}

impl<C> Api<C>
where
    C: Transport + Clone,
{
    pub fn with_transport(transport: C, base_url: &str) -> Result<Self, SyncError> {
        // validates the base URL up front
        join_url(base_url, "")?;
        Ok(Self {
            transport,
            base_url: base_url.to_string(),
            reset_url: default_reset_url(base_url)?,
        })
    }

    pub fn with_reset_url(mut self, reset_url: impl Into<String>) -> Self {
        self.reset_url = reset_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn reset_url(&self) -> &str {
        &self.reset_url
    }

    /// A fresh, empty synchronizer for a typed resource.
    pub fn collection<T>(&self) -> Result<Synchronizer<T, C>, SyncError>
    where
        T: Resource + Serialize + DeserializeOwned,
    {
        Synchronizer::new(self.transport.clone(), &self.base_url, T::COLLECTION)
    }

    pub fn customers(&self) -> Result<Synchronizer<Customer, C>, SyncError> {
        self.collection()
    }

    pub fn trainings(&self) -> Result<Synchronizer<Training, C>, SyncError> {
        self.collection()
    }

    /// Fetches all trainings with a denormalized copy of their customer.
    ///
    /// The feed is a plain JSON array; a HAL envelope is accepted as well.
    pub async fn training_feed(&self) -> Result<Vec<Entity<Training>>, SyncError> {
        let url = join_url(&self.base_url, TRAINING_FEED)?;
        let trainings = self.fetch_feed(&url).await.map_err(|e| {
            warn!("Fetching training feed failed: {}", e);
            SyncError::fetch(TRAINING_FEED, e)
        })?;

        debug!("Loaded {} trainings from feed", trainings.len());
        Ok(trainings)
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<Entity<Training>>, TransportError> {
        let body = self.transport.get(url).await?;
        match body {
            Value::Array(_) => Ok(serde_json::from_value(body)?),
            other => decode_embedded(other, Training::COLLECTION),
        }
    }

    /// Fetches the single entity behind a link.
    pub async fn follow<T: DeserializeOwned>(&self, href: &str) -> Result<Entity<T>, SyncError> {
        let entity: Entity<T> = async {
            let body = self.transport.get(href).await?;
            Ok::<Entity<T>, TransportError>(serde_json::from_value(body)?)
        }
        .await
        .map_err(|e| {
            warn!("Following {} failed: {}", href, e);
            SyncError::fetch(href, e)
        })?;

        Ok(entity)
    }

    /// Embeds the customer behind a training's `customer` link.
    ///
    /// Trainings without such a link are left untouched.
    pub async fn attach_customer(&self, training: &mut Entity<Training>) -> Result<(), SyncError> {
        let Some(href) = training.link("customer").map(str::to_string) else {
            return Ok(());
        };

        let customer: Entity<Customer> = self.follow(&href).await?;
        training.fields.customer = Some(CustomerRef::Embedded(Box::new(customer)));
        Ok(())
    }

    /// Asks the server to restore its demo data.
    pub async fn reset(&self) -> Result<(), SyncError> {
        self.transport.trigger(&self.reset_url).await.map_err(|e| {
            warn!("Resetting demo data failed: {}", e);
            SyncError::ResetFailure(e)
        })?;

        info!("Demo data reset");
        Ok(())
    }
}
