//! Local mirror of one remote HAL collection.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{SyncError, TransportError};
use super::transport::{HttpTransport, Transport};
use crate::models::{Entity, Resource};

/// Keeps an ordered local copy of a remote collection consistent with the
/// server across create, update and delete.
///
/// The local collection only changes after the server confirmed a request,
/// so a failed call never leaves it half-applied. Entities are identified by
/// their self-link, never by position.
#[derive(Debug)]
pub struct Synchronizer<T, C = HttpTransport> {
    transport: C,
    resource: String,
    collection_url: String,
    items: Vec<Entity<T>>,
}

impl<T, C> Synchronizer<T, C> {
    /// Name of the resource, used as path segment and `_embedded` key.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// The current known server collection, in fetch/insertion order.
    pub fn items(&self) -> &[Entity<T>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Entity<T>> {
        self.items
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }
}

impl<T: Resource, C> Synchronizer<T, C> {
    /// Finds an entity by self-link or server id.
    pub fn find(&self, identifier: &str) -> Option<&Entity<T>> {
        self.items.iter().find(|item| item.matches(identifier))
    }
}

impl<T, C> Synchronizer<T, C>
where
    T: Serialize + DeserializeOwned,
    C: Transport,
{
    /// Creates an empty synchronizer for `<base_url>/<resource>`.
    pub fn new(transport: C, base_url: &str, resource: impl Into<String>) -> Result<Self, SyncError> {
        let resource = resource.into();
        let collection_url = join_url(base_url, &resource)?;

        Ok(Self {
            transport,
            resource,
            collection_url,
            items: Vec::new(),
        })
    }

    /// Replaces the local collection with the server's, preserving server order.
    pub async fn load(&mut self) -> Result<&[Entity<T>], SyncError> {
        let items = self.fetch().await.map_err(|e| {
            warn!("Fetching {} failed: {}", self.resource, e);
            SyncError::fetch(&self.resource, e)
        })?;

        debug!("Loaded {} {}", items.len(), self.resource);
        self.items = items;
        Ok(&self.items)
    }

    /// Posts a draft and appends the entity the server created from it.
    pub async fn create(&mut self, draft: &T) -> Result<&Entity<T>, SyncError> {
        let created = self.post_draft(draft).await.map_err(|e| {
            warn!("Creating {} failed: {}", self.resource, e);
            SyncError::write(&self.resource, e)
        })?;

        let index = match self.items.iter().position(|item| item.same_resource(&created)) {
            Some(index) => {
                warn!(
                    "Server returned an existing {} link for a new entity; replacing it",
                    self.resource
                );
                self.items[index] = created;
                index
            }
            None => {
                self.items.push(created);
                self.items.len() - 1
            }
        };

        let created = &self.items[index];
        info!(
            "Created {} {}",
            self.resource,
            created.self_href().unwrap_or_default()
        );
        Ok(created)
    }

    /// Puts the entity's fields to its self-link, then reloads the collection.
    ///
    /// The self-link is not part of the payload. An entity without one fails
    /// with [`SyncError::MissingIdentity`] before any request is made. If the
    /// write succeeds but the reload fails, the reload error is returned.
    pub async fn update(&mut self, entity: &Entity<T>) -> Result<&[Entity<T>], SyncError> {
        let Some(href) = entity.self_href() else {
            warn!("Refusing to update {} entity without self link", self.resource);
            return Err(SyncError::missing_identity(&self.resource));
        };

        self.put_fields(href, &entity.fields).await.map_err(|e| {
            warn!("Updating {} failed: {}", href, e);
            SyncError::update(&self.resource, e)
        })?;

        info!("Updated {}", href);
        self.load().await
    }

    /// Deletes the entity's remote resource and drops it from the collection.
    pub async fn remove(&mut self, entity: &Entity<T>) -> Result<&[Entity<T>], SyncError> {
        let Some(href) = entity.self_href() else {
            warn!("Refusing to delete {} entity without self link", self.resource);
            return Err(SyncError::missing_identity(&self.resource));
        };

        self.transport.delete(href).await.map_err(|e| {
            warn!("Deleting {} failed: {}", href, e);
            SyncError::delete(&self.resource, e)
        })?;

        self.items.retain(|item| item.self_href() != Some(href));
        info!("Deleted {}", href);
        Ok(&self.items)
    }

    async fn fetch(&self) -> Result<Vec<Entity<T>>, TransportError> {
        let body = self.transport.get(&self.collection_url).await?;
        decode_embedded(body, &self.resource)
    }

    async fn post_draft(&self, draft: &T) -> Result<Entity<T>, TransportError> {
        let payload = encode(draft)?;
        let body = self.transport.post(&self.collection_url, &payload).await?;

        let created: Entity<T> = serde_json::from_value(body)?;
        if !created.is_persisted() {
            return Err(TransportError::MissingSelfLink);
        }
        Ok(created)
    }

    async fn put_fields(&self, href: &str, fields: &T) -> Result<(), TransportError> {
        let payload = encode(fields)?;
        self.transport.put(href, &payload).await?;
        Ok(())
    }
}

fn encode<T: Serialize>(fields: &T) -> Result<Value, TransportError> {
    serde_json::to_value(fields).map_err(|e| TransportError::Encode(e.to_string()))
}

/// Extracts `_embedded.<resource>` from a HAL collection document.
///
/// A document without embedded items is an empty collection.
pub(crate) fn decode_embedded<T: DeserializeOwned>(
    mut body: Value,
    resource: &str,
) -> Result<Vec<Entity<T>>, TransportError> {
    if !body.is_object() {
        return Err(TransportError::Decode(format!(
            "expected a HAL document for {}",
            resource
        )));
    }

    match body
        .get_mut("_embedded")
        .and_then(|embedded| embedded.get_mut(resource))
    {
        Some(items) => Ok(serde_json::from_value(items.take())?),
        None => Ok(Vec::new()),
    }
}

/// Joins a path segment onto a base URL, treating the base as a directory.
pub(crate) fn join_url(base: &str, segment: &str) -> Result<String, SyncError> {
    let invalid = |reason: String| SyncError::InvalidUrl {
        url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    url.join(segment)
        .map(|joined| joined.to_string())
        .map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Training};
    use crate::sync::mock::MockTransport;
    use serde_json::{json, Map};

    const BASE: &str = "http://api.test/api/";
    const CUSTOMERS: &str = "http://api.test/api/customers";

    type Record = Map<String, Value>;

    fn hal_customer(first: &str, href: &str) -> Value {
        json!({
            "firstname": first,
            "lastname": "Test",
            "email": format!("{}@mail.com", first.to_lowercase()),
            "phone": "040-1",
            "streetaddress": "Katu 1",
            "postcode": "00100",
            "city": "Helsinki",
            "_links": { "self": { "href": href }, "customer": { "href": href } }
        })
    }

    fn collection(items: Vec<Value>) -> Value {
        json!({ "_embedded": { "customers": items }, "_links": { "self": { "href": CUSTOMERS } } })
    }

    async fn loaded(items: Vec<Value>) -> Synchronizer<Customer, MockTransport> {
        let transport = MockTransport::new();
        transport.reply("GET", CUSTOMERS, collection(items));
        let mut sync = Synchronizer::new(transport, BASE, "customers").unwrap();
        sync.load().await.unwrap();
        sync
    }

    fn names(sync: &Synchronizer<Customer, MockTransport>) -> Vec<String> {
        sync.items()
            .iter()
            .map(|c| c.fields.firstname.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_load_keeps_server_order() {
        let sync = loaded(vec![
            hal_customer("Cecilia", "/api/customers/3"),
            hal_customer("Aino", "/api/customers/1"),
            hal_customer("Bertta", "/api/customers/2"),
        ])
        .await;

        assert_eq!(sync.items().len(), 3);
        assert_eq!(names(&sync), vec!["Cecilia", "Aino", "Bertta"]);
        assert_eq!(sync.items()[1].self_href(), Some("/api/customers/1"));
    }

    #[tokio::test]
    async fn test_load_replaces_wholesale() {
        let mut sync = loaded(vec![
            hal_customer("Old", "/api/customers/1"),
            hal_customer("Older", "/api/customers/2"),
        ])
        .await;
        sync.transport().reply(
            "GET",
            CUSTOMERS,
            collection(vec![hal_customer("New", "/api/customers/9")]),
        );

        sync.load().await.unwrap();
        assert_eq!(names(&sync), vec!["New"]);
    }

    #[tokio::test]
    async fn test_load_without_embedded_is_empty() {
        let transport = MockTransport::new();
        transport.reply("GET", CUSTOMERS, json!({ "_links": {} }));
        let mut sync: Synchronizer<Customer, _> =
            Synchronizer::new(transport, BASE, "customers").unwrap();

        assert!(sync.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_items() {
        let mut sync = loaded(vec![hal_customer("Aino", "/api/customers/1")]).await;
        sync.transport().fail("GET", CUSTOMERS, 500);

        let err = sync.load().await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::FetchFailure {
                source: TransportError::Status(500),
                ..
            }
        ));
        assert_eq!(names(&sync), vec!["Aino"]);
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_fetch_failure() {
        let transport = MockTransport::new();
        transport.reply("GET", CUSTOMERS, json!([1, 2, 3]));
        let mut sync: Synchronizer<Customer, _> =
            Synchronizer::new(transport, BASE, "customers").unwrap();

        let err = sync.load().await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::FetchFailure {
                source: TransportError::Decode(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_create_appends_exactly_one() {
        let mut sync = loaded(vec![
            hal_customer("Aino", "/api/customers/1"),
            hal_customer("Bertta", "/api/customers/2"),
        ])
        .await;
        sync.transport()
            .reply("POST", CUSTOMERS, hal_customer("Ville", "/api/customers/7"));
        let before = sync.items().to_vec();

        let draft = Customer::new("Ville", "Test").with_contact("ville@mail.com", "040-1");
        let created = sync.create(&draft).await.unwrap();
        assert_eq!(created.self_href(), Some("/api/customers/7"));

        assert_eq!(sync.items().len(), 3);
        assert_eq!(&sync.items()[..2], &before[..]);
        assert_eq!(sync.items()[2].self_href(), Some("/api/customers/7"));

        let post = &sync.transport().calls()[1];
        assert_eq!(post.method, "POST");
        assert_eq!(post.url, CUSTOMERS);
        assert_eq!(post.body.as_ref().unwrap()["firstname"], "Ville");
    }

    #[tokio::test]
    async fn test_failed_create_is_noop() {
        let mut sync = loaded(vec![hal_customer("Aino", "/api/customers/1")]).await;
        sync.transport().fail("POST", CUSTOMERS, 400);
        let before = sync.items().to_vec();

        let err = sync
            .create(&Customer::new("Ville", "Test"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::WriteFailure {
                source: TransportError::Status(400),
                ..
            }
        ));
        assert_eq!(sync.items(), &before[..]);
    }

    #[tokio::test]
    async fn test_create_without_self_link_is_write_failure() {
        let transport = MockTransport::new();
        transport.reply("POST", CUSTOMERS, json!({ "firstname": "Ville" }));
        let mut sync: Synchronizer<Customer, _> =
            Synchronizer::new(transport, BASE, "customers").unwrap();

        let err = sync
            .create(&Customer::new("Ville", "Test"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::WriteFailure {
                source: TransportError::MissingSelfLink,
                ..
            }
        ));
        assert!(sync.items().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_known_link_replaces_in_place() {
        let mut sync = loaded(vec![
            hal_customer("Aino", "/api/customers/1"),
            hal_customer("Bertta", "/api/customers/2"),
        ])
        .await;
        sync.transport()
            .reply("POST", CUSTOMERS, hal_customer("Aino2", "/api/customers/1"));

        sync.create(&Customer::new("Aino2", "Test")).await.unwrap();
        assert_eq!(names(&sync), vec!["Aino2", "Bertta"]);
    }

    #[tokio::test]
    async fn test_update_requires_identity() {
        let mut sync: Synchronizer<Customer, _> =
            Synchronizer::new(MockTransport::new(), BASE, "customers").unwrap();

        let err = sync
            .update(&Entity::new(Customer::new("Aino", "Test")))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingIdentity { .. }));

        let err = sync
            .update(&Entity::new(Customer::new("Aino", "Test")).with_self_link(""))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingIdentity { .. }));

        assert!(sync.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_payload_excludes_self_link() {
        let transport = MockTransport::new();
        transport.reply(
            "PUT",
            "/x/1",
            json!({ "name": "A", "_links": { "self": { "href": "/x/1" } } }),
        );
        transport.reply("GET", "http://api.test/api/x", json!({ "_embedded": { "x": [] } }));
        let mut sync: Synchronizer<Record, _> = Synchronizer::new(transport, BASE, "x").unwrap();

        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("A"));
        sync.update(&Entity::new(fields).with_self_link("/x/1"))
            .await
            .unwrap();

        let put = &sync.transport().calls()[0];
        assert_eq!(put.method, "PUT");
        assert_eq!(put.url, "/x/1");
        let body = put.body.as_ref().unwrap().as_object().unwrap();
        assert_eq!(body.get("name"), Some(&json!("A")));
        assert!(!body.contains_key("self"));
        assert!(!body.contains_key("_links"));
    }

    #[tokio::test]
    async fn test_update_reloads_from_server() {
        let mut sync = loaded(vec![hal_customer("Aino", "/api/customers/1")]).await;
        sync.transport().reply("PUT", "/api/customers/1", Value::Null);
        sync.transport().reply(
            "GET",
            CUSTOMERS,
            collection(vec![hal_customer("Persisted", "/api/customers/1")]),
        );

        let mut entity = sync.items()[0].clone();
        entity.fields.firstname = "Sent".to_string();
        sync.update(&entity).await.unwrap();

        assert_eq!(names(&sync), vec!["Persisted"]);
        let calls = sync.transport().calls();
        let methods: Vec<_> = calls.iter().map(|c| c.method).collect();
        assert_eq!(methods, vec!["GET", "PUT", "GET"]);
        assert_eq!(calls[1].body.as_ref().unwrap()["firstname"], "Sent");
    }

    #[tokio::test]
    async fn test_failed_update_leaves_items() {
        let mut sync = loaded(vec![hal_customer("Aino", "/api/customers/1")]).await;
        sync.transport().fail("PUT", "/api/customers/1", 500);

        let mut entity = sync.items()[0].clone();
        entity.fields.firstname = "Changed".to_string();
        let err = sync.update(&entity).await.unwrap_err();

        assert!(matches!(err, SyncError::UpdateFailure { .. }));
        assert_eq!(names(&sync), vec!["Aino"]);
        // no reload after a failed write
        assert_eq!(sync.transport().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_update_then_failed_reload_is_fetch_failure() {
        let mut sync = loaded(vec![hal_customer("Aino", "/api/customers/1")]).await;
        sync.transport().reply("PUT", "/api/customers/1", Value::Null);
        sync.transport().fail("GET", CUSTOMERS, 502);

        let entity = sync.items()[0].clone();
        let err = sync.update(&entity).await.unwrap_err();

        assert!(matches!(err, SyncError::FetchFailure { .. }));
        assert_eq!(names(&sync), vec!["Aino"]);
    }

    #[tokio::test]
    async fn test_remove_by_self_link_not_position() {
        let mut sync = loaded(vec![
            hal_customer("Bertta", "/x/2"),
            hal_customer("Cecilia", "/x/3"),
            hal_customer("Aino", "/x/1"),
        ])
        .await;
        sync.transport().reply("DELETE", "/x/1", Value::Null);

        let target = Entity::new(Customer::new("Aino", "Test")).with_self_link("/x/1");
        let remaining = sync.remove(&target).await.unwrap();

        let remaining: Vec<_> = remaining.iter().filter_map(|c| c.self_href()).collect();
        assert_eq!(remaining, vec!["/x/2", "/x/3"]);
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_items() {
        let mut sync = loaded(vec![
            hal_customer("Aino", "/x/1"),
            hal_customer("Bertta", "/x/2"),
        ])
        .await;
        sync.transport().fail("DELETE", "/x/1", 404);

        let target = sync.items()[0].clone();
        let err = sync.remove(&target).await.unwrap_err();

        assert!(matches!(err, SyncError::DeleteFailure { .. }));
        assert_eq!(sync.items().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_requires_identity() {
        let mut sync = loaded(vec![hal_customer("Aino", "/x/1")]).await;

        let err = sync
            .remove(&Entity::new(Customer::new("Aino", "Test")))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::MissingIdentity { .. }));
        assert_eq!(sync.transport().calls().len(), 1);
        assert_eq!(sync.items().len(), 1);
    }

    #[tokio::test]
    async fn test_instances_do_not_interfere() {
        let customers_transport = MockTransport::new();
        customers_transport.reply(
            "GET",
            CUSTOMERS,
            collection(vec![hal_customer("Aino", "/api/customers/1")]),
        );
        let trainings_transport = MockTransport::new();
        trainings_transport.reply(
            "GET",
            "http://api.test/api/trainings",
            json!({ "_embedded": { "trainings": [
                { "date": "2025-01-01T10:00:00Z", "activity": "Yoga", "duration": 30,
                  "_links": { "self": { "href": "/api/trainings/1" } } },
                { "date": "2025-01-02T10:00:00Z", "activity": "Gym", "duration": 60,
                  "_links": { "self": { "href": "/api/trainings/2" } } }
            ] } }),
        );

        let mut customers: Synchronizer<Customer, _> =
            Synchronizer::new(customers_transport, BASE, "customers").unwrap();
        let mut trainings: Synchronizer<Training, _> =
            Synchronizer::new(trainings_transport, BASE, "trainings").unwrap();

        let (c, t) = tokio::join!(customers.load(), trainings.load());
        assert_eq!(c.unwrap().len(), 1);
        assert_eq!(t.unwrap().len(), 2);
        assert_eq!(customers.items().len(), 1);
        assert_eq!(trainings.items().len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_href_or_id() {
        let mut with_id = hal_customer("Aino", "/api/customers/1");
        with_id["id"] = json!(41);
        let sync = loaded(vec![with_id, hal_customer("Bertta", "/api/customers/2")]).await;

        assert_eq!(sync.find("41").unwrap().fields.firstname, "Aino");
        assert_eq!(
            sync.find("/api/customers/2").unwrap().fields.firstname,
            "Bertta"
        );
        assert!(sync.find("3").is_none());
    }

    #[tokio::test]
    async fn test_find_by_link_segment_without_id_field() {
        let sync = loaded(vec![
            hal_customer("Aino", "https://host/api/customers/5"),
            hal_customer("Bertta", "https://host/api/customers/15"),
        ])
        .await;

        assert_eq!(sync.find("5").unwrap().fields.firstname, "Aino");
        assert_eq!(sync.find("15").unwrap().fields.firstname, "Bertta");
        assert!(sync.find("1").is_none());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://host/api/", "customers").unwrap(),
            "https://host/api/customers"
        );
        assert_eq!(
            join_url("https://host/api", "trainings").unwrap(),
            "https://host/api/trainings"
        );
        assert!(matches!(
            join_url("not a url", "customers"),
            Err(SyncError::InvalidUrl { .. })
        ));
    }
}
