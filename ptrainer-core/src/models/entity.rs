use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relation name of an entity's canonical link.
pub const SELF_REL: &str = "self";

/// A single hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
        }
    }
}

/// The `_links` object of a HAL document, keyed by relation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.0.insert(rel.into(), Link::new(href));
        self
    }

    /// Returns the href for a relation. Empty hrefs count as absent.
    pub fn href(&self, rel: &str) -> Option<&str> {
        self.0
            .get(rel)
            .map(|link| link.href.as_str())
            .filter(|href| !href.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Record fields of a resource plus the links the server attached to it.
///
/// The fields and the links are kept apart so that a write payload is built
/// from `fields` alone and can never carry the self-link back to the server.
/// Requests address an entity by its full self-link, never by a rebuilt URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<T> {
    #[serde(flatten)]
    pub fields: T,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl<T> Entity<T> {
    /// Wraps fields that have not been round-tripped through the server yet.
    pub fn new(fields: T) -> Self {
        Self {
            fields,
            links: None,
        }
    }

    pub fn with_self_link(mut self, href: impl Into<String>) -> Self {
        let links = self.links.take().unwrap_or_default();
        self.links = Some(links.with(SELF_REL, href));
        self
    }

    /// The canonical remote resource of this entity, if it has one.
    pub fn self_href(&self) -> Option<&str> {
        self.link(SELF_REL)
    }

    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links.as_ref().and_then(|links| links.href(rel))
    }

    /// True once the server has assigned a self-link.
    pub fn is_persisted(&self) -> bool {
        self.self_href().is_some()
    }

    /// True when both entities point at the same remote resource.
    pub fn same_resource(&self, other: &Entity<T>) -> bool {
        match (self.self_href(), other.self_href()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A typed record exposed as a collection by the remote API.
pub trait Resource {
    /// Collection path segment and `_embedded` key, e.g. `customers`.
    const COLLECTION: &'static str;

    /// Server-assigned numeric id, when the server exposes it.
    fn id(&self) -> Option<i64>;
}

impl<T: Resource> Entity<T> {
    /// The server id: the `id` field when the server exposes it, otherwise
    /// the numeric last path segment of the self-link.
    pub fn server_id(&self) -> Option<i64> {
        self.fields.id().or_else(|| {
            let href = self.self_href()?;
            let path = href.split(['?', '#']).next()?;
            path.trim_end_matches('/').rsplit('/').next()?.parse().ok()
        })
    }

    /// Matches an identifier typed by a user: a self-link or a numeric id.
    pub fn matches(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        if self.self_href() == Some(identifier) {
            return true;
        }
        match (self.server_id(), identifier.parse::<i64>()) {
            (Some(id), Ok(wanted)) => id == wanted,
            _ => false,
        }
    }
}
