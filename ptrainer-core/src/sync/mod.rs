//! Synchronization of local collections with the remote HAL API.
//!
//! ## Protocol
//!
//! Each resource type is a Spring-Data-REST style collection:
//! 1. `GET <base>/<resource>` returns `{ "_embedded": { "<resource>": [...] } }`
//! 2. `POST <base>/<resource>` creates an entity and returns it with `_links.self.href`
//! 3. `PUT <self-href>` replaces the entity's fields
//! 4. `DELETE <self-href>` removes it
//!
//! Self-links are the only identity used for writes; requests never rebuild them.

mod error;
#[cfg(test)]
pub(crate) mod mock;
mod synchronizer;
mod transport;

pub use error::{SyncError, TransportError};
pub use synchronizer::Synchronizer;
pub use transport::{HttpTransport, Transport};

pub(crate) use synchronizer::{decode_embedded, join_url};
