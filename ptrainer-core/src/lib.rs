//! Personal Trainer Core Library
//!
//! Customer and training models, HAL collection synchronization and the
//! list, calendar and statistics projections shared by Personal Trainer
//! clients.

pub mod api;
pub mod calendar;
pub mod export;
pub mod models;
pub mod stats;
pub mod sync;
pub mod view;

pub use api::{default_reset_url, Api, DEFAULT_API_URL, TRAINING_FEED};
pub use calendar::{agenda, CalendarEvent, CalendarView};
pub use export::{customers_csv, write_customers_csv};
pub use models::{Activity, Customer, CustomerRef, Entity, Link, Links, Resource, Training};
pub use stats::{activity_totals, bar_chart, ActivityTotal};
pub use sync::{HttpTransport, SyncError, Synchronizer, Transport, TransportError};
pub use view::{Fields, FieldValue, ListView, SortBy, SortOrder};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
