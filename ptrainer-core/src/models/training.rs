use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::customer::Customer;
use super::entity::{Entity, Resource};

/// Shown wherever a training has no embedded customer.
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

/// The customer side of a training.
///
/// Writes reference the customer by its self-link; the denormalized feed
/// returns a read-only copy of the whole customer instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CustomerRef {
    Href(String),
    Embedded(Box<Entity<Customer>>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Training {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: DateTime<Utc>,
    pub activity: String,
    pub duration: u32, // minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef>,
}

impl Training {
    pub fn new(date: DateTime<Utc>, activity: impl Into<String>, duration: u32) -> Self {
        Self {
            id: None,
            date,
            activity: activity.into(),
            duration,
            customer: None,
        }
    }

    /// Books the training for a customer identified by its self-link.
    pub fn for_customer(mut self, customer_href: impl Into<String>) -> Self {
        self.customer = Some(CustomerRef::Href(customer_href.into()));
        self
    }

    pub fn embedded_customer(&self) -> Option<&Customer> {
        match &self.customer {
            Some(CustomerRef::Embedded(customer)) => Some(&customer.fields),
            _ => None,
        }
    }

    /// Full name of the embedded customer, or `Unknown`.
    pub fn customer_name(&self) -> String {
        self.embedded_customer()
            .map(Customer::full_name)
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string())
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.date + chrono::Duration::minutes(i64::from(self.duration))
    }
}

impl Resource for Training {
    const COLLECTION: &'static str = "trainings";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl fmt::Display for Training {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.activity)?;
        writeln!(f, "{}", "=".repeat(self.activity.chars().count()))?;
        writeln!(f, "Date: {}", self.date.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "Duration: {} min", self.duration)?;
        writeln!(f, "Customer: {}", self.customer_name())?;
        Ok(())
    }
}
