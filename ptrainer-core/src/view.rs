//! Filtered and sorted projections of a collection for display.
//!
//! Filtering is a case-insensitive substring match, either over a
//! caller-chosen concatenation of fields or over each field on its own. Sorting uses a single field; text compares
//! case-insensitively, numbers numerically and dates chronologically. There is
//! no secondary key, so equal keys keep whatever order the sort leaves them in.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::models::{Customer, Entity, Training};

/// Default search fields of the customer list.
pub const CUSTOMER_SEARCH_FIELDS: &[&str] = &["firstname", "lastname", "email"];
/// Default search fields of the training list.
pub const TRAINING_SEARCH_FIELDS: &[&str] = &["customer", "activity"];

/// A field value as seen by filtering and sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Time(DateTime<Utc>),
}

impl FieldValue {
    fn text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.to_lowercase(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Time(t) => t.to_rfc3339(),
        }
    }

    fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Time(a), FieldValue::Time(b)) => a.cmp(b),
            (a, b) => a.text().cmp(&b.text()),
        }
    }
}

/// Named-field access for records shown in lists.
pub trait Fields {
    /// The value of `name`, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// The value of `name`, with missing fields reading as empty text.
    fn field_or_empty(&self, name: &str) -> FieldValue {
        self.field(name)
            .unwrap_or_else(|| FieldValue::Text(String::new()))
    }
}

impl<T: Fields> Fields for Entity<T> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.field(name)
    }
}

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(value.to_string()))
}

impl Fields for Customer {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => self.id.map(|id| FieldValue::Number(id as f64)),
            "firstname" => text(&self.firstname),
            "lastname" => text(&self.lastname),
            "email" => text(&self.email),
            "phone" => text(&self.phone),
            "streetaddress" => text(&self.streetaddress),
            "postcode" => text(&self.postcode),
            "city" => text(&self.city),
            _ => None,
        }
    }
}

impl Fields for Training {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => self.id.map(|id| FieldValue::Number(id as f64)),
            "date" => Some(FieldValue::Time(self.date)),
            "activity" => text(&self.activity),
            "duration" => Some(FieldValue::Number(f64::from(self.duration))),
            "customer" => Some(FieldValue::Text(self.customer_name())),
            _ => None,
        }
    }
}

impl Fields for Map<String, Value> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => text(s),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            other => Some(FieldValue::Text(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub order: SortOrder,
}

/// Search and sort settings of a list.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    query: String,
    search_fields: Vec<String>,
    any_field: bool,
    sort: Option<SortBy>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps records whose `fields`, joined with spaces, contain `query`.
    pub fn search(mut self, query: impl Into<String>, fields: &[&str]) -> Self {
        self.query = query.into().to_lowercase();
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self.any_field = false;
        self
    }

    /// Keeps records where at least one of `fields` contains `query`.
    ///
    /// Unlike [`ListView::search`], a query never matches across two fields.
    pub fn search_any(self, query: impl Into<String>, fields: &[&str]) -> Self {
        let mut view = self.search(query, fields);
        view.any_field = true;
        view
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortBy {
            field: field.into(),
            order,
        });
        self
    }

    /// Flips the order when `field` is already the sort key, otherwise sorts
    /// ascending by `field`.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = match self.sort.take() {
            Some(SortBy { field: current, order }) if current == field => Some(SortBy {
                field: current,
                order: match order {
                    SortOrder::Ascending => SortOrder::Descending,
                    SortOrder::Descending => SortOrder::Ascending,
                },
            }),
            _ => Some(SortBy {
                field: field.to_string(),
                order: SortOrder::Ascending,
            }),
        };
    }

    pub fn sort(&self) -> Option<&SortBy> {
        self.sort.as_ref()
    }

    pub fn matches<R: Fields>(&self, record: &R) -> bool {
        if self.query.is_empty() {
            return true;
        }

        if self.any_field {
            return self
                .search_fields
                .iter()
                .any(|name| record.field_or_empty(name).text().contains(&self.query));
        }

        let haystack = self
            .search_fields
            .iter()
            .map(|name| record.field_or_empty(name).text())
            .collect::<Vec<_>>()
            .join(" ");
        haystack.contains(&self.query)
    }

    /// The records to display, filtered then sorted.
    pub fn apply<'a, R: Fields>(&self, records: &'a [R]) -> Vec<&'a R> {
        let mut visible: Vec<&R> = records.iter().filter(|r| self.matches(*r)).collect();

        if let Some(sort) = &self.sort {
            visible.sort_by(|a, b| {
                let ordering = a
                    .field_or_empty(&sort.field)
                    .compare(&b.field_or_empty(&sort.field));
                match sort.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        visible
    }
}
