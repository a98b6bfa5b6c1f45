mod activity;
mod customer;
mod entity;
mod training;

pub use activity::Activity;
pub use customer::Customer;
pub use entity::{Entity, Link, Links, Resource, SELF_REL};
pub use training::{CustomerRef, Training, UNKNOWN_CUSTOMER};
