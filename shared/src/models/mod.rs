//! Domain models for the ZenVit CRM platform

pub mod customer;
pub mod expense;
pub mod order;
pub mod product;
pub mod purchase;
pub mod stock;
pub mod supplier;
pub mod task;
pub mod user;

pub use customer::*;
pub use expense::*;
pub use order::*;
pub use product::*;
pub use purchase::*;
pub use stock::*;
pub use supplier::*;
pub use task::*;
pub use user::*;
