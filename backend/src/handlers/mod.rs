//! HTTP handlers for the ZenVit CRM API

pub mod auth;
pub mod customers;
pub mod expenses;
pub mod health;
pub mod orders;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod seed;
pub mod stock;
pub mod suppliers;
pub mod tasks;

pub use auth::*;
pub use customers::*;
pub use expenses::*;
pub use health::*;
pub use orders::*;
pub use products::*;
pub use purchases::*;
pub use reports::*;
pub use seed::*;
pub use stock::*;
pub use suppliers::*;
pub use tasks::*;
