//! Business logic services for the ZenVit CRM platform

pub mod auth;
pub mod automation;
pub mod catalog;
pub mod customers;
pub mod expenses;
pub mod notification;
pub mod orders;
pub mod purchasing;
pub mod reporting;
pub mod seed;
pub mod stock;
pub mod suppliers;
pub mod tasks;

pub use auth::AuthService;
pub use automation::LowStockAutomation;
pub use catalog::ProductService;
pub use customers::CustomerService;
pub use expenses::ExpenseService;
pub use notification::EmailClient;
pub use orders::OrderService;
pub use purchasing::PurchaseService;
pub use reporting::ReportingService;
pub use seed::SeedService;
pub use stock::StockService;
pub use suppliers::SupplierService;
pub use tasks::TaskService;
