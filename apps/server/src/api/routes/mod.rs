pub mod admin;
pub mod businesses;

pub use admin::admin_routes;
pub use businesses::business_routes;
