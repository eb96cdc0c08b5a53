//! API endpoint modules.

pub mod analyses;
pub mod health;
pub mod images;
pub mod openapi;
pub mod vehicles;

pub use analyses::configure_routes as configure_analysis_routes;
pub use health::configure_health_routes;
pub use images::configure_routes as configure_image_routes;
pub use openapi::ApiDoc;
pub use vehicles::configure_routes as configure_vehicle_routes;
