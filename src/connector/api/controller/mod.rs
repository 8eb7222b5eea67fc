pub mod create_admin_controller;
pub mod serve_controller;
pub mod stats_controller;

pub use create_admin_controller::CreateAdminController;
pub use serve_controller::ServeController;
pub use stats_controller::StatsController;
