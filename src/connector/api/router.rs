use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{CreateAdminController, ServeController, StatsController};

pub struct Router<'a> {
    serve_controller: ServeController<'a>,
    create_admin_controller: CreateAdminController<'a>,
    stats_controller: StatsController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            serve_controller: ServeController::new(container),
            create_admin_controller: CreateAdminController::new(container),
            stats_controller: StatsController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Serve { host, port } => self.serve_controller.serve(host, port).await,
            Commands::CreateAdmin {
                username,
                email,
                password,
                profile_type,
            } => {
                self.create_admin_controller
                    .create(username, email, password, profile_type)
                    .await
            }
            Commands::Stats => self.stats_controller.stats().await,
        }
    }
}
