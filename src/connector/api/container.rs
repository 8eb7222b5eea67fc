use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::{
    AuthenticateUserUseCase, BaseInfoUseCase, CredentialService, LoginUseCase, ManageOffersUseCase,
    ManageOrdersUseCase, ManageProfilesUseCase, ManageReviewsUseCase, OfferRepository, OrderRepository,
    ProfileRepository, RegisterUserUseCase, ReviewRepository, UserRepository,
};
use crate::connector::adapter::{
    DuckdbOfferRepository, DuckdbOrderRepository, DuckdbProfileRepository, DuckdbReviewRepository,
    DuckdbUserRepository, Sha256Credentials, DEFAULT_ITERATIONS,
};

pub const DATABASE_FILE: &str = "coderr.duckdb";

#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep everything in an in-memory DuckDB; nothing survives the process.
    pub memory_storage: bool,
    pub password_iterations: u32,
}

impl ContainerConfig {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            memory_storage: false,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            data_dir: String::new(),
            memory_storage: true,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations;
        self
    }
}

/// Wires the DuckDB adapters into use cases. Cheap to clone; shared as
/// the HTTP application state.
#[derive(Clone)]
pub struct Container {
    user_repo: Arc<dyn UserRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    offer_repo: Arc<dyn OfferRepository>,
    order_repo: Arc<dyn OrderRepository>,
    review_repo: Arc<dyn ReviewRepository>,
    credentials: Arc<dyn CredentialService>,
    config: Arc<ContainerConfig>,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let users = if config.memory_storage {
            debug!("Using in-memory DuckDB storage");
            DuckdbUserRepository::in_memory()?
        } else {
            let data_dir = PathBuf::from(&config.data_dir);
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
            let db_path = data_dir.join(DATABASE_FILE);
            debug!("Using DuckDB storage at {:?}", db_path);
            DuckdbUserRepository::new(&db_path)?
        };

        // All adapters share one connection: DuckDB allows a single writer per file.
        let shared_conn = users.shared_connection();
        let profile_repo = Arc::new(DuckdbProfileRepository::with_connection(Arc::clone(&shared_conn)));
        let offer_repo = Arc::new(DuckdbOfferRepository::with_connection(Arc::clone(&shared_conn)).await?);
        let order_repo = Arc::new(DuckdbOrderRepository::with_connection(Arc::clone(&shared_conn)).await?);
        let review_repo = Arc::new(DuckdbReviewRepository::with_connection(shared_conn).await?);
        let credentials = Arc::new(Sha256Credentials::with_iterations(config.password_iterations));

        Ok(Self {
            user_repo: Arc::new(users),
            profile_repo,
            offer_repo,
            order_repo,
            review_repo,
            credentials,
            config: Arc::new(config),
        })
    }

    pub fn register_use_case(&self) -> RegisterUserUseCase {
        RegisterUserUseCase::new(
            self.user_repo.clone(),
            self.profile_repo.clone(),
            self.credentials.clone(),
        )
    }

    pub fn login_use_case(&self) -> LoginUseCase {
        LoginUseCase::new(self.user_repo.clone(), self.credentials.clone())
    }

    pub fn authenticate_use_case(&self) -> AuthenticateUserUseCase {
        AuthenticateUserUseCase::new(self.user_repo.clone())
    }

    pub fn profiles_use_case(&self) -> ManageProfilesUseCase {
        ManageProfilesUseCase::new(self.profile_repo.clone())
    }

    pub fn offers_use_case(&self) -> ManageOffersUseCase {
        ManageOffersUseCase::new(self.offer_repo.clone(), self.profile_repo.clone())
    }

    pub fn orders_use_case(&self) -> ManageOrdersUseCase {
        ManageOrdersUseCase::new(
            self.order_repo.clone(),
            self.offer_repo.clone(),
            self.profile_repo.clone(),
        )
    }

    pub fn reviews_use_case(&self) -> ManageReviewsUseCase {
        ManageReviewsUseCase::new(self.review_repo.clone(), self.profile_repo.clone())
    }

    pub fn base_info_use_case(&self) -> BaseInfoUseCase {
        BaseInfoUseCase::new(
            self.review_repo.clone(),
            self.profile_repo.clone(),
            self.offer_repo.clone(),
        )
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }

    pub fn memory_storage(&self) -> bool {
        self.config.memory_storage
    }
}
