pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    AuthenticateUserUseCase, BaseInfoUseCase, CredentialService, LoginUseCase, ManageOffersUseCase,
    ManageOrdersUseCase, ManageProfilesUseCase, ManageReviewsUseCase, OfferRepository, OrderRepository,
    ProfileRepository, RegisterUserUseCase, ReviewRepository, UserRepository,
};

pub use connector::{
    build_router, Container, ContainerConfig, DuckdbOfferRepository, DuckdbOrderRepository,
    DuckdbProfileRepository, DuckdbReviewRepository, DuckdbUserRepository, Sha256Credentials,
};

pub use domain::{
    BaseInfo, DomainError, FieldErrors, Offer, OfferDetail, OfferQuery, OfferType, Order, OrderStatus,
    Profile, ProfileType, Review, ReviewQuery, User,
};
