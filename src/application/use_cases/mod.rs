mod authenticate_user;
mod base_info;
mod login;
mod manage_offers;
mod manage_orders;
mod manage_profiles;
mod manage_reviews;
pub mod permissions;
mod register_user;

pub use authenticate_user::*;
pub use base_info::*;
pub use login::*;
pub use manage_offers::*;
pub use manage_orders::*;
pub use manage_profiles::*;
pub use manage_reviews::*;
pub use register_user::*;
