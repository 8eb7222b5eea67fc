mod base_info;
mod offer;
mod order;
mod review;
mod user;

pub use base_info::*;
pub use offer::*;
pub use order::*;
pub use review::*;
pub use user::*;
