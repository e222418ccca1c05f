mod auth;
mod event;
mod payment;
mod tenant;

pub use auth::*;
pub use event::*;
pub use payment::*;
pub use tenant::*;
