pub mod auth;
pub mod context;
pub mod error;
pub mod movie;
pub mod options;
pub mod traits;
pub mod transport;
