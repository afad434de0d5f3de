//! Demo application served on top of the protocol layer.
//!
//! Routing and the register/login rules live here, behind the
//! [`crate::http::Handler`] seam — the protocol core never depends on any of
//! it.

pub mod router;
pub mod users;

pub use router::AppRouter;
pub use users::UserService;
