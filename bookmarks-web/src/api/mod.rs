//! HTTP handlers for bookmarks-web

pub mod auth;
pub mod bookmarks;
pub mod health;
pub mod session;

pub use auth::auth_routes;
pub use bookmarks::bookmark_routes;
pub use health::health_routes;
