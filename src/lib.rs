pub mod aggregate;
pub mod cli_app;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod notion;
pub mod paginate;
pub mod reconcile;
pub mod sync;
pub mod whoop;
pub mod window;
