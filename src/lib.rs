#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod app;
pub mod database;
pub mod schema;

pub use app::AppError;
