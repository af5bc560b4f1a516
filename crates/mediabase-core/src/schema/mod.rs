pub mod db;
pub mod migrations;

pub use db::{Database, Resolved};
pub use migrations::{Migration, MIGRATIONS, TABLES};
