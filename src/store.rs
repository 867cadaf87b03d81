pub mod dao;
pub mod memory;
pub mod models;

pub use dao::{NewsStore, PgNewsStore};
pub use models::{Article, CategoryRanking, GlobalRanking};
