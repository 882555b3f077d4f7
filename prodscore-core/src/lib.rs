pub mod calculations;
pub mod db;
pub mod input;
pub mod models;
pub mod tracker;
pub mod widget;

pub use db::repository::{ProdScoreRepository, RepositoryError};
pub use models::*;
pub use tracker::{Tracker, TrackerError};
