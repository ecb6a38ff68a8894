pub mod catalog;
pub mod game;

pub use catalog::{CatalogDocument, PreviousCatalog};
pub use game::{GameRecord, Platform};
