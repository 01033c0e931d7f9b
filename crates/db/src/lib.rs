pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_config, connect_with_settings, ping, DbPool};
pub use fixtures::{seed_default_categories, SeedResult, DEFAULT_CATEGORIES};
pub use repositories::{
    ListingRepository, RepositoryError, SqlListingRepository, SqlListingWriter,
    SqlSubmissionService,
};
