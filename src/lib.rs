pub mod backup;
pub mod categorize;
pub mod config;
pub mod import;
pub mod model;
pub mod notion;
pub mod stats;
pub mod storefront;
