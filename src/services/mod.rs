//! Business logic services.

pub mod ad_selector;
pub mod ads;
pub mod categories;
pub mod config_resolver;
pub mod creatives;
pub mod delivery_configs;
