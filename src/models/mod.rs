//! Database models and DTOs for ads, categories and delivery configuration.

pub mod ad;
pub mod category;
pub mod delivery_config;
