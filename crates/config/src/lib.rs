//! Configuration loading.
//!
//! Discovers `ponte.{yaml,yml,toml,json}`, substitutes `${ENV}` placeholders
//! in the raw text, and falls back to `PONTE_*` environment variables for
//! anything the file leaves unset. The core never reads config itself; it
//! takes plain values at construction.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config, set_config_dir},
    schema::{DatabaseConfig, GatewayConfig, PonteConfig},
};
