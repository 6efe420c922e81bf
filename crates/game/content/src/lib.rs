//! Data-driven content definitions and loaders.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Species catalogs (data-driven via RON)
//! - Map layouts and monster spawn points (data-driven via RON)
//! - Game configuration (data-driven via TOML)
//!
//! Content is consumed by runtime oracles and never appears in game state.
//!
//! All loaders use game-core types directly with serde for RON/TOML deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, LoadResult, MapData, MapLoader, SpawnPoint, SpeciesLoader,
};
