//! Traits describing the world services the AI consumes.
//!
//! Oracles expose static map geometry, path search, the species catalog,
//! script hooks and configuration. The [`Env`] aggregate bundles them so the
//! engine can reach everything it needs without coupling to concrete
//! implementations.
mod config;
mod error;
mod map;
mod path;
mod rng;
mod scripts;
mod species;

pub use config::ConfigOracle;
pub use error::OracleError;
pub use map::{MapDimensions, MapOracle, StaticTile, TileFlags};
pub use path::{FindPathParams, PathOracle};
pub use rng::{PcgRng, RngOracle, shuffle};
pub use scripts::{HookOutcome, NoScripts, ScriptError, ScriptEvent, ScriptOracle};
pub use species::SpeciesOracle;

/// Aggregates read-only oracles required by the engine.
pub struct Env<'a, M, P, S, X, C>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    X: ScriptOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
    map: Option<&'a M>,
    paths: Option<&'a P>,
    species: Option<&'a S>,
    scripts: Option<&'a X>,
    config: Option<&'a C>,
}

impl<M, P, S, X, C> Clone for Env<'_, M, P, S, X, C>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    X: ScriptOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, P, S, X, C> Copy for Env<'_, M, P, S, X, C>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    X: ScriptOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
}

pub type GameEnv<'a> = Env<
    'a,
    dyn MapOracle + 'a,
    dyn PathOracle + 'a,
    dyn SpeciesOracle + 'a,
    dyn ScriptOracle + 'a,
    dyn ConfigOracle + 'a,
>;

impl<'a, M, P, S, X, C> Env<'a, M, P, S, X, C>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    X: ScriptOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
    pub fn new(
        map: Option<&'a M>,
        paths: Option<&'a P>,
        species: Option<&'a S>,
        scripts: Option<&'a X>,
        config: Option<&'a C>,
    ) -> Self {
        Self {
            map,
            paths,
            species,
            scripts,
            config,
        }
    }

    pub fn with_all(
        map: &'a M,
        paths: &'a P,
        species: &'a S,
        scripts: &'a X,
        config: &'a C,
    ) -> Self {
        Self::new(
            Some(map),
            Some(paths),
            Some(species),
            Some(scripts),
            Some(config),
        )
    }

    pub fn empty() -> Self {
        Self {
            map: None,
            paths: None,
            species: None,
            scripts: None,
            config: None,
        }
    }

    /// Returns the MapOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::MapNotAvailable` if no map oracle was provided.
    pub fn map(&self) -> Result<&'a M, OracleError> {
        self.map.ok_or(OracleError::MapNotAvailable)
    }

    /// Returns the PathOracle, or an error if not available.
    pub fn paths(&self) -> Result<&'a P, OracleError> {
        self.paths.ok_or(OracleError::PathNotAvailable)
    }

    /// Returns the SpeciesOracle, or an error if not available.
    pub fn species(&self) -> Result<&'a S, OracleError> {
        self.species.ok_or(OracleError::SpeciesNotAvailable)
    }

    /// Returns the ScriptOracle, or an error if not available.
    pub fn scripts(&self) -> Result<&'a X, OracleError> {
        self.scripts.ok_or(OracleError::ScriptsNotAvailable)
    }

    /// Returns the ConfigOracle, or an error if not available.
    pub fn config(&self) -> Result<&'a C, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }
}

impl<'a, M, P, S, X, C> Env<'a, M, P, S, X, C>
where
    M: MapOracle + 'a,
    P: PathOracle + 'a,
    S: SpeciesOracle + 'a,
    X: ScriptOracle + 'a,
    C: ConfigOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv` (consumes self).
    pub fn into_game_env(self) -> GameEnv<'a> {
        self.as_game_env()
    }

    /// Converts this environment into a trait-object based `GameEnv` (borrows self).
    pub fn as_game_env(&self) -> GameEnv<'a> {
        let map: Option<&'a dyn MapOracle> = self.map.map(|map| map as _);
        let paths: Option<&'a dyn PathOracle> = self.paths.map(|paths| paths as _);
        let species: Option<&'a dyn SpeciesOracle> = self.species.map(|species| species as _);
        let scripts: Option<&'a dyn ScriptOracle> = self.scripts.map(|scripts| scripts as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|config| config as _);
        Env::new(map, paths, species, scripts, config)
    }
}
