//! Persistence for boss rewards that outlive the simulation.
//!
//! The simulation worker hands every reward container produced by a boss kill
//! to a [`RewardRepository`]. Players collect them later through
//! [`RewardRepository::take`].
mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRewardRepository;
pub use memory::InMemoryRewardRepository;
pub use traits::RewardRepository;
