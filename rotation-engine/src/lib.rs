//! # rotation-engine
//!
//! Sail rotation assignment for fleet-racing and team-racing regattas.
//!
//! Given races, teams and an ordered list of sails, compute which sail each
//! team uses in each race:
//! - [`creator::FleetRotationCreator`] fills a whole fleet regatta from a
//!   [`config::RotationConfiguration`] (standard, combined, franny)
//! - [`manager::RotationManager`] builds explicit rotation tables, copies
//!   rotations between divisions with an offset, and renumbers sails
//! - [`team_rotation::assign_sails`] assigns boats for a team-racing round
//!
//! All writes are staged and committed as one [`store::Batch`] through the
//! [`store::RotationStore`] port. The engine does no locking: at most one
//! writer per regatta at a time.

pub mod config;
pub mod creator;
pub mod error;
pub mod manager;
pub mod persistence;
pub mod races_rotator;
pub mod regatta;
pub mod sails_rotator;
pub mod store;
pub mod team_rotation;

pub use config::{RotationConfiguration, RotationStyle, RotationType};
pub use creator::FleetRotationCreator;
pub use error::{Result, RotationError};
pub use manager::{Participants, RotationManager};
pub use regatta::{RaceId, Regatta, Scoring, Slot, TeamId};
pub use store::{Assignment, Batch, MemoryStore, RotationStore};
pub use team_rotation::{assign_sails, Frequency, RaceOrderTemplate, Round, TeamRotation};

pub use sail_types::{Division, Sail};
