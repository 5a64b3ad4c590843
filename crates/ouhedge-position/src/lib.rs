//! Position lifecycle management.
//!
//! The decision core of the bot:
//! - `PositionRegistry`: the set of markets currently under management
//! - `StopLossPolicy`: time-decayed hedge adjustment for one-sided fills
//! - entry sizing and pair math
//! - `PositionEngine`: the per-iteration state machine driving open,
//!   monitor, stop-loss/hedge and close/remove transitions

pub mod engine;
pub mod error;
pub mod registry;
pub mod sizing;
pub mod stop_loss;

pub use engine::PositionEngine;
pub use error::{PositionError, Result};
pub use registry::{FilledLeg, Position, PositionRegistry, PositionState};
pub use sizing::{entry_stake, plan_entry, EntryPlan, SizingConfig};
pub use stop_loss::{HedgeAdjustment, StopLossConfig, StopLossPolicy};
