//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Arrival timestamps are wall-clock UTC with microsecond resolution
//! - Captured once at push; used for staleness evaluation and forwarded
//!   verbatim, never mutated afterward

mod channel_id;
mod error;
mod plan;
mod record;
mod severity;
mod sink;

pub use channel_id::ChannelId;
pub use error::ContractError;
pub use plan::{DispatchPlan, DispatcherConfig, DispatcherSpec, SinkSpec, SinkType};
pub use record::SinkRecord;
pub use severity::Severity;
pub use sink::*;
