//! Fallback policy and the fallback event log.

mod events;
mod policy;

pub use events::*;
pub use policy::*;
