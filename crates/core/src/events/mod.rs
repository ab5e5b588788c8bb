//! Domain events module.
//!
//! Provides the immutable domain event record, the typed event kind tag and
//! the in-process bus that fans events out to registered handlers in
//! priority order. Each bus owns its own handler registry, so isolated bus
//! instances can coexist.

mod domain_event;
mod event_bus;

pub use domain_event::*;
pub use event_bus::*;
