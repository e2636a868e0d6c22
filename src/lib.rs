//! Infinite-scroll trigger.
//!
//! An [`InfinityLoader`] sits at the edge of a growing list and asks its host
//! for more items whenever the scroll container brings it within reach.
//! Everything it needs from the outside world comes in through small seams:
//! a [`Dom`] for measurements, an [`IdGenerator`], a [`Clock`] for debounce
//! deadlines and an [`InfinityModel`] it only ever reads. [`Host`] wires these
//! together and plays the part of a component framework.

pub mod config;
pub mod debounce;
pub mod document;
pub mod dom;
pub mod error;
pub mod events;
pub mod guid;
pub mod host;
pub mod loader;
pub mod model;
pub mod runloop;
pub mod time;

#[cfg(test)]
mod test_utils;

pub use config::{LoaderConfig, ScrollableOption};
pub use document::{Document, Element};
pub use dom::{Dom, ElementId, ScrollTarget};
pub use error::LoaderError;
pub use events::{EventBus, EventKind};
pub use guid::{Guid, IdGenerator, SequentialIds};
pub use host::{ActionHandler, Host};
pub use loader::{InfinityLoader, LoadMore, LoaderState, Reaction, Scrollable};
pub use model::{InfinityModel, ModelSnapshot, PagedModel};
pub use time::{Clock, ManualClock, SystemClock, manual_clock, system_clock};
