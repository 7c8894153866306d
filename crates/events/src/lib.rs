//! Config-change events and the in-process event bus.

pub mod bus;
pub mod notifier;

pub use bus::{ConfigChangeEvent, EventBus};
pub use notifier::{ConfigChangeNotifier, NotifyScope};
