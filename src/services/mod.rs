//! Business-logic services wrapping the storage layer.

pub mod counter;
pub mod pruner;
pub mod secret;

pub use counter::CounterService;
pub use pruner::PruneScheduler;
pub use secret::SecretService;
