//! NewsPulse backend: seeded in-memory news store, liveness updater,
//! streaming chat relay and the Rocket HTTP surface over them.

pub mod error;
pub mod relay;
pub mod server;
pub mod store;
pub mod updater;
