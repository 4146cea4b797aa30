//! Runtime-free core of the call relay: the durable call-log records and the
//! storage contracts the signaling runtime talks to.

pub mod store;
pub mod types;
