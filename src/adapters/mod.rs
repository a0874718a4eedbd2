// Adapters layer: concrete provisioning backends.

pub mod pubsub_rest;

pub use pubsub_rest::{RestBackend, RestSession};
