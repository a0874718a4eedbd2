// Domain layer: descriptor types and the backend ports the orchestrator drives.

pub mod model;
pub mod ports;
