// Domain layer: step/report models and the command-runner port.

pub mod model;
pub mod ports;
