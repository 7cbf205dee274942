// Domain layer: models and ports. Adapters under `crate::adapters` implement the ports.

pub mod model;
pub mod ports;
