// Domain layer: core models and the strategy port. No I/O lives here.

pub mod model;
pub mod ports;
