// Domain layer: price and command models plus the ports the control cycle talks through.

pub mod model;
pub mod ports;
