// Domain layer: value types and the ports the remote-call collaborator implements.

pub mod model;
pub mod ports;
