// Domain layer: quota models and the ports to the cloud APIs.

pub mod model;
pub mod ports;
