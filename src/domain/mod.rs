// Domain layer: value types, wire shapes and the provider ports.

pub mod address;
pub mod geojson;
pub mod model;
pub mod ports;
pub mod response;
