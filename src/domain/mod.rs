// Domain layer: fee schedule models, request/response envelopes and the ports the engine depends on.

pub mod model;
pub mod ports;
pub mod request;
pub mod response;
pub mod tables;
