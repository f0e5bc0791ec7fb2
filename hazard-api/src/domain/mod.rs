pub mod hazards;
pub mod ports;
