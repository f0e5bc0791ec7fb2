mod hazards;

pub use hazards::HazardRetrieval;
