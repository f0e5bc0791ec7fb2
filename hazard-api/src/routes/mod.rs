pub(crate) mod error;
pub(crate) mod hazards;

pub(crate) use error::ApiError;
