pub mod model;
pub mod normalizer;
pub mod value;

pub use model::*;
pub use normalizer::normalize_countries;
