pub mod dimension;
pub mod ids;
pub mod media;

pub use dimension::Dimension;
pub use ids::{DimensionValueId, MediaId};
pub use media::{round_score, Media};
