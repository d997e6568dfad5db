pub mod catalog;
pub mod plant;
pub mod projection;
pub mod similarity;

pub use catalog::PlantCatalog;
pub use plant::{Plant, PlantDetails, PlantImage};
pub use projection::{Projection, ProjectionPoint, ProjectionSet};
pub use similarity::{round_score, SimilarityMatrix};
