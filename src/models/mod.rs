pub mod constraint;
pub mod corpus;
pub mod curation;
pub mod loaders;
pub mod media;

pub use constraint::{DurationConstraint, Objective};
pub use corpus::Corpus;
pub use curation::{
    BatchCompleted, BatchJob, BatchOutcome, BatchSelection, BatchStatus, CuratedItem,
    CurationResult, CurationSource, BATCH_SIZE,
};
pub use loaders::load_corpus;
pub use media::{Category, MediaItem, DEFAULT_CATEGORY, RESERVED_CATEGORIES};
