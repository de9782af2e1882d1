pub mod constraint_applier;
pub mod duration_parser;
pub mod fallback_scorer;
pub mod folder_classifier;
pub mod prompt_compiler;
pub mod response_parser;
pub mod topic_normalizer;

pub use constraint_applier::apply_constraint;
pub use duration_parser::parse_duration_constraint;
pub use fallback_scorer::{synthesize_label, FallbackScorer, ScoredItem};
pub use folder_classifier::{resolve_label, validate_label, Classification, FolderClassifier};
pub use prompt_compiler::{compile_curation_prompt, compile_single_item_prompt, SingleItemRequest};
pub use response_parser::parse_curation_reply;
pub use topic_normalizer::TopicNormalizer;
