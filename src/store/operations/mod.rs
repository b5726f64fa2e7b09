pub mod progress;
pub mod records;
pub mod review_digests;
pub mod study_configs;
pub mod words;
