pub const CONFIG_VERSIONS: &str = "config_versions";

pub const WORD_PROGRESS: &str = "word_progress";
pub const PROGRESS_DUE_INDEX: &str = "progress_due_index";
pub const LEARNING_RECORDS: &str = "learning_records";
pub const STUDY_CONFIGS: &str = "study_configs";

// Catalog
pub const WORDS: &str = "words";
pub const WORDS_BY_RANK: &str = "words_by_rank";

// Worker output
pub const REVIEW_DIGESTS: &str = "review_digests";
