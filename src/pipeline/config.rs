//! Pipeline configuration types

use serde::{Deserialize, Serialize};

use crate::decompose::EntityGrouping;
use crate::grouping::GroupingConfig;
use crate::ingest::IngestConfig;
use crate::keys::{DEFAULT_MAX_KEY_COLUMNS, KeyConfig};
use crate::matching::FuzzyConfig;

/// Per-run options accepted by [`SchemaPipeline::infer`](super::SchemaPipeline::infer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Pass the generated DDL through the configured rewriter
    pub use_llm_rewrite: bool,
    /// Dialect hint for the rewriter
    pub dialect: String,
    /// Largest composite key searched for tables without a primary key
    pub max_composite_key_columns: usize,
    /// Minimum match similarity for grouping columns into entities (0.0 - 1.0)
    pub fuzzy_similarity_threshold: f64,
    /// Overrides the matcher's pair cutoff when set (0.0 - 1.0)
    pub fuzzy_match_cutoff: Option<f64>,
    /// Explicit entity groupings used when a single table is decomposed
    pub entity_groupings: Vec<EntityGrouping>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            use_llm_rewrite: false,
            dialect: "postgres".to_string(),
            max_composite_key_columns: DEFAULT_MAX_KEY_COLUMNS,
            fuzzy_similarity_threshold: 0.85,
            fuzzy_match_cutoff: None,
            entity_groupings: Vec::new(),
        }
    }
}

impl InferenceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm_rewrite(mut self, enabled: bool) -> Self {
        self.use_llm_rewrite = enabled;
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    pub fn with_max_composite_key_columns(mut self, columns: usize) -> Self {
        self.max_composite_key_columns = columns;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_similarity_threshold = threshold;
        self
    }

    pub fn with_match_cutoff(mut self, cutoff: f64) -> Self {
        self.fuzzy_match_cutoff = Some(cutoff);
        self
    }

    pub fn with_entity_grouping(mut self, grouping: EntityGrouping) -> Self {
        self.entity_groupings.push(grouping);
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.max_composite_key_columns == 0 {
            return Err("max_composite_key_columns must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.fuzzy_similarity_threshold) {
            return Err(format!(
                "fuzzy_similarity_threshold must be within [0, 1], got {}",
                self.fuzzy_similarity_threshold
            ));
        }
        if let Some(cutoff) = self.fuzzy_match_cutoff
            && !(0.0..=1.0).contains(&cutoff)
        {
            return Err(format!(
                "fuzzy_match_cutoff must be within [0, 1], got {cutoff}"
            ));
        }
        if self.dialect.trim().is_empty() {
            return Err("dialect must not be empty".to_string());
        }
        Ok(())
    }
}

/// Main pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingest: IngestConfig,
    pub keys: KeyConfig,
    pub fuzzy: FuzzyConfig,
    pub grouping: GroupingConfig,
    /// Defaults for runs that do not pass their own options
    pub options: InferenceOptions,
}

impl PipelineConfig {
    /// Create a new pipeline config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn with_keys(mut self, keys: KeyConfig) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_fuzzy(mut self, fuzzy: FuzzyConfig) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingConfig) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_options(mut self, options: InferenceOptions) -> Self {
        self.options = options;
        self
    }

    /// Matcher configuration with the run's cutoff applied
    pub fn fuzzy_for(&self, options: &InferenceOptions) -> FuzzyConfig {
        match options.fuzzy_match_cutoff {
            Some(cutoff) => self.fuzzy.clone().with_pair_cutoff(cutoff),
            None => self.fuzzy.clone(),
        }
    }

    /// Grouping configuration with the run's similarity threshold applied
    pub fn grouping_for(&self, options: &InferenceOptions) -> GroupingConfig {
        self.grouping
            .clone()
            .with_threshold(options.fuzzy_similarity_threshold)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fuzzy.max_workers == 0 {
            return Err("fuzzy.max_workers must be at least 1".to_string());
        }
        if self.grouping.min_group_size == 0 {
            return Err("grouping.min_group_size must be at least 1".to_string());
        }
        if self.ingest.allowed_extensions.is_empty() {
            return Err("ingest.allowed_extensions must not be empty".to_string());
        }
        self.options.validate()
    }
}
