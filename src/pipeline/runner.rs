//! Pipeline runner for the full inference flow

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::config::{InferenceOptions, PipelineConfig};
use super::error::{PipelineError, PipelineResult};
use super::result::InferenceResult;
use crate::decompose::{EntityGrouping, decompose};
use crate::export::{ExportFormat, render};
use crate::grouping::{
    CanonicalGroup, EntityGrouper, group_by_leading_token, suggest_canonical_names,
};
use crate::ingest::{
    IngestError, LocalFileReader, RawTable, SourceReader, load_table, profile_table,
};
use crate::keys::{RelationshipSuggester, deduplicate_by_confidence, find_composite_key};
use crate::matching::FuzzyValueMatcher;
use crate::models::{
    CompositeKeyFallback, ForeignKeyRef, NormalizedSchema, SchemaKeys, TableProfile,
};
use crate::overlap::{DEFAULT_OVERLAP_THRESHOLD, detect_overlapping_tables};
use crate::rewrite::{SchemaRewriter, apply_rewrite};

/// Runs file ingestion through DDL generation for one set of uploads
pub struct SchemaPipeline {
    config: PipelineConfig,
    reader: Box<dyn SourceReader>,
    rewriter: Option<Box<dyn SchemaRewriter>>,
}

impl Default for SchemaPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

struct Ingested {
    profiles: Vec<TableProfile>,
    raw: Vec<RawTable>,
}

impl SchemaPipeline {
    /// Create a pipeline reading from the local filesystem
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            reader: Box::new(LocalFileReader),
            rewriter: None,
        }
    }

    /// Read uploads through `reader` instead of the local filesystem
    pub fn with_reader(mut self, reader: impl SourceReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Rewriter used when a run asks for `use_llm_rewrite`
    pub fn with_rewriter(mut self, rewriter: impl SchemaRewriter + 'static) -> Self {
        self.rewriter = Some(Box::new(rewriter));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run with the configured default options
    pub fn infer_default<P: AsRef<Path>>(&self, paths: &[P]) -> InferenceResult {
        self.infer(paths, &self.config.options)
    }

    /// Run the full pipeline over `paths`.
    ///
    /// Never fails: unusable files end up in `rejected_files`, dropped
    /// relationships and skipped steps in `warnings`. Invalid options are
    /// reported as a warning and the configured defaults are used instead.
    pub fn infer<P: AsRef<Path>>(&self, paths: &[P], options: &InferenceOptions) -> InferenceResult {
        match options.validate() {
            Ok(()) => self.run(paths, options),
            Err(message) => {
                warn!(error = %message, "Invalid inference options, using defaults");
                let mut result = self.run(paths, &self.config.options);
                result
                    .warnings
                    .insert(0, format!("Ignored invalid options: {message}"));
                result
            }
        }
    }

    /// Like [`infer`](Self::infer), but rejects invalid configuration or
    /// options up front.
    pub fn try_infer<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &InferenceOptions,
    ) -> PipelineResult<InferenceResult> {
        self.config.validate().map_err(PipelineError::ConfigError)?;
        options.validate().map_err(PipelineError::ConfigError)?;
        Ok(self.run(paths, options))
    }

    fn run<P: AsRef<Path>>(&self, paths: &[P], options: &InferenceOptions) -> InferenceResult {
        let session_id = Uuid::new_v4().to_string();
        let _span = info_span!("inference_run", session_id = %session_id).entered();
        let start = Instant::now();
        info!(files = paths.len(), "Starting schema inference");

        let mut result = InferenceResult::new(session_id);
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        result.filenames = paths.iter().map(|p| display_name(p)).collect();

        let Ingested { mut profiles, raw } = self.ingest(&paths, &mut result);
        result.tables = profiles.iter().map(|t| t.name.clone()).collect();
        if profiles.is_empty() {
            warn!(
                rejected = result.rejected_files.len(),
                "No usable input, returning empty schema"
            );
            return result;
        }

        let suggester = RelationshipSuggester::new(self.config.keys.clone());
        let analysis = suggester.analyze(&profiles);
        debug!(aliases = ?suggester.active_aliases(&analysis), "Alias vocabulary in effect");
        for table in profiles.iter_mut() {
            if let Some(pk) = analysis.primary_keys.get(&table.name)
                && let Some(column) = table.columns.get_mut(&pk.column)
            {
                column.is_primary_key = true;
            }
        }

        result.composite_pk_fallbacks =
            composite_fallbacks(&profiles, &raw, options.max_composite_key_columns);

        let candidates = suggester.suggest_with(&profiles, &analysis);
        result.relationships = deduplicate_by_confidence(&candidates);
        result.overlaps = detect_overlapping_tables(&profiles, DEFAULT_OVERLAP_THRESHOLD);

        let grouping_config = self.config.grouping_for(options);
        let matcher = FuzzyValueMatcher::new(self.config.fuzzy_for(options));
        let matches = matcher.find_matches(&profiles, &raw);
        let mut groups = EntityGrouper::new(grouping_config.clone()).group(&matches);
        if groups.is_empty() {
            debug!("No value-based groups, grouping by leading name token");
            groups = group_by_leading_token(&profiles, grouping_config.min_group_size);
        }
        let canonical = suggest_canonical_names(&groups, &grouping_config);

        // a single table is split along the groups, several are annotated
        let final_tables = if profiles.len() == 1 {
            let table = &profiles[0];
            let groupings = if options.entity_groupings.is_empty() {
                canonical
                    .iter()
                    .map(|group| EntityGrouping::from_canonical(group, table))
                    .filter(|grouping| {
                        !grouping.primary_key.is_empty()
                            && !grouping
                                .primary_key
                                .iter()
                                .any(|pk| table.column(pk).is_some_and(|c| c.is_primary_key))
                    })
                    .collect()
            } else {
                options.entity_groupings.clone()
            };
            decompose(table, &groupings)
        } else {
            stamp_canonical_names(&mut profiles, &canonical);
            profiles
        };

        let nullable_threshold = self.config.ingest.nullable_threshold;
        let schema = NormalizedSchema::from_profiles(&final_tables, nullable_threshold);
        let mut keys = SchemaKeys::new();
        let mut proposed = Vec::new();
        for table in &final_tables {
            for column in table.columns.values() {
                if column.is_primary_key {
                    keys.add_primary_key(&table.name, &column.name);
                }
                if let Some((target_table, target_column)) = column
                    .is_foreign_key_to
                    .as_deref()
                    .and_then(|target| target.split_once('.'))
                {
                    proposed.push(ForeignKeyRef::new(
                        (table.name.as_str(), column.name.as_str()),
                        (target_table, target_column),
                    ));
                }
            }
        }
        proposed.extend(result.relationships.iter().map(|c| {
            ForeignKeyRef::new(
                (c.source_table.as_str(), c.source_column.as_str()),
                (c.target_table.as_str(), c.target_column.as_str()),
            )
        }));
        let (foreign_keys, fk_warnings) = resolve_foreign_keys(&schema, proposed);
        keys.foreign_keys = foreign_keys;
        result.warnings.extend(fk_warnings);

        let fallbacks = applicable_fallbacks(&schema, &keys, &result.composite_pk_fallbacks);
        let sql = render(ExportFormat::Sql, &schema, &keys, &fallbacks).content;
        result.diagram = render(ExportFormat::Mermaid, &schema, &keys, &fallbacks).content;
        result.dbml = render(ExportFormat::Dbml, &schema, &keys, &fallbacks).content;

        result.sql = if options.use_llm_rewrite {
            let (sql, warning) = apply_rewrite(self.rewriter.as_deref(), &sql, &options.dialect);
            result.warnings.extend(warning);
            sql
        } else {
            sql
        };

        info!(
            tables = schema.tables.len(),
            foreign_keys = keys.foreign_keys.len(),
            rejected = result.rejected_files.len(),
            warnings = result.warnings.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Schema inference completed"
        );
        result
    }

    fn ingest(&self, paths: &[PathBuf], result: &mut InferenceResult) -> Ingested {
        let mut profiles: Vec<TableProfile> = Vec::new();
        let mut raw: Vec<RawTable> = Vec::new();

        for path in paths {
            let filename = display_name(path);
            let outcome = load_table(self.reader.as_ref(), path, &self.config.ingest).and_then(
                |table| {
                    if profiles.iter().any(|p| p.name == table.name) {
                        return Err(IngestError::DuplicateTable(table.name.clone()));
                    }
                    let profile = profile_table(&table, &self.config.ingest)
                        .with_source_path(path.display().to_string());
                    if profile.is_empty() {
                        return Err(IngestError::Empty);
                    }
                    Ok((profile, table))
                },
            );

            match outcome {
                Ok((profile, table)) => {
                    info!(
                        file = %filename,
                        table = %profile.name,
                        columns = profile.columns.len(),
                        rows = table.row_count(),
                        "File profiled"
                    );
                    profiles.push(profile);
                    raw.push(table);
                }
                Err(e) => {
                    warn!(file = %filename, reason = %e, "File rejected");
                    let key = if result.rejected_files.contains_key(&filename) {
                        path.display().to_string()
                    } else {
                        filename
                    };
                    result.rejected_files.insert(key, e.to_string());
                }
            }
        }

        Ingested { profiles, raw }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Composite key for every table without a primary key, searched over its
/// profiled columns only.
fn composite_fallbacks(
    profiles: &[TableProfile],
    raw: &[RawTable],
    max_columns: usize,
) -> IndexMap<String, CompositeKeyFallback> {
    let mut fallbacks = IndexMap::new();
    for (profile, table) in profiles.iter().zip(raw) {
        if !profile.primary_key_columns().is_empty() {
            continue;
        }
        let columns = find_composite_key(&table.select(profile.column_names()), max_columns);
        if columns.is_empty() {
            info!(table = %profile.name, max_columns, "No primary key or composite key found");
            continue;
        }
        debug!(table = %profile.name, columns = ?columns, "Using composite key fallback");
        fallbacks.insert(profile.name.clone(), CompositeKeyFallback::new(columns));
    }
    fallbacks
}

/// Fallbacks that still apply to the final schema: the table exists, has no
/// selected key, and still holds every fallback column.
fn applicable_fallbacks(
    schema: &NormalizedSchema,
    keys: &SchemaKeys,
    fallbacks: &IndexMap<String, CompositeKeyFallback>,
) -> IndexMap<String, CompositeKeyFallback> {
    fallbacks
        .iter()
        .filter(|(table, fallback)| {
            keys.selected_primary_key(table).is_empty()
                && fallback
                    .columns
                    .iter()
                    .all(|column| schema.contains_column(table, column))
        })
        .map(|(table, fallback)| (table.clone(), fallback.clone()))
        .collect()
}

fn stamp_canonical_names(profiles: &mut [TableProfile], groups: &[CanonicalGroup]) {
    for group in groups {
        for qualified in &group.columns {
            let Some((table, column)) = qualified.split_once('.') else {
                continue;
            };
            if let Some(column) = profiles
                .iter_mut()
                .find(|t| t.name == table)
                .and_then(|t| t.columns.get_mut(column))
            {
                column.canonical_name = Some(group.entity_name.clone());
            }
        }
    }
}

/// Check proposed foreign keys against the final schema.
///
/// Exact duplicates collapse to one. Of two keys referencing each other
/// only the first is kept. Keys whose source or target is missing from
/// `schema` are dropped with a warning.
pub fn resolve_foreign_keys(
    schema: &NormalizedSchema,
    proposed: Vec<ForeignKeyRef>,
) -> (Vec<ForeignKeyRef>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut kept: Vec<ForeignKeyRef> = Vec::new();
    let mut seen: HashSet<ForeignKeyRef> = HashSet::new();

    for fk in proposed.into_iter().collect::<IndexSet<_>>() {
        let source = format!("{}.{}", fk.source_table, fk.source_column);
        let target = format!("{}.{}", fk.target_table, fk.target_column);

        if !schema.contains_table(&fk.target_table) {
            warnings.push(format!(
                "{source} appears to reference {target}, but no such table was uploaded."
            ));
            continue;
        }
        if !schema.contains_column(&fk.target_table, &fk.target_column) {
            warnings.push(format!(
                "{source} appears to reference {target}, but no such column exists."
            ));
            continue;
        }
        if !schema.contains_column(&fk.source_table, &fk.source_column) {
            warnings.push(format!(
                "{source} appears to reference {target}, but {source} is not in the final schema."
            ));
            continue;
        }

        let reverse = ForeignKeyRef::new(
            (fk.target_table.as_str(), fk.target_column.as_str()),
            (fk.source_table.as_str(), fk.source_column.as_str()),
        );
        if seen.contains(&reverse) {
            warnings.push(format!(
                "{source} and {target} reference each other; keeping only {target} -> {source}."
            ));
            continue;
        }

        seen.insert(fk.clone());
        kept.push(fk);
    }

    (kept, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sql::SUGGESTED_PREFIX;
    use crate::models::{ColumnSpec, SqlType};
    use crate::rewrite::RewriteError;
    use crate::rewrite::tests::MockRewriter;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn schema() -> NormalizedSchema {
        let mut schema = NormalizedSchema::new();
        let mut customers = IndexMap::new();
        customers.insert("id".to_string(), ColumnSpec::new(SqlType::Int, false));
        schema.insert_table("customers", customers);
        let mut orders = IndexMap::new();
        orders.insert("id".to_string(), ColumnSpec::new(SqlType::Int, false));
        orders.insert("customer_id".to_string(), ColumnSpec::new(SqlType::Int, false));
        schema.insert_table("orders", orders);
        schema
    }

    #[test]
    fn test_resolve_dangling_and_duplicates() {
        let fk = ForeignKeyRef::new(("orders", "customer_id"), ("customers", "id"));
        let proposed = vec![
            fk.clone(),
            fk.clone(),
            ForeignKeyRef::new(("orders", "product_id"), ("products", "id")),
            ForeignKeyRef::new(("orders", "customer_id"), ("customers", "uuid")),
        ];
        let (kept, warnings) = resolve_foreign_keys(&schema(), proposed);
        assert_eq!(kept, vec![fk]);
        assert_eq!(
            warnings,
            vec![
                "orders.product_id appears to reference products.id, but no such table was uploaded.",
                "orders.customer_id appears to reference customers.uuid, but no such column exists.",
            ]
        );
    }

    #[test]
    fn test_resolve_mutual_references() {
        let proposed = vec![
            ForeignKeyRef::new(("orders", "id"), ("customers", "id")),
            ForeignKeyRef::new(("customers", "id"), ("orders", "id")),
        ];
        let (kept, warnings) = resolve_foreign_keys(&schema(), proposed);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_table, "orders");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("reference each other"));
    }

    #[test]
    fn test_infer_two_tables() {
        let dir = tempfile::tempdir().unwrap();
        let customers = write_file(
            &dir,
            "customers.csv",
            "id,name\n1,Alice\n2,Bob\n3,Carol\n4,Dan\n",
        );
        let orders = write_file(
            &dir,
            "orders.csv",
            "id,customer_id,amount\n10,1,5.5\n11,1,7.25\n12,2,3.0\n13,3,9.75\n",
        );

        let result = SchemaPipeline::default().infer(&[customers, orders], &InferenceOptions::default());
        assert!(result.rejected_files.is_empty());
        assert_eq!(result.tables, vec!["customers", "orders"]);
        assert!(result.sql.contains("CREATE TABLE customers ("));
        assert!(result.sql.contains(
            "ALTER TABLE orders ADD FOREIGN KEY (customer_id) REFERENCES customers (id);"
        ));
        assert_eq!(
            result
                .sql
                .matches("ALTER TABLE orders ADD FOREIGN KEY (customer_id)")
                .count(),
            1
        );
        assert!(result.diagram.starts_with("erDiagram"));
        assert!(result.diagram.contains("customers ||--o{ orders : has"));
        assert!(result.dbml.contains("Ref: orders.customer_id > customers.id"));
        assert!(result.overlaps.iter().any(|o| o.table_a == "customers" && o.table_b == "orders"));
    }

    #[test]
    fn test_rejections_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "people.csv", "id,name\n1,a\n2,b\n");
        let notes = write_file(&dir, "notes.txt", "hello");
        let blank = write_file(&dir, "blank.csv", "a,b\n,\n");
        let missing = dir.path().join("missing.csv");

        let result = SchemaPipeline::default().infer(
            &[good, notes, blank, missing],
            &InferenceOptions::default(),
        );
        assert_eq!(result.tables, vec!["people"]);
        assert_eq!(result.filenames.len(), 4);
        assert_eq!(result.rejected_files["notes.txt"], "Unsupported file format");
        assert_eq!(result.rejected_files["blank.csv"], "No data after cleaning");
        assert!(result.rejected_files["missing.csv"].starts_with("File read error"));
    }

    #[test]
    fn test_duplicate_table_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_file(&dir, "items.csv", "id,label\n1,a\n2,b\n");
        let json = write_file(&dir, "items.json", r#"[{"id": 1, "label": "a"}, {"id": 2, "label": "b"}]"#);

        let result = SchemaPipeline::default().infer(&[csv, json], &InferenceOptions::default());
        assert_eq!(result.tables, vec!["items"]);
        assert_eq!(result.rejected_files["items.json"], "Duplicate table name 'items'");
    }

    #[test]
    fn test_all_rejected_returns_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let notes = write_file(&dir, "notes.md", "# nothing");
        let result = SchemaPipeline::default().infer(&[notes], &InferenceOptions::default());
        assert!(result.sql.is_empty());
        assert!(result.diagram.is_empty());
        assert!(!result.has_schema());
        assert_eq!(result.rejected_files.len(), 1);
    }

    #[test]
    fn test_rewrite_applied_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "people.csv", "id,name\n1,a\n2,b\n");
        let options = InferenceOptions::new().with_llm_rewrite(true);

        let accepted = SchemaPipeline::default()
            .with_rewriter(MockRewriter::returning("CREATE TABLE people (id INT PRIMARY KEY);"))
            .infer(&[&path], &options);
        assert_eq!(accepted.sql, "CREATE TABLE people (id INT PRIMARY KEY);\n");
        assert!(accepted.warnings.is_empty());

        let failed = SchemaPipeline::default()
            .with_rewriter(MockRewriter::failing(RewriteError::Timeout(5)))
            .infer(&[&path], &options);
        assert!(failed.sql.starts_with("CREATE TABLE people (\n"));
        assert!(failed.warnings.iter().any(|w| w.contains("timed out")));

        let unconfigured = SchemaPipeline::default().infer(&[&path], &options);
        assert!(unconfigured.sql.starts_with("CREATE TABLE people (\n"));
        assert_eq!(unconfigured.warnings.len(), 1);
    }

    #[test]
    fn test_canonical_names_only_annotate_multiple_tables() {
        let dir = tempfile::tempdir().unwrap();
        let people = write_file(
            &dir,
            "people.csv",
            "id,city_name,city_code\n1,Berlin,1\n2,Berlin,1\n3,Paris,2\n",
        );
        let single = SchemaPipeline::default().infer(&[&people], &InferenceOptions::default());
        assert_eq!(single.tables, vec!["people"]);
        assert!(!single.sql.contains(SUGGESTED_PREFIX));

        let customers = write_file(&dir, "customers.csv", "id,city_name\n1,Berlin\n2,Berlin\n3,Paris\n");
        let shops = write_file(&dir, "shops.csv", "id,city_code\n10,1\n11,1\n12,2\n");
        let multi = SchemaPipeline::default().infer(&[customers, shops], &InferenceOptions::default());
        assert_eq!(multi.tables, vec!["customers", "shops"]);
        assert!(multi.sql.contains(SUGGESTED_PREFIX));
    }

    #[test]
    fn test_try_infer_rejects_bad_options() {
        let options = InferenceOptions::new().with_max_composite_key_columns(0);
        let paths: [&str; 0] = [];
        let err = SchemaPipeline::default().try_infer(&paths, &options).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));

        let result = SchemaPipeline::default().infer(&paths, &options);
        assert!(result.warnings[0].starts_with("Ignored invalid options"));
    }
}
