//! Prompt template and response extraction for DDL rewriting

/// Marker preceding the rewritten DDL in a response
pub const BEGIN_MARKER: &str = "--BEGIN CLEANED SQL--";
/// Marker following the rewritten DDL in a response
pub const END_MARKER: &str = "--END CLEANED SQL--";

/// Prompt template for DDL rewriting
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"You are a database architect. Rewrite the schema below as a normalized (3NF) design for {dialect}.

## Rules
1. Keep every table and column of the input unless it is moved to a new table
2. Declare explicit primary keys and foreign key constraints
3. Split repeated or multi-valued data into separate tables
4. Use data types native to {dialect}
5. Place CREATE INDEX statements after the table definitions
6. Do not explain the result

## Dialect Requirements
{requirements}

## Output
Return the DDL between these markers and nothing else:
--BEGIN CLEANED SQL--
<DDL>
--END CLEANED SQL--

## Input Schema
```sql
{schema}
```"#;

/// Dialect-specific guidance for the prompt
pub fn dialect_requirements(dialect: &str) -> Option<&'static str> {
    let text = match dialect.trim().to_lowercase().as_str() {
        "postgres" | "postgresql" => {
            "PostgreSQL: identity columns (GENERATED ALWAYS AS IDENTITY), TEXT, TIMESTAMPTZ, JSONB where structured, GIN or BRIN indexes where useful, ValidFrom/ValidTo columns for history."
        }
        "mysql" => {
            "MySQL 8: AUTO_INCREMENT keys, InnoDB engine, utf8mb4 collation, DATETIME(6), BTREE indexes, ValidFrom/ValidTo timestamp ranges."
        }
        "sqlite" => {
            "SQLite: INTEGER PRIMARY KEY AUTOINCREMENT, TEXT, NUMERIC and REAL affinities, FOREIGN KEY clauses (enforced via PRAGMA), created_at/updated_at columns."
        }
        "oracle" => {
            "Oracle: NUMBER GENERATED ALWAYS AS IDENTITY, VARCHAR2, CLOB, TIMESTAMP, ENABLE VALIDATE constraints, ValidFrom/ValidTo for historical tables."
        }
        "sqlserver" | "mssql" => {
            "SQL Server: INT IDENTITY(1,1), NVARCHAR, BIT, DATETIME2, INCLUDE indexes, DATA_COMPRESSION = PAGE, ValidFrom/ValidTo temporal columns."
        }
        _ => return None,
    };
    Some(text)
}

/// Build the rewrite prompt, or `None` for an unsupported dialect
pub fn build_prompt(ddl: &str, dialect: &str) -> Option<String> {
    let requirements = dialect_requirements(dialect)?;
    Some(
        REWRITE_PROMPT_TEMPLATE
            .replace("{dialect}", &dialect.trim().to_uppercase())
            .replace("{requirements}", requirements)
            .replace("{schema}", ddl),
    )
}

/// Extract the DDL from a response.
///
/// Looks for the text between [`BEGIN_MARKER`] and [`END_MARKER`] first,
/// then for a fenced ```sql block, then any fenced block.
pub fn extract_ddl(response: &str) -> Option<String> {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find(BEGIN_MARKER) {
        let content_start = start + BEGIN_MARKER.len();
        if let Some(end) = trimmed[content_start..].find(END_MARKER) {
            return non_empty(strip_fence(&trimmed[content_start..content_start + end]));
        }
    }

    if let Some(start) = trimmed.find("```sql") {
        let content_start = start + 6;
        if let Some(end) = trimmed[content_start..].find("```") {
            return non_empty(&trimmed[content_start..content_start + end]);
        }
    }

    if let Some(start) = trimmed.find("```") {
        let content_start = start + 3;
        // Skip language identifier if present
        let content_start = trimmed[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
        if let Some(end) = trimmed[content_start..].find("```") {
            return non_empty(&trimmed[content_start..content_start + end]);
        }
    }

    None
}

fn strip_fence(block: &str) -> &str {
    let block = block.trim();
    let Some(rest) = block.strip_prefix("```") else {
        return block;
    };
    let body = rest.find('\n').map_or("", |n| &rest[n + 1..]);
    body.strip_suffix("```").unwrap_or(body)
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
