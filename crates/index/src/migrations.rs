/// Inline SQL migrations for the index store schema.
///
/// Simple inline migrations rather than sqlx migration files — the schema
/// is small and self-contained. Four sub-stores, one per predicate type:
/// full-text (FTS5), spatial (R*Tree), metadata equality, tag membership.
pub const MIGRATIONS: &[&str] = &[
    // Migration 1: full-text store. Title and body are both tokenized and
    // matchable; doc_id is carried along UNINDEXED so a MATCH never hits it.
    r#"
CREATE VIRTUAL TABLE IF NOT EXISTS documents
USING fts5(title, body, doc_id UNINDEXED);
"#,
    // Migration 2: point locations stored as degenerate boxes
    // (min == max on both axes) so bounding-box queries are index-accelerated.
    r#"
CREATE VIRTUAL TABLE IF NOT EXISTS locations
USING rtree(doc_id, min_lat, max_lat, min_lon, max_lon);
"#,
    // Migration 3: metadata key/value side table for exact-match filtering
    r#"
CREATE TABLE IF NOT EXISTS metadata (
    doc_id INTEGER NOT NULL,
    key    TEXT NOT NULL,
    value  TEXT NOT NULL,
    PRIMARY KEY (doc_id, key)
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_metadata_key_value ON metadata(key, value);
"#,
    // Migration 4: tag membership side table
    r#"
CREATE TABLE IF NOT EXISTS tags (
    doc_id INTEGER NOT NULL,
    tag    TEXT NOT NULL,
    PRIMARY KEY (doc_id, tag)
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_tags_tag ON tags(tag);
"#,
];
