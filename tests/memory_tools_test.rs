//! Integration tests for the query and execute tool handlers.
//!
//! Tests verify that:
//! - Reads render as numbered row blocks, or "no results"
//! - Dangerous statements are rejected by both tools and never reach the database
//! - Observation inserts require known tags and link them to the new row
//! - Constraint failures are reported with a descriptive prefix

use memory_mcp_server::db::{DbPool, QueryExecutor};
use memory_mcp_server::error::DbError;
use memory_mcp_server::tools::classifier::StatementClassifier;
use memory_mcp_server::tools::query::{QueryInput, QueryToolHandler};
use memory_mcp_server::tools::write::{ExecuteInput, WriteToolHandler};
use std::sync::Arc;

const SCHEMA: &[&str] = &[
    "CREATE TABLE entities (id INTEGER PRIMARY KEY, name TEXT NOT NULL CHECK (length(name) > 0), entity_type TEXT NOT NULL, created_at TEXT DEFAULT CURRENT_TIMESTAMP)",
    "CREATE TABLE observations (id INTEGER PRIMARY KEY, entity_id INTEGER NOT NULL REFERENCES entities(id), content TEXT NOT NULL CHECK (length(content) > 0), created_at TEXT DEFAULT CURRENT_TIMESTAMP)",
    "CREATE TABLE relations (id INTEGER PRIMARY KEY, from_id INTEGER NOT NULL REFERENCES entities(id), to_id INTEGER NOT NULL REFERENCES entities(id), relation_type TEXT NOT NULL, created_at TEXT DEFAULT CURRENT_TIMESTAMP)",
    "CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT UNIQUE NOT NULL, description TEXT, created_at TEXT DEFAULT CURRENT_TIMESTAMP)",
    "CREATE TABLE observation_tags (observation_id INTEGER NOT NULL REFERENCES observations(id), tag_id INTEGER NOT NULL REFERENCES tags(id), PRIMARY KEY (observation_id, tag_id))",
    "INSERT INTO tags (name, description) VALUES ('homelab', 'Servers and networking')",
    "INSERT INTO tags (name, description) VALUES ('career', 'Work and jobs')",
    "INSERT INTO entities (name, entity_type) VALUES ('alice', 'person')",
];

const OBSERVATION_INSERT: &str =
    "INSERT INTO observations (entity_id, content) VALUES (1, 'runs a proxmox cluster')";

struct Fixture {
    pool: Arc<DbPool>,
    query: QueryToolHandler,
    write: WriteToolHandler,
}

async fn setup() -> Fixture {
    let pool = Arc::new(DbPool::connect_sqlite("sqlite::memory:").await.unwrap());
    let executor = QueryExecutor::new();
    for sql in SCHEMA {
        executor.execute_write(&pool, sql, &[]).await.unwrap();
    }

    let classifier = Arc::new(StatementClassifier::new().unwrap());
    Fixture {
        query: QueryToolHandler::new(pool.clone(), classifier.clone()),
        write: WriteToolHandler::new(pool.clone(), classifier),
        pool,
    }
}

fn query_input(sql: &str) -> QueryInput {
    QueryInput {
        sql: sql.to_string(),
    }
}

fn execute_input(sql: &str, tags: Option<&str>) -> ExecuteInput {
    ExecuteInput {
        sql: sql.to_string(),
        tags: tags.map(str::to_string),
    }
}

async fn count(pool: &DbPool, table: &str) -> i64 {
    QueryExecutor::new()
        .fetch_optional_i64(pool, &format!("SELECT COUNT(*) FROM {table}"), &[])
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_query_renders_rows() {
    let f = setup().await;
    let text = f
        .query
        .query(query_input("SELECT id, name, entity_type FROM entities"))
        .await
        .unwrap();
    assert_eq!(
        text,
        "rows: 1\n\n--- row 1 ---\nid: 1\nname: alice\nentity_type: person\n\n"
    );
}

#[tokio::test]
async fn test_query_no_results() {
    let f = setup().await;
    let text = f
        .query
        .query(query_input("SELECT * FROM observations"))
        .await
        .unwrap();
    assert_eq!(text, "no results");
}

#[tokio::test]
async fn test_query_renders_null_and_blob() {
    let f = setup().await;
    let text = f
        .query
        .query(query_input("SELECT NULL AS n, x'68656c6c6f' AS b"))
        .await
        .unwrap();
    assert!(text.contains("n: NULL\n"));
    assert!(text.contains("b: hello\n"));
}

#[tokio::test]
async fn test_query_rejects_writes() {
    let f = setup().await;
    let err = f
        .query
        .query(query_input("DELETE FROM entities WHERE id = 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::WriteNotAllowed));
    assert_eq!(count(&f.pool, "entities").await, 1);
}

#[tokio::test]
async fn test_query_database_error_prefixed() {
    let f = setup().await;
    let err = f
        .query
        .query(query_input("SELECT * FROM memories"))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("query error: "), "{err}");
}

#[tokio::test]
async fn test_drop_blocked_in_both_tools() {
    let f = setup().await;

    let err = f
        .query
        .query(query_input("DROP TABLE entities"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DangerousOperation { .. }));

    let err = f
        .write
        .execute(execute_input("  drop table entities", None))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DangerousOperation { .. }));

    assert_eq!(count(&f.pool, "entities").await, 1);
}

#[tokio::test]
async fn test_execute_rejects_select() {
    let f = setup().await;
    let err = f
        .write
        .execute(execute_input("SELECT * FROM entities", None))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "SELECT not allowed in execute tool, use query tool instead"
    );
}

#[tokio::test]
async fn test_execute_missing_sql() {
    let f = setup().await;
    let err = f.write.execute(execute_input("", None)).await.unwrap_err();
    assert!(matches!(err, DbError::MissingParameter { name: "sql" }));
}

#[tokio::test]
async fn test_execute_insert_reports_last_insert_id() {
    let f = setup().await;
    let text = f
        .write
        .execute(execute_input(
            "INSERT INTO entities (name, entity_type) VALUES ('bob', 'person')",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(text, "success: 1 row(s) affected, last insert id: 2");
}

#[tokio::test]
async fn test_execute_update_reports_rows_affected() {
    let f = setup().await;
    let text = f
        .write
        .execute(execute_input(
            "UPDATE entities SET entity_type = 'friend' WHERE name = 'alice'",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(text, "success: 1 row(s) affected");

    // An earlier insert on the same connection must not leak into the report.
    f.write
        .execute(execute_input(
            "INSERT INTO entities (name, entity_type) VALUES ('bob', 'person')",
            None,
        ))
        .await
        .unwrap();
    let text = f
        .write
        .execute(execute_input(
            "DELETE FROM entities WHERE name = 'bob'",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(text, "success: 1 row(s) affected");
}

#[tokio::test]
async fn test_observation_insert_matching_no_rows_links_nothing() {
    let f = setup().await;
    let text = f
        .write
        .execute(execute_input(
            "INSERT INTO observations (entity_id, content) SELECT id, 'x' FROM entities WHERE 0",
            Some("homelab"),
        ))
        .await
        .unwrap();
    assert_eq!(text, "success: 0 row(s) affected");
    assert_eq!(count(&f.pool, "observations").await, 0);
    assert_eq!(count(&f.pool, "observation_tags").await, 0);

    // The next real insert still gets its own id linked.
    let text = f
        .write
        .execute(execute_input(OBSERVATION_INSERT, Some("career")))
        .await
        .unwrap();
    assert_eq!(text, "success: observation 1 created with tags: career");
    let links = f
        .query
        .query(query_input(
            "SELECT observation_id, tag_id FROM observation_tags",
        ))
        .await
        .unwrap();
    assert_eq!(links, "rows: 1\n\n--- row 1 ---\nobservation_id: 1\ntag_id: 2\n\n");
}

#[tokio::test]
async fn test_query_rejects_stacked_statements() {
    let f = setup().await;
    let err = f
        .query
        .query(query_input("SELECT 1; DROP TABLE entities"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::MultipleStatements));

    let err = f
        .write
        .execute(execute_input(
            "DELETE FROM observations; DELETE FROM entities",
            None,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::MultipleStatements));

    assert_eq!(count(&f.pool, "entities").await, 1);
}

#[tokio::test]
async fn test_observation_insert_without_tags() {
    let f = setup().await;
    for tags in [None, Some(""), Some("   ")] {
        let err = f
            .write
            .execute(execute_input(OBSERVATION_INSERT, tags))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::TagsRequired), "{tags:?}");
        assert!(err.to_string().contains("homelab, career, drinks, personal"));
    }
    assert_eq!(count(&f.pool, "observations").await, 0);
}

#[tokio::test]
async fn test_observation_insert_with_known_tag() {
    let f = setup().await;
    let text = f
        .write
        .execute(execute_input(OBSERVATION_INSERT, Some("homelab")))
        .await
        .unwrap();
    assert_eq!(text, "success: observation 1 created with tags: homelab");

    let links = f
        .query
        .query(query_input(
            "SELECT t.name FROM observation_tags ot JOIN tags t ON t.id = ot.tag_id WHERE ot.observation_id = 1",
        ))
        .await
        .unwrap();
    assert_eq!(links, "rows: 1\n\n--- row 1 ---\nname: homelab\n\n");
}

#[tokio::test]
async fn test_observation_insert_echoes_tags_as_given() {
    let f = setup().await;
    let text = f
        .write
        .execute(execute_input(
            "\n  insert into OBSERVATIONS (entity_id, content) values (1, 'promoted')",
            Some(" career , homelab ,"),
        ))
        .await
        .unwrap();
    assert_eq!(
        text,
        "success: observation 1 created with tags:  career , homelab ,"
    );
    assert_eq!(count(&f.pool, "observation_tags").await, 2);
}

#[tokio::test]
async fn test_observation_insert_with_unknown_tag() {
    let f = setup().await;
    let err = f
        .write
        .execute(execute_input(
            OBSERVATION_INSERT,
            Some("homelab,nonexistent_tag_xyz"),
        ))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("unknown tag(s): nonexistent_tag_xyz\n\nAvailable tags:\n"));
    assert!(msg.contains("career (Work and jobs)\nhomelab (Servers and networking)"));
    assert!(msg.contains("ask the user first"));
    assert_eq!(count(&f.pool, "observations").await, 0);
}

#[tokio::test]
async fn test_observation_insert_partial_success() {
    let f = setup().await;
    let err = f
        .write
        .execute(execute_input(OBSERVATION_INSERT, Some("homelab,homelab")))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::PartialSuccess {
            observation_id: 1,
            ..
        }
    ));
    let msg = err.to_string();
    assert!(msg.starts_with("observation created but failed to link tags: "));
    assert!(msg.contains("UNIQUE constraint"), "{msg}");

    // No rollback: the observation and the first link remain.
    assert_eq!(count(&f.pool, "observations").await, 1);
    assert_eq!(count(&f.pool, "observation_tags").await, 1);
}

#[tokio::test]
async fn test_other_table_inserts_skip_tag_checks() {
    let f = setup().await;
    let text = f
        .write
        .execute(execute_input(
            "INSERT INTO tags (name, description) VALUES ('drinks', 'Coffee and beer')",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(text, "success: 1 row(s) affected, last insert id: 3");
}

#[tokio::test]
async fn test_constraint_errors_classified() {
    let f = setup().await;

    let err = f
        .write
        .execute(execute_input(
            "INSERT INTO tags (name) VALUES ('homelab')",
            None,
        ))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("duplicate entry: "), "{err}");

    let err = f
        .write
        .execute(execute_input(
            "INSERT INTO observations (entity_id, content) VALUES (99, 'orphan')",
            Some("homelab"),
        ))
        .await
        .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("referenced entity does not exist: "),
        "{err}"
    );

    let err = f
        .write
        .execute(execute_input(
            "INSERT INTO entities (name, entity_type) VALUES ('', 'person')",
            None,
        ))
        .await
        .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("validation failed (empty or invalid value): "),
        "{err}"
    );
}
