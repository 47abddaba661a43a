//! Statement classification for the query and execute tools.
//!
//! Statements are sorted into categories by their leading keyword only. The
//! match is start-anchored, case-insensitive and whole-word, so keywords that
//! appear later in the text (inside string literals, column values, subqueries)
//! never change the outcome.
//!
//! Each call must carry exactly one statement. The text is tokenized with
//! sqlparser so that semicolons inside literals, quoted identifiers and
//! comments are not mistaken for statement separators.

use crate::error::{DbError, DbResult};
use regex::Regex;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Category of a SQL statement, decided by its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementCategory {
    /// Schema-mutating statements, blocked in both tools
    Dangerous,
    /// Data-mutating statements, allowed only through `execute`
    Write,
    /// Anything else, allowed only through `query`
    Read,
}

/// Leading keywords and the category each one selects.
const KEYWORD_TABLE: &[(&str, StatementCategory)] = &[
    ("DROP", StatementCategory::Dangerous),
    ("TRUNCATE", StatementCategory::Dangerous),
    ("ALTER", StatementCategory::Dangerous),
    ("CREATE", StatementCategory::Dangerous),
    ("ATTACH", StatementCategory::Dangerous),
    ("DETACH", StatementCategory::Dangerous),
    ("INSERT", StatementCategory::Write),
    ("UPDATE", StatementCategory::Write),
    ("DELETE", StatementCategory::Write),
];

const OBSERVATION_INSERT_PATTERN: &str = r"(?i)^\s*INSERT\s+INTO\s+observations\b";
const INSERT_PATTERN: &str = r"(?i)^\s*INSERT\b";

impl StatementCategory {
    /// Keywords mapped to this category, in table order.
    pub fn keywords(self) -> Vec<&'static str> {
        KEYWORD_TABLE
            .iter()
            .filter(|(_, category)| *category == self)
            .map(|(keyword, _)| *keyword)
            .collect()
    }

    fn pattern(self) -> String {
        format!(r"(?i)^\s*({})\b", self.keywords().join("|"))
    }
}

/// Raw classification flags for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub dangerous: bool,
    pub is_write: bool,
}

/// Compiled leading-keyword patterns.
///
/// Built once at startup and shared by both tool handlers.
#[derive(Debug, Clone)]
pub struct StatementClassifier {
    dangerous: Regex,
    write: Regex,
    insert: Regex,
    observation_insert: Regex,
}

impl StatementClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            dangerous: Regex::new(&StatementCategory::Dangerous.pattern())?,
            write: Regex::new(&StatementCategory::Write.pattern())?,
            insert: Regex::new(INSERT_PATTERN)?,
            observation_insert: Regex::new(OBSERVATION_INSERT_PATTERN)?,
        })
    }

    pub fn classify(&self, sql: &str) -> Classification {
        Classification {
            dangerous: self.dangerous.is_match(sql),
            is_write: self.write.is_match(sql),
        }
    }

    pub fn category(&self, sql: &str) -> StatementCategory {
        let classification = self.classify(sql);
        if classification.dangerous {
            StatementCategory::Dangerous
        } else if classification.is_write {
            StatementCategory::Write
        } else {
            StatementCategory::Read
        }
    }

    /// Check that `sql` may run through a tool.
    ///
    /// Dangerous statements are always rejected, as is text holding more than
    /// one statement. With `allow_write` only write statements pass; without it
    /// only reads pass.
    pub fn validate(&self, sql: &str, allow_write: bool) -> DbResult<()> {
        let category = self.category(sql);
        if category == StatementCategory::Dangerous {
            return Err(DbError::dangerous_operation(
                &StatementCategory::Dangerous.keywords(),
            ));
        }
        if statement_count(sql)? > 1 {
            return Err(DbError::MultipleStatements);
        }

        match (category, allow_write) {
            (StatementCategory::Write, false) => Err(DbError::WriteNotAllowed),
            (StatementCategory::Read, true) => Err(DbError::ReadNotAllowed),
            _ => Ok(()),
        }
    }

    /// True when `sql` starts with INSERT, into any table.
    pub fn is_insert(&self, sql: &str) -> bool {
        self.insert.is_match(sql)
    }

    /// True when `sql` inserts into the `observations` table itself.
    pub fn is_observation_insert(&self, sql: &str) -> bool {
        self.observation_insert.is_match(sql)
    }
}

/// Number of non-empty statements in `sql`.
///
/// A trailing semicolon does not start a new statement.
pub fn statement_count(sql: &str) -> DbResult<usize> {
    let tokens = Tokenizer::new(&SQLiteDialect {}, sql)
        .tokenize()
        .map_err(DbError::invalid_sql)?;

    let mut count = 0;
    let mut in_statement = false;
    for token in tokens {
        match token {
            Token::Whitespace(_) | Token::EOF => {}
            Token::SemiColon => in_statement = false,
            _ if !in_statement => {
                in_statement = true;
                count += 1;
            }
            _ => {}
        }
    }
    Ok(count)
}
