//! All-or-nothing statement batches

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::{Error, Result};

/// One SQL statement with positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Ordered statements executed in a single transaction
#[derive(Debug, Clone, Default)]
pub struct Batch {
    stmts: Vec<Statement>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch of one statement
    pub fn single(stmt: Statement) -> Self {
        Self { stmts: vec![stmt] }
    }

    pub fn push(&mut self, stmt: Statement) {
        self.stmts.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.stmts
    }

    /// Runs every statement inside one transaction.
    ///
    /// The first failing statement rolls the whole batch back; callers never
    /// observe a partial result.
    pub fn exec(self, conn: &mut Connection) -> Result<()> {
        debug!(statements = self.stmts.len(), "executing batch");

        let tx = conn.transaction()?;
        for stmt in &self.stmts {
            tx.execute(&stmt.sql, params_from_iter(stmt.params.iter()))
                .map_err(|e| {
                    debug!(sql = %stmt.sql, error = %e, "batch statement failed");
                    Error::from_exec(e)
                })?;
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit()?;
        Ok(())
    }
}

impl Extend<Statement> for Batch {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        self.stmts.extend(iter);
    }
}

impl FromIterator<Statement> for Batch {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            stmts: iter.into_iter().collect(),
        }
    }
}
