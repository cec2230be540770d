use ingestr_core::{DatabaseSession, SqlValue};

use crate::error::TaskError;

/// 同一语句的参数组队列，遍历结束后一次性下发
pub struct StatementBatch {
    sql: &'static str,
    rows: Vec<Vec<SqlValue>>,
}

impl StatementBatch {
    pub fn new(sql: &'static str) -> Self {
        Self { sql, rows: vec![] }
    }

    pub fn push(
        &mut self,
        params: Vec<SqlValue>,
    ) {
        self.rows.push(params);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 执行队列中的全部参数组，空队列不触发数据库往返
    pub fn flush(
        self,
        session: &mut Box<dyn DatabaseSession>,
    ) -> Result<u64, TaskError> {
        if self.rows.is_empty() {
            return Ok(0);
        }
        Ok(session.exec_batch(self.sql, &self.rows)?)
    }
}
