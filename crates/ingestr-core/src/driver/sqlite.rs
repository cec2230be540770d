use std::{fs, path::Path};

use rusqlite::{Connection, OpenFlags, params_from_iter, types::Value};

use crate::SQLiteOptions;

use super::{DatabaseDriver, DatabaseSession, DriverError, SqlValue, validate_sql};

#[derive(Debug, Clone, Copy)]
pub struct SQLiteDriver;

struct SQLiteSession {
    conn: Connection,
}

impl SQLiteSession {
    fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl DatabaseSession for SQLiteSession {
    fn begin(&mut self) -> Result<(), DriverError> {
        self.conn
            .execute_batch("BEGIN")
            .map_err(|err| DriverError::Other(format!("开启事务失败: {}", err)))
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|err| DriverError::Other(format!("提交事务失败: {}", err)))
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|err| DriverError::Other(format!("回滚事务失败: {}", err)))
    }

    fn exec(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64, DriverError> {
        validate_sql(sql)?;
        let affected = self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_value)))
            .map_err(|err| DriverError::Other(format!("执行失败: {}", err)))?;
        Ok(affected as u64)
    }

    fn exec_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, DriverError> {
        validate_sql(sql)?;
        tracing::debug!(sql = %sql, rows = rows.len());
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|err| DriverError::Other(format!("准备语句失败: {}", err)))?;

        for row in rows {
            stmt.execute(params_from_iter(row.iter().map(to_value)))
                .map_err(|err| DriverError::Other(format!("批量执行失败: {}", err)))?;
        }
        Ok(rows.len() as u64)
    }

    fn count(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64, DriverError> {
        validate_sql(sql)?;
        let value: i64 = self
            .conn
            .query_row(sql, params_from_iter(params.iter().map(to_value)), |row| {
                row.get(0)
            })
            .map_err(|err| DriverError::Other(format!("执行探测查询失败: {}", err)))?;
        Ok(value.max(0) as u64)
    }
}

impl DatabaseDriver for SQLiteDriver {
    type Config = SQLiteOptions;

    fn check_connection(
        &self,
        config: &Self::Config,
    ) -> Result<(), DriverError> {
        let conn = open_conn(config)?;
        conn.query_row("SELECT 1", [], |_| Ok::<_, rusqlite::Error>(()))
            .map_err(|err| DriverError::Other(format!("校验查询失败: {}", err)))?;
        Ok(())
    }

    fn create_connection(
        &self,
        config: &Self::Config,
    ) -> Result<Box<dyn DatabaseSession>, DriverError> {
        let conn = open_conn(config)?;
        Ok(Box::new(SQLiteSession::new(conn)))
    }
}

fn open_conn(config: &SQLiteOptions) -> Result<Connection, DriverError> {
    let path_str = config.filepath.trim();
    if path_str.is_empty() {
        return Err(DriverError::MissingField("filepath".into()));
    }

    let path = Path::new(path_str);

    if config.readonly {
        if !path.exists() {
            return Err(DriverError::InvalidField("filepath 不存在".into()));
        }
    } else if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| DriverError::Other(format!("创建目录失败: {}", err)))?;
        }
    }

    let flags = if config.readonly {
        OpenFlags::SQLITE_OPEN_READ_ONLY
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
    };

    Connection::open_with_flags(path, flags).map_err(|err| DriverError::Other(format!("打开 SQLite 失败: {}", err)))
}

fn to_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Int(int) => Value::Integer(*int),
        SqlValue::Text(text) => Value::Text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session(dir: &tempfile::TempDir) -> Box<dyn DatabaseSession> {
        let options = SQLiteOptions {
            readonly: false,
            filepath: dir.path().join("ingestr.db").to_string_lossy().into_owned(),
        };
        SQLiteDriver.create_connection(&options).unwrap()
    }

    #[test]
    fn exec_and_count_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(&dir);

        session
            .exec("CREATE TABLE departments (dept_no TEXT PRIMARY KEY, dept_name TEXT)", &[])
            .unwrap();
        let affected = session
            .exec(
                "INSERT INTO departments (dept_no, dept_name) VALUES (?, ?)",
                &[SqlValue::from("d001"), SqlValue::from("Marketing")],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let total = session
            .count(
                "SELECT COUNT(*) FROM departments WHERE dept_no = ?",
                &[SqlValue::from("d001")],
            )
            .unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn exec_batch_binds_each_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(&dir);

        session
            .exec("CREATE TABLE employees (emp_no INTEGER PRIMARY KEY, hire_date TEXT)", &[])
            .unwrap();
        let executed = session
            .exec_batch(
                "INSERT INTO employees (emp_no, hire_date) VALUES (?, ?)",
                &[
                    vec![SqlValue::Int(10001), SqlValue::from("2020-01-15")],
                    vec![SqlValue::Int(10002), SqlValue::Null],
                ],
            )
            .unwrap();
        assert_eq!(executed, 2);

        let nulls = session
            .count("SELECT COUNT(*) FROM employees WHERE hire_date IS NULL", &[])
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn rollback_discards_uncommitted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(&dir);

        session
            .exec("CREATE TABLE departments (dept_no TEXT PRIMARY KEY, dept_name TEXT)", &[])
            .unwrap();

        session.begin().unwrap();
        session
            .exec(
                "INSERT INTO departments (dept_no, dept_name) VALUES (?, ?)",
                &[SqlValue::from("d001"), SqlValue::from("Marketing")],
            )
            .unwrap();
        session.rollback().unwrap();

        let total = session.count("SELECT COUNT(*) FROM departments", &[]).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn commit_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let filepath = dir.path().join("ingestr.db").to_string_lossy().into_owned();
        let options = SQLiteOptions {
            readonly: false,
            filepath: filepath.clone(),
        };

        let mut session = SQLiteDriver.create_connection(&options).unwrap();
        session
            .exec("CREATE TABLE departments (dept_no TEXT PRIMARY KEY, dept_name TEXT)", &[])
            .unwrap();
        session.begin().unwrap();
        session
            .exec(
                "INSERT INTO departments (dept_no, dept_name) VALUES (?, ?)",
                &[SqlValue::from("d001"), SqlValue::from("Marketing")],
            )
            .unwrap();
        session.commit().unwrap();
        drop(session);

        let mut reopened = SQLiteDriver.create_connection(&options).unwrap();
        let total = reopened.count("SELECT COUNT(*) FROM departments", &[]).unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn missing_filepath_is_rejected() {
        let options = SQLiteOptions {
            readonly: false,
            filepath: "  ".into(),
        };
        assert!(SQLiteDriver.create_connection(&options).is_err());
    }
}
