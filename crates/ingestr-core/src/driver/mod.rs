use crate::DataSourceOptions;

pub use mysql::MySQLDriver;
pub use sqlite::SQLiteDriver;

mod mysql;
mod sqlite;

/// 参数化语句的绑定值
///
/// 日期统一以 `YYYY-MM-DD` 文本绑定（MySQL DATE 与 SQLite TEXT 都接受），
/// 解析失败的日期绑定 Null
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("{0}")]
    Other(String),
    #[error("配置字段缺失: {0}")]
    MissingField(String),
    #[error("配置字段非法: {0}")]
    InvalidField(String),
}

pub trait DatabaseDriver {
    type Config;

    fn check_connection(
        &self,
        config: &Self::Config,
    ) -> Result<(), DriverError>;

    fn create_connection(
        &self,
        config: &Self::Config,
    ) -> Result<Box<dyn DatabaseSession>, DriverError>;
}

/// 单连接会话，整个导入过程独占一条连接
///
/// 事务边界由调用方控制：导入任务在 begin 之后串行执行各阶段，
/// 全部成功才 commit，任一阶段失败则 rollback
pub trait DatabaseSession: Send {
    fn begin(&mut self) -> Result<(), DriverError>;

    fn commit(&mut self) -> Result<(), DriverError>;

    fn rollback(&mut self) -> Result<(), DriverError>;

    /// 执行单条参数化语句，返回受影响行数
    fn exec(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64, DriverError>;

    /// 同一语句按参数组批量执行（预编译一次），返回执行的参数组数量
    fn exec_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, DriverError>;

    /// 执行 COUNT 探测查询，返回标量计数
    fn count(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64, DriverError>;
}

pub fn check_connection(opts: &DataSourceOptions) -> Result<(), DriverError> {
    match opts {
        DataSourceOptions::MySQL(config) => MySQLDriver.check_connection(config),
        DataSourceOptions::SQLite(config) => SQLiteDriver.check_connection(config),
    }
}

pub fn create_connection(opts: &DataSourceOptions) -> Result<Box<dyn DatabaseSession>, DriverError> {
    match opts {
        DataSourceOptions::MySQL(config) => MySQLDriver.create_connection(config),
        DataSourceOptions::SQLite(config) => SQLiteDriver.create_connection(config),
    }
}

pub fn validate_sql(sql: &str) -> Result<(), DriverError> {
    if sql.trim().is_empty() {
        return Err(DriverError::InvalidField("sql".into()));
    }
    Ok(())
}
