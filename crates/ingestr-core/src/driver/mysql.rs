use mysql::{Conn, Opts, OptsBuilder, Params, SslOpts, Value, prelude::Queryable};

use crate::MySQLOptions;

use super::{DatabaseDriver, DatabaseSession, DriverError, SqlValue, validate_sql};

#[derive(Debug, Clone, Copy)]
pub struct MySQLDriver;

impl DatabaseDriver for MySQLDriver {
    type Config = MySQLOptions;

    fn check_connection(
        &self,
        config: &Self::Config,
    ) -> Result<(), DriverError> {
        let mut conn = open_conn(config)?;
        conn.ping()
            .map_err(|err| DriverError::Other(format!("ping 失败: {}", err)))?;
        Ok(())
    }

    fn create_connection(
        &self,
        config: &Self::Config,
    ) -> Result<Box<dyn DatabaseSession>, DriverError> {
        let conn = open_conn(config)?;
        Ok(Box::new(MySQLSession::new(conn)))
    }
}

struct MySQLSession {
    conn: Conn,
}

impl MySQLSession {
    fn new(conn: Conn) -> Self {
        Self { conn }
    }
}

impl DatabaseSession for MySQLSession {
    fn begin(&mut self) -> Result<(), DriverError> {
        self.conn
            .query_drop("START TRANSACTION")
            .map_err(|err| DriverError::Other(format!("开启事务失败: {}", err)))
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        self.conn
            .query_drop("COMMIT")
            .map_err(|err| DriverError::Other(format!("提交事务失败: {}", err)))
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.conn
            .query_drop("ROLLBACK")
            .map_err(|err| DriverError::Other(format!("回滚事务失败: {}", err)))
    }

    fn exec(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64, DriverError> {
        validate_sql(sql)?;
        self.conn
            .exec_drop(sql, to_params(params))
            .map_err(|err| DriverError::Other(format!("执行失败: {}", err)))?;
        Ok(self.conn.affected_rows())
    }

    fn exec_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, DriverError> {
        validate_sql(sql)?;
        tracing::debug!(sql = %sql, rows = rows.len());
        self.conn
            .exec_batch(sql, rows.iter().map(|row| to_params(row)))
            .map_err(|err| DriverError::Other(format!("批量执行失败: {}", err)))?;
        Ok(rows.len() as u64)
    }

    fn count(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64, DriverError> {
        validate_sql(sql)?;
        let value: Option<i64> = self
            .conn
            .exec_first(sql, to_params(params))
            .map_err(|err| DriverError::Other(format!("执行探测查询失败: {}", err)))?;
        Ok(value.unwrap_or(0).max(0) as u64)
    }
}

fn open_conn(config: &MySQLOptions) -> Result<Conn, DriverError> {
    if config.host.trim().is_empty() {
        return Err(DriverError::MissingField("host".into()));
    }
    if config.username.trim().is_empty() {
        return Err(DriverError::MissingField("username".into()));
    }
    if config.database.trim().is_empty() {
        return Err(DriverError::MissingField("database".into()));
    }

    let mut builder = OptsBuilder::new();
    builder = builder.ip_or_hostname(Some(config.host.clone()));
    builder = builder.tcp_port(config.port.parse().unwrap_or(3306));
    builder = builder.user(Some(config.username.clone()));
    builder = builder.pass(Some(config.password.clone()));
    builder = builder.db_name(Some(config.database.clone()));

    if config.use_tls {
        builder = builder.ssl_opts(Some(SslOpts::default()));
    }
    let opts = Opts::from(builder);
    Conn::new(opts).map_err(|err| DriverError::Other(format!("连接失败: {}", err)))
}

fn to_params(params: &[SqlValue]) -> Params {
    if params.is_empty() {
        return Params::Empty;
    }
    Params::Positional(params.iter().map(to_value).collect())
}

fn to_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Int(int) => Value::Int(*int),
        SqlValue::Text(text) => Value::Bytes(text.clone().into_bytes()),
    }
}
