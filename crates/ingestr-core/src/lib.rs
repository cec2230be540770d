use std::path::Path;

use serde::{Deserialize, Serialize};

// 核心模块导出
pub mod driver;

// 重新导出 driver 类型
pub use driver::{
    DatabaseDriver, DatabaseSession, DriverError, SqlValue, check_connection, create_connection,
};

#[derive(Clone, Serialize, Deserialize)]
pub struct MySQLOptions {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub use_tls: bool,
}

impl Default for MySQLOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: "3306".into(),
            username: "root".into(),
            password: "".into(),
            database: String::new(),
            use_tls: false,
        }
    }
}

impl MySQLOptions {
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_tls { "mysqls" } else { "mysql" };
        let db = self.database.trim();
        if db.is_empty() {
            format!("{}://{}:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}/{}", scheme, self.host, self.port, db)
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SQLiteOptions {
    #[serde(default)]
    pub readonly: bool,
    pub filepath: String,
}

impl Default for SQLiteOptions {
    fn default() -> Self {
        Self {
            readonly: false,
            filepath: String::new(),
        }
    }
}

impl SQLiteOptions {
    pub fn endpoint(&self) -> String {
        let path = self.filepath.trim();
        if path.is_empty() {
            return "sqlite://<未配置文件>".into();
        }

        let name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path);

        if self.readonly {
            format!("sqlite://{}?mode=ro", name)
        } else {
            format!("sqlite://{}", name)
        }
    }
}

/// 数据源连接配置，直接内嵌在任务配置文件中
#[derive(Clone, Serialize, Deserialize)]
pub enum DataSourceOptions {
    #[serde(rename = "mysql")]
    MySQL(MySQLOptions),
    #[serde(rename = "sqlite")]
    SQLite(SQLiteOptions),
}

impl DataSourceOptions {
    pub fn endpoint(&self) -> String {
        match self {
            DataSourceOptions::MySQL(opts) => opts.endpoint(),
            DataSourceOptions::SQLite(opts) => opts.endpoint(),
        }
    }
}
