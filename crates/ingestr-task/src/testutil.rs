use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use ingestr_core::{DatabaseDriver, DatabaseSession, SQLiteOptions, SqlValue, driver::SQLiteDriver};

/// 打开一个建好三张目标表的 SQLite 会话
pub fn open_session(dir: &TempDir) -> Box<dyn DatabaseSession> {
    let options = SQLiteOptions {
        readonly: false,
        filepath: dir.path().join("ingestr.db").to_string_lossy().into_owned(),
    };
    let mut session = SQLiteDriver.create_connection(&options).unwrap();
    create_schema(&mut session);
    session
}

/// 目标库表结构（由外部系统持有，这里仅为测试复刻）
pub fn create_schema(session: &mut Box<dyn DatabaseSession>) {
    let statements = [
        "CREATE TABLE IF NOT EXISTS departments (
            dept_no TEXT PRIMARY KEY,
            dept_name TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS employees (
            emp_no INTEGER PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            gender TEXT,
            hire_date TEXT,
            birth_date TEXT
        )",
        "CREATE TABLE IF NOT EXISTS dept_emp (
            emp_no INTEGER NOT NULL,
            dept_no TEXT NOT NULL,
            from_date TEXT,
            to_date TEXT,
            PRIMARY KEY (emp_no, dept_no)
        )",
    ];
    for sql in statements {
        session.exec(sql, &[]).unwrap();
    }
}

pub fn write_csv(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn count(
    session: &mut Box<dyn DatabaseSession>,
    sql: &str,
) -> u64 {
    session.count(sql, &[]).unwrap()
}

pub fn count_with(
    session: &mut Box<dyn DatabaseSession>,
    sql: &str,
    params: &[SqlValue],
) -> u64 {
    session.count(sql, params).unwrap()
}

pub fn insert_employee(
    session: &mut Box<dyn DatabaseSession>,
    emp_no: i64,
) {
    session
        .exec(
            "INSERT INTO employees (emp_no, first_name, last_name, gender, hire_date, birth_date)
             VALUES (?, ?, ?, ?, ?, ?)",
            &[
                SqlValue::Int(emp_no),
                SqlValue::from("Ana"),
                SqlValue::from("Garcia"),
                SqlValue::from("F"),
                SqlValue::from("2020-01-15"),
                SqlValue::from("1990-06-01"),
            ],
        )
        .unwrap();
}

/// 缺失路径，用于触发阶段失败
pub fn missing_file(dir: &TempDir) -> PathBuf {
    dir.path().join("absent.csv")
}
