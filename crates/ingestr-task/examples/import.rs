use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const DEPARTMENTS_CSV: &str = "dept_no,dept_name\nd001,Marketing\nd002,Sales\n";
const EMPLOYEES_CSV: &str = "emp_no,first_name,last_name,gender,hire_date,birth_date\n\
1001,Ana,Garcia,F,2020-01-15,1990-06-01\n\
1002,Luis,Perez,M,2018-09-01,1985-12-24\n";
const DEPT_EMP_CSV: &str = "emp_no,dept_no,from_date,to_date\n\
1001,d001,2020-01-15,9999-01-01\n\
9999,d001,2020-01-15,9999-01-01\n";

const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS departments (dept_no TEXT PRIMARY KEY, dept_name TEXT NOT NULL);
CREATE TABLE IF NOT EXISTS employees (emp_no INTEGER PRIMARY KEY, first_name TEXT, last_name TEXT, gender TEXT, hire_date TEXT, birth_date TEXT);
CREATE TABLE IF NOT EXISTS dept_emp (emp_no INTEGER NOT NULL, dept_no TEXT NOT NULL, from_date TEXT, to_date TEXT, PRIMARY KEY (emp_no, dept_no));
";

/// 示例：向本地 SQLite 库导入三个示例 CSV
fn import_sample_data() {
    let task_dir = PathBuf::from("/tmp/ingestr-tasks/import-sample");
    let db_file = PathBuf::from("/tmp/ingestr-sample.db");

    // 清除上次任务的信息
    if task_dir.exists() {
        fs::remove_dir_all(&task_dir).unwrap();
    }
    if db_file.exists() {
        fs::remove_file(&db_file).unwrap();
    }
    fs::create_dir_all(&task_dir).unwrap();

    // 准备目标表结构（表结构由外部系统持有，这里只为示例建好）
    {
        let conn = rusqlite::Connection::open(&db_file).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
    }

    // 准备输入文件
    let departments = task_dir.join("departments.csv");
    let employees = task_dir.join("employees.csv");
    let dept_emp = task_dir.join("dept_emp.csv");
    fs::write(&departments, DEPARTMENTS_CSV).unwrap();
    fs::write(&employees, EMPLOYEES_CSV).unwrap();
    fs::write(&dept_emp, DEPT_EMP_CSV).unwrap();

    let config = json!({
        "task_id": "import-sample-001",
        "created_at": "2026-08-31T10:00:00Z",
        "source": {
            "sqlite": {
                "filepath": db_file,
                "readonly": false
            }
        },
        "import": {
            "departments_file": departments,
            "employees_file": employees,
            "dept_emp_file": dept_emp
        }
    });

    fs::write(
        task_dir.join("config.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    println!("配置文件已创建: {:?}/config.json", task_dir);
    println!("正在执行任务...\n");

    // 直接调用二进制执行任务
    let status = Command::new("cargo")
        .args(["run", "-p", "ingestr-task", "--", "--task-dir"])
        .arg(&task_dir)
        .status()
        .expect("创建任务失败");

    if status.success() {
        println!("\n✓ 任务执行成功");
    } else {
        println!("\n✗ 任务执行失败");
    }
}

fn main() {
    println!("=== Ingestr Task Import 示例 ===\n");

    import_sample_data();
    println!();

    println!("注意:");
    println!("  1. 目标库为 /tmp/ingestr-sample.db，可用 sqlite3 检查结果");
    println!("  2. emp_no=9999 的关系行引用了不存在的员工，会被跳过并告警");
    println!("  3. 重复执行本示例等价于全量更新，不会产生重复行");
}
