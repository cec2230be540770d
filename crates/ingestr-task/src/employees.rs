use std::collections::HashSet;
use std::path::Path;

use ingestr_core::{DatabaseSession, SqlValue};

use crate::LoadReport;
use crate::batch::StatementBatch;
use crate::dates::{date_value, parse_date};
use crate::error::TaskError;
use crate::records::{field, read_records, row_number};

const PROBE_SQL: &str = "SELECT COUNT(*) FROM employees WHERE emp_no = ?";
const INSERT_SQL: &str = "INSERT INTO employees \
    (emp_no, first_name, last_name, gender, hire_date, birth_date) \
    VALUES (?, ?, ?, ?, ?, ?)";
const UPDATE_SQL: &str = "UPDATE employees \
    SET first_name = ?, last_name = ?, gender = ?, hire_date = ?, birth_date = ? \
    WHERE emp_no = ?";

/// 员工导入阶段
///
/// emp_no 非数字属于阶段级错误；日期解析失败按行恢复，置 NULL 继续
pub fn run(
    session: &mut Box<dyn DatabaseSession>,
    file: &Path,
) -> Result<LoadReport, TaskError> {
    tracing::info!("读取员工文件: {}", file.display());
    let records = read_records(file)?;

    let mut inserts = StatementBatch::new(INSERT_SQL);
    let mut updates = StatementBatch::new(UPDATE_SQL);
    let mut queued: HashSet<i64> = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let row = row_number(index);
        let raw_emp_no = field(record, 0, "emp_no", row)?;
        let emp_no: i64 = raw_emp_no.parse().map_err(|_| TaskError::InvalidNumber {
            row,
            value: raw_emp_no.to_string(),
        })?;

        let first_name = field(record, 1, "first_name", row)?;
        let last_name = field(record, 2, "last_name", row)?;
        let gender = field(record, 3, "gender", row)?;
        let hire_date = date_value(parse_date(field(record, 4, "hire_date", row)?));
        let birth_date = date_value(parse_date(field(record, 5, "birth_date", row)?));

        let exists = queued.contains(&emp_no)
            || session.count(PROBE_SQL, &[SqlValue::Int(emp_no)])? > 0;

        if exists {
            updates.push(vec![
                SqlValue::from(first_name),
                SqlValue::from(last_name),
                SqlValue::from(gender),
                hire_date,
                birth_date,
                SqlValue::Int(emp_no),
            ]);
        } else {
            queued.insert(emp_no);
            inserts.push(vec![
                SqlValue::Int(emp_no),
                SqlValue::from(first_name),
                SqlValue::from(last_name),
                SqlValue::from(gender),
                hire_date,
                birth_date,
            ]);
        }
    }

    let inserted = inserts.flush(session)?;
    let updated = updates.flush(session)?;
    tracing::info!("员工处理完成，新增 {} 条，更新 {} 条", inserted, updated);

    Ok(LoadReport {
        stage: "employees",
        rows: records.len() as u64,
        inserted,
        updated,
        skipped: 0,
    })
}
