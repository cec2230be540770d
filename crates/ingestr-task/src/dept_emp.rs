use std::collections::HashSet;
use std::path::Path;

use ingestr_core::{DatabaseSession, SqlValue};

use crate::LoadReport;
use crate::batch::StatementBatch;
use crate::dates::{date_value, parse_date};
use crate::error::TaskError;
use crate::records::{field, read_records, row_number};

const EMPLOYEE_PROBE_SQL: &str = "SELECT COUNT(*) FROM employees WHERE emp_no = ?";
const PROBE_SQL: &str = "SELECT COUNT(*) FROM dept_emp WHERE emp_no = ? AND dept_no = ?";
const INSERT_SQL: &str = "INSERT INTO dept_emp (emp_no, dept_no, from_date, to_date) VALUES (?, ?, ?, ?)";
const UPDATE_SQL: &str = "UPDATE dept_emp SET from_date = ?, to_date = ? WHERE emp_no = ? AND dept_no = ?";

/// 部门-员工关系导入阶段
///
/// 每行两级校验：先探测员工是否存在（不存在则整行跳过，只告警），
/// 再按复合键 (emp_no, dept_no) 探测存在性路由插入或更新。
/// 员工阶段在同一事务内先行完成，探测能看到尚未提交的新员工
pub fn run(
    session: &mut Box<dyn DatabaseSession>,
    file: &Path,
) -> Result<LoadReport, TaskError> {
    tracing::info!("读取部门-员工关系文件: {}", file.display());
    let records = read_records(file)?;

    let mut inserts = StatementBatch::new(INSERT_SQL);
    let mut updates = StatementBatch::new(UPDATE_SQL);
    let mut queued: HashSet<(i64, String)> = HashSet::new();
    let mut skipped = 0u64;

    for (index, record) in records.iter().enumerate() {
        let row = row_number(index);
        let raw_emp_no = field(record, 0, "emp_no", row)?;
        let emp_no: i64 = raw_emp_no.parse().map_err(|_| TaskError::InvalidNumber {
            row,
            value: raw_emp_no.to_string(),
        })?;
        let dept_no = field(record, 1, "dept_no", row)?;
        let from_date = date_value(parse_date(field(record, 2, "from_date", row)?));
        let to_date = date_value(parse_date(field(record, 3, "to_date", row)?));

        // 引用校验：员工不存在的行既不插入也不更新
        if session.count(EMPLOYEE_PROBE_SQL, &[SqlValue::Int(emp_no)])? == 0 {
            tracing::warn!("员工 {} 不存在，跳过第 {} 行", emp_no, row);
            skipped += 1;
            continue;
        }

        let key = (emp_no, dept_no.to_string());
        let exists = queued.contains(&key)
            || session.count(PROBE_SQL, &[SqlValue::Int(emp_no), SqlValue::from(dept_no)])? > 0;

        if exists {
            updates.push(vec![
                from_date,
                to_date,
                SqlValue::Int(emp_no),
                SqlValue::from(dept_no),
            ]);
        } else {
            queued.insert(key);
            inserts.push(vec![
                SqlValue::Int(emp_no),
                SqlValue::from(dept_no),
                from_date,
                to_date,
            ]);
        }
    }

    let inserted = inserts.flush(session)?;
    let updated = updates.flush(session)?;
    tracing::info!(
        "部门-员工关系处理完成，新增 {} 条，更新 {} 条，跳过 {} 条",
        inserted,
        updated,
        skipped
    );

    Ok(LoadReport {
        stage: "dept_emp",
        rows: records.len() as u64,
        inserted,
        updated,
        skipped,
    })
}
