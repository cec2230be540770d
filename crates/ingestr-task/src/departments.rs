use std::collections::HashSet;
use std::path::Path;

use ingestr_core::{DatabaseSession, SqlValue};

use crate::LoadReport;
use crate::batch::StatementBatch;
use crate::error::TaskError;
use crate::records::{field, read_records, row_number};

const PROBE_SQL: &str = "SELECT COUNT(*) FROM departments WHERE dept_no = ?";
const INSERT_SQL: &str = "INSERT INTO departments (dept_no, dept_name) VALUES (?, ?)";
const UPDATE_SQL: &str = "UPDATE departments SET dept_name = ? WHERE dept_no = ?";

/// 部门导入阶段
///
/// 逐行按主键探测存在性，路由至插入或更新队列，遍历结束后先下发
/// 插入批再下发更新批。同一文件内重复出现的新键第二次起走更新，
/// 保证同键以最后一次出现的值收尾
pub fn run(
    session: &mut Box<dyn DatabaseSession>,
    file: &Path,
) -> Result<LoadReport, TaskError> {
    tracing::info!("读取部门文件: {}", file.display());
    let records = read_records(file)?;

    let mut inserts = StatementBatch::new(INSERT_SQL);
    let mut updates = StatementBatch::new(UPDATE_SQL);
    // 本次运行中已排队插入的键
    let mut queued: HashSet<String> = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let row = row_number(index);
        let dept_no = field(record, 0, "dept_no", row)?;
        let dept_name = field(record, 1, "dept_name", row)?;

        let exists = queued.contains(dept_no)
            || session.count(PROBE_SQL, &[SqlValue::from(dept_no)])? > 0;

        if exists {
            updates.push(vec![SqlValue::from(dept_name), SqlValue::from(dept_no)]);
        } else {
            queued.insert(dept_no.to_string());
            inserts.push(vec![SqlValue::from(dept_no), SqlValue::from(dept_name)]);
        }
    }

    let inserted = inserts.flush(session)?;
    let updated = updates.flush(session)?;
    tracing::info!("部门处理完成，新增 {} 条，更新 {} 条", inserted, updated);

    Ok(LoadReport {
        stage: "departments",
        rows: records.len() as u64,
        inserted,
        updated,
        skipped: 0,
    })
}
