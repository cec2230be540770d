use std::path::Path;

use ingestr_core::DatabaseSession;

use crate::error::TaskError;
use crate::{ImportConfig, LoadReport, MessageKind, ProgressMessage, print_progress};
use crate::{departments, dept_emp, employees};

type StageFn = fn(&mut Box<dyn DatabaseSession>, &Path) -> Result<LoadReport, TaskError>;

/// 按固定顺序执行三个导入阶段，整体一个事务
///
/// 阶段表顺序即依赖顺序：dept_emp 的引用校验依赖 employees 阶段
/// 先行完成。任一阶段失败立即回滚整条连接并返回错误，不再继续
/// 后续阶段；全部成功后一次性提交
pub fn run(
    session: &mut Box<dyn DatabaseSession>,
    config: &ImportConfig,
) -> Result<Vec<LoadReport>, TaskError> {
    let stages: [(&str, &Path, StageFn); 3] = [
        ("departments", config.departments_file.as_path(), departments::run),
        ("employees", config.employees_file.as_path(), employees::run),
        ("dept_emp", config.dept_emp_file.as_path(), dept_emp::run),
    ];

    session.begin()?;

    let mut reports = Vec::with_capacity(stages.len());
    for (name, file, stage) in stages {
        tracing::info!("执行阶段: {}", name);
        match stage(session, file) {
            Ok(report) => {
                print_progress(ProgressMessage {
                    kind: MessageKind::Progress,
                    data: serde_json::json!(report),
                });
                reports.push(report);
            }
            Err(err) => {
                tracing::error!("阶段 {} 失败: {}", name, err);
                if let Err(rb) = session.rollback() {
                    tracing::error!("回滚失败: {}", rb);
                }
                return Err(err);
            }
        }
    }

    session.commit()?;
    Ok(reports)
}
