use ingestr_core::DriverError;

/// 导入任务错误
///
/// 日期解析失败和外键不匹配不在此列，它们按行恢复（置空/跳过），
/// 不会中断阶段
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 读取失败: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("第 {row} 行缺少列: {column}")]
    MissingColumn { row: usize, column: &'static str },

    #[error("第 {row} 行数值非法: {value}")]
    InvalidNumber { row: usize, value: String },
}
