use std::env;
use std::fs;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process::exit;

use serde::{Deserialize, Serialize};
use tracing_appender::{non_blocking, rolling::never};
use tracing_subscriber::{EnvFilter, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt};

use ingestr_core::{DataSourceOptions, create_connection};

mod batch;
mod dates;
mod departments;
mod dept_emp;
mod employees;
mod error;
mod pipeline;
mod records;

#[cfg(test)]
mod testutil;

/// 统一的任务配置（task_dir/config.json）
#[derive(Deserialize)]
pub struct TaskConfig {
    pub task_id: String,
    pub created_at: String,

    // 数据源直接内嵌，不再依赖外部数据源存储
    pub source: DataSourceOptions,
    pub import: ImportConfig,
}

/// 导入配置：三个 CSV 文件的路径
#[derive(Debug, Deserialize)]
pub struct ImportConfig {
    pub departments_file: PathBuf,
    pub employees_file: PathBuf,
    pub dept_emp_file: PathBuf,
}

/// 单个导入阶段的统计结果
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub stage: &'static str,
    pub rows: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// 进度输出消息（写入 stdout 的 JSON Lines）
#[derive(Debug, Serialize)]
pub struct ProgressMessage {
    kind: MessageKind,
    data: serde_json::Value,
}

/// 消息类型
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Progress,
    Error,
    Completed,
}

/// 初始化任务日志系统
fn init_task_logging(task_dir: &Path) -> non_blocking::WorkerGuard {
    let log_file = never(task_dir, "task.log");
    let (non_blocking, guard) = non_blocking(log_file);

    tracing_subscriber::registry()
        .with(EnvFilter::new("info"))
        .with(layer().with_writer(stdout))
        .with(layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}

fn main() {
    // 1. 解析命令行参数
    let mut task_dir: Option<PathBuf> = None;
    let args: Vec<String> = env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--task-dir" && i + 1 < args.len() {
            task_dir = Some(PathBuf::from(&args[i + 1]));
            break;
        }
    }
    let task_dir = match task_dir {
        Some(dir) => dir,
        None => {
            print_error("fatal", "缺少 --task-dir 参数");
            eprintln!("用法: ingestr-task --task-dir <DIR>");
            exit(1);
        }
    };

    // 2. 初始化日志系统
    let _log_guard = init_task_logging(&task_dir);
    tracing::info!("任务进程启动，task_dir: {:?}", task_dir);

    // 3. 读取任务配置
    let config_path = task_dir.join("config.json");
    let config_content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) => {
            print_error("fatal", &format!("无法读取配置文件: {}", e));
            exit(1);
        }
    };

    // 4. 解析统一的任务配置
    let config: TaskConfig = match serde_json::from_str(&config_content) {
        Ok(cfg) => cfg,
        Err(e) => {
            print_error("fatal", &format!("配置文件格式错误: {}", e));
            exit(1);
        }
    };
    tracing::info!("任务配置解析成功: task_id={}", config.task_id);

    // 5. 建立数据库连接
    tracing::info!("正在连接数据库: {}", config.source.endpoint());
    let mut session = match create_connection(&config.source) {
        Ok(s) => s,
        Err(e) => {
            print_error("fatal", &format!("数据库连接失败: {}", e));
            exit(1);
        }
    };
    tracing::info!("数据库连接成功");

    // 6. 执行导入流水线，任一阶段失败整体回滚并以非零退出码结束
    match pipeline::run(&mut session, &config.import) {
        Ok(reports) => {
            let total: u64 = reports.iter().map(|r| r.rows).sum();
            tracing::info!("导入完成，共处理 {} 行", total);
            print_completed(serde_json::json!({
                "status": "success",
                "total_rows": total,
                "stages": reports,
            }));
        }
        Err(e) => {
            print_error("fatal", &format!("导入失败，已回滚: {}", e));
            exit(1);
        }
    }
}

pub fn print_error(
    severity: &str,
    message: &str,
) {
    print_progress(ProgressMessage {
        kind: MessageKind::Error,
        data: serde_json::json!({
            "severity": severity,
            "message": message,
        }),
    });
}

pub fn print_completed(data: serde_json::Value) {
    print_progress(ProgressMessage {
        kind: MessageKind::Completed,
        data,
    });
}

pub fn print_progress(msg: ProgressMessage) {
    if let Ok(json) = serde_json::to_string(&msg) {
        println!("{}", json);
    }
}
