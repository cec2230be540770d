use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::TaskError;

/// 整个文件按输入顺序读入内存，表头行由 reader 消费掉
pub fn read_records(path: &Path) -> Result<Vec<StringRecord>, TaskError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let mut records = vec![];
    for record in reader.records() {
        records.push(record?);
    }
    Ok(records)
}

/// 取指定列，缺列视为阶段级错误
///
/// row 为 CSV 文件中的行号（表头为第 1 行）
pub fn field<'a>(
    record: &'a StringRecord,
    index: usize,
    column: &'static str,
    row: usize,
) -> Result<&'a str, TaskError> {
    record.get(index).ok_or(TaskError::MissingColumn { row, column })
}

/// 数据行在 CSV 文件中的行号（索引 0 对应第 2 行）
pub fn row_number(index: usize) -> usize {
    index + 2
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn header_row_is_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("departments.csv");
        fs::write(&path, "dept_no,dept_name\nd001,Marketing\nd002,Sales\n").unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(0), Some("d001"));
    }

    #[test]
    fn fields_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("departments.csv");
        fs::write(&path, "dept_no,dept_name\n d001 , Marketing \n").unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(field(&records[0], 1, "dept_name", row_number(0)).unwrap(), "Marketing");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_records(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn short_row_reports_missing_column() {
        let record = StringRecord::from(vec!["d001"]);
        let err = field(&record, 1, "dept_name", 2).unwrap_err();
        assert!(matches!(err, TaskError::MissingColumn { row: 2, column: "dept_name" }));
    }
}
