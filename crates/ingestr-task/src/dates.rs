use chrono::NaiveDate;

use ingestr_core::SqlValue;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析 `yyyy-MM-dd` 格式的日期
///
/// 解析失败只告警不中断，调用方以 NULL 日期继续写入该行
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!("日期解析失败: {:?}", raw);
            None
        }
    }
}

/// 日期绑定值：有效日期绑定文本，无效日期绑定 NULL
pub fn date_value(date: Option<NaiveDate>) -> SqlValue {
    match date {
        Some(date) => SqlValue::Text(date.format(DATE_FORMAT).to_string()),
        None => SqlValue::Null,
    }
}
