// ==========================================
// 课程模板实例化引擎 - 行映射辅助函数
// ==========================================
// 统一枚举 / 时间 / JSON 列的读写格式
// ==========================================

use crate::domain::types::UnknownVariantError;
use chrono::{DateTime, Local, NaiveDateTime};
use rusqlite::types::Type;
use std::str::FromStr;

/// 时间列统一格式（写入时使用）
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 读取时额外兼容的无时区格式（ISO 8601 'T' 分隔、带小数秒）
const ACCEPTED_NAIVE_FORMATS: [&str; 3] = [
    DATETIME_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// 解析枚举列
pub fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariantError>,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 格式化时间列
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// 解析必填时间列
///
/// 依次尝试统一格式、ISO 8601 无时区格式，最后按 RFC 3339 解析并换算为本地时间
pub fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(parsed) = ACCEPTED_NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Ok(parsed);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).naive_local())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析可空时间列
pub fn parse_optional_datetime(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<NaiveDateTime>> {
    raw.map(|s| parse_datetime(idx, &s)).transpose()
}

/// 解析 JSON 数组形式的 ID 列表
pub fn parse_id_list(idx: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 编码 ID 列表为 JSON 数组
pub fn encode_id_list(ids: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(ids)
}
