// ==========================================
// 排程摄取服务 - 单元格清洗
// ==========================================
// 职责: TRIM / NULL 标准化 / 尽力型日期与布尔解析
// 红线: 日期与布尔解析是全函数 - 解析失败一律返回 None,
//       绝不让单行脏数据中断整个批次
// ==========================================

use calamine::{Data, DataType};
use chrono::NaiveDate;

/// 取单元格的文本表示并去除首尾空白
pub fn cell_text(cell: &Data) -> String {
    cell.to_string().trim().to_string()
}

/// 空白文本标准化为 None
pub fn non_blank(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// 取单元格文本,空白置 None
pub fn cell_opt_text(cell: &Data) -> Option<String> {
    non_blank(cell_text(cell))
}

/// 尽力解析日期单元格
///
/// 先走原生日期单元格（Excel 序列日期）,失败后按文本
/// 逐个格式尝试。
pub fn cell_date(cell: &Data) -> Option<NaiveDate> {
    if let Some(date) = cell.as_date() {
        return Some(date);
    }
    parse_date_text(&cell_text(cell))
}

/// 尽力解析日期文本
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%m/%d/%y",
        "%Y/%m/%d",
        "%Y%m%d",
    ];

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// 尽力解析布尔单元格（三态: true / false / 未知置 None）
pub fn cell_bool(cell: &Data) -> Option<bool> {
    match cell {
        Data::Bool(b) => Some(*b),
        _ => parse_bool_text(&cell_text(cell)),
    }
}

/// 尽力解析布尔文本
pub fn parse_bool_text(value: &str) -> Option<bool> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRUE" | "YES" | "Y" | "1" => Some(true),
        "FALSE" | "NO" | "N" | "0" => Some(false),
        _ => None,
    }
}
