// ==========================================
// 排程摄取服务 - 排产单元领域模型
// ==========================================
// 职责: 定义排程表一行数据的解码结果
// 红线: 列位置契约（1-15 列）与上游排程表严格对齐,
//       字段顺序不得调整
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ==========================================
// ScheduledUnit - 排产单元
// ==========================================
// 用途: 摄取层写入,宿主只读
// 约束: 仅当 job_number 与 customer 同时非空时才构造;
//       其余字段解析失败一律置 None,不报错
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledUnit {
    // ===== 日期字段（尽力解析,失败置空）=====
    pub start_date: Option<NaiveDate>,               // 第 1 列: 开工日期
    pub projected_delivery_date: Option<NaiveDate>,  // 第 2 列: 预计交付日期

    // ===== 产线定位 =====
    pub start_point: Option<String>,                 // 第 3 列: 上线工位
    pub value_stream: Option<String>,                // 第 4 列: 价值流
    pub work_order: Option<String>,                  // 第 5 列: 工单号

    // ===== 主键字段（必填,空白则整行跳过）=====
    pub job_number: String,                          // 第 6 列: 任务号
    pub customer: String,                            // 第 7 列: 客户

    // ===== 产品信息 =====
    #[serde(rename = "box")]
    pub box_: Option<String>,                        // 第 8 列: 箱体
    pub chassis: Option<String>,                     // 第 9 列: 底盘
    pub indicator: Option<String>,                   // 第 10 列: 标识

    // ===== 进度字段 =====
    pub complete: Option<bool>,                      // 第 11 列: 完成标记（尽力解析）
    pub first_day_of_prod_week: Option<NaiveDate>,   // 第 12 列: 生产周首日

    // ===== 排序信息 =====
    pub day_and_number: Option<String>,              // 第 13 列: 日序号
    pub line_order: Option<String>,                  // 第 14 列: 产线顺序
    pub build_number: Option<String>,                // 第 15 列: 制造序号
}

// ==========================================
// ScheduleBatch - 排程批次
// ==========================================
// 一次成功解析得到的全量排产单元,按行序排列。
// 批次不携带身份,跨批次去重由宿主负责。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleBatch {
    /// 排产单元（保持工作表行序）
    pub units: Vec<ScheduledUnit>,

    /// 本批次来源文件
    pub source_file: PathBuf,

    /// 因主键字段空白被跳过的非空行数
    pub rows_skipped: usize,
}

impl ScheduleBatch {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
