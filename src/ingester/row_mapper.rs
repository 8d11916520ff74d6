// ==========================================
// 排程摄取服务 - 行映射器
// ==========================================
// 职责: 按列位置契约（1-15 列）把一行单元格映射为排产单元
// 红线: 列位置与上游排程表严格对齐,不得改动
// ==========================================

use crate::domain::ScheduledUnit;
use crate::ingester::cell_cleaner::{cell_bool, cell_date, cell_opt_text, cell_text, non_blank};
use crate::ingester::schedule_ingester_trait::RowMapper;
use calamine::Data;

// ===== 列位置契约（0 基下标）=====
const COL_START_DATE: usize = 0;
const COL_PROJECTED_DELIVERY_DATE: usize = 1;
const COL_START_POINT: usize = 2;
const COL_VALUE_STREAM: usize = 3;
const COL_WORK_ORDER: usize = 4;
const COL_JOB_NUMBER: usize = 5;
const COL_CUSTOMER: usize = 6;
const COL_BOX: usize = 7;
const COL_CHASSIS: usize = 8;
const COL_INDICATOR: usize = 9;
const COL_COMPLETE: usize = 10;
const COL_FIRST_DAY_OF_PROD_WEEK: usize = 11;
const COL_DAY_AND_NUMBER: usize = 12;
const COL_LINE_ORDER: usize = 13;
const COL_BUILD_NUMBER: usize = 14;

pub struct PositionalRowMapper;

const EMPTY_CELL: &Data = &Data::Empty;

/// 按下标取单元格,行尾缺列按空单元格处理
fn cell_at(row: &[Data], idx: usize) -> &Data {
    row.get(idx).unwrap_or(EMPTY_CELL)
}

impl RowMapper for PositionalRowMapper {
    fn map_row(&self, row: &[Data], row_number: usize) -> Option<ScheduledUnit> {
        // 主键字段缺一即整行跳过（排程表尾部的稀疏行是常态）
        let job_number = non_blank(cell_text(cell_at(row, COL_JOB_NUMBER)));
        let customer = non_blank(cell_text(cell_at(row, COL_CUSTOMER)));
        let (job_number, customer) = match (job_number, customer) {
            (Some(j), Some(c)) => (j, c),
            _ => {
                tracing::trace!(row = row_number, "主键字段空白,跳过该行");
                return None;
            }
        };

        Some(ScheduledUnit {
            start_date: cell_date(cell_at(row, COL_START_DATE)),
            projected_delivery_date: cell_date(cell_at(row, COL_PROJECTED_DELIVERY_DATE)),
            start_point: cell_opt_text(cell_at(row, COL_START_POINT)),
            value_stream: cell_opt_text(cell_at(row, COL_VALUE_STREAM)),
            work_order: cell_opt_text(cell_at(row, COL_WORK_ORDER)),
            job_number,
            customer,
            box_: cell_opt_text(cell_at(row, COL_BOX)),
            chassis: cell_opt_text(cell_at(row, COL_CHASSIS)),
            indicator: cell_opt_text(cell_at(row, COL_INDICATOR)),
            complete: cell_bool(cell_at(row, COL_COMPLETE)),
            first_day_of_prod_week: cell_date(cell_at(row, COL_FIRST_DAY_OF_PROD_WEEK)),
            day_and_number: cell_opt_text(cell_at(row, COL_DAY_AND_NUMBER)),
            line_order: cell_opt_text(cell_at(row, COL_LINE_ORDER)),
            build_number: cell_opt_text(cell_at(row, COL_BUILD_NUMBER)),
        })
    }
}
