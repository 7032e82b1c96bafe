// ==========================================
// OEE 生产监控系统 - 记录存储能力接口
// ==========================================
// 记录存储只要求最小能力：整表读取 + 追加一行
// 不要求查询下推、不要求事务、不要求行级标识
// （沿用电子表格语义：允许重复行，按写入顺序读回）
// ==========================================

use crate::repository::error::RepositoryResult;
use std::collections::HashMap;
use std::fmt;

/// 原始行：列名 → 单元格文本
///
/// 单元格一律以文本存取，数值/日期解析由指标引擎尽力完成。
pub type RawRow = HashMap<String, String>;

// ==========================================
// 记录表 (Record Table)
// ==========================================

/// 记录存储中的两张命名表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTable {
    /// 生产记录表
    Production,
    /// 停机记录表
    Downtime,
}

impl RecordTable {
    /// 表名
    pub fn name(&self) -> &'static str {
        match self {
            RecordTable::Production => "production",
            RecordTable::Downtime => "downtime",
        }
    }

    /// 表的固定列集合（写入顺序）
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RecordTable::Production => &[
                "date",
                "line",
                "shift",
                "sku",
                "loading_time",
                "output_maximum",
                "good_output",
                "defect_count",
                "entered_by",
            ],
            RecordTable::Downtime => &[
                "date",
                "line",
                "shift",
                "sku",
                "start_time",
                "finish_time",
                "description",
                "category",
                "work_center",
                "process",
                "equipment",
                "entered_by",
            ],
        }
    }

    /// 按表名解析
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "production" | "oee" => Some(RecordTable::Production),
            "downtime" => Some(RecordTable::Downtime),
            _ => None,
        }
    }
}

impl fmt::Display for RecordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ==========================================
// RecordStore - 记录存储能力接口
// ==========================================

/// 记录存储能力接口
///
/// 契约：
/// - read_table 返回整表所有行，保持写入顺序
/// - append_row 追加一行，单次尽力写入，失败直接上抛（无重试）
/// - 不去重、不校验行内容（引擎容忍坏单元格）
pub trait RecordStore: Send + Sync {
    /// 整表读取（按写入顺序）
    fn read_table(&self, table: RecordTable) -> RepositoryResult<Vec<RawRow>>;

    /// 追加一行
    fn append_row(&self, table: RecordTable, row: &RawRow) -> RepositoryResult<()>;
}
