// ==========================================
// OEE 生产监控系统 - 领域类型定义
// ==========================================
// KPI 颜色分级 / 月份键 / 看板周期选择
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ==========================================
// KPI 颜色分级 (KPI Color)
// ==========================================
// 阈值为固定常量，不可配置

/// KPI 红色上限（低于此值为红色）
pub const KPI_RED_BELOW_PCT: f64 = 65.0;

/// KPI 绿色下限（达到此值为绿色）
pub const KPI_GREEN_FROM_PCT: f64 = 85.0;

/// KPI 值的颜色分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KpiColor {
    Red,    // < 65
    Yellow, // 65 ≤ v < 85
    Green,  // ≥ 85
}

impl KpiColor {
    /// 按固定阈值对 KPI 百分比值分级
    pub fn classify(value_pct: f64) -> Self {
        if value_pct < KPI_RED_BELOW_PCT {
            KpiColor::Red
        } else if value_pct < KPI_GREEN_FROM_PCT {
            KpiColor::Yellow
        } else {
            KpiColor::Green
        }
    }

    /// 前端渲染用的十六进制颜色
    pub fn hex(&self) -> &'static str {
        match self {
            KpiColor::Red => "#e74c3c",
            KpiColor::Yellow => "#f1c40f",
            KpiColor::Green => "#2ecc71",
        }
    }
}

impl fmt::Display for KpiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiColor::Red => write!(f, "RED"),
            KpiColor::Yellow => write!(f, "YELLOW"),
            KpiColor::Green => write!(f, "GREEN"),
        }
    }
}

// ==========================================
// 月份键 (Month Key)
// ==========================================
// 聚合与筛选使用的月份标识，文本形式 "YYYY-MM"

/// 月份键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// 从日期取月份键
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 该月第一天（用于排序/区间计算）
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// 月份键解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthKeyError(pub String);

impl fmt::Display for ParseMonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "无效的月份键: {}", self.0)
    }
}

impl std::error::Error for ParseMonthKeyError {}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, '-');
        let year = parts
            .next()
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(|| ParseMonthKeyError(s.to_string()))?;
        let month = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| ParseMonthKeyError(s.to_string()))?;
        Ok(Self { year, month })
    }
}

// 序列化为 "YYYY-MM" 字符串（与数据库/前端一致）
impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ==========================================
// 看板周期选择 (Period Filter)
// ==========================================

/// 看板周期选择：单月 / 整年 / 全部
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PeriodFilter {
    Month(MonthKey),
    Year(i32),
    All,
}

impl PeriodFilter {
    /// 判断日期是否落在所选周期内
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            PeriodFilter::Month(key) => MonthKey::from_date(date) == *key,
            PeriodFilter::Year(year) => date.year() == *year,
            PeriodFilter::All => true,
        }
    }

    /// 周期的展示标签
    pub fn label(&self) -> String {
        match self {
            PeriodFilter::Month(key) => key.to_string(),
            PeriodFilter::Year(year) => format!("{:04}", year),
            PeriodFilter::All => "ALL".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpi_color_thresholds() {
        // 阈值边界：64.9→红，65.0→黄，84.9→黄，85.0→绿
        assert_eq!(KpiColor::classify(64.9), KpiColor::Red);
        assert_eq!(KpiColor::classify(65.0), KpiColor::Yellow);
        assert_eq!(KpiColor::classify(84.9), KpiColor::Yellow);
        assert_eq!(KpiColor::classify(85.0), KpiColor::Green);
    }

    #[test]
    fn test_month_key_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let key = MonthKey::from_date(date);
        assert_eq!(key.to_string(), "2025-03");
        assert_eq!("2025-03".parse::<MonthKey>().unwrap(), key);
    }

    #[test]
    fn test_month_key_parse_invalid() {
        assert!("2025".parse::<MonthKey>().is_err());
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("abcd-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_period_filter_contains() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert!(PeriodFilter::Month("2025-03".parse().unwrap()).contains(date));
        assert!(!PeriodFilter::Month("2025-04".parse().unwrap()).contains(date));
        assert!(PeriodFilter::Year(2025).contains(date));
        assert!(!PeriodFilter::Year(2024).contains(date));
        assert!(PeriodFilter::All.contains(date));
    }
}
