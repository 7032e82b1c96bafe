// ==========================================
// OEE 生产监控系统 - 指标公式
// ==========================================
// 四项指标均为 0-100 百分比；分母为零或非正时
// 以 None 替代，不抛错、不产生 Inf/NaN
// ==========================================
// Performance 采用规范公式:
//   (良品 + 不良品) / 最大产出
// （源系统存在未统一的第二种公式，本系统统一采用此式，
//  决策记录见 DESIGN.md）
// ==========================================

use serde::{Deserialize, Serialize};

/// Availability（%）
///
/// (负荷时间 − 停机时长) / 负荷时间 × 100
/// 负荷时间 ≤ 0 或缺失时为 None。
pub fn availability_pct(loading_time: Option<f64>, downtime_minutes: f64) -> Option<f64> {
    let loading = loading_time?;
    if loading <= 0.0 {
        return None;
    }
    Some((loading - downtime_minutes) / loading * 100.0)
}

/// Performance（%）
///
/// (良品产出 + 不良品数) / 最大产出 × 100
/// 最大产出 ≤ 0 或任一项缺失时为 None。
pub fn performance_pct(
    good_output: Option<f64>,
    defect_count: Option<f64>,
    output_maximum: Option<f64>,
) -> Option<f64> {
    let good = good_output?;
    let defect = defect_count?;
    let out_max = output_maximum?;
    if out_max <= 0.0 {
        return None;
    }
    Some((good + defect) / out_max * 100.0)
}

/// Quality（%）
///
/// (良品产出 − 不良品数) / 良品产出 × 100
/// 良品产出 ≤ 0 或任一项缺失时为 None。
pub fn quality_pct(good_output: Option<f64>, defect_count: Option<f64>) -> Option<f64> {
    let good = good_output?;
    let defect = defect_count?;
    if good <= 0.0 {
        return None;
    }
    Some((good - defect) / good * 100.0)
}

/// OEE（%）
///
/// availability × performance × quality / 10000
/// （三项均为百分比，除以 100² 归一回 0-100）
/// 任一因子为 None 时 OEE 为 None。
pub fn oee_pct(
    availability: Option<f64>,
    performance: Option<f64>,
    quality: Option<f64>,
) -> Option<f64> {
    Some(availability? * performance? * quality? / 10_000.0)
}

// ==========================================
// OEE 指标组 (OeeMetrics)
// ==========================================

/// 一组 A/P/Q/OEE 指标值
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OeeMetrics {
    pub availability: Option<f64>,
    pub performance: Option<f64>,
    pub quality: Option<f64>,
    pub oee: Option<f64>,
}

impl OeeMetrics {
    /// 由原始计数直接套公式计算
    pub fn compute(
        loading_time: Option<f64>,
        output_maximum: Option<f64>,
        good_output: Option<f64>,
        defect_count: Option<f64>,
        downtime_minutes: f64,
    ) -> Self {
        let availability = availability_pct(loading_time, downtime_minutes);
        let performance = performance_pct(good_output, defect_count, output_maximum);
        let quality = quality_pct(good_output, defect_count);
        let oee = oee_pct(availability, performance, quality);
        Self {
            availability,
            performance,
            quality,
            oee,
        }
    }
}

// ==========================================
// 指标计数器 (MetricCounters)
// ==========================================
// 聚合策略：先累加原始计数再套公式，
// 绝不对每行百分比取平均（行数不均时平均会失真）

/// 按日/按月聚合的原始计数累加器
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricCounters {
    pub loading_time: f64,
    pub output_maximum: f64,
    pub good_output: f64,
    pub defect_count: f64,
    pub downtime_minutes: f64,
}

impl MetricCounters {
    /// 累加一条生产记录的计数（缺失值按 0 处理，与逐列求和语义一致）
    pub fn add_production(&mut self, record: &crate::domain::record::ProductionRecord) {
        self.loading_time += record.loading_time.unwrap_or(0.0);
        self.output_maximum += record.output_maximum.unwrap_or(0.0);
        self.good_output += record.good_output.unwrap_or(0.0);
        self.defect_count += record.defect_count.unwrap_or(0.0);
    }

    /// 累加停机时长
    pub fn add_downtime(&mut self, minutes: f64) {
        self.downtime_minutes += minutes;
    }

    /// 从累加后的计数重算一组指标
    pub fn metrics(&self) -> OeeMetrics {
        OeeMetrics::compute(
            Some(self.loading_time),
            Some(self.output_maximum),
            Some(self.good_output),
            Some(self.defect_count),
            self.downtime_minutes,
        )
    }
}
