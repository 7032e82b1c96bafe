// ==========================================
// OEE 生产监控系统 - 数据录入 API
// ==========================================
// 职责: 表单提交 → 记录存储追加
// - 一条生产行 + 零或多条停机行，逐行独立追加（无事务组）
// - 写入前以会话用户做访问门禁，用户名落入 entered_by
// ==========================================
// 停机行编辑采用"草稿竞技场"：一个由生成 id 索引的可重复
// 行编辑器（add/update/remove 单一参数化入口），
// 取代按 (产线, SKU) 组合逐个硬编码的处理器
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::app::session::SessionStore;
use crate::engine::normalize::parse_date;
use crate::i18n::t;
use crate::repository::record_store::{RawRow, RecordStore, RecordTable};

// ==========================================
// 表单 DTO
// ==========================================

/// 生产记录表单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    /// 日期（须可解析，如 "2025-03-01"）
    pub date: String,
    pub line: String,
    pub shift: String,
    pub sku: String,
    /// 负荷时间（分钟），须 > 0
    pub loading_time: f64,
    /// 最大产出（件），须 > 0
    pub output_maximum: f64,
    /// 良品产出（件），须 ≥ 0
    pub good_output: f64,
    /// 不良品数（件），须 ≥ 0
    pub defect_count: f64,
}

/// 停机行草稿（竞技场中的一条，id 为生成键）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeDraft {
    pub id: Uuid,
    pub start_time: String,
    pub finish_time: String,
    pub description: String,
    pub category: String,
    pub work_center: String,
    pub process: String,
    pub equipment: String,
}

impl DowntimeDraft {
    fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: String::new(),
            finish_time: String::new(),
            description: String::new(),
            category: String::new(),
            work_center: String::new(),
            process: String::new(),
            equipment: String::new(),
        }
    }

    /// 七个字段全部填写才算完整；不完整的草稿提交时静默跳过
    pub fn is_complete(&self) -> bool {
        !self.start_time.trim().is_empty()
            && !self.finish_time.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.category.trim().is_empty()
            && !self.work_center.trim().is_empty()
            && !self.process.trim().is_empty()
            && !self.equipment.trim().is_empty()
    }
}

/// 停机行草稿集合（由生成 id 索引的可重复行编辑器）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DowntimeDraftSet {
    rows: Vec<DowntimeDraft>,
}

impl DowntimeDraftSet {
    /// 初始含一条空白行（表单打开即有一行可填）
    pub fn new() -> Self {
        Self {
            rows: vec![DowntimeDraft::blank()],
        }
    }

    /// 追加一条空白行，返回生成的 id
    pub fn add_row(&mut self) -> Uuid {
        let draft = DowntimeDraft::blank();
        let id = draft.id;
        self.rows.push(draft);
        id
    }

    /// 按 id 删除一行
    pub fn remove_row(&mut self, id: Uuid) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    /// 按 id 取可变引用（更新字段值）
    pub fn row_mut(&mut self, id: Uuid) -> Option<&mut DowntimeDraft> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn rows(&self) -> &[DowntimeDraft] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 完整填写的草稿行
    pub fn complete_rows(&self) -> impl Iterator<Item = &DowntimeDraft> {
        self.rows.iter().filter(|row| row.is_complete())
    }
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// 追加的停机行数
    pub downtime_appended: usize,
    /// 用户可见状态消息
    pub message: String,
}

// ==========================================
// InputApi - 数据录入 API
// ==========================================

/// 数据录入API
pub struct InputApi {
    store: Arc<dyn RecordStore>,
    session: Arc<SessionStore>,
}

impl InputApi {
    /// 创建新的InputApi实例
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<SessionStore>) -> Self {
        Self { store, session }
    }

    /// 提交一次录入：一条生产行 + 草稿集中完整的停机行
    ///
    /// # 参数
    /// - entry: 生产记录表单
    /// - drafts: 停机行草稿集合
    ///
    /// # 返回
    /// - Ok(SubmitOutcome): 追加行数与状态消息
    /// - Err(ApiError): 未登录 / 字段校验失败 / 存储写入失败（单次尽力，不重试）
    pub fn submit_entry(
        &self,
        entry: &ProductionEntry,
        drafts: &DowntimeDraftSet,
    ) -> ApiResult<SubmitOutcome> {
        let user = self
            .session
            .current_user()
            .ok_or_else(|| ApiError::Unauthorized(t("login.required")))?;

        self.validate_entry(entry)?;

        // 生产行
        let production_row = Self::production_row(entry, &user);
        self.store
            .append_row(RecordTable::Production, &production_row)?;

        // 停机行：只提交完整填写的草稿
        let mut downtime_appended = 0usize;
        for draft in drafts.complete_rows() {
            let row = Self::downtime_row(entry, draft, &user);
            self.store.append_row(RecordTable::Downtime, &row)?;
            downtime_appended += 1;
        }

        tracing::info!(
            line = %entry.line,
            date = %entry.date,
            downtime_rows = downtime_appended,
            user = %user,
            "录入已保存"
        );

        let message = if downtime_appended > 0 {
            t("input.saved_with_downtime")
        } else {
            t("input.saved")
        };

        Ok(SubmitOutcome {
            downtime_appended,
            message,
        })
    }

    /// 生产表单校验
    fn validate_entry(&self, entry: &ProductionEntry) -> ApiResult<()> {
        if entry.date.trim().is_empty()
            || entry.line.trim().is_empty()
            || entry.shift.trim().is_empty()
            || entry.sku.trim().is_empty()
        {
            return Err(ApiError::InvalidInput(t("input.missing_fields")));
        }
        if parse_date(&entry.date).is_none() {
            return Err(ApiError::InvalidInput(format!(
                "无法解析的日期: {}",
                entry.date
            )));
        }
        if entry.loading_time <= 0.0 {
            return Err(ApiError::InvalidInput(
                "负荷时间必须大于 0".to_string(),
            ));
        }
        if entry.output_maximum <= 0.0 {
            return Err(ApiError::InvalidInput(
                "最大产出必须大于 0".to_string(),
            ));
        }
        if entry.good_output < 0.0 || entry.defect_count < 0.0 {
            return Err(ApiError::InvalidInput(
                "产出与不良品数不能为负".to_string(),
            ));
        }
        Ok(())
    }

    fn production_row(entry: &ProductionEntry, user: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert("date".to_string(), entry.date.trim().to_string());
        row.insert("line".to_string(), entry.line.trim().to_string());
        row.insert("shift".to_string(), entry.shift.trim().to_string());
        row.insert("sku".to_string(), entry.sku.trim().to_string());
        row.insert("loading_time".to_string(), entry.loading_time.to_string());
        row.insert(
            "output_maximum".to_string(),
            entry.output_maximum.to_string(),
        );
        row.insert("good_output".to_string(), entry.good_output.to_string());
        row.insert("defect_count".to_string(), entry.defect_count.to_string());
        row.insert("entered_by".to_string(), user.to_string());
        row
    }

    fn downtime_row(entry: &ProductionEntry, draft: &DowntimeDraft, user: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert("date".to_string(), entry.date.trim().to_string());
        row.insert("line".to_string(), entry.line.trim().to_string());
        row.insert("shift".to_string(), entry.shift.trim().to_string());
        row.insert("sku".to_string(), entry.sku.trim().to_string());
        row.insert("start_time".to_string(), draft.start_time.trim().to_string());
        row.insert(
            "finish_time".to_string(),
            draft.finish_time.trim().to_string(),
        );
        row.insert(
            "description".to_string(),
            draft.description.trim().to_string(),
        );
        row.insert("category".to_string(), draft.category.trim().to_string());
        row.insert(
            "work_center".to_string(),
            draft.work_center.trim().to_string(),
        );
        row.insert("process".to_string(), draft.process.trim().to_string());
        row.insert("equipment".to_string(), draft.equipment.trim().to_string());
        row.insert("entered_by".to_string(), user.to_string());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_set_starts_with_one_blank_row() {
        let drafts = DowntimeDraftSet::new();
        assert_eq!(drafts.len(), 1);
        assert!(!drafts.rows()[0].is_complete());
    }

    #[test]
    fn test_draft_arena_add_update_remove() {
        let mut drafts = DowntimeDraftSet::new();
        let id = drafts.add_row();
        assert_eq!(drafts.len(), 2);

        {
            let row = drafts.row_mut(id).unwrap();
            row.start_time = "08:00".to_string();
            row.finish_time = "09:00".to_string();
            row.description = "换模".to_string();
            row.category = "计划停机".to_string();
            row.work_center = "WC1".to_string();
            row.process = "成型".to_string();
            row.equipment = "E1".to_string();
        }
        assert_eq!(drafts.complete_rows().count(), 1);

        assert!(drafts.remove_row(id));
        assert_eq!(drafts.len(), 1);
        assert!(!drafts.remove_row(id));
    }

    #[test]
    fn test_incomplete_draft_not_counted() {
        let mut drafts = DowntimeDraftSet::new();
        let id = drafts.add_row();
        let row = drafts.row_mut(id).unwrap();
        row.start_time = "08:00".to_string();
        // finish 等字段缺失
        assert_eq!(drafts.complete_rows().count(), 0);
    }
}
