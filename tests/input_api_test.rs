// ==========================================
// 数据录入 API 集成测试
// ==========================================
// 会话门禁 / 表单校验 / 生产+停机行追加
// ==========================================


use oee_monitoring::api::{ApiError, DowntimeDraftSet, ProductionEntry};
use oee_monitoring::repository::record_store::{RecordStore, RecordTable};
use test_helpers::create_test_app;

fn sample_entry() -> ProductionEntry {
    ProductionEntry {
        date: "2025-03-01".to_string(),
        line: "1".to_string(),
        shift: "1".to_string(),
        sku: "SKU-A".to_string(),
        loading_time: 480.0,
        output_maximum: 1000.0,
        good_output: 900.0,
        defect_count: 50.0,
    }
}

#[test]
fn test_submit_requires_login() {
    let (_db, app) = create_test_app();
    let err = app
        .input_api
        .submit_entry(&sample_entry(), &DowntimeDraftSet::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    // 未登录时不得写入任何行
    assert!(app
        .store
        .read_table(RecordTable::Production)
        .unwrap()
        .is_empty());
}

#[test]
fn test_submit_appends_production_and_complete_downtime() {
    let (_db, app) = create_test_app();
    app.auth_api.login("heri", "heri2024").unwrap();

    let mut drafts = DowntimeDraftSet::new();
    let id = drafts.add_row();
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

    let outcome = app.input_api.submit_entry(&sample_entry(), &drafts).unwrap();
    // 初始空白行不完整，只有填好的那行入库
    assert_eq!(outcome.downtime_appended, 1);

    let production = app.store.read_table(RecordTable::Production).unwrap();
    assert_eq!(production.len(), 1);
    assert_eq!(production[0]["loading_time"], "480");
    // entered_by 盖章为会话用户
    assert_eq!(production[0]["entered_by"], "heri");

    let downtime = app.store.read_table(RecordTable::Downtime).unwrap();
    assert_eq!(downtime.len(), 1);
    assert_eq!(downtime[0]["category"], "计划停机");
    // 停机行继承表头字段
    assert_eq!(downtime[0]["date"], "2025-03-01");
    assert_eq!(downtime[0]["line"], "1");
    assert_eq!(downtime[0]["entered_by"], "heri");
}

#[test]
fn test_submit_without_downtime() {
    let (_db, app) = create_test_app();
    app.auth_api.login("admin", "admin123").unwrap();

    let outcome = app
        .input_api
        .submit_entry(&sample_entry(), &DowntimeDraftSet::new())
        .unwrap();
    assert_eq!(outcome.downtime_appended, 0);
    assert!(app
        .store
        .read_table(RecordTable::Downtime)
        .unwrap()
        .is_empty());
}

#[test]
fn test_submit_validates_fields() {
    let (_db, app) = create_test_app();
    app.auth_api.login("admin", "admin123").unwrap();

    let mut entry = sample_entry();
    entry.line = "".to_string();
    assert!(matches!(
        app.input_api
            .submit_entry(&entry, &DowntimeDraftSet::new()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut entry = sample_entry();
    entry.date = "03/99/2025".to_string();
    assert!(matches!(
        app.input_api
            .submit_entry(&entry, &DowntimeDraftSet::new()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut entry = sample_entry();
    entry.loading_time = 0.0;
    assert!(matches!(
        app.input_api
            .submit_entry(&entry, &DowntimeDraftSet::new()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut entry = sample_entry();
    entry.defect_count = -1.0;
    assert!(matches!(
        app.input_api
            .submit_entry(&entry, &DowntimeDraftSet::new()),
        Err(ApiError::InvalidInput(_))
    ));

    // 校验失败不得写入
    assert!(app
        .store
        .read_table(RecordTable::Production)
        .unwrap()
        .is_empty());
}

#[test]
fn test_logout_blocks_further_submissions() {
    let (_db, app) = create_test_app();
    app.auth_api.login("admin", "admin123").unwrap();
    app.input_api
        .submit_entry(&sample_entry(), &DowntimeDraftSet::new())
        .unwrap();

    app.auth_api.logout();
    let err = app
        .input_api
        .submit_entry(&sample_entry(), &DowntimeDraftSet::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    assert_eq!(app.store.read_table(RecordTable::Production).unwrap().len(), 1);
}
