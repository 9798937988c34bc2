// ==========================================
// 数据完整性扫描集成测试
// ==========================================
// 工段链 1 -> 2 -> 3 -> 4，记录直接写库以构造不平衡场景
// ==========================================


#[cfg(test)]
mod integrity_scan_test {
    use chrono::Duration;
    use shopfloor_mis::api::ApiError;
    use shopfloor_mis::config::config_keys;
    use shopfloor_mis::domain::{FindingKind, Severity};
    use shopfloor_mis::Actor;

    use crate::test_helpers::{create_test_db, insert_raw_log, open_state, seed_chain, test_today};

    fn admin() -> Actor {
        Actor::admin("admin")
    }

    #[test]
    fn test_medium_discrepancy_and_missing_workers() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let today = test_today();

        insert_raw_log(&db_path, 1, 1, today, 120.0, 100.0).unwrap();
        insert_raw_log(&db_path, 3, 2, today, 90.0, 85.0).unwrap();
        insert_raw_log(&db_path, 5, 3, today, 85.0, 80.0).unwrap();
        insert_raw_log(&db_path, 7, 4, today, 80.0, 80.0).unwrap();

        let state = open_state(&db_path);
        let report = state
            .report_api
            .check_data_integrity_on(&admin(), today)
            .unwrap();

        assert_eq!(report.scan_date, today);
        assert!(!report.scan_id.is_empty());
        assert_eq!(report.findings.len(), 5);
        assert_eq!(report.count_by_kind(FindingKind::MaterialFlow), 1);
        assert_eq!(report.count_by_kind(FindingKind::MissingData), 4);

        // 物料流转问题排在前面
        let flow = &report.findings[0];
        assert_eq!(flow.kind, FindingKind::MaterialFlow);
        assert_eq!(flow.severity, Severity::Medium);
        assert_eq!(
            flow.description,
            "Material flow discrepancy between Raw Material and Processing"
        );
        assert_eq!(flow.details["discrepancy"].as_f64(), Some(10.0));
        assert_eq!(flow.details["from_section_id"].as_i64(), Some(1));
        assert_eq!(flow.details["to_section_id"].as_i64(), Some(2));

        let missing: Vec<i64> = report
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::MissingData)
            .map(|f| {
                assert_eq!(f.severity, Severity::Low);
                f.details["worker_id"].as_i64().unwrap()
            })
            .collect();
        assert_eq!(missing, vec![2, 4, 6, 8]);
        assert_eq!(report.max_severity(), Some(Severity::Medium));
    }

    #[test]
    fn test_large_discrepancy_is_high_in_both_directions() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let today = test_today();

        // 1 -> 2: 产出 100，投入 80 => +20
        insert_raw_log(&db_path, 1, 1, today, 110.0, 100.0).unwrap();
        insert_raw_log(&db_path, 3, 2, today, 80.0, 0.0).unwrap();
        // 3 -> 4: 产出 0，投入 15 => -15
        insert_raw_log(&db_path, 7, 4, today, 15.0, 15.0).unwrap();

        let state = open_state(&db_path);
        let report = state
            .report_api
            .check_data_integrity_on(&admin(), today)
            .unwrap();

        let flow: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::MaterialFlow)
            .collect();
        assert_eq!(flow.len(), 2);
        assert!(flow.iter().all(|f| f.severity == Severity::High));
        assert_eq!(flow[0].details["discrepancy"].as_f64(), Some(20.0));
        assert_eq!(flow[1].details["discrepancy"].as_f64(), Some(-15.0));
    }

    #[test]
    fn test_discrepancy_within_tolerance_not_reported() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let today = test_today();

        insert_raw_log(&db_path, 1, 1, today, 100.0, 100.0).unwrap();
        insert_raw_log(&db_path, 3, 2, today, 99.95, 0.0).unwrap();

        let state = open_state(&db_path);
        let report = state
            .report_api
            .check_data_integrity_on(&admin(), today)
            .unwrap();
        assert_eq!(report.count_by_kind(FindingKind::MaterialFlow), 0);

        let rows = state
            .report_api
            .material_flow_report_on(&admin(), today)
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| !r.has_issue));
    }

    #[test]
    fn test_only_scan_date_counts() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let yesterday = test_today() - Duration::days(1);

        insert_raw_log(&db_path, 1, 1, yesterday, 120.0, 100.0).unwrap();

        let state = open_state(&db_path);
        let report = state
            .report_api
            .check_data_integrity_on(&admin(), test_today())
            .unwrap();

        assert_eq!(report.count_by_kind(FindingKind::MaterialFlow), 0);
        assert_eq!(report.count_by_kind(FindingKind::MissingData), 8);
        assert_eq!(report.max_severity(), Some(Severity::Low));
    }

    #[test]
    fn test_empty_plant_has_no_findings() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let state = open_state(&db_path);

        let report = state
            .report_api
            .check_data_integrity_on(&admin(), test_today())
            .unwrap();
        assert!(report.findings.is_empty());
        assert_eq!(report.max_severity(), None);
    }

    #[test]
    fn test_configured_thresholds_apply() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let today = test_today();

        insert_raw_log(&db_path, 1, 1, today, 120.0, 100.0).unwrap();
        insert_raw_log(&db_path, 3, 2, today, 95.0, 0.0).unwrap();

        let state = open_state(&db_path);
        state
            .config_manager
            .set_config_value(config_keys::INTEGRITY_FLOW_TOLERANCE, "5")
            .unwrap();

        // 差异 5 不超过容差 5
        let report = state
            .report_api
            .check_data_integrity_on(&admin(), today)
            .unwrap();
        assert_eq!(report.count_by_kind(FindingKind::MaterialFlow), 0);

        state
            .config_manager
            .set_config_value(config_keys::INTEGRITY_FLOW_TOLERANCE, "1")
            .unwrap();
        state
            .config_manager
            .set_config_value(config_keys::INTEGRITY_HIGH_SEVERITY_THRESHOLD, "4")
            .unwrap();
        let report = state
            .report_api
            .check_data_integrity_on(&admin(), today)
            .unwrap();
        assert_eq!(report.count_by_kind(FindingKind::MaterialFlow), 1);
        assert_eq!(report.findings[0].severity, Severity::High);
    }

    #[test]
    fn test_material_flow_report_rows() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let today = test_today();

        insert_raw_log(&db_path, 1, 1, today, 120.0, 100.0).unwrap();
        insert_raw_log(&db_path, 3, 2, today, 90.0, 0.0).unwrap();

        let state = open_state(&db_path);
        let rows = state
            .report_api
            .material_flow_report_on(&admin(), today)
            .unwrap();

        let first = rows
            .iter()
            .find(|r| r.from_section == "Raw Material")
            .unwrap();
        assert_eq!(first.to_section, "Processing");
        assert_eq!(first.output, 100.0);
        assert_eq!(first.input, 90.0);
        assert_eq!(first.discrepancy, 10.0);
        assert!(first.has_issue);

        // 链尾工段没有下游，不出行
        assert!(rows.iter().all(|r| r.from_section != "Packaging"));
    }

    #[test]
    fn test_staff_cannot_scan() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let staff = Actor::staff("staff1", 1);
        assert!(matches!(
            state.report_api.check_data_integrity_on(&staff, test_today()),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state.report_api.material_flow_report_on(&staff, test_today()),
            Err(ApiError::PermissionDenied(_))
        ));
    }
}
