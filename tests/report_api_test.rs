// ==========================================
// 录入 + 管理报表集成测试
// ==========================================
// 覆盖: 考勤/停机录入、按品种产量、出勤、停机列表、工人历史、首页汇总
// ==========================================


#[cfg(test)]
mod report_api_test {
    use shopfloor_mis::api::ApiError;
    use shopfloor_mis::app::AppState;
    use shopfloor_mis::domain::{
        AttendanceRequest, DowntimeRequest, ProductionEntryRequest, RequisitionRequest,
    };
    use shopfloor_mis::Actor;

    use crate::test_helpers::{create_test_db, open_state, seed_chain, test_today};

    fn production(
        worker_id: i64,
        item_id: i64,
        actual: i64,
        input: f64,
        output: f64,
    ) -> ProductionEntryRequest {
        ProductionEntryRequest {
            worker_id: Some(worker_id),
            item_id: Some(item_id),
            date: Some(test_today().to_string()),
            actual: Some(actual),
            input_material: Some(input),
            output_material: Some(output),
        }
    }

    fn downtime(machine: &str, start: &str, end: &str) -> DowntimeRequest {
        DowntimeRequest {
            machine_name: Some(machine.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            remarks: None,
        }
    }

    /// 工段 1 / 2 各录一条生产数据
    fn seed_production(state: &AppState) {
        state
            .production_api
            .submit_entry_on(
                &Actor::staff("staff1", 1),
                production(1, 1, 450, 500.0, 480.0),
                test_today(),
            )
            .unwrap();
        state
            .production_api
            .submit_entry_on(
                &Actor::staff("staff2", 2),
                production(3, 2, 450, 480.0, 470.0),
                test_today(),
            )
            .unwrap();
    }

    #[test]
    fn test_production_by_item() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        seed_production(&state);

        let report = state
            .report_api
            .production_by_item(&Actor::admin("admin"))
            .unwrap();
        assert_eq!(report.labels, vec!["Processed Yarn", "Raw Cotton"]);
        assert_eq!(report.targets, vec![450, 500]);
        assert_eq!(report.actuals, vec![450, 450]);
    }

    #[test]
    fn test_attendance_by_section() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let count = state
            .attendance_api
            .record_attendance_on(
                &Actor::staff("staff1", 1),
                AttendanceRequest {
                    workers: Some(vec![1, 2]),
                    date: Some(test_today().to_string()),
                },
                test_today(),
            )
            .unwrap();
        assert_eq!(count, 2);

        state
            .attendance_api
            .record_attendance_on(
                &Actor::staff("staff2", 2),
                AttendanceRequest {
                    workers: Some(vec![3]),
                    date: Some(test_today().to_string()),
                },
                test_today(),
            )
            .unwrap();

        let rows = state
            .report_api
            .attendance_by_section(&Actor::admin("admin"))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].section, "Processing");
        assert_eq!(rows[0].present, 1);
        assert_eq!(rows[1].section, "Raw Material");
        assert_eq!(rows[1].present, 2);
    }

    #[test]
    fn test_attendance_validation() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let err = state
            .attendance_api
            .record_attendance_on(
                &Actor::staff("staff1", 1),
                AttendanceRequest {
                    workers: Some(vec![]),
                    date: Some("2026-10-01".to_string()),
                },
                test_today(),
            )
            .unwrap_err();
        match err {
            ApiError::ValidationFailed { errors } => assert_eq!(errors.len(), 2),
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_recent_downtime() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        let staff = Actor::staff("staff1", 1);

        state
            .downtime_api
            .record_downtime_on(
                &staff,
                downtime("Loom #1", "2026-10-18T08:00", "2026-10-18T09:30"),
                test_today(),
            )
            .unwrap();
        state
            .downtime_api
            .record_downtime_on(
                &staff,
                downtime("Loom #2", "2026-10-18T10:00", "2026-10-18T10:30"),
                test_today(),
            )
            .unwrap();

        let rows = state
            .report_api
            .recent_downtime(&Actor::admin("admin"))
            .unwrap();
        assert_eq!(rows.len(), 2);

        // 新录入的在前
        assert_eq!(rows[0].machine, "Loom #2");
        assert_eq!(rows[0].duration_hours, 0.5);
        assert!(!rows[0].is_long);

        assert_eq!(rows[1].machine, "Loom #1");
        assert_eq!(rows[1].start_time, "2026-10-18 08:00");
        assert_eq!(rows[1].end_time, "2026-10-18 09:30");
        assert_eq!(rows[1].duration_hours, 1.5);
        assert!(rows[1].is_long);
    }

    #[test]
    fn test_downtime_validation() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        let staff = Actor::staff("staff1", 1);

        let cases = [
            downtime("Loom #1", "2026-10-18T10:00", "2026-10-18T09:00"),
            downtime("Loom #1", "2026-10-17T10:00", "2026-10-17T11:00"),
            downtime("Loom #1", "2026-10-18T00:00", "2026-10-19T01:00"),
            downtime("Loom #1", "2026-10-18 10:00", "2026-10-18T11:00"),
        ];
        for req in cases {
            assert!(matches!(
                state.downtime_api.record_downtime_on(&staff, req, test_today()),
                Err(ApiError::ValidationFailed { .. })
            ));
        }
    }

    #[test]
    fn test_worker_history() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        seed_production(&state);

        let admin = Actor::admin("admin");
        let rows = state.report_api.worker_history(&admin, 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_name, "Raw Cotton");
        assert_eq!(rows[0].date, test_today());
        assert_eq!(rows[0].efficiency, 90.0);

        assert!(state.report_api.worker_history(&admin, 2).unwrap().is_empty());
        assert!(matches!(
            state.report_api.worker_history(&admin, 99),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_admin_summary() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        seed_production(&state);

        state
            .requisition_api
            .submit_requisition(
                &Actor::staff("staff1", 1),
                RequisitionRequest {
                    item_id: Some(1),
                    quantity: Some(100),
                },
            )
            .unwrap();

        let summary = state
            .report_api
            .admin_summary_on(&Actor::admin("admin"), test_today())
            .unwrap();
        assert_eq!(summary.total_workers, 8);
        assert_eq!(summary.total_sections, 4);
        assert_eq!(summary.pending_requisitions, 1);
        assert_eq!(summary.pending_reqs.len(), 1);
        assert_eq!(summary.production_summary.total_target, 950);
        assert_eq!(summary.production_summary.total_actual, 900);
        assert_eq!(summary.production_summary.total_wastage, 30.0);
    }

    #[test]
    fn test_reports_require_admin() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        let staff = Actor::staff("staff1", 1);

        assert!(matches!(
            state.report_api.production_by_item(&staff),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state.report_api.recent_downtime(&staff),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state.report_api.admin_summary_on(&staff, test_today()),
            Err(ApiError::PermissionDenied(_))
        ));
    }
}
