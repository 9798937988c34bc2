// ==========================================
// 生产录入 API 集成测试
// ==========================================
// 覆盖: 字段校验、派生字段、物料流转校验、权限
// ==========================================


#[cfg(test)]
mod production_api_test {
    use shopfloor_mis::api::ApiError;
    use shopfloor_mis::domain::ProductionEntryRequest;
    use shopfloor_mis::Actor;

    use crate::test_helpers::{create_test_db, open_state, seed_chain, test_today};

    fn entry(worker_id: i64, actual: i64, input: f64, output: f64) -> ProductionEntryRequest {
        ProductionEntryRequest {
            worker_id: Some(worker_id),
            item_id: Some(1),
            date: Some(test_today().to_string()),
            actual: Some(actual),
            input_material: Some(input),
            output_material: Some(output),
        }
    }

    #[test]
    fn test_chain_head_entry_saved_with_derived_fields() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let staff = Actor::staff("staff1", 1);
        let id = state
            .production_api
            .submit_entry_on(&staff, entry(1, 600, 500.0, 480.0), test_today())
            .unwrap();

        let log = state.production_api.get_entry(id).unwrap();
        assert_eq!(log.section_id, 1);
        assert_eq!(log.target, 500);
        assert_eq!(log.wastage, 20.0);
        // 500 / 8h = 62.5/h，超产 100 => 1.6h
        assert!((log.overtime_hours - 1.6).abs() < 1e-9);
        assert_eq!(log.date, test_today());
    }

    #[test]
    fn test_downstream_limited_by_upstream_output() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let raw = Actor::staff("staff1", 1);
        let processing = Actor::staff("staff2", 2);

        state
            .production_api
            .submit_entry_on(&raw, entry(1, 480, 500.0, 480.0), test_today())
            .unwrap();

        // 恰好用完上游产出
        state
            .production_api
            .submit_entry_on(&processing, entry(3, 400, 480.0, 480.0), test_today())
            .unwrap();

        // 剩余 480 - 480 = 0
        let err = state
            .production_api
            .submit_entry_on(&processing, entry(4, 10, 1.0, 0.1), test_today())
            .unwrap_err();
        match err {
            ApiError::InsufficientInput {
                available,
                requested,
            } => {
                assert_eq!(available, 0.0);
                assert_eq!(requested, 0.1);
            }
            other => panic!("Expected InsufficientInput, got {:?}", other),
        }
    }

    #[test]
    fn test_fan_in_sums_all_upstream_sections() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        let admin = Actor::admin("admin");

        // Dyeing 与 Raw Material 同时流向 Processing
        let dyeing = state.floor_api.create_section(&admin, "Dyeing", Some(2)).unwrap();
        let dyer = state
            .floor_api
            .create_worker(&admin, "Dyer", Some(dyeing))
            .unwrap();

        state
            .production_api
            .submit_entry_on(&Actor::staff("staff1", 1), entry(1, 300, 320.0, 300.0), test_today())
            .unwrap();
        state
            .production_api
            .submit_entry_on(&Actor::staff("dye", dyeing), entry(dyer, 200, 210.0, 200.0), test_today())
            .unwrap();

        let processing = Actor::staff("staff2", 2);
        state
            .production_api
            .submit_entry_on(&processing, entry(3, 500, 500.0, 500.0), test_today())
            .unwrap();
        assert!(matches!(
            state
                .production_api
                .submit_entry_on(&processing, entry(4, 1, 1.0, 1.0), test_today()),
            Err(ApiError::InsufficientInput { .. })
        ));
    }

    #[test]
    fn test_insufficient_input_message_and_no_row_written() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        state
            .production_api
            .submit_entry_on(&Actor::staff("staff1", 1), entry(1, 480, 500.0, 480.0), test_today())
            .unwrap();

        let processing = Actor::staff("staff2", 2);
        let err = state
            .production_api
            .submit_entry_on(&processing, entry(3, 400, 500.0, 480.1), test_today())
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_INPUT");
        assert_eq!(
            err.user_message(),
            "Insufficient input material. Available: 480kg, Requested: 480.1kg"
        );

        // 失败的录入不落库
        let logs = state
            .production_api
            .list_section_entries(&processing, test_today())
            .unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_validation_errors_returned_together() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let req = ProductionEntryRequest {
            worker_id: Some(1),
            item_id: None,
            date: Some("2026-10-17".to_string()),
            actual: Some(10),
            input_material: Some(5.0),
            output_material: Some(6.0),
        };
        let err = state
            .production_api
            .submit_entry_on(&Actor::staff("staff1", 1), req, test_today())
            .unwrap_err();

        match err {
            ApiError::ValidationFailed { errors } => {
                assert_eq!(errors.len(), 3);
                assert!(errors.contains(&"Field 'item_id' is required".to_string()));
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_item_and_worker() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);
        let staff = Actor::staff("staff1", 1);

        let mut req = entry(1, 10, 5.0, 5.0);
        req.item_id = Some(99);
        assert!(matches!(
            state.production_api.submit_entry_on(&staff, req, test_today()),
            Err(ApiError::NotFound(_))
        ));

        assert!(matches!(
            state
                .production_api
                .submit_entry_on(&staff, entry(99, 10, 5.0, 5.0), test_today()),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_actor_without_section_rejected() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let err = state
            .production_api
            .submit_entry_on(&Actor::admin("admin"), entry(1, 10, 5.0, 5.0), test_today())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_actor_section_missing() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_chain(&db_path).unwrap();
        let state = open_state(&db_path);

        let err = state
            .production_api
            .submit_entry_on(&Actor::staff("ghost", 42), entry(1, 10, 5.0, 5.0), test_today())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
