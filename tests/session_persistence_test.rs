// ==========================================
// 会话持久化集成测试
// ==========================================
// 测试范围:
// 1. 每次有效操作 revision 递增并落库
// 2. 重启后恢复会话, 与新地理数据重新校验
// 3. 旧 revision 写入被拒绝
// ==========================================

mod helpers;

use freight_zone_config::api::ApiError;
use freight_zone_config::domain::types::Region;
use freight_zone_config::engine::AlwaysConfirm;
use helpers::api_test_helper::ApiTestEnv;
use helpers::geo_fixture::{city, code, standard_geography, GeoFixtureBuilder};

#[tokio::test]
async fn test_session_restored_after_restart() {
    let env = ApiTestEnv::new();
    {
        let mut api = env.ready_api().await;
        api.select_zone(code("N1")).unwrap();
        api.select_zone(code("N2")).unwrap();
        api.select_all_for_state(code("N1"), "Delhi").unwrap();
        api.toggle_city(code("N1"), &city("Dwarka", "Delhi")).unwrap();
        api.save_zone(code("N1"), &AlwaysConfirm).unwrap();
        assert_eq!(api.session().revision, 5);
    }

    let mut api = env.api();
    assert!(api.restore_session().unwrap());
    let summary = api.load_geography(&standard_geography().source()).await.unwrap();
    assert!(!summary.session_reset);
    assert_eq!(summary.accepted, 9);

    let session = api.session();
    assert_eq!(session.revision, 5);
    assert_eq!(session.roster(Region::North), vec![code("N1"), code("N2")]);
    assert!(session.zones[0].is_complete);
    assert_eq!(api.current_zone(), Some(code("N2")));
    assert_eq!(
        api.leftover_cities(code("N2"), "Delhi").unwrap(),
        vec![city("Dwarka", "Delhi")]
    );
    api.verify_session().unwrap();
}

#[tokio::test]
async fn test_restored_session_reset_when_geography_changes() {
    let env = ApiTestEnv::new();
    {
        let mut api = env.ready_api().await;
        api.select_zone(code("S1")).unwrap();
        api.select_all_for_state(code("S1"), "Kerala").unwrap();
    }

    let shrunk = GeoFixtureBuilder::new()
        .city("110001", "Delhi", "New Delhi", "N1")
        .city("560001", "Karnataka", "Bengaluru", "S1");
    let mut api = env.api();
    api.restore_session().unwrap();
    let summary = api.load_geography(&shrunk.source()).await.unwrap();

    assert!(summary.session_reset);
    assert!(api.session().zones.is_empty());
    assert_eq!(api.session().revision, 3);
    assert_eq!(env.session_repo.stored_revision(&api.config().session_key).unwrap(), Some(3));
}

#[tokio::test]
async fn test_stale_writer_rejected() {
    let env = ApiTestEnv::new();
    let mut first = env.ready_api().await;
    first.select_zone(code("N1")).unwrap();
    first.select_zone(code("N2")).unwrap();

    // 第二个实例未恢复快照, 从 revision 0 开始
    let mut stale = env.ready_api().await;
    let err = stale.select_zone(code("S1")).unwrap_err();
    assert!(matches!(err, ApiError::VersionConflict(_)));
    assert!(stale.session().zones.is_empty());

    first.select_zone(code("N3")).unwrap();
    let stored = env.session_repo.load(&first.config().session_key).unwrap().unwrap();
    assert_eq!(stored.revision, 3);
    assert_eq!(stored.roster(Region::North).len(), 3);
}
