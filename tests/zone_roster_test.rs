// ==========================================
// 区域名单集成测试
// ==========================================
// 测试范围:
// 1. 严格顺序: 只能追加下一槽位 / 只能移除最后槽位
// 2. 宽松顺序: 任意槽位
// 3. 名单始终是目录前缀
// ==========================================

mod helpers;

use freight_zone_config::api::ApiError;
use freight_zone_config::config::ConfiguratorConfig;
use freight_zone_config::domain::types::{OrderingPolicy, Region};
use freight_zone_config::engine::{AlwaysConfirm, ZoneError};
use helpers::api_test_helper::ApiTestEnv;
use helpers::geo_fixture::{code, standard_geography};

#[tokio::test]
async fn test_select_out_of_order_rejected() {
    let env = ApiTestEnv::new();
    let mut api = env.ready_api().await;

    let err = api.select_zone(code("N3")).unwrap_err();
    match err {
        ApiError::ZoneRule(ZoneError::SelectOrderViolation { code: rejected, expected }) => {
            assert_eq!(rejected, code("N3"));
            assert_eq!(expected, Some(code("N1")));
        }
        other => panic!("Expected SelectOrderViolation, got {:?}", other),
    }
    assert!(api.session().zones.is_empty());

    api.select_zone(code("N1")).unwrap();
    api.select_zone(code("N2")).unwrap();
    api.select_zone(code("N3")).unwrap();
    assert_eq!(api.roster(Region::North), vec![code("N1"), code("N2"), code("N3")]);
}

#[tokio::test]
async fn test_deselect_only_last() {
    let env = ApiTestEnv::new();
    let mut api = env.ready_api().await;
    api.select_all_in_region(Region::North).unwrap();

    assert!(matches!(
        api.deselect_zone(code("N2")),
        Err(ApiError::ZoneRule(ZoneError::DeselectOrderViolation { .. }))
    ));
    api.deselect_zone(code("N6")).unwrap();
    assert_eq!(api.roster(Region::North).len(), 5);

    let removed = api.deselect_all_in_region(Region::North).unwrap();
    assert_eq!(removed.first(), Some(&code("N5")));
    assert!(api.roster(Region::North).is_empty());
}

#[tokio::test]
async fn test_roster_stays_catalogue_prefix() {
    let env = ApiTestEnv::new();
    let mut api = env.ready_api().await;

    let attempts = ["S2", "S1", "N1", "S3", "S2", "S5", "N2", "S3", "E1", "N4", "S4"];
    for attempt in attempts {
        let _ = api.select_zone(code(attempt));
        for region in Region::ALL {
            let roster = api.roster(region);
            let catalogue = region.catalogue();
            assert_eq!(roster.as_slice(), &catalogue[..roster.len()]);
        }
    }
    assert_eq!(api.roster(Region::South).len(), 4);
}

#[tokio::test]
async fn test_relaxed_policy_allows_gaps() {
    let env = ApiTestEnv::new();
    let mut api = env.api_with_config(ConfiguratorConfig {
        ordering_policy: OrderingPolicy::Relaxed,
        ..ConfiguratorConfig::default()
    });
    api.load_geography(&standard_geography().source()).await.unwrap();

    api.select_zone(code("N3")).unwrap();
    api.select_zone(code("N1")).unwrap();
    assert_eq!(api.roster(Region::North), vec![code("N1"), code("N3")]);
    api.deselect_zone(code("N1")).unwrap();
    assert_eq!(api.roster(Region::North), vec![code("N3")]);
}

#[tokio::test]
async fn test_zone_limit() {
    let env = ApiTestEnv::new();
    let mut api = env.api_with_config(ConfiguratorConfig {
        max_zone_count: 2,
        ..ConfiguratorConfig::default()
    });
    api.load_geography(&standard_geography().source()).await.unwrap();

    let added = api.select_all_in_region(Region::North).unwrap();
    assert_eq!(added, vec![code("N1"), code("N2")]);
    assert!(matches!(
        api.select_zone(code("S1")),
        Err(ApiError::ZoneRule(ZoneError::ZoneLimitReached { max: 2 }))
    ));
}

#[tokio::test]
async fn test_deleting_zone_releases_cities() {
    let env = ApiTestEnv::new();
    let mut api = env.ready_api().await;
    api.select_zone(code("N1")).unwrap();
    api.select_zone(code("N2")).unwrap();
    api.select_all_for_state(code("N1"), "Delhi").unwrap();
    api.save_zone(code("N1"), &AlwaysConfirm).unwrap();
    api.select_all_for_state(code("N2"), "Punjab").unwrap();
    assert_eq!(api.unclaimed_count(Region::North).unwrap(), 1);

    api.deselect_zone(code("N2")).unwrap();
    assert_eq!(api.unclaimed_count(Region::North).unwrap(), 3);
    api.verify_session().unwrap();
}
