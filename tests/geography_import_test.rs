// ==========================================
// 地理数据导入集成测试
// ==========================================
// 测试范围:
// 1. CSV / JSON 文件导入后进入可交互状态
// 2. 占位值 / 非法邮编 / 未知大区被跳过
// 3. 文件缺失与空数据集
// ==========================================

mod helpers;

use std::io::Write;

use freight_zone_config::api::ApiError;
use freight_zone_config::domain::types::Region;
use freight_zone_config::importer::FileGeographySource;
use helpers::api_test_helper::ApiTestEnv;
use helpers::geo_fixture::{city, code};
use tempfile::Builder;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_csv_geography_file() {
    let file = write_temp(
        ".csv",
        "Pincode,State Name,City,Zone\n\
         110001,Delhi,New Delhi,N1\n\
         110075,Delhi,Dwarka,n2\n\
         143001,Punjab,NA,N2\n\
         12345,Punjab,Amritsar,N2\n\
         682001,Kerala,Kochi,S1\n\
         700001,West Bengal,Kolkata,X\n",
    );

    let env = ApiTestEnv::new();
    let mut api = env.api();
    let summary = api
        .load_geography(&FileGeographySource::new(file.path()))
        .await
        .unwrap();

    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.regions, vec![Region::North, Region::South]);
    assert!(api.is_ready());

    api.select_zone(code("N1")).unwrap();
    assert_eq!(
        api.available_cities(code("N1"), "Delhi").unwrap(),
        vec![city("Dwarka", "Delhi"), city("New Delhi", "Delhi")]
    );
    assert_eq!(api.visible_states(code("N1")).unwrap(), vec!["Delhi".to_string()]);
}

#[tokio::test]
async fn test_json_geography_file() {
    let file = write_temp(
        ".json",
        r#"[
            {"pincode": 560001, "state": "Karnataka", "city": "Bengaluru", "zone": "S3"},
            {"pincode": "781001", "state": "Assam", "city": "Guwahati", "zone": "NE1"},
            {"pincode": "781005", "state": "Assam", "city": null, "zone": "NE1"}
        ]"#,
    );

    let env = ApiTestEnv::new();
    let mut api = env.api();
    let summary = api
        .load_geography(&FileGeographySource::new(file.path()))
        .await
        .unwrap();
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.regions, vec![Region::South, Region::Northeast]);
}

#[tokio::test]
async fn test_missing_file_and_empty_dataset() {
    let env = ApiTestEnv::new();
    let mut api = env.api();

    let err = api
        .load_geography(&FileGeographySource::new("/nonexistent/geo.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let file = write_temp(".csv", "pincode,state,city,zone\n000,,,\n");
    let err = api
        .load_geography(&FileGeographySource::new(file.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
    assert!(!api.is_ready());
}
