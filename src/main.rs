// ==========================================
// 区域划分配置器 - 命令行入口
// ==========================================
// 用法:
//   freight-zone-config <地理数据文件> [价格矩阵CSV]
// 加载地理数据并输出会话摘要; 若会话已进入价格阶段, 可导出矩阵
// ==========================================

use freight_zone_config::app::{get_default_db_path, AppState};
use freight_zone_config::domain::types::SessionPhase;
use freight_zone_config::engine::AlwaysDecline;
use freight_zone_config::importer::FileGeographySource;

#[tokio::main]
async fn main() {
    freight_zone_config::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", freight_zone_config::APP_NAME);
    tracing::info!("系统版本: {}", freight_zone_config::VERSION);
    tracing::info!("==================================================");

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let Some(geo_path) = args.next() else {
        return Err("用法: freight-zone-config <地理数据文件> [价格矩阵CSV]".to_string());
    };
    let matrix_csv = args.next();

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).await?;
    let mut api = state.configurator_api.lock().await;

    let summary = api
        .load_geography(&FileGeographySource::new(geo_path))
        .await
        .map_err(|e| e.user_message())?;
    tracing::info!(
        accepted = summary.accepted,
        skipped = summary.skipped,
        regions = summary.regions.len(),
        session_reset = summary.session_reset,
        "地理数据已加载"
    );

    let session = api.session();
    println!("revision: {}", session.revision);
    println!("phase: {}", session.phase);
    for zone in &session.zones {
        println!(
            "{}\tstates={}\tcities={}\tcomplete={}",
            zone.code,
            zone.derived_states().len(),
            zone.assigned_cities.len(),
            zone.is_complete
        );
    }

    if api.phase() != SessionPhase::Pricing {
        return Ok(());
    }

    match matrix_csv {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("无法读取 {}: {}", path, e))?;
            // 命令行模式下不覆盖已填写的价格
            let outcome = api
                .import_matrix_csv(&text, &AlwaysDecline)
                .map_err(|e| e.user_message())?;
            println!("{:?}", outcome);
        }
        None => print!("{}", api.export_matrix_csv().map_err(|e| e.user_message())?),
    }
    Ok(())
}
