// ==========================================
// 区域划分配置器 - 配置器 API
// ==========================================
// 职责: 操作员门面, 持有唯一会话值
// 流程: 克隆会话 -> 引擎操作 -> 递增 revision -> 落库 -> 整体替换
// 红线: 地理数据加载完成前, 所有划分操作返回 GeographyNotLoaded
// ==========================================

mod lifecycle_ops;
mod partition_ops;
mod pricing_ops;
mod roster_ops;

pub use pricing_ops::MatrixImportOutcome;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfiguratorConfig;
use crate::domain::session::ConfiguratorSession;
use crate::domain::types::{Region, SessionPhase, ZoneCode};
use crate::engine::error::ZoneError;
use crate::engine::geography_index::GeographyIndex;
use crate::engine::lifecycle::ZoneLifecycleWorkflow;
use crate::engine::partition::PartitionEngine;
use crate::engine::price_matrix::PriceMatrixBuilder;
use crate::engine::roster::ZoneRosterController;
use crate::importer::{GeographyImporter, GeographySource};
use crate::repository::{HandoffRepository, SessionRepository};

/// 地理数据加载摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographySummary {
    pub accepted: usize,
    pub skipped: usize,
    pub regions: Vec<Region>,
    /// 已恢复的会话与新数据不一致, 已重置为空会话
    pub session_reset: bool,
}

// ==========================================
// ConfiguratorApi - 配置器 API
// ==========================================

/// 配置器API
///
/// 职责：
/// 1. 地理数据加载与就绪门控
/// 2. 区域名单 / 城市划分 / 生命周期操作
/// 3. 价格矩阵录入与 CSV 导入导出
/// 4. 会话快照持久化与最终交接
pub struct ConfiguratorApi {
    session_repo: Arc<SessionRepository>,
    handoff_repo: Arc<HandoffRepository>,
    config: ConfiguratorConfig,
    importer: GeographyImporter,
    roster: ZoneRosterController,
    matrix_builder: PriceMatrixBuilder,
    partition: Option<Arc<PartitionEngine>>,
    lifecycle: Option<Arc<ZoneLifecycleWorkflow>>,
    session: ConfiguratorSession,
}

impl ConfiguratorApi {
    /// 创建新的ConfiguratorApi实例
    pub fn new(
        session_repo: Arc<SessionRepository>,
        handoff_repo: Arc<HandoffRepository>,
        config: ConfiguratorConfig,
    ) -> Self {
        Self {
            session_repo,
            handoff_repo,
            importer: GeographyImporter::new(config.placeholder_tokens.clone()),
            roster: ZoneRosterController::new(config.ordering_policy, config.max_zone_count),
            matrix_builder: PriceMatrixBuilder::new(),
            partition: None,
            lifecycle: None,
            session: ConfiguratorSession::new(),
            config,
        }
    }

    /// 从快照恢复会话
    ///
    /// # 返回
    /// - Ok(true): 已恢复
    /// - Ok(false): 无快照, 使用空会话
    pub fn restore_session(&mut self) -> ApiResult<bool> {
        match self.session_repo.load(&self.config.session_key)? {
            Some(session) => {
                tracing::info!(
                    session_key = %self.config.session_key,
                    revision = session.revision,
                    zones = session.zones.len(),
                    "会话快照已恢复"
                );
                self.session = session;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 加载地理数据并进入可交互状态
    ///
    /// 已恢复的会话在新数据上重新校验, 不一致时重置
    #[instrument(skip(self, source), fields(geo_source = %source.describe()))]
    pub async fn load_geography(&mut self, source: &dyn GeographySource) -> ApiResult<GeographySummary> {
        let index = Arc::new(self.importer.import(source).await?);
        let partition = Arc::new(PartitionEngine::new(index.clone()));

        let mut session_reset = false;
        if let Err(e) = partition.verify_invariants(&self.session) {
            tracing::warn!(error = %e, "已恢复的会话与地理数据不一致, 重置会话");
            let mut fresh = ConfiguratorSession::new();
            fresh.revision = self.session.revision + 1;
            self.session_repo.save(&self.config.session_key, &fresh)?;
            self.session = fresh;
            session_reset = true;
        }

        self.lifecycle = Some(Arc::new(ZoneLifecycleWorkflow::new(partition.clone())));
        self.partition = Some(partition);

        Ok(GeographySummary {
            accepted: index.accepted(),
            skipped: index.skipped(),
            regions: index.regions(),
            session_reset,
        })
    }

    // ==========================================
    // 查询接口
    // ==========================================

    pub fn is_ready(&self) -> bool {
        self.partition.is_some()
    }

    pub fn session(&self) -> &ConfiguratorSession {
        &self.session
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    pub fn geography(&self) -> ApiResult<&GeographyIndex> {
        Ok(self.partition_ref()?.geography())
    }

    /// 当前聚焦区域
    pub fn current_zone(&self) -> Option<ZoneCode> {
        self.session.zone(self.session.current_zone).map(|z| z.code)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn partition_ref(&self) -> ApiResult<&Arc<PartitionEngine>> {
        self.partition
            .as_ref()
            .ok_or(ApiError::ZoneRule(ZoneError::GeographyNotLoaded))
    }

    fn partition_engine(&self) -> ApiResult<Arc<PartitionEngine>> {
        self.partition_ref().cloned()
    }

    fn lifecycle_workflow(&self) -> ApiResult<Arc<ZoneLifecycleWorkflow>> {
        self.lifecycle
            .clone()
            .ok_or(ApiError::ZoneRule(ZoneError::GeographyNotLoaded))
    }

    fn zone_index(&self, code: ZoneCode) -> ApiResult<usize> {
        self.session
            .index_of(&code)
            .ok_or(ApiError::ZoneRule(ZoneError::NotSelected(code)))
    }

    /// 可编辑区域下标: 区域须已选择且未被导航锁定
    fn editable_zone_index(&self, code: ZoneCode) -> ApiResult<usize> {
        let workflow = self.lifecycle_workflow()?;
        let index = self.zone_index(code)?;
        if !workflow.can_open_zone(&self.session, index) {
            tracing::warn!(zone = %code, "区域导航被锁定, 拒绝编辑");
            return Err(ZoneError::NavigationLocked(code).into());
        }
        Ok(index)
    }

    /// 在会话副本上执行操作; 成功且有变化时递增 revision、落库并整体替换
    fn commit<T, E>(&mut self, op: impl FnOnce(&mut ConfiguratorSession) -> Result<T, E>) -> ApiResult<T>
    where
        ApiError: From<E>,
    {
        let mut draft = self.session.clone();
        let value = op(&mut draft)?;

        if draft != self.session {
            draft.bump_revision();
            self.session_repo.save(&self.config.session_key, &draft)?;
            self.session = draft;
        }
        Ok(value)
    }
}
