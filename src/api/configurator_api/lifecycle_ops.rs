use super::*;
use crate::engine::confirm::ConfirmationHandler;
use crate::engine::lifecycle::SaveReport;

impl ConfiguratorApi {
    // ==========================================
    // 区域生命周期接口
    // ==========================================

    /// 保存区域（可能触发删除 / 级联确认; 受导航锁约束）
    #[instrument(skip(self, code, confirm), fields(zone = %code))]
    pub fn save_zone(&mut self, code: ZoneCode, confirm: &dyn ConfirmationHandler) -> ApiResult<SaveReport> {
        let workflow = self.lifecycle_workflow()?;
        let index = self.editable_zone_index(code)?;
        self.commit(|session| workflow.save_zone(session, index, confirm))
    }

    /// 打开区域（受导航锁约束）
    pub fn open_zone(&mut self, code: ZoneCode) -> ApiResult<()> {
        let workflow = self.lifecycle_workflow()?;
        let index = self.zone_index(code)?;
        self.commit(|session| workflow.open_zone(session, index))
    }

    pub fn can_open_zone(&self, code: ZoneCode) -> ApiResult<bool> {
        let workflow = self.lifecycle_workflow()?;
        let index = self.zone_index(code)?;
        Ok(workflow.can_open_zone(&self.session, index))
    }

    /// 重新打开已完成区域
    #[instrument(skip(self, code), fields(zone = %code))]
    pub fn reopen_zone(&mut self, code: ZoneCode) -> ApiResult<()> {
        let workflow = self.lifecycle_workflow()?;
        let index = self.zone_index(code)?;
        self.commit(|session| workflow.reopen_zone(session, index))
    }

    /// 区域划分定稿, 进入价格矩阵阶段
    #[instrument(skip(self))]
    pub fn finalize_partition(&mut self) -> ApiResult<()> {
        let workflow = self.lifecycle_workflow()?;
        self.commit(|session| workflow.finalize_partition(session))
    }

    /// 返回区域划分阶段
    #[instrument(skip(self))]
    pub fn reopen_partitioning(&mut self) -> ApiResult<()> {
        let workflow = self.lifecycle_workflow()?;
        self.commit(|session| workflow.reopen_partitioning(session))
    }
}
