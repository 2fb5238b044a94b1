use super::*;
use crate::domain::types::CityKey;
use crate::engine::partition::ToggleOutcome;

impl ConfiguratorApi {
    // ==========================================
    // 城市划分接口
    // ==========================================

    /// 切换城市归属
    #[instrument(skip(self, code, key), fields(zone = %code, city = %key))]
    pub fn toggle_city(&mut self, code: ZoneCode, key: &CityKey) -> ApiResult<ToggleOutcome> {
        let partition = self.partition_engine()?;
        let index = self.editable_zone_index(code)?;
        self.commit(|session| partition.toggle_city(session, index, key))
    }

    /// 全选州内可选城市
    #[instrument(skip(self, code), fields(zone = %code))]
    pub fn select_all_for_state(&mut self, code: ZoneCode, state: &str) -> ApiResult<usize> {
        let partition = self.partition_engine()?;
        let index = self.editable_zone_index(code)?;
        self.commit(|session| partition.select_all_for_state(session, index, state))
    }

    /// 清空区域在该州的城市
    #[instrument(skip(self, code), fields(zone = %code))]
    pub fn clear_state(&mut self, code: ZoneCode, state: &str) -> ApiResult<usize> {
        let partition = self.partition_engine()?;
        let index = self.editable_zone_index(code)?;
        self.commit(|session| partition.clear_state(session, index, state))
    }

    /// 记录区域聚焦的州
    pub fn set_active_state(&mut self, code: ZoneCode, state: &str) -> ApiResult<()> {
        let partition = self.partition_engine()?;
        let index = self.zone_index(code)?;
        self.commit(|session| partition.set_active_state(session, index, state))
    }

    // ==========================================
    // 划分查询接口
    // ==========================================

    /// 区域可选城市（展示顺序）
    pub fn available_cities(&self, code: ZoneCode, state: &str) -> ApiResult<Vec<CityKey>> {
        let index = self.zone_index(code)?;
        Ok(self
            .partition_ref()?
            .sorted_available_cities(&self.session, index, state)?)
    }

    /// 州内剩余池城市
    pub fn leftover_cities(&self, code: ZoneCode, state: &str) -> ApiResult<Vec<CityKey>> {
        let index = self.zone_index(code)?;
        Ok(self.partition_ref()?.leftover_cities(&self.session, index, state)?)
    }

    /// 区域可见的州
    pub fn visible_states(&self, code: ZoneCode) -> ApiResult<Vec<String>> {
        let index = self.zone_index(code)?;
        Ok(self.partition_ref()?.visible_states(&self.session, index)?)
    }

    pub fn state_visibility(&self, code: ZoneCode, state: &str) -> ApiResult<bool> {
        let index = self.zone_index(code)?;
        Ok(self.partition_ref()?.state_visibility(&self.session, index, state)?)
    }

    /// 大区内未认领城市数量
    pub fn unclaimed_count(&self, region: Region) -> ApiResult<usize> {
        Ok(self.partition_ref()?.unclaimed_cities(&self.session, region).len())
    }

    pub fn is_region_exhausted(&self, region: Region) -> ApiResult<bool> {
        Ok(self.partition_ref()?.is_region_exhausted(&self.session, region))
    }

    /// 校验当前会话不变量
    pub fn verify_session(&self) -> ApiResult<()> {
        Ok(self.partition_ref()?.verify_invariants(&self.session)?)
    }
}
