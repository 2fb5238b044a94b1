use super::*;

impl ConfiguratorApi {
    // ==========================================
    // 区域名单接口
    // ==========================================

    /// 选择区域（生成空区域）
    #[instrument(skip(self, code), fields(zone = %code))]
    pub fn select_zone(&mut self, code: ZoneCode) -> ApiResult<()> {
        self.partition_ref()?;
        let roster = self.roster.clone();
        self.commit(|session| roster.select_zone(session, code))
    }

    /// 移除区域（城市释放为可分配）
    #[instrument(skip(self, code), fields(zone = %code))]
    pub fn deselect_zone(&mut self, code: ZoneCode) -> ApiResult<()> {
        self.partition_ref()?;
        let roster = self.roster.clone();
        self.commit(|session| roster.deselect_zone(session, code))
    }

    /// 批量选择大区内后续槽位
    ///
    /// # 返回
    /// - 本次新增的区域编码
    #[instrument(skip(self))]
    pub fn select_all_in_region(&mut self, region: Region) -> ApiResult<Vec<ZoneCode>> {
        self.partition_ref()?;
        let roster = self.roster.clone();
        self.commit(|session| roster.select_all_in_region(session, region))
    }

    /// 批量移除大区内区域（逆序）
    #[instrument(skip(self))]
    pub fn deselect_all_in_region(&mut self, region: Region) -> ApiResult<Vec<ZoneCode>> {
        self.partition_ref()?;
        let roster = self.roster.clone();
        self.commit(|session| roster.deselect_all_in_region(session, region))
    }

    /// 大区当前名单
    pub fn roster(&self, region: Region) -> Vec<ZoneCode> {
        self.session.roster(region)
    }
}
