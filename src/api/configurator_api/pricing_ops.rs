use super::*;
use crate::domain::matrix::{Price, PriceMatrix, PriceMatrixEntry};
use crate::domain::session::OnboardingHandoff;
use crate::engine::confirm::{ConfirmationHandler, ConfirmationPrompt};
use crate::engine::price_matrix::{MatrixError, MatrixImportReport};

/// 价格矩阵 CSV 导入结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatrixImportOutcome {
    Applied(MatrixImportReport),
    /// 操作员拒绝覆盖已填写的价格
    Cancelled,
}

impl ConfiguratorApi {
    // ==========================================
    // 价格矩阵接口
    // ==========================================

    /// 设置单元格价格（None 清空）
    #[instrument(skip(self, from, to), fields(from = %from, to = %to))]
    pub fn set_price(&mut self, from: ZoneCode, to: ZoneCode, value: Option<f64>) -> ApiResult<()> {
        self.ensure_pricing()?;
        let builder = self.matrix_builder.clone();
        self.commit(|session| -> ApiResult<()> {
            let matrix = session.price_matrix.as_mut().ok_or(MatrixError::NotBuilt)?;
            builder.set_price(matrix, from, to, value)?;
            Ok(())
        })
    }

    pub fn get_price(&self, from: ZoneCode, to: ZoneCode) -> ApiResult<Option<Price>> {
        let matrix = self.ensure_pricing()?;
        for zone in [from, to] {
            if !matrix.contains(&zone) {
                return Err(MatrixError::UnknownZone(zone).into());
            }
        }
        Ok(matrix.get(&from, &to))
    }

    /// 按行主序列出全部单元格
    pub fn matrix_entries(&self) -> ApiResult<Vec<PriceMatrixEntry>> {
        Ok(self.ensure_pricing()?.entries())
    }

    pub fn export_matrix_csv(&self) -> ApiResult<String> {
        let matrix = self.ensure_pricing()?;
        Ok(self.matrix_builder.export_csv(matrix)?)
    }

    /// 导入价格矩阵 CSV
    ///
    /// 已有价格时先经操作员确认; 取消时矩阵不变
    #[instrument(skip(self, text, confirm), fields(bytes = text.len()))]
    pub fn import_matrix_csv(
        &mut self,
        text: &str,
        confirm: &dyn ConfirmationHandler,
    ) -> ApiResult<MatrixImportOutcome> {
        let filled_cells = self.ensure_pricing()?.filled_count();
        if filled_cells > 0 && !confirm.confirm(&ConfirmationPrompt::OverwritePrices { filled_cells }) {
            tracing::info!(filled_cells, "操作员取消价格矩阵导入");
            return Ok(MatrixImportOutcome::Cancelled);
        }

        let builder = self.matrix_builder.clone();
        let report = self.commit(|session| -> ApiResult<MatrixImportReport> {
            let matrix = session.price_matrix.as_mut().ok_or(MatrixError::NotBuilt)?;
            Ok(builder.import_csv(matrix, text)?)
        })?;

        tracing::info!(
            applied = report.applied,
            blank = report.blank,
            skipped_rows = report.skipped_rows.len(),
            skipped_cells = report.skipped_cells.len(),
            "价格矩阵导入完成"
        );
        Ok(MatrixImportOutcome::Applied(report))
    }

    // ==========================================
    // 交接接口
    // ==========================================

    /// 提交最终区域与价格矩阵给入驻表单
    ///
    /// 同一会话键重复提交覆盖上一次载荷
    #[instrument(skip(self), fields(session_key = %self.config.session_key))]
    pub fn submit_handoff(&self) -> ApiResult<OnboardingHandoff> {
        self.ensure_pricing()?;
        let handoff = self.session.to_handoff();
        let handoff_id = self.handoff_repo.write(&self.config.session_key, &handoff)?;
        tracing::info!(
            handoff_id = %handoff_id,
            zones = handoff.zones.len(),
            cells = handoff.price_matrix.len(),
            "交接载荷已写入"
        );
        Ok(handoff)
    }

    fn ensure_pricing(&self) -> ApiResult<&PriceMatrix> {
        if self.session.phase != SessionPhase::Pricing {
            return Err(ZoneError::PhaseViolation {
                expected: SessionPhase::Pricing,
                actual: self.session.phase,
            }
            .into());
        }
        self.session
            .price_matrix
            .as_ref()
            .ok_or(ApiError::Matrix(MatrixError::NotBuilt))
    }
}
