// ==========================================
// 区域划分配置器 - 价格矩阵构建器
// ==========================================
// 输入: 已完成且非空的区域
// 输出: 区域 × 区域价格表（含自身）, 初始全空
// CSV 格式: 首格为空, 表头为区域编码, 每行 = 起始区域 + 各列价格, 空格 = 未设置
// ==========================================
// 红线: 表头区域集合与当前区域集合不一致时整体拒绝, 不做部分应用
// 红线: 单元格非数字/越界仅跳过该格, 不截断
// ==========================================

use crate::domain::matrix::{Price, PriceError, PriceMatrix};
use crate::domain::types::ZoneCode;
use crate::domain::zone::Zone;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// 价格矩阵错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("价格矩阵尚未生成")]
    NotBuilt,

    #[error("区域不在价格矩阵中: {0}")]
    UnknownZone(ZoneCode),

    #[error(transparent)]
    InvalidPrice(#[from] PriceError),

    #[error("CSV 为空")]
    EmptyCsv,

    #[error("CSV 表头区域与当前区域不一致: expected={expected:?}, found={found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("CSV 解析失败: {0}")]
    Csv(String),
}

impl From<csv::Error> for MatrixError {
    fn from(err: csv::Error) -> Self {
        MatrixError::Csv(err.to_string())
    }
}

pub type MatrixResult<T> = Result<T, MatrixError>;

/// 被跳过的单元格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCell {
    /// CSV 行号（表头为第 1 行）
    pub row: usize,
    pub from_zone: String,
    pub to_zone: String,
    pub value: String,
    pub reason: String,
}

/// CSV 导入报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixImportReport {
    /// 写入价格的单元格数
    pub applied: usize,
    /// 空白单元格数
    pub blank: usize,
    /// 起始区域无法识别而跳过的行
    pub skipped_rows: Vec<usize>,
    pub skipped_cells: Vec<SkippedCell>,
}

// ==========================================
// PriceMatrixBuilder
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PriceMatrixBuilder;

impl PriceMatrixBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 由定稿区域生成空矩阵（仅已完成且非空的区域）
    pub fn build(&self, zones: &[Zone]) -> PriceMatrix {
        let codes: Vec<ZoneCode> = zones
            .iter()
            .filter(|z| z.is_complete && !z.is_empty())
            .map(|z| z.code)
            .collect();
        tracing::info!(zones = codes.len(), "价格矩阵已生成");
        PriceMatrix::new(codes)
    }

    /// 设置单元格价格（None 表示清空）
    pub fn set_price(
        &self,
        matrix: &mut PriceMatrix,
        from: ZoneCode,
        to: ZoneCode,
        value: Option<f64>,
    ) -> MatrixResult<()> {
        for zone in [from, to] {
            if !matrix.contains(&zone) {
                return Err(MatrixError::UnknownZone(zone));
            }
        }
        let price = value.map(Price::try_from).transpose()?;
        matrix.set(&from, &to, price);
        Ok(())
    }

    /// 导出 CSV
    pub fn export_csv(&self, matrix: &PriceMatrix) -> MatrixResult<String> {
        let mut writer = WriterBuilder::new().flexible(false).from_writer(Vec::new());

        let mut header = vec![String::new()];
        header.extend(matrix.zones().iter().map(|z| z.to_string()));
        writer.write_record(&header)?;

        for from in matrix.zones() {
            let mut row = vec![from.to_string()];
            row.extend(
                matrix
                    .zones()
                    .iter()
                    .map(|to| matrix.get(from, to).map(|p| p.to_string()).unwrap_or_default()),
            );
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| MatrixError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| MatrixError::Csv(e.to_string()))
    }

    /// 导入 CSV
    ///
    /// 表头校验通过后整体替换矩阵内容; 未出现或被跳过的单元格置空
    pub fn import_csv(&self, matrix: &mut PriceMatrix, text: &str) -> MatrixResult<MatrixImportReport> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut records = reader.records();
        let header = records.next().ok_or(MatrixError::EmptyCsv)??;
        let columns = validate_header(matrix, &header)?;

        let mut next = PriceMatrix::new(matrix.zones().to_vec());
        let mut report = MatrixImportReport::default();

        for (offset, result) in records.enumerate() {
            let row_no = offset + 2;
            let record = result?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            let from = match record
                .get(0)
                .and_then(|cell| cell.parse::<ZoneCode>().ok())
                .filter(|code| next.contains(code))
            {
                Some(code) => code,
                None => {
                    tracing::warn!(row = row_no, "起始区域无法识别, 整行跳过");
                    report.skipped_rows.push(row_no);
                    continue;
                }
            };

            for (col, to) in columns.iter().enumerate() {
                let raw = record.get(col + 1).unwrap_or("");
                if raw.is_empty() {
                    report.blank += 1;
                    next.set(&from, to, None);
                    continue;
                }
                match Price::parse(raw) {
                    Ok(price) => {
                        next.set(&from, to, Some(price));
                        report.applied += 1;
                    }
                    Err(e) => {
                        tracing::warn!(row = row_no, from = %from, to = %to, value = raw, "价格单元格跳过: {}", e);
                        next.set(&from, to, None);
                        report.skipped_cells.push(SkippedCell {
                            row: row_no,
                            from_zone: from.to_string(),
                            to_zone: to.to_string(),
                            value: raw.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        *matrix = next;
        tracing::info!(
            applied = report.applied,
            skipped_cells = report.skipped_cells.len(),
            skipped_rows = report.skipped_rows.len(),
            "价格矩阵 CSV 导入完成"
        );
        Ok(report)
    }
}

/// 表头校验: 区域集合、数量均须与矩阵一致（顺序无关）
///
/// # 返回
/// - 各列对应的区域编码（按表头顺序）
fn validate_header(matrix: &PriceMatrix, header: &csv::StringRecord) -> MatrixResult<Vec<ZoneCode>> {
    let found: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();
    let expected: Vec<String> = matrix.zones().iter().map(|z| z.to_string()).collect();
    let mismatch = || MatrixError::HeaderMismatch {
        expected: expected.clone(),
        found: found.clone(),
    };

    let columns: Vec<ZoneCode> = found
        .iter()
        .map(|s| s.parse::<ZoneCode>())
        .collect::<Result<_, _>>()
        .map_err(|_| mismatch())?;

    let found_set: BTreeSet<ZoneCode> = columns.iter().copied().collect();
    let expected_set: BTreeSet<ZoneCode> = matrix.zones().iter().copied().collect();
    if columns.len() != matrix.zones().len() || found_set.len() != columns.len() || found_set != expected_set {
        tracing::warn!(?expected, ?found, "CSV 表头区域不一致, 拒绝导入");
        return Err(mismatch());
    }
    Ok(columns)
}
