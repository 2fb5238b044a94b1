// ==========================================
// 区域划分配置器 - 地理数据导入 Trait
// ==========================================
// 职责: 定义地理数据导入接口（不包含实现）
// ==========================================

use crate::domain::geo::RawGeoRecord;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// GeographySource Trait
// ==========================================
// 用途: 地理数据来源（文件 / 内存 / 其他系统）
// 实现者: FileGeographySource, InMemoryGeographySource
#[async_trait]
pub trait GeographySource: Send + Sync {
    /// 异步读取全部原始地理记录
    ///
    /// # 返回
    /// - Ok(Vec<RawGeoRecord>): 未清洗的原始记录
    /// - Err: 文件读取错误、格式错误、缺少必需列
    async fn load_records(&self) -> ImportResult<Vec<RawGeoRecord>>;

    /// 来源描述（日志用）
    fn describe(&self) -> String;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser, JsonParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录（HashMap<列名, 值>）
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(Vec<HashMap<String, String>>): 行记录列表
    /// - Err: 文件读取错误、格式错误
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<HashMap<String, String>>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列名别名 -> 输入契约字段
// 实现者: GeoFieldMapper
pub trait FieldMapper: Send + Sync {
    /// 映射全部行
    ///
    /// # 返回
    /// - Err(MissingColumn): 表头中找不到某个必需字段的任何别名
    fn map_rows(&self, rows: &[HashMap<String, String>]) -> ImportResult<Vec<RawGeoRecord>>;
}
