// ==========================================
// 区域划分配置器 - 地理数据导入实现
// ==========================================
// 流程:
// 1. 文件读取与解析（阻塞 IO 放到 spawn_blocking）
// 2. 列名别名映射 -> RawGeoRecord
// 3. 清洗并构建 GeographyIndex
// ==========================================

use crate::domain::geo::RawGeoRecord;
use crate::engine::geography_index::GeographyIndex;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::GeoFieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::geography_importer_trait::{FieldMapper, GeographySource};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Instant;

// ==========================================
// FileGeographySource - 文件来源
// ==========================================
pub struct FileGeographySource {
    path: PathBuf,
}

impl FileGeographySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GeographySource for FileGeographySource {
    async fn load_records(&self) -> ImportResult<Vec<RawGeoRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let rows = UniversalFileParser.parse(&path)?;
            GeoFieldMapper.map_rows(&rows)
        })
        .await?
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ==========================================
// InMemoryGeographySource - 内存来源（测试 / 上游已解析）
// ==========================================
pub struct InMemoryGeographySource {
    records: Vec<RawGeoRecord>,
}

impl InMemoryGeographySource {
    pub fn new(records: Vec<RawGeoRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl GeographySource for InMemoryGeographySource {
    async fn load_records(&self) -> ImportResult<Vec<RawGeoRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory({} rows)", self.records.len())
    }
}

// ==========================================
// GeographyImporter - 导入并构建索引
// ==========================================
pub struct GeographyImporter {
    placeholders: Vec<String>,
}

impl GeographyImporter {
    pub fn new(placeholders: Vec<String>) -> Self {
        Self { placeholders }
    }

    /// 读取来源并构建地理索引
    ///
    /// # 返回
    /// - Err(EmptyDataset): 没有任何有效记录
    pub async fn import(&self, source: &dyn GeographySource) -> ImportResult<GeographyIndex> {
        let started = Instant::now();
        let records = source.load_records().await?;
        let index = GeographyIndex::build_with_placeholders(&records, &self.placeholders);

        if index.accepted() == 0 {
            tracing::warn!(source = %source.describe(), rows = records.len(), "地理数据无有效记录");
            return Err(ImportError::EmptyDataset {
                skipped: index.skipped(),
            });
        }

        tracing::info!(
            source = %source.describe(),
            accepted = index.accepted(),
            skipped = index.skipped(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "地理数据导入完成"
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Region;
    use crate::engine::geography_index::DEFAULT_PLACEHOLDER_TOKENS;
    use std::io::Write;

    fn importer() -> GeographyImporter {
        GeographyImporter::new(DEFAULT_PLACEHOLDER_TOKENS.iter().map(|t| t.to_string()).collect())
    }

    #[tokio::test]
    async fn test_import_from_csv_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "pin_code,state_name,city,zone_code").unwrap();
        writeln!(temp_file, "110001,Delhi,New Delhi,N1").unwrap();
        writeln!(temp_file, "781001,Assam,Guwahati,NE2").unwrap();
        writeln!(temp_file, "999,Assam,Bad Pin,NE2").unwrap();

        let source = FileGeographySource::new(temp_file.path());
        let index = importer().import(&source).await.unwrap();

        assert_eq!(index.accepted(), 2);
        assert_eq!(index.skipped(), 1);
        assert_eq!(index.states_of(Region::Northeast), vec!["Assam".to_string()]);
    }

    #[tokio::test]
    async fn test_import_rejects_empty_dataset() {
        let source = InMemoryGeographySource::new(vec![RawGeoRecord::new("110001", "NA", "Delhi", "N1")]);
        let result = importer().import(&source).await;
        assert!(matches!(result, Err(ImportError::EmptyDataset { skipped: 1 })));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileGeographySource::new("/nonexistent/geo.csv");
        assert!(matches!(
            importer().import(&source).await,
            Err(ImportError::FileNotFound(_))
        ));
    }
}
