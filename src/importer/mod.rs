// ==========================================
// 区域划分配置器 - 导入层
// ==========================================
// 职责: 外部地理数据导入, 生成输入契约记录
// 支持: Excel, CSV, JSON
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod geography_importer;
pub mod geography_importer_trait;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::GeoFieldMapper;
pub use file_parser::{CsvParser, ExcelParser, JsonParser, UniversalFileParser};
pub use geography_importer::{FileGeographySource, GeographyImporter, InMemoryGeographySource};

// 重导出 Trait 接口
pub use geography_importer_trait::{FieldMapper, FileParser, GeographySource};
