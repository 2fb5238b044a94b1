// ==========================================
// 区域划分配置器 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将下层错误转换为操作员可读的错误消息
// ==========================================

use crate::engine::error::ZoneError;
use crate::engine::price_matrix::MatrixError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 区域划分规则违反（顺序 / 空区域 / 唯一归属 / 阶段）
    #[error("{0}")]
    ZoneRule(ZoneError),

    /// 价格矩阵错误（表头不匹配 / 价格越界）
    #[error("{0}")]
    Matrix(MatrixError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("版本冲突: {0}")]
    VersionConflict(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 面向操作员的本地化消息
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ZoneRule(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

// ==========================================
// 从 ZoneError / MatrixError 转换
// ==========================================
impl From<ZoneError> for ApiError {
    fn from(err: ZoneError) -> Self {
        ApiError::ZoneRule(err)
    }
}

impl From<MatrixError> for ApiError {
    fn from(err: MatrixError) -> Self {
        ApiError::Matrix(err)
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("地理数据文件 {}", path)),
            ImportError::UnsupportedFormat(ext) => {
                ApiError::InvalidInput(format!("不支持的地理数据格式: {}", ext))
            }
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误
            RepositoryError::VersionConflict {
                session_key,
                stored,
                incoming,
            } => ApiError::VersionConflict(format!(
                "会话{}已被其他窗口修改（已存储revision={}，本次revision={}）",
                session_key, stored, incoming
            )),

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            // 数据质量错误
            RepositoryError::SerializationError(msg) => {
                ApiError::InternalError(format!("会话快照损坏: {}", msg))
            }
            err @ RepositoryError::UnsupportedSchemaVersion { .. } => {
                ApiError::InternalError(err.to_string())
            }

            // 通用错误
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
