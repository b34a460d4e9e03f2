use thiserror::Error;

/// component-diff 的错误类型定义
#[derive(Error, Debug)]
pub enum ComponentDiffError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Node {path} is not of type {expected}")]
    WrongType { path: String, expected: String },

    #[error("Tree access error: {0}")]
    Access(#[from] AccessError),

    #[error("Invalid tree document: {0}")]
    TreeFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// 组件提取失败的原因
///
/// 只有这两类错误会终止单个组件的提取；属性读取和子节点遍历失败
/// 都在提取过程中就地恢复。
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionError {
    #[error("Component node not found: {path}")]
    NotFound { path: String },

    #[error("Node {path} is not a component (missing type {expected})")]
    WrongType { path: String, expected: String },
}

impl ExtractionError {
    /// 出错的组件路径
    pub fn path(&self) -> &str {
        match self {
            ExtractionError::NotFound { path } | ExtractionError::WrongType { path, .. } => path,
        }
    }
}

impl From<ExtractionError> for ComponentDiffError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::NotFound { path } => ComponentDiffError::NotFound(path),
            ExtractionError::WrongType { path, expected } => {
                ComponentDiffError::WrongType { path, expected }
            }
        }
    }
}

/// 树访问器读取失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Failed to read attribute {name} on {path}: {reason}")]
    AttributeRead {
        path: String,
        name: String,
        reason: String,
    },

    #[error("Failed to list children of {path}: {reason}")]
    Traversal { path: String, reason: String },
}

/// 项目通用的 Result 类型别名
pub type Result<T> = std::result::Result<T, ComponentDiffError>;
