//! component-diff-core - 组件结构提取与比较核心库
//!
//! 从层级化的内容树中提取组件的结构化模型（基本属性、对话框字段、
//! 依赖信息），并对两个组件模型做结构化比较。

pub mod batch;
pub mod classifier;
pub mod comparator;
pub mod component;
pub mod config;
pub mod dialog;
pub mod error;
pub mod exporter;
pub mod normalizer;
pub mod tree;

// 重新导出主要的公共 API
pub use batch::{
    BatchConfig, BatchExtractor, BatchItem, BatchResult, BatchStats, discover_components,
};
pub use classifier::{FieldClassifier, FieldKind, NodeClass};
pub use comparator::{
    AttributeDifference, BasicPropertiesDiff, ComparisonResult, ComparisonSummary,
    DependenciesDiff, DialogDiff, DiffEngine, FieldsDiff,
};
pub use component::{
    ComponentModel, ComponentModelBuilder, ComponentSummary, DependencyInfo, EditConfig,
    InplaceEditing, TemplateInfo,
};
pub use config::ExtractorConfig;
pub use dialog::{
    ContainerSummary, DialogContent, DialogKind, DialogModel, FieldDescriptor, FieldModelExtractor,
    FieldOption,
};
pub use error::{AccessError, ComponentDiffError, ExtractionError, Result};
pub use exporter::{ComponentExporter, ExportConfig, ExportFormat, ExportIndex, IndexEntry};
pub use normalizer::{AttributeNormalizer, NormalizedValue};
pub use tree::{
    LenientReader, MemoryTree, NodeBuilder, NodePath, RawValue, Scalar, TreeAccessor, TreeNode,
};
