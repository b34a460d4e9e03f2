//! 提取配置

use crate::classifier::FieldClassifier;
use crate::error::{ComponentDiffError, Result};
use serde::{Deserialize, Serialize};

/// 默认组件类型标记
pub const DEFAULT_COMPONENT_TYPE: &str = "cq:Component";

/// 默认最大遍历深度
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// 组件提取配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// 对话框遍历的最大深度，超出部分会被跳过
    pub max_depth: usize,
    /// 组件节点必须具有的类型
    pub component_type_marker: String,
    /// 原始属性映射中是否保留 `jcr:` 系统属性
    pub include_system_attributes: bool,
    /// 是否对父类型做存在性探测
    pub resolve_super_type: bool,
    /// 字段分类器
    pub classifier: FieldClassifier,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            component_type_marker: DEFAULT_COMPONENT_TYPE.to_string(),
            include_system_attributes: false,
            resolve_super_type: true,
            classifier: FieldClassifier::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_component_type_marker(mut self, marker: impl Into<String>) -> Self {
        self.component_type_marker = marker.into();
        self
    }

    pub fn with_system_attributes(mut self, include: bool) -> Self {
        self.include_system_attributes = include;
        self
    }

    pub fn with_super_type_resolution(mut self, enabled: bool) -> Self {
        self.resolve_super_type = enabled;
        self
    }

    pub fn with_classifier(mut self, classifier: FieldClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ComponentDiffError::ConfigError(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.component_type_marker.trim().is_empty() {
            return Err(ComponentDiffError::ConfigError(
                "component_type_marker cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
