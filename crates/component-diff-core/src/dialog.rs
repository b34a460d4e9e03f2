//! 对话框分析模块
//!
//! 遍历对话框子树，提取扁平的字段定义列表和嵌套的容器布局

use crate::classifier::{FieldKind, NodeClass};
use crate::config::ExtractorConfig;
use crate::tree::{LenientReader, NodePath, TreeAccessor, TreeNode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 字段名称属性
pub const FIELD_NAME_ATTR: &str = "name";
/// 字段标签属性
pub const FIELD_LABEL_ATTR: &str = "fieldLabel";
/// 标签缺失时使用的标题属性
pub const TITLE_ATTR: &str = "jcr:title";
/// 默认值属性
pub const DEFAULT_VALUE_ATTR: &str = "value";
/// 必填标记属性
pub const REQUIRED_ATTR: &str = "required";
/// 选项容器子节点
pub const OPTIONS_CONTAINER: &str = "items";
/// 验证规则容器子节点
pub const VALIDATION_CONTAINER: &str = "validation";

/// 选择类字段的一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    pub text: Option<String>,
    pub value: Option<String>,
    pub title: Option<String>,
}

/// 一个输入字段定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// 字段节点名称
    pub node_name: String,
    /// 字段节点路径
    pub path: NodePath,
    /// 字段名称，作为差异比较的键；缺失时不参与按名称比较
    pub name: Option<String>,
    /// 显示标签，缺失时退回到标题
    pub label: Option<String>,
    pub type_tag: String,
    pub kind: FieldKind,
    pub default_value: Option<String>,
    pub required: bool,
    /// 只有选择类字段且存在选项容器时才有值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    pub validation: BTreeMap<String, String>,
    /// 节点的全部规范化属性
    pub attributes: BTreeMap<String, String>,
}

/// 容器布局摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    pub name: String,
    pub type_tag: String,
    pub is_field: bool,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContainerSummary>,
}

impl ContainerSummary {
    /// 摘要树中的节点总数
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ContainerSummary::node_count).sum::<usize>()
    }
}

/// 一个对话框的分析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogContent {
    pub path: NodePath,
    pub attributes: BTreeMap<String, String>,
    pub fields: Vec<FieldDescriptor>,
    pub layout: ContainerSummary,
}

/// 对话框种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    None,
    Touch,
    Classic,
}

/// 对话框模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DialogModel {
    None,
    Touch(DialogContent),
    Classic(DialogContent),
}

impl DialogModel {
    pub fn kind(&self) -> DialogKind {
        match self {
            DialogModel::None => DialogKind::None,
            DialogModel::Touch(_) => DialogKind::Touch,
            DialogModel::Classic(_) => DialogKind::Classic,
        }
    }

    pub fn content(&self) -> Option<&DialogContent> {
        match self {
            DialogModel::None => None,
            DialogModel::Touch(content) | DialogModel::Classic(content) => Some(content),
        }
    }

    /// 字段列表，没有对话框时为空
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self.content() {
            Some(content) => &content.fields,
            None => &[],
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DialogModel::None)
    }
}

/// 字段模型提取器
pub struct FieldModelExtractor<'a, A: ?Sized> {
    reader: LenientReader<'a, A>,
    config: &'a ExtractorConfig,
}

impl<'a, A: TreeAccessor + ?Sized> FieldModelExtractor<'a, A> {
    pub fn new(accessor: &'a A, config: &'a ExtractorConfig) -> Self {
        Self {
            reader: LenientReader::new(accessor, config.include_system_attributes),
            config,
        }
    }

    /// 分析一个对话框节点
    pub fn analyze_dialog(&self, dialog: &TreeNode, kind: DialogKind) -> DialogModel {
        let content = DialogContent {
            path: dialog.path.clone(),
            attributes: self.reader.attributes(dialog),
            fields: self.extract(dialog),
            layout: self.analyze_container_structure(dialog),
        };
        debug!(
            "Analyzed {:?} dialog {} with {} fields",
            kind,
            dialog.path,
            content.fields.len()
        );
        match kind {
            DialogKind::Touch => DialogModel::Touch(content),
            DialogKind::Classic => DialogModel::Classic(content),
            DialogKind::None => DialogModel::None,
        }
    }

    /// 提取子树中的全部字段
    ///
    /// 先序深度优先遍历，结果保持遍历顺序。字段节点的子节点同样会被遍历，
    /// 以免遗漏嵌套在非标准对话框中的字段。
    pub fn extract(&self, root: &TreeNode) -> Vec<FieldDescriptor> {
        let mut fields = Vec::new();
        let mut stack = vec![(root.clone(), 0_usize)];

        while let Some((node, depth)) = stack.pop() {
            let children = self.reader.children(&node);
            let type_tag = self.reader.accessor().type_tag(&node);

            if let NodeClass::Field(kind) =
                self.config.classifier.classify(&type_tag, !children.is_empty())
            {
                fields.push(self.build_descriptor(&node, type_tag, kind));
            }

            if depth + 1 >= self.config.max_depth {
                if !children.is_empty() {
                    warn!(
                        "Max depth {} reached at {}, skipping {} children",
                        self.config.max_depth,
                        node.path,
                        children.len()
                    );
                }
                continue;
            }

            // 逆序入栈以保持先序遍历顺序
            for child in children.into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        fields
    }

    /// 生成嵌套的容器布局摘要
    ///
    /// 与 [`extract`](Self::extract) 相互独立：字段作为布局的叶子出现，
    /// 无法识别的叶子节点被跳过。
    pub fn analyze_container_structure(&self, root: &TreeNode) -> ContainerSummary {
        self.summarize(root, 0)
    }

    fn summarize(&self, node: &TreeNode, depth: usize) -> ContainerSummary {
        let type_tag = self.reader.accessor().type_tag(node);
        let attributes = self.reader.attributes(node);
        let is_field = self.config.classifier.is_field(&type_tag);
        let mut summary = ContainerSummary {
            name: node.name().to_string(),
            type_tag,
            is_field,
            attributes,
            children: Vec::new(),
        };

        if is_field {
            return summary;
        }
        if depth + 1 >= self.config.max_depth {
            warn!(
                "Max depth {} reached at {}, layout truncated",
                self.config.max_depth, node.path
            );
            return summary;
        }

        for child in self.reader.children(node) {
            let child_tag = self.reader.accessor().type_tag(&child);
            let has_children = !self.reader.children(&child).is_empty();
            match self.config.classifier.classify(&child_tag, has_children) {
                NodeClass::Unknown => {}
                NodeClass::Field(_) | NodeClass::Container => {
                    summary.children.push(self.summarize(&child, depth + 1));
                }
            }
        }

        summary
    }

    fn build_descriptor(
        &self,
        node: &TreeNode,
        type_tag: String,
        kind: FieldKind,
    ) -> FieldDescriptor {
        let label = self
            .reader
            .text(node, FIELD_LABEL_ATTR)
            .or_else(|| self.reader.text(node, TITLE_ATTR));

        let options = kind
            .has_options()
            .then(|| self.reader.child(node, OPTIONS_CONTAINER))
            .flatten()
            .map(|items| self.extract_options(&items));

        let validation = self
            .reader
            .child(node, VALIDATION_CONTAINER)
            .map(|v| self.reader.attributes(&v))
            .unwrap_or_default();

        FieldDescriptor {
            node_name: node.name().to_string(),
            path: node.path.clone(),
            name: self.reader.text(node, FIELD_NAME_ATTR),
            label,
            type_tag,
            kind,
            default_value: self.reader.text(node, DEFAULT_VALUE_ATTR),
            required: self.reader.text(node, REQUIRED_ATTR).as_deref() == Some("true"),
            options,
            validation,
            attributes: self.reader.attributes(node),
        }
    }

    fn extract_options(&self, items: &TreeNode) -> Vec<FieldOption> {
        self.reader
            .children(items)
            .iter()
            .map(|option| FieldOption {
                text: self.reader.text(option, "text"),
                value: self.reader.text(option, "value"),
                title: self.reader.text(option, TITLE_ATTR),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
