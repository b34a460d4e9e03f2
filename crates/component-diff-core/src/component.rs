//! 组件模型构建模块
//!
//! 汇总组件的基本属性、对话框字段、设计对话框、编辑配置和依赖信息

use crate::config::ExtractorConfig;
use crate::dialog::{DialogKind, DialogModel, FieldModelExtractor};
use crate::error::ExtractionError;
use crate::normalizer::NormalizedValue;
use crate::tree::{LenientReader, NodePath, TreeAccessor, TreeNode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const RESOURCE_TYPE: &str = "sling:resourceType";
pub const TITLE: &str = "jcr:title";
pub const DESCRIPTION: &str = "jcr:description";
pub const COMPONENT_GROUP: &str = "componentGroup";
pub const RESOURCE_SUPER_TYPE: &str = "sling:resourceSuperType";
pub const ICON: &str = "cq:icon";
pub const TAGS: &str = "cq:tags";
pub const HTML_TAG: &str = "cq:htmlTag";
pub const HTML_TAG_NAME: &str = "cq:tagName";

/// 组件的基本属性键
pub const BASIC_ATTRIBUTES: [&str; 7] = [
    RESOURCE_TYPE,
    TITLE,
    DESCRIPTION,
    COMPONENT_GROUP,
    RESOURCE_SUPER_TYPE,
    ICON,
    TAGS,
];

/// 触摸对话框子节点名称（仓库名称和 FileVault 序列化名称）
pub const TOUCH_DIALOG_NAMES: [&str; 2] = ["cq:dialog", "_cq_dialog"];
pub const CLASSIC_DIALOG_NAMES: [&str; 1] = ["dialog"];
pub const DESIGN_DIALOG_NAMES: [&str; 2] = ["cq:design_dialog", "_cq_design_dialog"];
pub const EDIT_CONFIG_NAMES: [&str; 2] = ["cq:editConfig", "_cq_editConfig"];
pub const CLIENTLIB_CHILD_NAMES: [&str; 2] = ["clientlibs", "cq:clientlibs"];
pub const CLIENTLIB_FOLDER_TYPE: &str = "cq:ClientLibraryFolder";

/// 常见的模板脚本文件名
pub const TEMPLATE_FILE_NAMES: [&str; 6] = [
    "component.html",
    "template.html",
    "component.jsp",
    "template.jsp",
    "component.js",
    "component.htl",
];

/// 组件资源类型的搜索路径
pub const SEARCH_PATHS: [&str; 2] = ["/apps", "/libs"];

/// 依赖信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInfo {
    pub super_type: Option<String>,
    /// 父类型是否能在树中找到；未做探测时为 false
    pub super_type_exists: bool,
    pub linked_libraries: Vec<String>,
    /// `cq:htmlTag` 节点的属性；以单个属性给出时记为 `cq:tagName`
    pub html_tag: BTreeMap<String, String>,
}

/// 内联编辑配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InplaceEditing {
    pub editor_type: Option<String>,
    pub active: Option<String>,
}

/// 编辑配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditConfig {
    pub attributes: BTreeMap<String, String>,
    pub inplace_editing: Option<InplaceEditing>,
    pub listeners: BTreeMap<String, String>,
    pub form_parameters: BTreeMap<String, String>,
}

/// 模板文件信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub files: Vec<String>,
    pub has_template_folder: bool,
    pub template_folder_entries: usize,
    /// 每个模板文件节点的规范化属性，键为文件名
    pub file_attributes: BTreeMap<String, BTreeMap<String, String>>,
}

/// 组件模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentModel {
    pub path: NodePath,
    pub name: String,
    pub primary_type: String,
    /// 基本属性，总是包含 [`BASIC_ATTRIBUTES`] 中的全部键
    pub basic: BTreeMap<String, NormalizedValue>,
    /// 组件节点的全部规范化属性
    pub attributes: BTreeMap<String, String>,
    pub dialog: DialogModel,
    /// 同时存在触摸对话框时保留的经典对话框
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_dialog: Option<DialogModel>,
    pub design_dialog: DialogModel,
    pub edit_config: Option<EditConfig>,
    pub dependencies: DependencyInfo,
    pub templates: TemplateInfo,
    pub extracted_at: DateTime<Utc>,
}

impl ComponentModel {
    /// 读取基本属性
    pub fn basic(&self, key: &str) -> Option<&str> {
        self.basic.get(key).and_then(NormalizedValue::as_deref)
    }

    pub fn title(&self) -> Option<&str> {
        self.basic(TITLE)
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.basic(RESOURCE_TYPE)
    }

    /// 除提取时间戳外是否完全相同
    pub fn content_eq(&self, other: &ComponentModel) -> bool {
        let mut aligned = other.clone();
        aligned.extracted_at = self.extracted_at;
        *self == aligned
    }
}

/// 组件简要信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub path: NodePath,
    pub name: String,
    pub basic: BTreeMap<String, NormalizedValue>,
    pub has_dialog: bool,
    pub has_design_dialog: bool,
}

/// 组件模型构建器
pub struct ComponentModelBuilder<'a, A: ?Sized> {
    accessor: &'a A,
    config: ExtractorConfig,
}

impl<'a, A: TreeAccessor + ?Sized> ComponentModelBuilder<'a, A> {
    /// 使用默认配置创建构建器
    pub fn new(accessor: &'a A) -> Self {
        Self::with_config(accessor, ExtractorConfig::default())
    }

    pub fn with_config(accessor: &'a A, config: ExtractorConfig) -> Self {
        Self { accessor, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn accessor(&self) -> &'a A {
        self.accessor
    }

    /// 构建组件模型
    ///
    /// 路径不存在时返回 `NotFound`，节点不是组件类型时返回 `WrongType`。
    /// 单个属性或子节点读取失败不会中断构建。
    pub fn build(&self, path: &NodePath) -> Result<ComponentModel, ExtractionError> {
        let node = self.resolve_component(path)?;
        let reader = self.reader();
        let fields = FieldModelExtractor::new(self.accessor, &self.config);

        let basic = self.read_basic(&node);

        let touch = reader.first_child(&node, &TOUCH_DIALOG_NAMES);
        let classic = reader.first_child(&node, &CLASSIC_DIALOG_NAMES);
        let (dialog, secondary_dialog) = match (touch, classic) {
            (Some(touch), classic) => (
                fields.analyze_dialog(&touch, DialogKind::Touch),
                classic.map(|c| fields.analyze_dialog(&c, DialogKind::Classic)),
            ),
            (None, Some(classic)) => (fields.analyze_dialog(&classic, DialogKind::Classic), None),
            (None, None) => (DialogModel::None, None),
        };

        let design_dialog = reader
            .first_child(&node, &DESIGN_DIALOG_NAMES)
            .map_or(DialogModel::None, |d| {
                fields.analyze_dialog(&d, DialogKind::Touch)
            });

        let model = ComponentModel {
            path: node.path.clone(),
            name: node.name().to_string(),
            primary_type: node.primary_type.clone(),
            dependencies: self.resolve_dependencies(&node, &basic),
            basic,
            attributes: reader.attributes(&node),
            dialog,
            secondary_dialog,
            design_dialog,
            edit_config: self.extract_edit_config(&node),
            templates: self.extract_templates(&node),
            extracted_at: Utc::now(),
        };

        debug!(
            "Built component model for {} ({} dialog fields)",
            model.path,
            model.dialog.fields().len()
        );
        Ok(model)
    }

    /// 只提取基本属性和对话框存在性
    pub fn summarize(&self, path: &NodePath) -> Result<ComponentSummary, ExtractionError> {
        let node = self.resolve_component(path)?;
        let reader = self.reader();
        let has_dialog = reader.first_child(&node, &TOUCH_DIALOG_NAMES).is_some()
            || reader.first_child(&node, &CLASSIC_DIALOG_NAMES).is_some();
        let has_design_dialog = reader.first_child(&node, &DESIGN_DIALOG_NAMES).is_some();

        Ok(ComponentSummary {
            path: node.path.clone(),
            name: node.name().to_string(),
            basic: self.read_basic(&node),
            has_dialog,
            has_design_dialog,
        })
    }

    /// 根据资源类型查找组件路径
    ///
    /// 绝对路径直接探测；相对资源类型依次在 `/apps` 和 `/libs` 下查找。
    pub fn find_by_resource_type(&self, resource_type: &str) -> Option<NodePath> {
        if resource_type.starts_with('/') {
            let path = NodePath::new(resource_type);
            return self.accessor.exists(&path).then_some(path);
        }
        SEARCH_PATHS
            .iter()
            .map(|base| NodePath::new(base).join(resource_type))
            .find(|path| self.accessor.exists(path))
    }

    fn reader(&self) -> LenientReader<'a, A> {
        LenientReader::new(self.accessor, self.config.include_system_attributes)
    }

    fn resolve_component(&self, path: &NodePath) -> Result<TreeNode, ExtractionError> {
        let node = self
            .accessor
            .get(path)
            .ok_or_else(|| ExtractionError::NotFound {
                path: path.to_string(),
            })?;
        if !self
            .accessor
            .has_type(&node, &self.config.component_type_marker)
        {
            return Err(ExtractionError::WrongType {
                path: path.to_string(),
                expected: self.config.component_type_marker.clone(),
            });
        }
        Ok(node)
    }

    fn read_basic(&self, node: &TreeNode) -> BTreeMap<String, NormalizedValue> {
        let reader = self.reader();
        BASIC_ATTRIBUTES
            .iter()
            .map(|key| (key.to_string(), reader.value(node, key)))
            .collect()
    }

    fn resolve_dependencies(
        &self,
        node: &TreeNode,
        basic: &BTreeMap<String, NormalizedValue>,
    ) -> DependencyInfo {
        let super_type = basic
            .get(RESOURCE_SUPER_TYPE)
            .and_then(NormalizedValue::as_deref)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // 第二次读取：只有存在父类型且允许解析时才探测
        let super_type_exists = match &super_type {
            Some(st) if self.config.resolve_super_type => {
                self.find_by_resource_type(st).is_some()
            }
            _ => false,
        };

        DependencyInfo {
            super_type,
            super_type_exists,
            linked_libraries: self.collect_client_libraries(node),
            html_tag: self.read_html_tag(node),
        }
    }

    fn read_html_tag(&self, node: &TreeNode) -> BTreeMap<String, String> {
        let reader = self.reader();
        if let Some(tag) = reader.child(node, HTML_TAG) {
            return reader.attributes(&tag);
        }
        reader
            .text(node, HTML_TAG)
            .filter(|t| !t.is_empty())
            .map(|t| BTreeMap::from([(HTML_TAG_NAME.to_string(), t)]))
            .unwrap_or_default()
    }

    fn collect_client_libraries(&self, node: &TreeNode) -> Vec<String> {
        let reader = self.reader();
        let mut folders = Vec::new();
        for name in CLIENTLIB_CHILD_NAMES {
            if let Some(child) = reader.child(node, name) {
                for nested in reader.children(&child) {
                    if self.accessor.has_type(&nested, CLIENTLIB_FOLDER_TYPE) {
                        folders.push(nested);
                    }
                }
                folders.push(child);
            }
        }
        for child in reader.children(node) {
            if self.accessor.has_type(&child, CLIENTLIB_FOLDER_TYPE)
                && !folders.iter().any(|f| f.path == child.path)
            {
                folders.push(child);
            }
        }

        let mut libraries: Vec<String> = Vec::new();
        for folder in &folders {
            for attr in ["categories", "embed"] {
                if let Some(value) = reader.raw(folder, attr) {
                    for library in value.texts() {
                        if !libraries.contains(&library) {
                            libraries.push(library);
                        }
                    }
                }
            }
        }
        libraries
    }

    fn extract_edit_config(&self, node: &TreeNode) -> Option<EditConfig> {
        let reader = self.reader();
        let edit_config = reader.first_child(node, &EDIT_CONFIG_NAMES)?;
        let child_attributes = |name: &str| {
            reader
                .child(&edit_config, name)
                .map(|c| reader.attributes(&c))
                .unwrap_or_default()
        };

        let inplace_editing = reader
            .child(&edit_config, "cq:inplaceEditing")
            .map(|inplace| InplaceEditing {
                editor_type: reader.text(&inplace, "editorType"),
                active: reader.text(&inplace, "active"),
            });

        Some(EditConfig {
            attributes: reader.attributes(&edit_config),
            inplace_editing,
            listeners: child_attributes("cq:listeners"),
            form_parameters: child_attributes("cq:formParameters"),
        })
    }

    fn extract_templates(&self, node: &TreeNode) -> TemplateInfo {
        let reader = self.reader();
        let own_script = format!("{}.html", node.name());
        let mut files = Vec::new();
        let mut file_attributes = BTreeMap::new();
        for name in std::iter::once(own_script.as_str()).chain(TEMPLATE_FILE_NAMES) {
            if files.iter().any(|f| f == name) {
                continue;
            }
            if let Some(file) = reader.child(node, name) {
                files.push(name.to_string());
                file_attributes.insert(name.to_string(), reader.attributes(&file));
            }
        }

        let folder = reader.child(node, "template");
        TemplateInfo {
            files,
            has_template_folder: folder.is_some(),
            template_folder_entries: folder.map_or(0, |f| reader.children(&f).len()),
            file_attributes,
        }
    }
}
