//! 组件比较模块
//!
//! 对两个组件模型做分类别比较，并汇总成比较结果

use crate::component::ComponentModel;
use crate::dialog::{DialogKind, FieldDescriptor};
use crate::tree::NodePath;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// 一个取值不同的基本属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDifference {
    pub key: String,
    pub value1: String,
    pub value2: String,
}

impl AttributeDifference {
    /// 文本形式：`key: 'v1' vs 'v2'`
    pub fn render(&self) -> String {
        format!("{}: '{}' vs '{}'", self.key, self.value1, self.value2)
    }
}

/// 基本属性差异
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicPropertiesDiff {
    /// 渲染后的差异文本，与 `changed` 一一对应
    pub differences: Vec<String>,
    pub changed: Vec<AttributeDifference>,
    pub only_in_component1: Vec<String>,
    pub only_in_component2: Vec<String>,
    pub identical: bool,
}

/// 对话框差异
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogDiff {
    pub type1: DialogKind,
    pub type2: DialogKind,
    pub type_different: bool,
    /// 只有两侧对话框种类相同且都存在时才统计字段数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_count1: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_count2: Option<usize>,
}

/// 字段差异
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsDiff {
    pub only_in_component1: Vec<String>,
    pub only_in_component2: Vec<String>,
    /// 两侧都存在但判定为不同的字段名
    pub different: Vec<String>,
    pub identical: bool,
}

/// 依赖差异
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependenciesDiff {
    /// 父类型，缺失时为空字符串
    pub super_type1: String,
    pub super_type2: String,
    pub super_type_different: bool,
}

/// 比较摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub components_identical: bool,
    pub basic_properties_identical: bool,
    pub fields_identical: bool,
    pub basic_property_differences: usize,
    pub different_fields: usize,
}

/// 比较结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub component1: NodePath,
    pub component2: NodePath,
    pub basic_properties: BasicPropertiesDiff,
    pub dialog: DialogDiff,
    pub fields: FieldsDiff,
    pub dependencies: DependenciesDiff,
    pub summary: ComparisonSummary,
}

/// 差异引擎
///
/// 只比较已成功提取的模型，没有独立的错误路径。
pub struct DiffEngine;

impl DiffEngine {
    /// 比较两个组件
    ///
    /// 结构上对称，标注上不对称：差异按“只在 1 中”/“只在 2 中”分别报告。
    /// 依赖和对话框结构的差异不影响摘要中的相同标记。
    pub fn compare(a: &ComponentModel, b: &ComponentModel) -> ComparisonResult {
        let basic_properties = Self::compare_basic(a, b);
        let fields = Self::compare_fields(a.dialog.fields(), b.dialog.fields());

        let summary = ComparisonSummary {
            components_identical: basic_properties.identical && fields.identical,
            basic_properties_identical: basic_properties.identical,
            fields_identical: fields.identical,
            basic_property_differences: basic_properties.differences.len(),
            different_fields: fields.different.len(),
        };

        ComparisonResult {
            component1: a.path.clone(),
            component2: b.path.clone(),
            basic_properties,
            dialog: Self::compare_dialogs(a, b),
            fields,
            dependencies: Self::compare_dependencies(a, b),
            summary,
        }
    }

    /// 比较基本属性，缺失值视为不存在
    pub fn compare_basic(a: &ComponentModel, b: &ComponentModel) -> BasicPropertiesDiff {
        let mut changed = Vec::new();
        let mut only_in_component1 = Vec::new();
        let mut only_in_component2 = Vec::new();

        for (key, value) in &a.basic {
            let Some(value1) = value.as_deref() else {
                continue;
            };
            match b.basic(key) {
                None => only_in_component1.push(key.clone()),
                Some(value2) if value1 != value2 => changed.push(AttributeDifference {
                    key: key.clone(),
                    value1: value1.to_string(),
                    value2: value2.to_string(),
                }),
                Some(_) => {}
            }
        }

        for (key, value) in &b.basic {
            if value.is_present() && a.basic(key).is_none() {
                only_in_component2.push(key.clone());
            }
        }

        let identical =
            changed.is_empty() && only_in_component1.is_empty() && only_in_component2.is_empty();
        BasicPropertiesDiff {
            differences: changed.iter().map(AttributeDifference::render).collect(),
            changed,
            only_in_component1,
            only_in_component2,
            identical,
        }
    }

    /// 按名称比较字段
    ///
    /// 没有名称的字段不参与比较；名称相同的字段只比较类型。
    /// 同一侧出现重名字段时以第一个为准。
    pub fn compare_fields(a: &[FieldDescriptor], b: &[FieldDescriptor]) -> FieldsDiff {
        let keyed_a = Self::key_fields(a);
        let keyed_b = Self::key_fields(b);
        let index_a: HashMap<&str, &FieldDescriptor> = keyed_a.iter().copied().collect();
        let index_b: HashMap<&str, &FieldDescriptor> = keyed_b.iter().copied().collect();

        let mut only_in_component1 = Vec::new();
        let mut different = Vec::new();
        for &(name, field) in &keyed_a {
            match index_b.get(name) {
                None => only_in_component1.push(name.to_string()),
                Some(other) if !Self::fields_equal(field, other) => {
                    different.push(name.to_string());
                }
                Some(_) => {}
            }
        }

        let only_in_component2: Vec<String> = keyed_b
            .iter()
            .filter(|(name, _)| !index_a.contains_key(name))
            .map(|(name, _)| name.to_string())
            .collect();

        let identical =
            only_in_component1.is_empty() && only_in_component2.is_empty() && different.is_empty();
        FieldsDiff {
            only_in_component1,
            only_in_component2,
            different,
            identical,
        }
    }

    /// 字段相等判定：名称和类型完全一致
    pub fn fields_equal(a: &FieldDescriptor, b: &FieldDescriptor) -> bool {
        a.name == b.name && a.type_tag == b.type_tag
    }

    pub fn compare_dialogs(a: &ComponentModel, b: &ComponentModel) -> DialogDiff {
        let type1 = a.dialog.kind();
        let type2 = b.dialog.kind();
        let counts = (type1 == type2 && type1 != DialogKind::None)
            .then(|| (a.dialog.fields().len(), b.dialog.fields().len()));

        DialogDiff {
            type1,
            type2,
            type_different: type1 != type2,
            field_count1: counts.map(|(c, _)| c),
            field_count2: counts.map(|(_, c)| c),
        }
    }

    pub fn compare_dependencies(a: &ComponentModel, b: &ComponentModel) -> DependenciesDiff {
        let super_type1 = a.dependencies.super_type.clone().unwrap_or_default();
        let super_type2 = b.dependencies.super_type.clone().unwrap_or_default();
        DependenciesDiff {
            super_type_different: super_type1 != super_type2,
            super_type1,
            super_type2,
        }
    }

    /// 保持源顺序的名称映射
    fn key_fields(fields: &[FieldDescriptor]) -> Vec<(&str, &FieldDescriptor)> {
        let mut seen = HashSet::new();
        fields
            .iter()
            .filter_map(|field| field.name.as_deref().map(|name| (name, field)))
            .filter(|(name, _)| seen.insert(*name))
            .collect()
    }
}
