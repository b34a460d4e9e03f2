//! 属性规范化模块
//!
//! 把单值或多值的原始属性统一转换为一个字符串表示

use crate::tree::{AccessResult, RawValue, TreeAccessor, TreeNode};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 非文本属性（二进制、日期、引用）的替代文本
pub const NON_TEXT_SENTINEL: &str = "[non-string value]";

/// 多值属性的连接符
///
/// 值内部的逗号不做转义，含逗号的多值属性无法从结果中还原。
pub const MULTI_VALUE_SEPARATOR: &str = ",";

/// 系统属性前缀
pub const SYSTEM_ATTRIBUTE_PREFIX: &str = "jcr:";

/// 规范化后的属性值
///
/// `Absent` 与空字符串不同：前者表示属性不存在，后者表示属性存在但为空。
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NormalizedValue {
    #[default]
    Absent,
    Text(String),
}

impl NormalizedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, NormalizedValue::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            NormalizedValue::Absent => None,
            NormalizedValue::Text(text) => Some(text),
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            NormalizedValue::Absent => None,
            NormalizedValue::Text(text) => Some(text),
        }
    }
}

impl From<Option<String>> for NormalizedValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(NormalizedValue::Absent, NormalizedValue::Text)
    }
}

impl From<&str> for NormalizedValue {
    fn from(value: &str) -> Self {
        NormalizedValue::Text(value.to_string())
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Absent => f.write_str("<absent>"),
            NormalizedValue::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for NormalizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_deref().serialize(serializer)
    }
}

/// 属性规范化器
pub struct AttributeNormalizer;

impl AttributeNormalizer {
    /// 规范化一个存在的原始属性值
    ///
    /// 单值返回其文本形式；多值按原始顺序以逗号连接。
    /// 只要有一个值没有文本形式，整个属性就规范化为 [`NON_TEXT_SENTINEL`]。
    pub fn normalize(value: &RawValue) -> String {
        let mut texts = Vec::new();
        for scalar in value.values() {
            match scalar.as_text() {
                Some(text) => texts.push(text),
                None => return NON_TEXT_SENTINEL.to_string(),
            }
        }
        texts.join(MULTI_VALUE_SEPARATOR)
    }

    /// 规范化一个可能不存在的属性值
    pub fn normalize_optional(value: Option<&RawValue>) -> NormalizedValue {
        match value {
            Some(raw) => NormalizedValue::Text(Self::normalize(raw)),
            None => NormalizedValue::Absent,
        }
    }

    /// 读取并规范化节点上的单个属性
    pub fn read<A: TreeAccessor + ?Sized>(
        accessor: &A,
        node: &TreeNode,
        name: &str,
    ) -> AccessResult<NormalizedValue> {
        let raw = accessor.attribute(node, name)?;
        Ok(Self::normalize_optional(raw.as_ref()))
    }

    /// 读取并规范化节点上的全部属性
    ///
    /// `include_system` 为 false 时跳过 `jcr:` 前缀的系统属性。
    pub fn read_all<A: TreeAccessor + ?Sized>(
        accessor: &A,
        node: &TreeNode,
        include_system: bool,
    ) -> AccessResult<BTreeMap<String, String>> {
        let raw = accessor.all_attributes(node)?;
        Ok(Self::normalize_map(&raw, include_system))
    }

    /// 规范化整个属性映射
    pub fn normalize_map(
        attributes: &BTreeMap<String, RawValue>,
        include_system: bool,
    ) -> BTreeMap<String, String> {
        attributes
            .iter()
            .filter(|(name, _)| include_system || !name.starts_with(SYSTEM_ATTRIBUTE_PREFIX))
            .map(|(name, value)| (name.clone(), Self::normalize(value)))
            .collect()
    }
}
