//! 容错读取
//!
//! 包装 [`TreeAccessor`]，把单个属性或子节点列表的读取失败
//! 转换为“不存在”或“空列表”，并记录警告。

use super::common::{RawValue, TreeAccessor, TreeNode};
use crate::normalizer::{AttributeNormalizer, NormalizedValue};
use std::collections::BTreeMap;
use tracing::warn;

/// 容错读取器
pub struct LenientReader<'a, A: ?Sized> {
    accessor: &'a A,
    include_system: bool,
}

impl<'a, A: TreeAccessor + ?Sized> LenientReader<'a, A> {
    pub fn new(accessor: &'a A, include_system: bool) -> Self {
        Self {
            accessor,
            include_system,
        }
    }

    pub fn accessor(&self) -> &'a A {
        self.accessor
    }

    /// 读取原始属性值，失败时视为不存在
    pub fn raw(&self, node: &TreeNode, name: &str) -> Option<RawValue> {
        match self.accessor.attribute(node, name) {
            Ok(value) => value,
            Err(e) => {
                warn!("Attribute read failed, treating as absent: {}", e);
                None
            }
        }
    }

    /// 读取并规范化属性，失败时返回 `Absent`
    pub fn value(&self, node: &TreeNode, name: &str) -> NormalizedValue {
        AttributeNormalizer::normalize_optional(self.raw(node, name).as_ref())
    }

    pub fn text(&self, node: &TreeNode, name: &str) -> Option<String> {
        self.value(node, name).into_option()
    }

    /// 读取全部规范化属性，失败时返回空映射
    pub fn attributes(&self, node: &TreeNode) -> BTreeMap<String, String> {
        match AttributeNormalizer::read_all(self.accessor, node, self.include_system) {
            Ok(attributes) => attributes,
            Err(e) => {
                warn!("Attribute listing failed for {}: {}", node.path, e);
                BTreeMap::new()
            }
        }
    }

    /// 列出子节点，失败时把该处子树视为空
    pub fn children(&self, node: &TreeNode) -> Vec<TreeNode> {
        match self.accessor.children(node) {
            Ok(children) => children,
            Err(e) => {
                warn!("Traversal failed, treating subtree as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// 获取指定名称的子节点，失败时视为不存在
    pub fn child(&self, node: &TreeNode, name: &str) -> Option<TreeNode> {
        match self.accessor.child(node, name) {
            Ok(child) => child,
            Err(e) => {
                warn!("Child lookup {} under {} failed: {}", name, node.path, e);
                None
            }
        }
    }

    /// 按顺序尝试多个名称，返回第一个存在的子节点
    pub fn first_child(&self, node: &TreeNode, names: &[&str]) -> Option<TreeNode> {
        names.iter().find_map(|name| self.child(node, name))
    }
}
