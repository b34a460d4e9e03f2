//! 内存树实现
//!
//! 提供基于内存的 [`TreeAccessor`] 实现，可以通过 [`NodeBuilder`] 构建，
//! 也可以从 Sling 风格的 JSON 导出（`.infinity.json`）加载。

use super::common::{
    AccessResult, DEFAULT_PRIMARY_TYPE, MIXIN_TYPES_ATTR, NodePath, PRIMARY_TYPE_ATTR, RawValue,
    Scalar, TreeAccessor, TreeNode,
};
use crate::error::{AccessError, ComponentDiffError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 新建中间节点时使用的类型
const FOLDER_TYPE: &str = "sling:Folder";

/// 存储的节点数据
#[derive(Debug, Clone)]
struct StoredNode {
    primary_type: String,
    mixin_types: Vec<String>,
    attributes: BTreeMap<String, RawValue>,
    children: Vec<String>,
}

impl StoredNode {
    fn new(primary_type: &str) -> Self {
        Self {
            primary_type: primary_type.to_string(),
            mixin_types: Vec::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

/// 节点构建器
///
/// 同名子节点会被替换，保证兄弟节点名称唯一。
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    primary_type: String,
    mixin_types: Vec<String>,
    attributes: BTreeMap<String, RawValue>,
    children: Vec<(String, NodeBuilder)>,
}

impl NodeBuilder {
    pub fn new(primary_type: impl Into<String>) -> Self {
        Self {
            primary_type: primary_type.into(),
            mixin_types: Vec::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// 无结构节点（`nt:unstructured`）
    pub fn unstructured() -> Self {
        Self::new(DEFAULT_PRIMARY_TYPE)
    }

    pub fn mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixin_types.push(mixin.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attr_multi<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.insert(name.into(), RawValue::strings(values));
        self
    }

    pub fn child(mut self, name: impl Into<String>, child: NodeBuilder) -> Self {
        let name = name.into();
        if let Some(slot) = self.children.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = child;
        } else {
            self.children.push((name, child));
        }
        self
    }
}

/// 内存内容树
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: BTreeMap<NodePath, StoredNode>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// 创建只包含根节点的空树
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodePath::root(), StoredNode::new("rep:root"));
        Self { nodes }
    }

    /// 节点总数（含根节点）
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// 在指定路径挂载节点子树
    ///
    /// 缺失的祖先节点会以 `sling:Folder` 类型创建；已存在的同路径子树被替换。
    pub fn mount(&mut self, path: impl Into<NodePath>, node: NodeBuilder) {
        let path = path.into();
        self.ensure_ancestors(&path);
        self.remove_subtree(&path);
        self.insert_recursive(path, node);
    }

    /// 从 Sling JSON 文档加载一棵树，挂载在 `root` 下
    pub fn from_json_str(root: impl Into<NodePath>, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let mut tree = Self::new();
        tree.mount_json(root, &value)?;
        Ok(tree)
    }

    /// 把 Sling JSON 值挂载到指定路径
    pub fn mount_json(&mut self, path: impl Into<NodePath>, value: &Value) -> Result<()> {
        let path = path.into();
        let builder = builder_from_json(&path, value)?;
        if path.is_root() {
            self.nodes.clear();
            self.insert_recursive(path, builder);
        } else {
            self.mount(path, builder);
        }
        Ok(())
    }

    fn ensure_ancestors(&mut self, path: &NodePath) {
        let mut missing = Vec::new();
        let mut current = path.parent();
        while let Some(ancestor) = current {
            if self.nodes.contains_key(&ancestor) {
                break;
            }
            current = ancestor.parent();
            missing.push(ancestor);
        }
        for ancestor in missing.into_iter().rev() {
            self.link_to_parent(&ancestor);
            self.nodes.insert(ancestor, StoredNode::new(FOLDER_TYPE));
        }
    }

    fn link_to_parent(&mut self, path: &NodePath) {
        if let Some(parent) = path.parent() {
            if let Some(stored) = self.nodes.get_mut(&parent) {
                let name = path.name().to_string();
                if !stored.children.contains(&name) {
                    stored.children.push(name);
                }
            }
        }
    }

    fn remove_subtree(&mut self, path: &NodePath) {
        self.nodes.retain(|p, _| p != path && !p.is_descendant_of(path));
    }

    fn insert_recursive(&mut self, path: NodePath, node: NodeBuilder) {
        self.link_to_parent(&path);
        let mut stored = StoredNode::new(&node.primary_type);
        stored.mixin_types = node.mixin_types;
        stored.attributes = node.attributes;
        stored.children = node.children.iter().map(|(n, _)| n.clone()).collect();
        self.nodes.insert(path.clone(), stored);

        for (name, child) in node.children {
            self.insert_recursive(path.join(&name), child);
        }
    }

    fn handle(&self, path: &NodePath, stored: &StoredNode) -> TreeNode {
        TreeNode {
            path: path.clone(),
            primary_type: stored.primary_type.clone(),
            mixin_types: stored.mixin_types.clone(),
        }
    }

    fn stored(&self, node: &TreeNode) -> Option<&StoredNode> {
        self.nodes.get(&node.path)
    }
}

impl TreeAccessor for MemoryTree {
    fn exists(&self, path: &NodePath) -> bool {
        self.nodes.contains_key(path)
    }

    fn get(&self, path: &NodePath) -> Option<TreeNode> {
        self.nodes.get(path).map(|stored| self.handle(path, stored))
    }

    fn attribute(&self, node: &TreeNode, name: &str) -> AccessResult<Option<RawValue>> {
        let stored = self.stored(node).ok_or_else(|| AccessError::AttributeRead {
            path: node.path.to_string(),
            name: name.to_string(),
            reason: "node no longer exists".to_string(),
        })?;
        Ok(match name {
            PRIMARY_TYPE_ATTR => Some(RawValue::Single(Scalar::Name(stored.primary_type.clone()))),
            MIXIN_TYPES_ATTR if !stored.mixin_types.is_empty() => Some(RawValue::Multi(
                stored
                    .mixin_types
                    .iter()
                    .map(|m| Scalar::Name(m.clone()))
                    .collect(),
            )),
            _ => stored.attributes.get(name).cloned(),
        })
    }

    fn all_attributes(&self, node: &TreeNode) -> AccessResult<BTreeMap<String, RawValue>> {
        let stored = self.stored(node).ok_or_else(|| AccessError::AttributeRead {
            path: node.path.to_string(),
            name: "*".to_string(),
            reason: "node no longer exists".to_string(),
        })?;
        let mut attributes = stored.attributes.clone();
        attributes.insert(
            PRIMARY_TYPE_ATTR.to_string(),
            RawValue::Single(Scalar::Name(stored.primary_type.clone())),
        );
        if !stored.mixin_types.is_empty() {
            attributes.insert(
                MIXIN_TYPES_ATTR.to_string(),
                RawValue::Multi(
                    stored
                        .mixin_types
                        .iter()
                        .map(|m| Scalar::Name(m.clone()))
                        .collect(),
                ),
            );
        }
        Ok(attributes)
    }

    fn children(&self, node: &TreeNode) -> AccessResult<Vec<TreeNode>> {
        let stored = self.stored(node).ok_or_else(|| AccessError::Traversal {
            path: node.path.to_string(),
            reason: "node no longer exists".to_string(),
        })?;
        Ok(stored
            .children
            .iter()
            .filter_map(|name| self.get(&node.path.join(name)))
            .collect())
    }
}

/// 把 Sling JSON 对象转换为节点构建器
fn builder_from_json(path: &NodePath, value: &Value) -> Result<NodeBuilder> {
    let object = value.as_object().ok_or_else(|| {
        ComponentDiffError::TreeFormat(format!("Expected a JSON object for node {path}"))
    })?;

    let primary_type = object
        .get(PRIMARY_TYPE_ATTR)
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PRIMARY_TYPE);
    let mut builder = NodeBuilder::new(primary_type);

    if let Some(mixins) = object.get(MIXIN_TYPES_ATTR).and_then(Value::as_array) {
        for mixin in mixins.iter().filter_map(Value::as_str) {
            builder = builder.mixin(mixin);
        }
    }

    for (key, member) in object {
        if key == PRIMARY_TYPE_ATTR || key == MIXIN_TYPES_ATTR {
            continue;
        }

        // Sling 把二进制属性导出为 ":name": 长度
        if let Some(binary_name) = key.strip_prefix(':') {
            if let Some(length) = member.as_u64() {
                builder = builder.attr(binary_name, Scalar::Binary { length });
            }
            continue;
        }

        match member {
            Value::Object(_) => {
                let child = builder_from_json(&path.join(key), member)?;
                builder = builder.child(key.as_str(), child);
            }
            Value::Array(items) => {
                let mut scalars = Vec::with_capacity(items.len());
                for item in items {
                    match scalar_from_json(item) {
                        Some(scalar) => scalars.push(scalar),
                        None => warn!(
                            "Skipping non-scalar element in multi-valued attribute {} on {}",
                            key, path
                        ),
                    }
                }
                builder = builder.attr(key.as_str(), RawValue::Multi(scalars));
            }
            Value::Null => debug!("Skipping null attribute {} on {}", key, path),
            scalar => {
                if let Some(scalar) = scalar_from_json(scalar) {
                    builder = builder.attr(key.as_str(), scalar);
                }
            }
        }
    }

    Ok(builder)
}

fn scalar_from_json(value: &Value) -> Option<Scalar> {
    match value {
        Value::String(s) => Some(Scalar::String(s.clone())),
        Value::Bool(b) => Some(Scalar::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(Scalar::Long)
            .or_else(|| n.as_f64().map(Scalar::Double)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
