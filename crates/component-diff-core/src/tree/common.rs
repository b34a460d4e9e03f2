//! 树访问接口和共享数据结构
//!
//! 定义核心逻辑消费的只读树访问能力，以及节点路径、属性值等通用类型

use crate::error::AccessError;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 节点资源类型属性
pub const RESOURCE_TYPE_ATTR: &str = "sling:resourceType";
/// 经典对话框控件的类型属性
pub const XTYPE_ATTR: &str = "xtype";
/// 节点主类型属性
pub const PRIMARY_TYPE_ATTR: &str = "jcr:primaryType";
/// 节点 mixin 类型属性
pub const MIXIN_TYPES_ATTR: &str = "jcr:mixinTypes";
/// 未声明主类型时使用的默认类型
pub const DEFAULT_PRIMARY_TYPE: &str = "nt:unstructured";

/// 树访问操作的 Result 类型别名
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// 以 `/` 分隔的规范化节点路径
///
/// 规范形式总是以 `/` 开头，不含空段，也不以 `/` 结尾（根路径 `/` 除外）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    /// 解析并规范化路径字符串
    pub fn new(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        Self(format!("/{}", segments.join("/")))
    }

    /// 根路径
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// 按顺序返回路径段
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// 路径深度（根为 0）
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// 最后一个路径段，根路径返回空字符串
    pub fn name(&self) -> &str {
        self.segments().last().unwrap_or("")
    }

    /// 父路径，根路径没有父路径
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        let segments: Vec<&str> = self.segments().collect();
        Some(Self::new(&segments[..segments.len() - 1].join("/")))
    }

    /// 拼接相对路径（可包含多个段）
    pub fn join(&self, relative: &str) -> NodePath {
        Self::new(&format!("{}/{}", self.0, relative))
    }

    /// 判断当前路径是否位于 `ancestor` 之下（不含自身）
    pub fn is_descendant_of(&self, ancestor: &NodePath) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(&ancestor.0)
            && self.0.as_bytes()[ancestor.0.len()] == b'/'
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodePath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NodePath {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// 单个属性值
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Name(String),
    Path(String),
    Date(String),
    Binary { length: u64 },
    Reference(String),
}

impl Scalar {
    /// 文本形式；二进制、日期和引用类型没有文本形式
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::String(s) | Scalar::Name(s) | Scalar::Path(s) => Some(s.clone()),
            Scalar::Long(n) => Some(n.to_string()),
            Scalar::Double(d) => Some(d.to_string()),
            Scalar::Boolean(b) => Some(b.to_string()),
            Scalar::Date(_) | Scalar::Binary { .. } | Scalar::Reference(_) => None,
        }
    }

    /// 值类型名称
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "String",
            Scalar::Long(_) => "Long",
            Scalar::Double(_) => "Double",
            Scalar::Boolean(_) => "Boolean",
            Scalar::Name(_) => "Name",
            Scalar::Path(_) => "Path",
            Scalar::Date(_) => "Date",
            Scalar::Binary { .. } => "Binary",
            Scalar::Reference(_) => "Reference",
        }
    }
}

/// 原始属性值：单值或有序多值
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Single(Scalar),
    Multi(Vec<Scalar>),
}

impl RawValue {
    /// 构造多值字符串属性
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawValue::Multi(
            values
                .into_iter()
                .map(|v| Scalar::String(v.into()))
                .collect(),
        )
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, RawValue::Multi(_))
    }

    /// 按原始顺序返回所有标量
    pub fn values(&self) -> Vec<&Scalar> {
        match self {
            RawValue::Single(scalar) => vec![scalar],
            RawValue::Multi(values) => values.iter().collect(),
        }
    }

    /// 所有值的文本形式，非文本值被跳过
    pub fn texts(&self) -> Vec<String> {
        self.values().into_iter().filter_map(Scalar::as_text).collect()
    }
}

impl From<Scalar> for RawValue {
    fn from(scalar: Scalar) -> Self {
        RawValue::Single(scalar)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Single(Scalar::String(value.to_string()))
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Single(Scalar::String(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Single(Scalar::Long(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Single(Scalar::Double(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Single(Scalar::Boolean(value))
    }
}

/// 树节点句柄
///
/// 只携带路径和类型信息；属性和子节点通过 [`TreeAccessor`] 读取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: NodePath,
    pub primary_type: String,
    pub mixin_types: Vec<String>,
}

impl TreeNode {
    pub fn new(path: NodePath, primary_type: impl Into<String>) -> Self {
        Self {
            path,
            primary_type: primary_type.into(),
            mixin_types: Vec::new(),
        }
    }

    /// 节点名称
    pub fn name(&self) -> &str {
        self.path.name()
    }
}

/// 只读树访问接口
///
/// 核心逻辑只通过这个接口读取内容树。属性和子节点读取可能失败，
/// 失败以 [`AccessError`] 返回，由调用方决定如何恢复。
pub trait TreeAccessor: Send + Sync {
    /// 路径是否存在
    fn exists(&self, path: &NodePath) -> bool;

    /// 按路径获取节点
    fn get(&self, path: &NodePath) -> Option<TreeNode>;

    /// 读取单个属性
    fn attribute(&self, node: &TreeNode, name: &str) -> AccessResult<Option<RawValue>>;

    /// 读取节点的全部属性
    fn all_attributes(&self, node: &TreeNode) -> AccessResult<BTreeMap<String, RawValue>>;

    /// 按原始顺序列出直接子节点
    fn children(&self, node: &TreeNode) -> AccessResult<Vec<TreeNode>>;

    /// 获取指定名称的直接子节点
    fn child(&self, node: &TreeNode, name: &str) -> AccessResult<Option<TreeNode>> {
        Ok(self.get(&node.path.join(name)))
    }

    /// 节点是否具有指定的主类型或 mixin 类型
    fn has_type(&self, node: &TreeNode, type_marker: &str) -> bool {
        node.primary_type == type_marker || node.mixin_types.iter().any(|m| m == type_marker)
    }

    /// 节点的类型标签
    ///
    /// 依次使用 `sling:resourceType`、经典控件的 `xtype`，都没有时退回到主类型。
    fn type_tag(&self, node: &TreeNode) -> String {
        [RESOURCE_TYPE_ATTR, XTYPE_ATTR]
            .into_iter()
            .find_map(|name| match self.attribute(node, name) {
                Ok(Some(value)) => value.texts().into_iter().next(),
                _ => None,
            })
            .unwrap_or_else(|| node.primary_type.clone())
    }
}

impl<T: TreeAccessor + ?Sized> TreeAccessor for &T {
    fn exists(&self, path: &NodePath) -> bool {
        (**self).exists(path)
    }

    fn get(&self, path: &NodePath) -> Option<TreeNode> {
        (**self).get(path)
    }

    fn attribute(&self, node: &TreeNode, name: &str) -> AccessResult<Option<RawValue>> {
        (**self).attribute(node, name)
    }

    fn all_attributes(&self, node: &TreeNode) -> AccessResult<BTreeMap<String, RawValue>> {
        (**self).all_attributes(node)
    }

    fn children(&self, node: &TreeNode) -> AccessResult<Vec<TreeNode>> {
        (**self).children(node)
    }

    fn child(&self, node: &TreeNode, name: &str) -> AccessResult<Option<TreeNode>> {
        (**self).child(node, name)
    }

    fn has_type(&self, node: &TreeNode, type_marker: &str) -> bool {
        (**self).has_type(node, type_marker)
    }

    fn type_tag(&self, node: &TreeNode) -> String {
        (**self).type_tag(node)
    }
}
