//! 内容树访问模块
//!
//! 提供只读树访问接口和内存实现

pub mod common;
pub mod memory;
pub mod reader;

// 重新导出核心类型
pub use common::{
    AccessResult, DEFAULT_PRIMARY_TYPE, MIXIN_TYPES_ATTR, NodePath, PRIMARY_TYPE_ATTR,
    RESOURCE_TYPE_ATTR, RawValue, Scalar, TreeAccessor, TreeNode, XTYPE_ATTR,
};
pub use memory::{MemoryTree, NodeBuilder};
pub use reader::LenientReader;
