//! 测试数据集模块
//!
//! 提供各种组件结构的测试树

#![allow(dead_code)]

use component_diff_core::{MemoryTree, NodeBuilder, NodePath};

pub const FORM: &str = "granite/ui/components/coral/foundation/form/";

/// 测试数据集结构
pub struct TestDataSet {
    pub tree: MemoryTree,
    pub components: Vec<TestComponent>,
}

/// 测试组件信息
pub struct TestComponent {
    pub path: NodePath,
    pub description: String,
}

impl TestDataSet {
    /// 创建覆盖各种组件结构的测试数据集
    pub fn create_comprehensive_dataset() -> Self {
        let mut tree = MemoryTree::new();
        let mut components = Vec::new();
        let mut add = |tree: &mut MemoryTree, path: &str, description: &str, node: NodeBuilder| {
            tree.mount(path, node);
            components.push(TestComponent {
                path: NodePath::new(path),
                description: description.to_string(),
            });
        };

        // 1. 没有对话框的最简组件
        add(
            &mut tree,
            "/apps/site/components/plain",
            "basic attributes only",
            NodeBuilder::new("cq:Component")
                .attr("sling:resourceType", "x/y")
                .attr("jcr:title", "Hello"),
        );

        // 2. 标题不同、字段相同的一对组件
        add(
            &mut tree,
            "/apps/site/components/hello",
            "title Hello with heading field",
            teaser("Hello", vec![("heading", field("textfield", "heading"))]),
        );
        add(
            &mut tree,
            "/apps/site/components/world",
            "title World with heading field",
            teaser("World", vec![("heading", field("textfield", "heading"))]),
        );

        // 3. 字段集合不同的组件
        add(
            &mut tree,
            "/apps/site/components/subheading",
            "title Hello with subheading field",
            teaser("Hello", vec![("subheading", field("textfield", "subheading"))]),
        );

        // 4. 带三个选项的选择字段
        add(
            &mut tree,
            "/apps/site/components/choice",
            "select field with three options",
            teaser(
                "Choice",
                vec![(
                    "size",
                    field("select", "./size").child(
                        "items",
                        NodeBuilder::unstructured()
                            .child("s", option("Small", "s"))
                            .child("m", option("Medium", "m"))
                            .child("l", option("Large", "l")),
                    ),
                )],
            ),
        );

        // 5. 继承核心组件并引用客户端库
        add(
            &mut tree,
            "/apps/site/components/title",
            "super type with client libraries",
            NodeBuilder::new("cq:Component")
                .attr("jcr:title", "Title")
                .attr("sling:resourceSuperType", "core/wcm/components/title/v2/title")
                .child(
                    "clientlibs",
                    NodeBuilder::new("cq:ClientLibraryFolder")
                        .attr_multi("categories", ["site.title"]),
                ),
        );

        tree.mount(
            "/libs/core/wcm/components/title/v2/title",
            NodeBuilder::new("cq:Component").attr("jcr:title", "Core Title"),
        );
        tree.mount("/apps/site/templates", NodeBuilder::new("sling:Folder"));

        Self { tree, components }
    }

    pub fn path(&self, name: &str) -> NodePath {
        NodePath::new(&format!("/apps/site/components/{name}"))
    }
}

/// 表单字段节点
pub fn field(suffix: &str, name: &str) -> NodeBuilder {
    NodeBuilder::unstructured()
        .attr("sling:resourceType", format!("{FORM}{suffix}"))
        .attr("name", name)
}

/// 选项节点
pub fn option(text: &str, value: &str) -> NodeBuilder {
    NodeBuilder::unstructured().attr("text", text).attr("value", value)
}

/// 带触摸对话框的组件
pub fn teaser(title: &str, fields: Vec<(&str, NodeBuilder)>) -> NodeBuilder {
    let items = fields
        .into_iter()
        .fold(NodeBuilder::unstructured(), |items, (name, f)| items.child(name, f));
    NodeBuilder::new("cq:Component")
        .attr("sling:resourceType", "site/components/teaser")
        .attr("jcr:title", title)
        .child(
            "cq:dialog",
            NodeBuilder::new("nt:unstructured")
                .attr("sling:resourceType", "cq/gui/components/authoring/dialog")
                .child(
                    "content",
                    NodeBuilder::unstructured().child(
                        "items",
                        NodeBuilder::unstructured().child(
                            "column",
                            NodeBuilder::unstructured().child("items", items),
                        ),
                    ),
                ),
        )
}

/// Sling JSON 形式的组件树
pub const SLING_JSON_TREE: &str = r#"{
    "jcr:primaryType": "sling:Folder",
    "teaser": {
        "jcr:primaryType": "cq:Component",
        "jcr:title": "Teaser",
        "componentGroup": "Site",
        "cq:tags": ["site:a", "site:b"],
        "teaser.html": { "jcr:primaryType": "nt:file", ":jcr:data": 120 },
        "cq:dialog": {
            "jcr:primaryType": "nt:unstructured",
            "sling:resourceType": "cq/gui/components/authoring/dialog",
            "content": {
                "jcr:primaryType": "nt:unstructured",
                "items": {
                    "jcr:primaryType": "nt:unstructured",
                    "title": {
                        "jcr:primaryType": "nt:unstructured",
                        "sling:resourceType": "granite/ui/components/coral/foundation/form/textfield",
                        "name": "./jcr:title",
                        "fieldLabel": "Title"
                    },
                    "link": {
                        "jcr:primaryType": "nt:unstructured",
                        "sling:resourceType": "granite/ui/components/coral/foundation/form/pathfield",
                        "name": "./link",
                        "required": true
                    }
                }
            }
        }
    },
    "text": {
        "jcr:primaryType": "cq:Component",
        "jcr:title": "Text",
        "sling:resourceSuperType": "core/wcm/components/text/v2/text"
    }
}"#;
