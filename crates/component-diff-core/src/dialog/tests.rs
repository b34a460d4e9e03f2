//! 对话框分析测试

use super::*;
use crate::error::AccessError;
use crate::tree::{AccessResult, MemoryTree, NodeBuilder, RawValue};
use pretty_assertions::assert_eq;

const FORM: &str = "granite/ui/components/coral/foundation/form/";
const DIALOG_PATH: &str = "/apps/site/components/teaser/cq:dialog";

fn field(kind: &str) -> NodeBuilder {
    NodeBuilder::unstructured().attr("sling:resourceType", format!("{FORM}{kind}"))
}

fn container(resource_type: &str) -> NodeBuilder {
    NodeBuilder::unstructured().attr(
        "sling:resourceType",
        format!("granite/ui/components/coral/foundation/{resource_type}"),
    )
}

/// 创建测试用的触摸对话框
fn create_test_dialog() -> MemoryTree {
    let options = NodeBuilder::unstructured()
        .child(
            "small",
            NodeBuilder::unstructured()
                .attr("text", "Small")
                .attr("value", "s"),
        )
        .child(
            "medium",
            NodeBuilder::unstructured()
                .attr("text", "Medium")
                .attr("value", "m")
                .attr("jcr:title", "Medium size"),
        )
        .child(
            "large",
            NodeBuilder::unstructured()
                .attr("text", "Large")
                .attr("value", "l"),
        );

    let fields = NodeBuilder::unstructured()
        .child(
            "heading",
            field("textfield")
                .attr("name", "./heading")
                .attr("fieldLabel", "Heading")
                .attr("value", "Hello")
                .attr("required", true)
                .child(
                    "validation",
                    NodeBuilder::unstructured()
                        .attr("maxlength", 80_i64)
                        .attr("pattern", "^[A-Z].*"),
                ),
        )
        .child(
            "size",
            field("select")
                .attr("name", "./size")
                .attr("jcr:title", "Size")
                .child("items", options),
        )
        .child("note", field("hidden"))
        .child("spacer", NodeBuilder::unstructured().attr("sling:resourceType", "custom/spacer"));

    let dialog = NodeBuilder::unstructured()
        .attr("sling:resourceType", "cq/gui/components/authoring/dialog")
        .attr("jcr:title", "Teaser")
        .child(
            "content",
            container("container").child(
                "items",
                NodeBuilder::unstructured().child(
                    "tabs",
                    container("tabs").child(
                        "items",
                        NodeBuilder::unstructured().child(
                            "properties",
                            container("container")
                                .attr("jcr:title", "Properties")
                                .child("items", fields),
                        ),
                    ),
                ),
            ),
        );

    let mut tree = MemoryTree::new();
    tree.mount(DIALOG_PATH, dialog);
    tree
}

fn dialog_node(tree: &MemoryTree) -> TreeNode {
    tree.get(&NodePath::new(DIALOG_PATH)).unwrap()
}

#[test]
fn test_extract_fields_in_traversal_order() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);

    let fields = extractor.extract(&dialog_node(&tree));
    let names: Vec<&str> = fields.iter().map(|f| f.node_name.as_str()).collect();
    assert_eq!(names, vec!["heading", "size", "note"]);
}

#[test]
fn test_field_descriptor_contents() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let fields = extractor.extract(&dialog_node(&tree));

    let heading = &fields[0];
    assert_eq!(heading.name.as_deref(), Some("./heading"));
    assert_eq!(heading.label.as_deref(), Some("Heading"));
    assert_eq!(heading.type_tag, format!("{FORM}textfield"));
    assert_eq!(heading.kind, FieldKind::Text);
    assert_eq!(heading.default_value.as_deref(), Some("Hello"));
    assert!(heading.required);
    assert_eq!(heading.options, None);
    assert_eq!(
        heading.validation.get("maxlength").map(String::as_str),
        Some("80")
    );
    assert_eq!(
        heading.validation.get("pattern").map(String::as_str),
        Some("^[A-Z].*")
    );
    assert_eq!(
        heading.attributes.get("sling:resourceType").map(String::as_str),
        Some(format!("{FORM}textfield").as_str())
    );
    assert!(!heading.attributes.contains_key("jcr:primaryType"));
}

#[test]
fn test_system_attributes_included_when_configured() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default().with_system_attributes(true);
    let extractor = FieldModelExtractor::new(&tree, &config);
    let fields = extractor.extract(&dialog_node(&tree));

    let heading = &fields[0];
    assert_eq!(
        heading.attributes.get("jcr:primaryType").map(String::as_str),
        Some("nt:unstructured")
    );
    let size = &fields[1];
    assert_eq!(size.attributes.get("jcr:title").map(String::as_str), Some("Size"));
    // 字段识别不受系统属性影响
    assert_eq!(fields.len(), 3);
}

#[test]
fn test_label_falls_back_to_title_and_required_defaults_false() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let fields = extractor.extract(&dialog_node(&tree));

    let size = &fields[1];
    assert_eq!(size.label.as_deref(), Some("Size"));
    assert!(!size.required);

    let note = &fields[2];
    assert_eq!(note.name, None);
    assert_eq!(note.label, None);
    assert_eq!(note.kind, FieldKind::Hidden);
}

#[test]
fn test_choice_options_in_source_order() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let fields = extractor.extract(&dialog_node(&tree));

    let options = fields[1].options.as_ref().unwrap();
    assert_eq!(
        options,
        &vec![
            FieldOption {
                text: Some("Small".into()),
                value: Some("s".into()),
                title: None,
            },
            FieldOption {
                text: Some("Medium".into()),
                value: Some("m".into()),
                title: Some("Medium size".into()),
            },
            FieldOption {
                text: Some("Large".into()),
                value: Some("l".into()),
                title: None,
            },
        ]
    );
}

#[test]
fn test_items_child_of_non_choice_field_is_not_options() {
    let mut tree = MemoryTree::new();
    tree.mount(
        "/dialog",
        NodeBuilder::unstructured()
            .child(
                "title",
                field("textfield").attr("name", "./title").child(
                    "items",
                    NodeBuilder::unstructured()
                        .child("hint", NodeBuilder::unstructured().attr("text", "Hint")),
                ),
            )
            .child(
                "layout",
                field("radiogroup").attr("name", "./layout").child(
                    "items",
                    NodeBuilder::unstructured().child(
                        "grid",
                        NodeBuilder::unstructured()
                            .attr("text", "Grid")
                            .attr("value", "grid"),
                    ),
                ),
            ),
    );
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);

    let fields = extractor.extract(&tree.get(&NodePath::new("/dialog")).unwrap());
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].kind, FieldKind::Text);
    assert_eq!(fields[0].options, None);
    assert_eq!(fields[1].kind, FieldKind::Radio);
    let layout = fields[1].options.as_ref().unwrap();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].value.as_deref(), Some("grid"));
}

#[test]
fn test_extraction_is_stable() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let root = dialog_node(&tree);

    assert_eq!(extractor.extract(&root), extractor.extract(&root));
}

#[test]
fn test_fields_nested_under_fields_are_found() {
    let mut tree = MemoryTree::new();
    tree.mount(
        "/dialog",
        NodeBuilder::unstructured().child(
            "outer",
            field("checkbox")
                .attr("name", "./enabled")
                .child(
                    "extras",
                    NodeBuilder::unstructured().child(
                        "inner",
                        field("numberfield").attr("name", "./count"),
                    ),
                ),
        ),
    );
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let root = tree.get(&NodePath::new("/dialog")).unwrap();

    let names: Vec<Option<String>> = extractor
        .extract(&root)
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(
        names,
        vec![Some("./enabled".to_string()), Some("./count".to_string())]
    );
}

#[test]
fn test_root_field_is_extracted() {
    let mut tree = MemoryTree::new();
    tree.mount("/single", field("datepicker").attr("name", "./date"));
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);

    let fields = extractor.extract(&tree.get(&NodePath::new("/single")).unwrap());
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].kind, FieldKind::Date);
}

#[test]
fn test_max_depth_guard() {
    let tree = create_test_dialog();
    // 字段位于对话框下第 7 层
    let shallow = ExtractorConfig::default().with_max_depth(7);
    let extractor = FieldModelExtractor::new(&tree, &shallow);
    assert!(extractor.extract(&dialog_node(&tree)).is_empty());

    let deep_enough = ExtractorConfig::default().with_max_depth(8);
    let extractor = FieldModelExtractor::new(&tree, &deep_enough);
    assert_eq!(extractor.extract(&dialog_node(&tree)).len(), 3);
}

#[test]
fn test_container_structure() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);

    let layout = extractor.analyze_container_structure(&dialog_node(&tree));
    assert_eq!(layout.name, "cq:dialog");
    assert!(!layout.is_field);
    assert_eq!(layout.attributes.get("jcr:title"), None);

    let content = &layout.children[0];
    assert_eq!(content.name, "content");
    let tabs = &content.children[0].children[0];
    assert_eq!(tabs.type_tag, "granite/ui/components/coral/foundation/tabs");
    let properties = &tabs.children[0].children[0];
    assert_eq!(properties.name, "properties");

    // 字段作为叶子出现，无法识别的叶子被跳过
    let items = &properties.children[0];
    let leaves: Vec<(&str, bool)> = items
        .children
        .iter()
        .map(|c| (c.name.as_str(), c.is_field))
        .collect();
    assert_eq!(leaves, vec![("heading", true), ("size", true), ("note", true)]);
    assert!(items.children.iter().all(|c| c.children.is_empty()));
    assert_eq!(layout.node_count(), 10);
}

#[test]
fn test_analyze_dialog_variants() {
    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let root = dialog_node(&tree);

    let touch = extractor.analyze_dialog(&root, DialogKind::Touch);
    assert_eq!(touch.kind(), DialogKind::Touch);
    assert_eq!(touch.fields().len(), 3);
    let content = touch.content().unwrap();
    assert_eq!(
        content.attributes.get("sling:resourceType").map(String::as_str),
        Some("cq/gui/components/authoring/dialog")
    );

    let classic = extractor.analyze_dialog(&root, DialogKind::Classic);
    assert_eq!(classic.kind(), DialogKind::Classic);
    assert_eq!(classic.fields(), touch.fields());

    let none = extractor.analyze_dialog(&root, DialogKind::None);
    assert!(none.is_none());
    assert!(none.fields().is_empty());
}

#[test]
fn test_dialog_model_serialization() {
    let json = serde_json::to_value(DialogModel::None).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "none" }));

    let tree = create_test_dialog();
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let touch = extractor.analyze_dialog(&dialog_node(&tree), DialogKind::Touch);
    let json = serde_json::to_value(&touch).unwrap();
    assert_eq!(json["type"], "touch");
    assert_eq!(json["fields"][0]["name"], "./heading");
    assert_eq!(json["fields"][0]["kind"], "text");
    assert!(json["fields"][0].get("options").is_none());
    assert_eq!(json["fields"][1]["options"][2]["value"], "l");
}

#[test]
fn test_classic_widgets_classified_by_xtype() {
    let path = "/apps/site/components/legacy/dialog";
    let mut tree = MemoryTree::new();
    tree.mount(
        path,
        NodeBuilder::new("cq:Dialog").attr("xtype", "dialog").child(
            "items",
            NodeBuilder::new("cq:WidgetCollection").child(
                "title",
                NodeBuilder::new("cq:Widget")
                    .attr("xtype", "textfield")
                    .attr("name", "./title")
                    .attr("fieldLabel", "Title"),
            ),
        ),
    );
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let dialog = tree.get(&NodePath::new(path)).unwrap();

    let model = extractor.analyze_dialog(&dialog, DialogKind::Classic);
    assert_eq!(model.kind(), DialogKind::Classic);
    assert_eq!(model.fields().len(), 1);
    let title = &model.fields()[0];
    assert_eq!(title.type_tag, "textfield");
    assert_eq!(title.kind, FieldKind::Text);
    assert_eq!(title.name.as_deref(), Some("./title"));
    assert_eq!(title.label.as_deref(), Some("Title"));
}

/// 在指定节点上模拟读取失败的访问器
struct FlakyTree {
    inner: MemoryTree,
    broken: NodePath,
}

impl TreeAccessor for FlakyTree {
    fn exists(&self, path: &NodePath) -> bool {
        self.inner.exists(path)
    }

    fn get(&self, path: &NodePath) -> Option<TreeNode> {
        self.inner.get(path)
    }

    fn attribute(&self, node: &TreeNode, name: &str) -> AccessResult<Option<RawValue>> {
        if node.path == self.broken && name == "name" {
            return Err(AccessError::AttributeRead {
                path: node.path.to_string(),
                name: name.to_string(),
                reason: "simulated".to_string(),
            });
        }
        self.inner.attribute(node, name)
    }

    fn all_attributes(
        &self,
        node: &TreeNode,
    ) -> AccessResult<std::collections::BTreeMap<String, RawValue>> {
        self.inner.all_attributes(node)
    }

    fn children(&self, node: &TreeNode) -> AccessResult<Vec<TreeNode>> {
        if node.path == self.broken {
            return Err(AccessError::Traversal {
                path: node.path.to_string(),
                reason: "simulated".to_string(),
            });
        }
        self.inner.children(node)
    }
}

#[test]
fn test_read_failures_are_recovered() {
    let heading = NodePath::new(DIALOG_PATH)
        .join("content/items/tabs/items/properties/items/heading");
    let tree = FlakyTree {
        inner: create_test_dialog(),
        broken: heading,
    };
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let root = tree.get(&NodePath::new(DIALOG_PATH)).unwrap();

    let fields = extractor.extract(&root);
    assert_eq!(fields.len(), 3);
    // 名称读取失败视为不存在，其他属性照常读取
    assert_eq!(fields[0].name, None);
    assert_eq!(fields[0].label.as_deref(), Some("Heading"));
    assert_eq!(fields[1].name.as_deref(), Some("./size"));
}

#[test]
fn test_traversal_failure_treated_as_empty_subtree() {
    let items = NodePath::new(DIALOG_PATH).join("content/items/tabs/items/properties/items");
    let tree = FlakyTree {
        inner: create_test_dialog(),
        broken: items,
    };
    let config = ExtractorConfig::default();
    let extractor = FieldModelExtractor::new(&tree, &config);
    let root = tree.get(&NodePath::new(DIALOG_PATH)).unwrap();

    assert!(extractor.extract(&root).is_empty());
    let layout = extractor.analyze_container_structure(&root);
    assert!(layout.node_count() < 10);
}
