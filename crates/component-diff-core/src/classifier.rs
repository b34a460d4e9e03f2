//! 字段分类模块
//!
//! 根据类型标签判断节点是输入字段定义还是结构容器。
//! 这是“是否为叶子输入控件”的唯一判断来源。

use serde::{Deserialize, Serialize};

/// 字段的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    MultilineText,
    Number,
    Checkbox,
    Radio,
    Choice,
    PathReference,
    Date,
    Toggle,
    Color,
    Range,
    Hidden,
    Autocomplete,
}

impl FieldKind {
    /// 是否从 `items` 子节点读取候选项
    pub fn has_options(self) -> bool {
        matches!(
            self,
            FieldKind::Choice | FieldKind::Radio | FieldKind::Checkbox | FieldKind::Autocomplete
        )
    }
}

/// 节点分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// 输入字段定义
    Field(FieldKind),
    /// 含子节点的结构容器
    Container,
    /// 无法识别且没有子节点
    Unknown,
}

/// 注册表中的一条字段类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeEntry {
    /// 类型标签的末段，如 `textfield`
    pub suffix: String,
    pub kind: FieldKind,
}

/// 字段分类器
///
/// 类型标签通常带有厂商或版本前缀
/// （如 `granite/ui/components/coral/foundation/form/textfield`），
/// 因此按末段或 `/form/<suffix>` 子串匹配。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldClassifier {
    entries: Vec<FieldTypeEntry>,
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldClassifier {
    /// 使用内置字段类型创建分类器
    pub fn new() -> Self {
        let builtin = [
            ("textfield", FieldKind::Text),
            ("textarea", FieldKind::MultilineText),
            ("numberfield", FieldKind::Number),
            ("checkbox", FieldKind::Checkbox),
            ("radio", FieldKind::Radio),
            ("radiogroup", FieldKind::Radio),
            ("select", FieldKind::Choice),
            ("pathfield", FieldKind::PathReference),
            ("pathbrowser", FieldKind::PathReference),
            ("datepicker", FieldKind::Date),
            ("switch", FieldKind::Toggle),
            ("colorfield", FieldKind::Color),
            ("range", FieldKind::Range),
            ("hidden", FieldKind::Hidden),
            ("autocomplete", FieldKind::Autocomplete),
        ];
        Self {
            entries: builtin
                .into_iter()
                .map(|(suffix, kind)| FieldTypeEntry {
                    suffix: suffix.to_string(),
                    kind,
                })
                .collect(),
        }
    }

    /// 不含任何字段类型的分类器
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 注册额外的字段类型；同名后缀会覆盖原有种类
    pub fn register(mut self, suffix: impl Into<String>, kind: FieldKind) -> Self {
        let suffix = suffix.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.suffix == suffix) {
            entry.kind = kind;
        } else {
            self.entries.push(FieldTypeEntry { suffix, kind });
        }
        self
    }

    pub fn entries(&self) -> &[FieldTypeEntry] {
        &self.entries
    }

    /// 查找类型标签对应的字段种类
    pub fn field_kind(&self, type_tag: &str) -> Option<FieldKind> {
        let last_segment = type_tag.rsplit('/').next().unwrap_or(type_tag);

        // 末段精确匹配优先，避免 radio 抢先匹配 radiogroup
        if let Some(entry) = self.entries.iter().find(|e| e.suffix == last_segment) {
            return Some(entry.kind);
        }

        self.entries
            .iter()
            .find(|e| type_tag.contains(&format!("/form/{}", e.suffix)))
            .map(|e| e.kind)
    }

    pub fn is_field(&self, type_tag: &str) -> bool {
        self.field_kind(type_tag).is_some()
    }

    /// 对节点进行分类
    pub fn classify(&self, type_tag: &str, has_children: bool) -> NodeClass {
        match self.field_kind(type_tag) {
            Some(kind) => NodeClass::Field(kind),
            None if has_children => NodeClass::Container,
            None => NodeClass::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = "granite/ui/components/coral/foundation/form/";

    #[test]
    fn test_granite_field_types() {
        let classifier = FieldClassifier::new();
        let cases = [
            ("textfield", FieldKind::Text),
            ("textarea", FieldKind::MultilineText),
            ("numberfield", FieldKind::Number),
            ("checkbox", FieldKind::Checkbox),
            ("radiogroup", FieldKind::Radio),
            ("select", FieldKind::Choice),
            ("pathfield", FieldKind::PathReference),
            ("datepicker", FieldKind::Date),
            ("switch", FieldKind::Toggle),
            ("colorfield", FieldKind::Color),
            ("range", FieldKind::Range),
            ("hidden", FieldKind::Hidden),
        ];
        for (suffix, kind) in cases {
            let tag = format!("{FORM}{suffix}");
            assert_eq!(classifier.classify(&tag, false), NodeClass::Field(kind), "{tag}");
        }
        assert_eq!(
            classifier.field_kind("granite/ui/components/foundation/form/autocomplete"),
            Some(FieldKind::Autocomplete)
        );
    }

    #[test]
    fn test_versioned_and_bare_tags() {
        let classifier = FieldClassifier::new();
        assert!(classifier.is_field("textfield"));
        assert!(classifier.is_field("vendor/ui/form/textfield/v2"));
        assert!(!classifier.is_field("granite/ui/components/coral/foundation/container"));
        assert!(!classifier.is_field("mytextfieldish"));
    }

    #[test]
    fn test_containers_and_unknown() {
        let classifier = FieldClassifier::new();
        let tabs = "granite/ui/components/coral/foundation/tabs";
        assert_eq!(classifier.classify(tabs, true), NodeClass::Container);
        assert_eq!(classifier.classify(tabs, false), NodeClass::Unknown);
        // 字段即使有子节点也仍然是字段
        assert_eq!(
            classifier.classify(&format!("{FORM}select"), true),
            NodeClass::Field(FieldKind::Choice)
        );
    }

    #[test]
    fn test_only_choice_kinds_have_options() {
        let with_options: Vec<FieldKind> = [
            FieldKind::Text,
            FieldKind::Choice,
            FieldKind::Radio,
            FieldKind::Checkbox,
            FieldKind::Autocomplete,
            FieldKind::Hidden,
        ]
        .into_iter()
        .filter(|kind| kind.has_options())
        .collect();
        assert_eq!(
            with_options,
            vec![
                FieldKind::Choice,
                FieldKind::Radio,
                FieldKind::Checkbox,
                FieldKind::Autocomplete
            ]
        );
    }

    #[test]
    fn test_classification_is_pure() {
        let classifier = FieldClassifier::new();
        let tag = format!("{FORM}datepicker");
        let first = classifier.classify(&tag, false);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&tag, false), first);
        }
    }

    #[test]
    fn test_register_custom_type() {
        let classifier = FieldClassifier::empty().register("richtext", FieldKind::MultilineText);
        assert_eq!(
            classifier.field_kind("cq/gui/components/authoring/dialog/richtext"),
            Some(FieldKind::MultilineText)
        );
        assert!(!classifier.is_field(&format!("{FORM}textfield")));

        let overridden = FieldClassifier::new().register("hidden", FieldKind::Text);
        assert_eq!(overridden.field_kind("hidden"), Some(FieldKind::Text));
        assert_eq!(overridden.entries().len(), FieldClassifier::new().entries().len());
    }
}
