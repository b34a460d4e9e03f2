//! 导出模块
//!
//! 把组件模型和比较结果输出为 JSON 或 Markdown 文档

use crate::comparator::ComparisonResult;
use crate::component::{COMPONENT_GROUP, ComponentModel, DESCRIPTION, RESOURCE_TYPE, TITLE};
use crate::dialog::FieldDescriptor;
use crate::error::{ComponentDiffError, Result};
use crate::tree::NodePath;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

/// 索引文件名
pub const INDEX_FILE_NAME: &str = "index.json";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("file name pattern is valid"));

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
}

/// 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// 输出格式
    pub format: ExportFormat,
    /// JSON 是否缩进输出
    pub pretty: bool,
    /// 批量导出时是否写索引文件
    pub write_index: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            pretty: true,
            write_index: true,
        }
    }
}

impl ExportConfig {
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_index(mut self, write_index: bool) -> Self {
        self.write_index = write_index;
        self
    }
}

/// 索引中的一个组件条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub name: String,
    pub title: Option<String>,
    pub resource_type: Option<String>,
    pub path: String,
    pub group: Option<String>,
    pub file: String,
}

/// 批量导出的索引文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportIndex {
    pub exported_at: DateTime<Utc>,
    pub total_components: usize,
    pub components: Vec<IndexEntry>,
}

/// 批量导出报告
#[derive(Debug, Default)]
pub struct BatchExportReport {
    /// 成功写出的文件
    pub written: Vec<PathBuf>,
    /// 写出失败的组件及原因
    pub failed: Vec<(NodePath, String)>,
    pub index_path: Option<PathBuf>,
}

/// 组件导出器
pub struct ComponentExporter {
    config: ExportConfig,
}

impl Default for ComponentExporter {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl ComponentExporter {
    /// 创建新的导出器
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// 使用默认配置创建导出器
    pub fn with_default_config() -> Self {
        Self::new(ExportConfig::default())
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// 序列化为 JSON 文本
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// 按配置的格式渲染组件模型
    pub fn render_component(&self, model: &ComponentModel) -> Result<String> {
        match self.config.format {
            ExportFormat::Json => self.to_json(model),
            ExportFormat::Markdown => Ok(self.render_markdown(model)),
        }
    }

    /// 按配置的格式渲染比较结果
    pub fn render_comparison(&self, result: &ComparisonResult) -> Result<String> {
        match self.config.format {
            ExportFormat::Json => self.to_json(result),
            ExportFormat::Markdown => Ok(self.render_comparison_markdown(result)),
        }
    }

    /// 写出任意可序列化值
    pub fn export_json<T: Serialize + ?Sized>(&self, value: &T, output: &Path) -> Result<()> {
        let json = self.to_json(value)?;
        write_file(output, &json)?;
        info!("Exported JSON to {}", output.display());
        Ok(())
    }

    /// 批量导出：每个组件一个 JSON 文件，外加索引文件
    ///
    /// 单个组件写出失败只记录在报告中，不会中断其余组件。
    pub fn export_batch(
        &self,
        models: &[ComponentModel],
        output_dir: &Path,
    ) -> Result<BatchExportReport> {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ComponentDiffError::Export(format!(
                "{} is not a directory",
                output_dir.display()
            )));
        }
        fs::create_dir_all(output_dir)?;

        let mut report = BatchExportReport::default();
        let mut used = HashSet::new();
        let mut entries = Vec::with_capacity(models.len());

        for model in models {
            let file = unique_file_name(&Self::file_stem(model), &mut used);
            let target = output_dir.join(&file);
            match self.to_json(model).and_then(|json| write_file(&target, &json)) {
                Ok(()) => {
                    report.written.push(target);
                    entries.push(Self::index_entry(model, file));
                }
                Err(e) => {
                    warn!("Failed to export {}: {}", model.path, e);
                    report.failed.push((model.path.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Exported {} components to {}",
            report.written.len(),
            output_dir.display()
        );

        if self.config.write_index {
            let index = ExportIndex {
                exported_at: Utc::now(),
                total_components: models.len(),
                components: entries,
            };
            let index_path = output_dir.join(INDEX_FILE_NAME);
            self.export_json(&index, &index_path)?;
            report.index_path = Some(index_path);
        }

        Ok(report)
    }

    /// 导出文件名（不含扩展名）
    ///
    /// 优先使用组件名，其次资源类型的最后一段，最后退回到时间戳。
    pub fn file_stem(model: &ComponentModel) -> String {
        if !model.name.is_empty() {
            return sanitize_file_name(&model.name);
        }
        if let Some(last) = model
            .resource_type()
            .and_then(|rt| rt.rsplit('/').next())
            .filter(|s| !s.is_empty())
        {
            return sanitize_file_name(last);
        }
        format!("component_{}", Utc::now().timestamp_millis())
    }

    fn index_entry(model: &ComponentModel, file: String) -> IndexEntry {
        let basic = |key: &str| model.basic(key).map(str::to_string);
        IndexEntry {
            name: model.name.clone(),
            title: basic(TITLE),
            resource_type: basic(RESOURCE_TYPE),
            path: model.path.to_string(),
            group: basic(COMPONENT_GROUP),
            file,
        }
    }

    /// 渲染组件的 Markdown 文档，包含根据对话框字段生成的 Props 接口
    pub fn render_markdown(&self, model: &ComponentModel) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", model.title().unwrap_or("Component")));
        output.push_str(&format!(
            "**Resource Type:** `{}`\n\n",
            model.resource_type().unwrap_or_default()
        ));
        if let Some(description) = model.basic(DESCRIPTION).filter(|d| !d.is_empty()) {
            output.push_str(&format!("**Description:** {description}\n\n"));
        }

        output.push_str("## React Component Suggestions\n\n");

        if !model.dialog.is_none() {
            output.push_str("### Props Interface\n\n");
            output.push_str("```typescript\n");
            output.push_str("interface ComponentProps {\n");
            for field in model.dialog.fields() {
                if let Some(line) = props_line(field) {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
            output.push_str("}\n");
            output.push_str("```\n\n");
        }

        output.push_str("### Suggested Files\n\n");
        output.push_str("- `Component.tsx` - main component\n");
        output.push_str("- `Component.module.css` - styles\n");
        output.push_str("- `Component.types.ts` - TypeScript type definitions\n");
        output.push_str("- `index.ts` - exports\n");

        output
    }

    /// 渲染比较结果的 Markdown 文档
    pub fn render_comparison_markdown(&self, result: &ComparisonResult) -> String {
        let mut output = String::new();
        let summary = &result.summary;

        output.push_str("# Component Comparison\n\n");
        output.push_str(&format!("- **Component 1:** `{}`\n", result.component1));
        output.push_str(&format!("- **Component 2:** `{}`\n", result.component2));
        output.push_str(&format!(
            "- **Identical:** {}\n\n",
            yes_no(summary.components_identical)
        ));

        output.push_str("## Summary\n\n");
        output.push_str("| Category | Identical | Differences |\n");
        output.push_str("|----------|-----------|-------------|\n");
        output.push_str(&format!(
            "| Basic properties | {} | {} |\n",
            yes_no(summary.basic_properties_identical),
            summary.basic_property_differences
        ));
        output.push_str(&format!(
            "| Fields | {} | {} |\n\n",
            yes_no(summary.fields_identical),
            summary.different_fields
        ));

        let basic = &result.basic_properties;
        output.push_str("## Basic Properties\n\n");
        if basic.identical {
            output.push_str("No differences.\n\n");
        } else {
            push_list(&mut output, "Different values", &basic.differences);
            push_list(&mut output, "Only in component 1", &basic.only_in_component1);
            push_list(&mut output, "Only in component 2", &basic.only_in_component2);
        }

        let dialog = &result.dialog;
        output.push_str("## Dialog\n\n");
        output.push_str(&format!(
            "- Type: `{:?}` vs `{:?}`\n",
            dialog.type1, dialog.type2
        ));
        if let (Some(count1), Some(count2)) = (dialog.field_count1, dialog.field_count2) {
            output.push_str(&format!("- Field count: {count1} vs {count2}\n"));
        }
        output.push('\n');

        let fields = &result.fields;
        output.push_str("## Fields\n\n");
        if fields.identical {
            output.push_str("No differences.\n\n");
        } else {
            push_list(&mut output, "Only in component 1", &fields.only_in_component1);
            push_list(&mut output, "Only in component 2", &fields.only_in_component2);
            push_list(&mut output, "Different", &fields.different);
        }

        let deps = &result.dependencies;
        output.push_str("## Dependencies\n\n");
        if deps.super_type_different {
            output.push_str(&format!(
                "- Super type: `{}` vs `{}`\n",
                deps.super_type1, deps.super_type2
            ));
        } else {
            output.push_str("No differences.\n");
        }

        output
    }
}

/// 根据字段类型推断 TypeScript 类型
///
/// 按顺序做子串匹配，第一个命中的规则生效；选择类字段（select、radio）
/// 与其他未匹配的类型一样映射为 `string`。
pub fn infer_script_type(type_tag: &str) -> &'static str {
    if type_tag.contains("numberfield") {
        "number"
    } else if type_tag.contains("checkbox") || type_tag.contains("switch") {
        "boolean"
    } else if type_tag.contains("datepicker") {
        "Date | string"
    } else {
        "string"
    }
}

/// 清理文件名中的不安全字符
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name, "_").into_owned()
}

fn props_line(field: &FieldDescriptor) -> Option<String> {
    let name = field.name.as_deref().filter(|n| !n.is_empty())?;
    let optional = if field.required { "" } else { "?" };
    let comment = field
        .attributes
        .get("fieldLabel")
        .map(|label| format!(" // {label}"))
        .unwrap_or_default();
    Some(format!(
        "  {name}{optional}: {};{comment}",
        infer_script_type(&field.type_tag)
    ))
}

fn unique_file_name(stem: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = format!("{stem}.json");
    let mut counter = 2;
    while !used.insert(candidate.clone()) || candidate == INDEX_FILE_NAME {
        candidate = format!("{stem}_{counter}.json");
        counter += 1;
    }
    candidate
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn push_list(output: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("**{heading}:**\n\n"));
    for item in items {
        output.push_str(&format!("- `{item}`\n"));
    }
    output.push('\n');
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
