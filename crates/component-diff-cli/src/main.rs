//! component-diff - 组件结构提取与比较工具
//!
//! 从 Sling JSON 导出的内容树中提取组件模型，支持单个提取、
//! 批量提取和两个组件之间的结构化比较。

mod cli;

use cli::{Action, Cli, CliResult, Config};
use component_diff_core::{
    BatchExtractor, ComponentExporter, ComponentModelBuilder, DiffEngine, MemoryTree, NodePath,
};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // 解析命令行参数
    let cli = Cli::parse_args();

    // 初始化日志记录
    init_logging(cli.verbose);

    // 验证参数
    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let config: Config = cli.into();

    if config.verbose {
        info!("Starting component-diff");
        debug!(
            "Configuration: tree={}, root={}, action={:?}",
            config.tree_file.display(),
            config.root,
            config.action
        );
    }

    // 运行主要逻辑
    if let Err(e) = run(config) {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

/// 初始化日志：优先使用 `RUST_LOG`，否则按 `--verbose` 选择默认级别
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 主要应用逻辑
fn run(config: Config) -> CliResult<()> {
    config.extractor.validate()?;
    let tree = load_tree(&config.tree_file, &config.root)?;
    let builder = ComponentModelBuilder::with_config(&tree, config.extractor.clone());
    let exporter = ComponentExporter::new(config.export.clone());

    match &config.action {
        Action::Extract {
            path,
            simple,
            output,
        } => {
            let content = if *simple {
                exporter.to_json(&builder.summarize(path)?)?
            } else {
                exporter.render_component(&builder.build(path)?)?
            };
            emit(&content, output.as_deref())
        }
        Action::Batch {
            base_path,
            output_dir,
        } => {
            let extractor = BatchExtractor::new(&tree, config.extractor.clone())
                .with_batch_config(config.batch.clone());
            let result = extractor.extract_all(base_path)?;

            for failure in result.failures() {
                error!("Failed to extract {}: {}", failure.path(), failure);
            }

            if let Some(dir) = output_dir {
                let models: Vec<_> = result.models().cloned().collect();
                let report = exporter.export_batch(&models, dir)?;
                info!(
                    "Wrote {} component files to {}",
                    report.written.len(),
                    dir.display()
                );
            }

            println!(
                "Extracted {} components: {} succeeded, {} failed",
                result.stats.total, result.stats.succeeded, result.stats.failed
            );
            Ok(())
        }
        Action::Compare {
            path1,
            path2,
            other_tree,
            output,
        } => {
            let left = builder.build(path1)?;
            let right = match other_tree {
                Some(file) => {
                    let other = load_tree(file, &config.root)?;
                    ComponentModelBuilder::with_config(&other, config.extractor.clone())
                        .build(path2)?
                }
                None => builder.build(path2)?,
            };

            let result = DiffEngine::compare(&left, &right);
            info!(
                "Compared {} with {}: identical={}",
                path1, path2, result.summary.components_identical
            );
            emit(&exporter.render_comparison(&result)?, output.as_deref())
        }
    }
}

/// 读取内容树文档
fn load_tree(file: &Path, root: &NodePath) -> CliResult<MemoryTree> {
    let json = std::fs::read_to_string(file)?;
    let tree = MemoryTree::from_json_str(root.clone(), &json)?;
    debug!("Loaded {} nodes from {}", tree.len(), file.display());
    Ok(tree)
}

/// 输出到文件或标准输出
fn emit(content: &str, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            info!("Output written to {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
