//! 命令行接口模块
//!
//! 提供命令行参数解析和用户交互功能

use clap::{Parser, Subcommand, ValueEnum};
use component_diff_core::{
    BatchConfig, ComponentDiffError, ExportConfig, ExportFormat, ExtractionError, ExtractorConfig,
    NodePath,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 命令行错误
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Core(#[from] ComponentDiffError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;

/// component-diff - 组件结构提取与比较工具
///
/// 从 Sling JSON 导出的内容树中提取组件的属性、对话框字段和依赖信息，
/// 并比较两个组件之间的差异。
#[derive(Parser, Debug)]
#[command(name = "component-diff")]
#[command(author = "component-diff contributors")]
#[command(version = "0.1.0")]
#[command(about = "Extract and compare structured component models from a content tree")]
pub struct Cli {
    /// 内容树文件
    #[arg(
        short = 't',
        long = "tree",
        global = true,
        env = "COMPONENT_DIFF_TREE",
        value_name = "FILE",
        help = "Sling JSON document holding the content tree"
    )]
    pub tree: Option<PathBuf>,

    /// 内容树挂载点
    #[arg(
        long = "root",
        global = true,
        default_value = "/",
        value_name = "PATH",
        help = "Repository path the tree document is mounted at"
    )]
    pub root: String,

    /// 最大遍历深度
    #[arg(
        long = "max-depth",
        global = true,
        default_value_t = 64,
        value_name = "DEPTH",
        help = "Maximum dialog traversal depth (1-1024)",
        value_parser = clap::value_parser!(u32).range(1..=1024)
    )]
    pub max_depth: u32,

    /// 保留系统属性
    #[arg(
        long = "include-system-attributes",
        global = true,
        help = "Keep jcr: attributes in raw attribute maps"
    )]
    pub include_system_attributes: bool,

    /// 跳过父类型探测
    #[arg(
        long = "skip-super-type",
        global = true,
        help = "Do not check whether the super type exists"
    )]
    pub skip_super_type: bool,

    /// 详细输出
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        help = "Enable verbose logging output"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// 子命令
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 提取单个组件
    Extract {
        #[arg(help = "Path of the component node", value_name = "PATH")]
        path: String,

        #[arg(long = "simple", help = "Only extract basic attributes and dialog presence")]
        simple: bool,

        #[arg(
            short = 'f',
            long = "format",
            value_enum,
            default_value_t = FormatArg::Json,
            help = "Output format"
        )]
        format: FormatArg,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "FILE",
            help = "Write output to a file instead of stdout"
        )]
        output: Option<PathBuf>,
    },

    /// 批量提取子树中的全部组件
    Batch {
        #[arg(help = "Base path to search for components", value_name = "BASE_PATH")]
        base_path: String,

        #[arg(
            long = "output-dir",
            value_name = "DIR",
            help = "Export one JSON file per component plus index.json"
        )]
        output_dir: Option<PathBuf>,

        #[arg(long = "parallel", help = "Build components on a thread pool")]
        parallel: bool,

        #[arg(
            long = "threads",
            value_name = "N",
            help = "Thread pool size for --parallel (defaults to the CPU count)",
            value_parser = clap::value_parser!(u32).range(1..=256)
        )]
        threads: Option<u32>,
    },

    /// 比较两个组件
    Compare {
        #[arg(help = "Path of the first component", value_name = "PATH1")]
        path1: String,

        #[arg(help = "Path of the second component", value_name = "PATH2")]
        path2: String,

        #[arg(
            long = "other-tree",
            value_name = "FILE",
            help = "Resolve PATH2 in a second tree document"
        )]
        other_tree: Option<PathBuf>,

        #[arg(
            short = 'f',
            long = "format",
            value_enum,
            default_value_t = FormatArg::Json,
            help = "Output format"
        )]
        format: FormatArg,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "FILE",
            help = "Write output to a file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
}

/// 输出格式命令行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JSON 格式输出
    #[value(name = "json")]
    Json,
    /// Markdown 格式输出
    #[value(name = "markdown")]
    Markdown,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Markdown => ExportFormat::Markdown,
        }
    }
}

/// 要执行的操作
#[derive(Debug, Clone)]
pub enum Action {
    Extract {
        path: NodePath,
        simple: bool,
        output: Option<PathBuf>,
    },
    Batch {
        base_path: NodePath,
        output_dir: Option<PathBuf>,
    },
    Compare {
        path1: NodePath,
        path2: NodePath,
        other_tree: Option<PathBuf>,
        output: Option<PathBuf>,
    },
}

/// 应用程序配置信息
#[derive(Debug, Clone)]
pub struct Config {
    /// 内容树文件
    pub tree_file: PathBuf,
    /// 内容树挂载点
    pub root: NodePath,
    /// 是否启用详细输出
    pub verbose: bool,
    /// 提取配置
    pub extractor: ExtractorConfig,
    /// 导出配置
    pub export: ExportConfig,
    /// 批量提取配置
    pub batch: BatchConfig,
    pub action: Action,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let extractor = ExtractorConfig::default()
            .with_max_depth(cli.max_depth as usize)
            .with_system_attributes(cli.include_system_attributes)
            .with_super_type_resolution(!cli.skip_super_type);

        let mut export = ExportConfig::default();
        let mut batch = BatchConfig::default();

        let action = match cli.command {
            Command::Extract {
                path,
                simple,
                format,
                output,
            } => {
                export = export.with_format(format.into());
                Action::Extract {
                    path: NodePath::new(&path),
                    simple,
                    output,
                }
            }
            Command::Batch {
                base_path,
                output_dir,
                parallel,
                threads,
            } => {
                batch = batch.with_parallel(parallel);
                if let Some(threads) = threads {
                    batch = batch.with_thread_pool_size(threads as usize);
                }
                Action::Batch {
                    base_path: NodePath::new(&base_path),
                    output_dir,
                }
            }
            Command::Compare {
                path1,
                path2,
                other_tree,
                format,
                output,
            } => {
                export = export.with_format(format.into());
                Action::Compare {
                    path1: NodePath::new(&path1),
                    path2: NodePath::new(&path2),
                    other_tree,
                    output,
                }
            }
        };

        Config {
            tree_file: cli.tree.unwrap_or_default(),
            root: NodePath::new(&cli.root),
            verbose: cli.verbose,
            extractor,
            export,
            batch,
            action,
        }
    }
}

impl Cli {
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// 验证参数的有效性
    pub fn validate(&self) -> CliResult<()> {
        let tree = self.tree.as_ref().ok_or_else(|| {
            CliError::InvalidArgument(
                "A tree document is required (--tree FILE or COMPONENT_DIFF_TREE)".to_string(),
            )
        })?;
        ensure_file(tree)?;

        if !self.root.starts_with('/') {
            return Err(CliError::InvalidArgument(format!(
                "Root must be an absolute path: {}",
                self.root
            )));
        }

        match &self.command {
            Command::Extract {
                path,
                simple,
                format,
                output,
            } => {
                ensure_absolute(path)?;
                if *simple && *format == FormatArg::Markdown {
                    return Err(CliError::InvalidArgument(
                        "--simple output is only available as JSON".to_string(),
                    ));
                }
                prepare_output(output.as_deref())?;
            }
            Command::Batch {
                base_path,
                output_dir,
                ..
            } => {
                ensure_absolute(base_path)?;
                if let Some(dir) = output_dir {
                    if dir.exists() && !dir.is_dir() {
                        return Err(CliError::InvalidArgument(format!(
                            "Output directory is a file: {}",
                            dir.display()
                        )));
                    }
                }
            }
            Command::Compare {
                path1,
                path2,
                other_tree,
                output,
                ..
            } => {
                ensure_absolute(path1)?;
                ensure_absolute(path2)?;
                if let Some(other) = other_tree {
                    ensure_file(other)?;
                }
                prepare_output(output.as_deref())?;
            }
        }

        Ok(())
    }
}

fn ensure_absolute(path: &str) -> CliResult<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "Component path must be absolute: {path}"
        )))
    }
}

fn ensure_file(path: &Path) -> CliResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Tree document does not exist: {}", path.display()),
        )))
    }
}

/// 输出文件的父目录不存在时创建
fn prepare_output(output: Option<&Path>) -> CliResult<()> {
    if let Some(parent) = output.and_then(|o| o.parent()) {
        // 只有当父目录不是空路径时才检查和创建
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create output directory {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }
    }
    Ok(())
}
