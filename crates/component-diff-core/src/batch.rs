//! 批量提取模块
//!
//! 在子树中发现组件节点，并对每个组件独立构建模型

use crate::component::{ComponentModel, ComponentModelBuilder};
use crate::config::ExtractorConfig;
use crate::error::{ComponentDiffError, ExtractionError, Result};
use crate::tree::{LenientReader, NodePath, TreeAccessor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 批量提取配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchConfig {
    /// 是否并行构建
    pub parallel: bool,
    /// 线程池大小
    pub thread_pool_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            thread_pool_size: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = size;
        self
    }
}

/// 单个组件的提取结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub path: NodePath,
    pub outcome: std::result::Result<ComponentModel, ExtractionError>,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// 批量提取统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl BatchStats {
    /// 统计一组结果
    pub fn tally(items: &[BatchItem], elapsed: Duration) -> Self {
        let succeeded = items.iter().filter(|item| item.is_success()).count();
        Self {
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
            elapsed,
        }
    }

    /// 成功率
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}

/// 批量提取结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// 按路径排序的全部结果
    pub items: Vec<BatchItem>,
    pub stats: BatchStats,
}

impl BatchResult {
    /// 成功构建的模型
    pub fn models(&self) -> impl Iterator<Item = &ComponentModel> {
        self.items.iter().filter_map(|item| item.outcome.as_ref().ok())
    }

    /// 失败的条目
    pub fn failures(&self) -> impl Iterator<Item = &ExtractionError> {
        self.items.iter().filter_map(|item| item.outcome.as_ref().err())
    }
}

/// 在 `base` 下发现全部组件节点
///
/// 深度优先，命中组件后不再向下查找。`base` 本身是组件时只返回它自己。
/// 子节点列表读取失败时该处子树视为空。
pub fn discover_components<A: TreeAccessor + ?Sized>(
    accessor: &A,
    base: &NodePath,
    config: &ExtractorConfig,
) -> Vec<NodePath> {
    let Some(root) = accessor.get(base) else {
        warn!("Batch base path not found: {}", base);
        return Vec::new();
    };

    let reader = LenientReader::new(accessor, config.include_system_attributes);
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if accessor.has_type(&node, &config.component_type_marker) {
            found.push(node.path);
            continue;
        }
        for child in reader.children(&node).into_iter().rev() {
            stack.push(child);
        }
    }

    debug!("Discovered {} components under {}", found.len(), base);
    found
}

/// 批量提取器
pub struct BatchExtractor<'a, A: ?Sized> {
    builder: ComponentModelBuilder<'a, A>,
    config: BatchConfig,
}

impl<'a, A: TreeAccessor + ?Sized> BatchExtractor<'a, A> {
    pub fn new(accessor: &'a A, extractor_config: ExtractorConfig) -> Self {
        Self {
            builder: ComponentModelBuilder::with_config(accessor, extractor_config),
            config: BatchConfig::default(),
        }
    }

    pub fn with_batch_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn builder(&self) -> &ComponentModelBuilder<'a, A> {
        &self.builder
    }

    /// 发现并提取 `base` 下的全部组件
    pub fn extract_all(&self, base: &NodePath) -> Result<BatchResult> {
        let accessor = self.builder.accessor();
        let paths = discover_components(accessor, base, self.builder.config());
        self.extract_paths(&paths)
    }

    /// 提取给定路径列表
    ///
    /// 单个组件失败不会中断其他组件。两种模式下结果都按路径排序。
    pub fn extract_paths(&self, paths: &[NodePath]) -> Result<BatchResult> {
        let start_time = Instant::now();
        info!("Extracting {} components", paths.len());

        let mut items: Vec<BatchItem> = if self.config.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.thread_pool_size)
                .build()
                .map_err(|e| {
                    ComponentDiffError::ConfigError(format!("Failed to create thread pool: {e}"))
                })?;
            pool.install(|| paths.par_iter().map(|path| self.extract_one(path)).collect())
        } else {
            paths.iter().map(|path| self.extract_one(path)).collect()
        };

        items.sort_by(|a, b| a.path.cmp(&b.path));

        let stats = BatchStats::tally(&items, start_time.elapsed());
        info!(
            "Batch extraction finished: {} succeeded, {} failed, took {:?}",
            stats.succeeded, stats.failed, stats.elapsed
        );

        Ok(BatchResult { items, stats })
    }

    fn extract_one(&self, path: &NodePath) -> BatchItem {
        let outcome = self.builder.build(path);
        if let Err(e) = &outcome {
            warn!("Component extraction failed: {}", e);
        }
        BatchItem {
            path: path.clone(),
            outcome,
        }
    }
}
