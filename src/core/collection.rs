//! # Collection Tree Module / Collection 目录树模块
//!
//! Reads the two-level `collection/facet/config` directory hierarchy into
//! an in-memory description of the matrix. Nothing here is persisted; the
//! tree is re-read on every invocation.
//!
//! 将两级 `collection/facet/config` 目录层次读入内存中的矩阵描述。
//! 这里不持久化任何内容；每次调用都会重新读取目录树。

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Collection {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One concrete configuration choice for a facet.
/// facet 的一个具体配置选项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetConfig {
    pub name: String,
    pub path: PathBuf,
}

/// One dimension of variation within a collection.
/// collection 中的一个变化维度。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub name: String,
    /// Config documents, in lexical order of their file names.
    pub configs: Vec<FacetConfig>,
}

/// A named directory of facets.
/// 由 facet 组成的命名目录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// The basename of the munged path.
    pub name: String,
    pub path: PathBuf,
    /// Facets, in lexical order of their directory names.
    pub facets: Vec<Facet>,
}

/// Options controlling which files count as facet configs.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub extensions: Vec<String>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string()],
        }
    }
}

impl TreeOptions {
    fn is_config_document(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Makes a possibly hostile path safe to use as a name: empty and `.`
/// segments are dropped and segments starting with `.` get a `_` prefix.
///
/// 使可能不安全的路径可以安全地用作名称：删除空段和 `.` 段，
/// 以 `.` 开头的段加上 `_` 前缀。
pub fn munge_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(|segment| {
            if segment.starts_with('.') {
                format!("_{segment}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The collection name: the basename of the munged path.
pub fn collection_name(path: &Path) -> String {
    let munged = munge_path(&path.to_string_lossy());
    munged.rsplit('/').next().unwrap_or_default().to_string()
}

/// Checks every requested collection up front, so that a single bad path
/// aborts the run before anything is dispatched.
///
/// 预先检查所有请求的 collection，使单个错误路径在任何分发之前就中止运行。
pub fn validate_collections(paths: &[PathBuf]) -> Result<(), TreeError> {
    match paths.iter().find(|path| !path.is_dir()) {
        Some(bad) => Err(TreeError::NotADirectory(bad.clone())),
        None => Ok(()),
    }
}

/// Lists the non-hidden entry names of a directory in lexical order.
fn sorted_entries(dir: &Path) -> Result<Vec<String>, TreeError> {
    let io_err = |source| TreeError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let name = entry.map_err(io_err)?.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Reads one collection directory into its ordered facets and configs.
///
/// # Errors
/// `TreeError::NotADirectory` if `path` is not a directory, `TreeError::Io`
/// if any level of the tree cannot be listed.
pub fn read_collection(path: &Path, options: &TreeOptions) -> Result<Collection, TreeError> {
    if !path.is_dir() {
        return Err(TreeError::NotADirectory(path.to_path_buf()));
    }

    let mut facets = Vec::new();
    for facet_name in sorted_entries(path)? {
        let facet_dir = path.join(&facet_name);
        if !facet_dir.is_dir() {
            continue;
        }
        let configs = sorted_entries(&facet_dir)?
            .into_iter()
            .filter(|name| options.is_config_document(name))
            .map(|name| FacetConfig {
                path: facet_dir.join(&name),
                name,
            })
            .collect::<Vec<_>>();
        debug!(facet = %facet_name, configs = configs.len(), "read facet");
        facets.push(Facet {
            name: facet_name,
            configs,
        });
    }

    Ok(Collection {
        name: collection_name(path),
        path: path.to_path_buf(),
        facets,
    })
}
