//! Materializes a parsed tree onto the filesystem.
//! Directories are created first, parents before children, then every file is
//! created empty. Existing directories are reused and existing files are
//! never truncated.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::tree::Tree;

/// A single filesystem operation derived from a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOperation {
    CreateDir { target: PathBuf },
    CreateFile { target: PathBuf },
}

impl BuildOperation {
    pub fn target(&self) -> &Path {
        match self {
            BuildOperation::CreateDir { target } | BuildOperation::CreateFile { target } => target,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            BuildOperation::CreateDir { .. } => "Creating directory",
            BuildOperation::CreateFile { .. } => "Creating file",
        }
    }
}

impl std::fmt::Display for BuildOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}'", self.action(), self.target().display())
    }
}

/// Counts of entries handled by [`Builder::build`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub directories: usize,
    pub files: usize,
}

pub struct Builder {
    dest: PathBuf,
}

impl Builder {
    /// Creates a builder rooted at `dest`; node paths are joined onto it.
    pub fn new<P: AsRef<Path>>(dest: P) -> Self {
        Self {
            dest: dest.as_ref().to_path_buf(),
        }
    }

    /// Lists the operations needed for `tree`: every directory in pre-order,
    /// then every file in pre-order.
    ///
    /// # Errors
    /// * `Error::EmptyTree` if the tree has no root
    pub fn plan(&self, tree: &Tree) -> Result<Vec<BuildOperation>> {
        if tree.is_empty() {
            return Err(Error::EmptyTree);
        }

        let mut directories = Vec::new();
        let mut files = Vec::new();
        for (_, id) in tree.pre_order() {
            let node = tree.node(id);
            let target = self.dest.join(node.path());
            if node.is_directory() {
                directories.push(BuildOperation::CreateDir { target });
            } else {
                files.push(BuildOperation::CreateFile { target });
            }
        }
        directories.append(&mut files);
        Ok(directories)
    }

    /// Performs one operation.
    ///
    /// # Errors
    /// * `Error::BuildError` naming the path that could not be created
    pub fn apply(&self, operation: &BuildOperation) -> Result<()> {
        debug!("{}", operation);
        match operation {
            BuildOperation::CreateDir { target } => create_dir(target),
            BuildOperation::CreateFile { target } => create_file(target),
        }
    }

    /// Creates every directory and file of `tree` under the destination.
    pub fn build(&self, tree: &Tree) -> Result<BuildReport> {
        let operations = self.plan(tree)?;
        self.execute(&operations)
    }

    /// Applies planned operations in order, creating the destination first.
    pub fn execute(&self, operations: &[BuildOperation]) -> Result<BuildReport> {
        create_dir(&self.dest)?;

        let mut report = BuildReport::default();
        for operation in operations {
            self.apply(operation)?;
            match operation {
                BuildOperation::CreateDir { .. } => report.directories += 1,
                BuildOperation::CreateFile { .. } => report.files += 1,
            }
        }
        Ok(report)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::BuildError {
        path: path.to_path_buf(),
        source,
    })
}

fn create_file(path: &Path) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map(|_| ())
        .map_err(|source| Error::BuildError {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexerConfig;
    use crate::parser::parse_source;

    fn tree(source: &str) -> Tree {
        parse_source("test.trm", source.as_bytes(), &LexerConfig::default())
            .unwrap()
            .tree
    }

    fn dir(target: PathBuf) -> BuildOperation {
        BuildOperation::CreateDir { target }
    }

    fn file(target: PathBuf) -> BuildOperation {
        BuildOperation::CreateFile { target }
    }

    #[test]
    fn test_plan_creates_directories_before_files() {
        let builder = Builder::new("out");
        let parsed = tree("a/\n    b\n    c/\n        d\n");
        let plan = builder.plan(&parsed).unwrap();

        let a = Path::new("out").join("a");
        assert_eq!(
            plan,
            vec![
                dir(a.clone()),
                dir(a.join("c")),
                file(a.join("b")),
                file(a.join("c").join("d")),
            ]
        );
    }

    #[test]
    fn test_plan_rejects_empty_tree() {
        let result = Builder::new("out").plan(&Tree::new());
        assert!(matches!(result, Err(Error::EmptyTree)));
    }

    #[test]
    fn test_operation_display() {
        let operation = file(PathBuf::from("x"));
        assert_eq!(operation.to_string(), "Creating file: 'x'");
        assert_eq!(dir(PathBuf::from("d")).action(), "Creating directory");
    }
}
