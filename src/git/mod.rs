use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository")]
    NotARepo,
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("failed to read untracked file {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Where changed files and their diffs come from.
pub trait DiffSource {
    /// Paths with uncommitted changes, in display order.
    fn list_changed_files(&self) -> Result<Vec<String>>;

    /// Unified diff text for one path.
    fn get_diff(&self, path: &str) -> Result<String>;
}

/// `DiffSource` backed by the `git` binary, run inside `repo_root`.
#[derive(Debug, Clone)]
pub struct GitSource {
    repo_root: PathBuf,
}

impl GitSource {
    /// Open the repository containing `dir`.
    ///
    /// Fails with `GitError::NotARepo` when `dir` is outside a work tree.
    pub fn open(dir: &Path) -> Result<Self> {
        let repo_root = find_repo_root(dir)?;
        debug!("opened repository at {}", repo_root.display());
        Ok(Self { repo_root })
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()?)
    }

    /// Run git and return stdout, turning a non-zero exit into `CommandFailed`.
    ///
    /// Output is decoded lossily: tracked files in other encodings still diff.
    fn git_text(&self, args: &[&str]) -> Result<String> {
        let output = self.git(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("git {} failed: {}", args.join(" "), stderr.trim());
            return Err(GitError::CommandFailed(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether git knows about `path` (exit code 1 from ls-files means it doesn't).
    fn is_tracked(&self, path: &str) -> Result<bool> {
        let output = self.git(&["ls-files", "--error-unmatch", "--", path])?;
        if output.status.success() {
            return Ok(true);
        }
        match output.status.code() {
            Some(1) => Ok(false),
            _ => Err(GitError::CommandFailed(format!(
                "failed to check if {} is tracked: {}",
                path,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

impl DiffSource for GitSource {
    fn list_changed_files(&self) -> Result<Vec<String>> {
        let status = self.git_text(&["status", "--porcelain", "-z", "--untracked-files=all"])?;
        Ok(parse_porcelain_z(&status))
    }

    fn get_diff(&self, path: &str) -> Result<String> {
        let on_disk = self.repo_root.join(path);
        if !self.is_tracked(path)? && on_disk.exists() {
            let content = fs::read(&on_disk).map_err(|source| {
                GitError::ReadFile {
                    path: path.to_string(),
                    source,
                }
            })?;
            return Ok(synthesize_new_file_diff(
                path,
                &String::from_utf8_lossy(&content),
            ));
        }

        let diff = self.git_text(&["diff", "--", path])?;
        if !diff.is_empty() {
            return Ok(diff);
        }

        // Nothing unstaged; fall back to what is already in the index.
        self.git_text(&["diff", "--cached", "--", path])
    }
}

/// Find the root of the git repository containing `dir`.
pub fn find_repo_root(dir: &Path) -> Result<PathBuf> {
    let output = Command::new("git")
        .arg("rev-parse")
        .arg("--show-toplevel")
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        return Err(GitError::NotARepo);
    }

    let path = String::from_utf8(output.stdout)?.trim().to_string();

    Ok(PathBuf::from(path))
}

/// Parse `git status --porcelain -z` output into a sorted, de-duplicated path list.
///
/// Entries are `XY path` separated by NUL. Renames and copies carry the original
/// path as an extra entry, which is skipped. Directory entries are ignored.
pub fn parse_porcelain_z(output: &str) -> Vec<String> {
    let mut files = Vec::new();
    let mut entries = output.split('\0');

    while let Some(entry) = entries.next() {
        if entry.len() < 4 {
            continue;
        }
        let (code, path) = entry.split_at(3);
        if code.starts_with('R') || code.starts_with('C') {
            entries.next();
        }
        if path.is_empty() || path.ends_with('/') {
            continue;
        }
        files.push(path.to_string());
    }

    files.sort();
    files.dedup();
    files
}

/// Build an all-addition diff for a file git does not track yet.
pub fn synthesize_new_file_diff(path: &str, content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();

    let mut diff = String::new();
    diff.push_str(&format!("diff --git a/{path} b/{path}\n"));
    diff.push_str("new file mode 100644\n");
    diff.push_str("index 0000000..e69de29\n");
    diff.push_str("--- /dev/null\n");
    diff.push_str(&format!("+++ b/{path}\n"));
    diff.push_str(&format!("@@ -0,0 +1,{} @@\n", lines.len()));
    for line in lines {
        diff.push('+');
        diff.push_str(line);
        diff.push('\n');
    }
    diff
}
