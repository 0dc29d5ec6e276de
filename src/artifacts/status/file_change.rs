use colored::Colorize;

/// Change to a tracked or staged file that has not been staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChangeType {
    Modified,
    Deleted,
}

impl From<&WorkspaceChangeType> for &str {
    fn from(change: &WorkspaceChangeType) -> Self {
        match change {
            WorkspaceChangeType::Modified => "modified",
            WorkspaceChangeType::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for WorkspaceChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = self.into();
        write!(f, "({label})")
    }
}

/// Section of the status report a path is listed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeType {
    Staged,
    Removed,
    Workspace(WorkspaceChangeType),
    Untracked,
}

impl FileChangeType {
    /// One report line for `path`, colored when `colorize` is set
    pub fn render(&self, path: &str, colorize: bool) -> String {
        let line = match self {
            FileChangeType::Workspace(change) => format!("{path} {change}"),
            _ => path.to_string(),
        };

        if !colorize {
            return line;
        }

        match self {
            FileChangeType::Staged => line.green().to_string(),
            FileChangeType::Removed | FileChangeType::Workspace(_) => line.red().to_string(),
            FileChangeType::Untracked => line.normal().to_string(),
        }
    }
}
