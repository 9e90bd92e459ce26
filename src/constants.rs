use std::path::{Path, PathBuf};

pub struct Constants;

impl Constants {
    pub const REPOSITORY_FOLDER_NAME: &'static str = ".git";
    pub const OBJECTS_FOLDER_NAME: &'static str = "objects";
    pub const REFS_FOLDER_NAME: &'static str = "refs";
    pub const HEADS_FOLDER_NAME: &'static str = "heads";
    pub const HEAD_NAME: &'static str = "HEAD";
    pub const HEAD_CONTENT_HEADER: &'static str = "ref: ";
    pub const DEFAULT_BRANCH: &'static str = "master";
    pub const DEFAULT_IDENTIFIER: &'static str = "mgit <mgit@localhost>";

    /// The location of the .git folder inside `root`.
    ///
    /// Every path builder takes the repository root explicitly so the same
    /// code serves both the current directory and a freshly cloned one.
    pub fn repository_path(root: &Path) -> PathBuf {
        root.join(Constants::REPOSITORY_FOLDER_NAME)
    }

    pub fn objects_path(root: &Path) -> PathBuf {
        Constants::repository_path(root).join(Constants::OBJECTS_FOLDER_NAME)
    }

    pub fn refs_path(root: &Path) -> PathBuf {
        Constants::repository_path(root).join(Constants::REFS_FOLDER_NAME)
    }

    pub fn heads_path(root: &Path) -> PathBuf {
        Constants::refs_path(root).join(Constants::HEADS_FOLDER_NAME)
    }

    pub fn head_path(root: &Path) -> PathBuf {
        Constants::repository_path(root).join(Constants::HEAD_NAME)
    }
}
