mod cat_file;
mod clone;
mod commit_tree;
mod hash_object;
mod init;
mod ls_tree;
mod write_tree;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::args::Command;
use crate::Constants;

/// Calls the corresponding function to perform every command variant.
///
/// # Return
///
/// The success message
///
/// # Errors
///
/// This function will fail if any of the executed commands return an error.
pub fn execute_command(command: &Command) -> Result<String> {
    // init creates a repository and clone brings its own directory; every
    // other command needs to run inside an existing one
    match command {
        Command::Init => return init::init(&current_dir()?),
        Command::Clone { url, directory } => return clone::clone(url, directory),
        _ => {}
    }

    let root = current_dir()?;
    if !Constants::repository_path(&root).exists() {
        return Ok("Folder is not a git repository".into());
    }

    match command {
        Command::CatFile { pretty, hash } => cat_file::cat_file(&root, *pretty, hash),
        Command::HashObject { write, file } => hash_object::hash_object(&root, *write, file),
        Command::LsTree { name_only, hash } => ls_tree::ls_tree(&root, *name_only, hash),
        Command::WriteTree => write_tree::write_tree(&root),
        Command::CommitTree {
            tree,
            parent,
            message,
        } => commit_tree::commit_tree(&root, tree, parent.as_deref(), message),
        Command::Init | Command::Clone { .. } => unreachable!("handled above"),
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().context("could not get the current directory")
}
