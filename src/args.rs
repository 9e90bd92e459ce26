use std::ffi::OsString;

use clap::{Parser, Subcommand};

/// Contains the commands passed to the program
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// A list of subcommands the program can perform
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates a new repository
    Init,

    /// Shows the object with the specified hash
    CatFile {
        /// Pretty-print the object's content
        #[arg(short = 'p')]
        pretty: bool,
        /// Hash of the object to show
        hash: String,
    },
    /// Computes the blob hash of a file
    HashObject {
        /// Also store the blob in the object database
        #[arg(short, long)]
        write: bool,
        /// File to hash
        file: OsString,
    },
    /// Lists the contents of a tree object
    LsTree {
        /// Only print entry names
        #[arg(long)]
        name_only: bool,
        /// Hash of the tree to list
        hash: String,
    },
    /// Stores the working tree as tree objects, printing the root hash
    WriteTree,
    /// Creates a commit object for an already stored tree
    CommitTree {
        /// Hash of the tree the commit points at
        tree: String,
        /// Hash of the parent commit
        #[arg(short)]
        parent: Option<String>,
        /// Commit message
        #[arg(short)]
        message: String,
    },

    /// Clones a repository served over the smart HTTP protocol
    Clone {
        /// URL of the remote repository
        url: String,
        /// Directory to clone into
        directory: OsString,
    },
}
