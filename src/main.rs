#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::commands::porcelain::clone::CloneOpts;
use crate::commands::porcelain::rm::RmOpts;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod areas;
mod artifacts;
mod commands;

#[derive(Parser)]
#[command(
    name = "nit",
    version = "0.1.0",
    about = "A minimal distributed version control engine",
    long_about = "nit is a minimal distributed version control engine: a \
    content-addressed object store with a staging index, branches, three-way \
    merge, and fetch/push/clone between same-machine repositories."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
        #[arg(long, help = "Create a bare repository")]
        bare: bool,
    },
    #[command(about = "Clone a repository into a new directory")]
    Clone {
        #[arg(index = 1, help = "Path of the repository to clone")]
        remote_path: String,
        #[arg(index = 2, help = "Directory to clone into")]
        target_path: String,
        #[arg(long, help = "Create a bare repository")]
        bare: bool,
    },
    #[command(about = "Add file contents to the index")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to add")]
        paths: Vec<String>,
    },
    #[command(about = "Remove files from the working tree and the index")]
    Rm {
        #[arg(index = 1, help = "File or directory to remove")]
        path: String,
        #[arg(short, help = "Remove directories recursively")]
        r: bool,
        #[arg(short, help = "Force removal (not supported)")]
        f: bool,
    },
    #[command(about = "Record changes to the repository")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(about = "List branches or create a new one")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
    },
    #[command(about = "Switch branches or restore a commit's working tree")]
    Checkout {
        #[arg(index = 1, help = "Branch name or commit hash")]
        target: String,
    },
    #[command(about = "Show changed files between commits, index and working tree")]
    Diff {
        #[arg(index = 1)]
        ref1: Option<String>,
        #[arg(index = 2)]
        ref2: Option<String>,
    },
    #[command(about = "Join another branch's history into the current branch")]
    Merge {
        #[arg(index = 1, help = "Branch name, ref, or commit hash to merge")]
        target: String,
    },
    #[command(about = "Manage the set of tracked repositories")]
    Remote {
        #[arg(index = 1, help = "Remote subcommand (only add is supported)")]
        command: String,
        #[arg(index = 2, help = "Name of the remote")]
        name: String,
        #[arg(index = 3, help = "Path of the remote repository")]
        url: String,
    },
    #[command(about = "Download objects and refs from another repository")]
    Fetch {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(about = "Update remote refs along with associated objects")]
    Push {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
        #[arg(short, long, help = "Allow a non-fast-forward update")]
        force: bool,
    },
    #[command(about = "Fetch and merge a remote branch")]
    Pull {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(about = "Show the working tree status")]
    Status,
    #[command(name = "hash-object", about = "Compute the blob hash of a file")]
    HashObject {
        #[arg(short, long, help = "Write the blob to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "cat-file", about = "Print the content of an object")]
    CatFile {
        #[arg(short = 'p', long, help = "The object hash to print")]
        sha: String,
    },
}

fn open_repository(cwd: &Path) -> Result<Repository> {
    Repository::discover(cwd, Box::new(std::io::stdout()))
}

fn relative(repo: &Repository, cwd: &Path, arg: &str) -> Result<PathBuf> {
    repo.relativize(cwd, Path::new(arg))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Init { path, bare } => {
            let root = match path {
                Some(path) => cwd.join(path),
                None => cwd.clone(),
            };
            Repository::init(&root, *bare, &mut std::io::stdout())?;
        }
        Commands::Clone {
            remote_path,
            target_path,
            bare,
        } => {
            Repository::clone(
                remote_path,
                target_path,
                CloneOpts { bare: *bare },
                &cwd,
                &mut std::io::stdout(),
            )?;
        }
        Commands::Add { paths } => {
            let repository = open_repository(&cwd)?;
            for path in paths {
                let path = relative(&repository, &cwd, path)?;
                repository.add(&path)?;
            }
        }
        Commands::Rm { path, r, f } => {
            let repository = open_repository(&cwd)?;
            let path = relative(&repository, &cwd, path)?;
            repository.rm(
                &path,
                RmOpts {
                    recursive: *r,
                    force: *f,
                },
            )?;
        }
        Commands::Commit { message } => {
            let repository = open_repository(&cwd)?;
            repository.commit(Some(message.as_str()))?;
        }
        Commands::Branch { name } => {
            let repository = open_repository(&cwd)?;
            repository.branch(name.as_deref())?;
        }
        Commands::Checkout { target } => {
            let repository = open_repository(&cwd)?;
            repository.checkout(target)?;
        }
        Commands::Diff { ref1, ref2 } => {
            let repository = open_repository(&cwd)?;
            repository.diff(ref1.as_deref(), ref2.as_deref())?;
        }
        Commands::Merge { target } => {
            let repository = open_repository(&cwd)?;
            repository.merge(target)?;
        }
        Commands::Remote { command, name, url } => {
            let repository = open_repository(&cwd)?;
            repository.remote(command, name, url)?;
        }
        Commands::Fetch { remote, branch } => {
            let repository = open_repository(&cwd)?;
            repository.fetch(remote, branch)?;
        }
        Commands::Push {
            remote,
            branch,
            force,
        } => {
            let repository = open_repository(&cwd)?;
            repository.push(remote, branch, *force)?;
        }
        Commands::Pull { remote, branch } => {
            let repository = open_repository(&cwd)?;
            repository.pull(remote, branch)?;
        }
        Commands::Status => {
            let repository = open_repository(&cwd)?;
            repository.status()?;
        }
        Commands::HashObject { write, file } => {
            let repository = open_repository(&cwd)?;
            let path = relative(&repository, &cwd, file)?;
            repository.hash_object(&path, *write)?;
        }
        Commands::CatFile { sha } => {
            let repository = open_repository(&cwd)?;
            repository.cat_file(sha)?;
        }
    }

    Ok(())
}
