use clap::{Parser, Subcommand};
use graft::artifacts::core::PagerWriter;
use graft::{MergeOutcome, Repository};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const NO_PAGER_ENV: &str = "NO_PAGER";

#[derive(Parser)]
#[command(
    name = "graft",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small version control system",
    long_about = "A small version control system with branches and three-way merges. \
    Snapshots of the working tree are stored as commits in a content-addressed object store \
    under .graft in the repository root.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path, \
        with the default branch pointing at an empty initial commit."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stages the current content of the given files. \
        Directories are expanded to every file beneath them."
    )]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage its removal",
        long_about = "This command unstages a pending addition. If the file is tracked by the current commit, \
        it is deleted from the working tree and its removal is staged."
    )]
    Rm {
        #[arg(index = 1)]
        path: PathBuf,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged changes as a new commit on the current branch."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: Option<String>,
        #[arg(index = 1, conflicts_with = "message", help = "The commit message")]
        positional_message: Option<String>,
    },
    #[command(
        name = "log",
        about = "Show the history of the current branch",
        long_about = "This command shows the commits reachable from HEAD through first parents, newest first."
    )]
    Log,
    #[command(
        name = "global-log",
        about = "Show every commit ever made",
        long_about = "This command shows every commit in the object store, in object id order."
    )]
    GlobalLog,
    #[command(
        name = "find",
        about = "Print the ids of commits with the given message"
    )]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show branches, staged changes and working tree changes"
    )]
    Status,
    #[command(
        name = "restore",
        about = "Restore a working file from a commit",
        long_about = "This command overwrites a working file with its content in the given commit (HEAD by default). \
        The path must follow `--`."
    )]
    Restore {
        #[arg(index = 1, help = "The commit to restore from")]
        commit: Option<String>,
        #[arg(index = 2, last = true, required = true, help = "The file to restore")]
        path: PathBuf,
    },
    #[command(name = "branch", about = "Create a branch at the current commit")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "switch", about = "Switch to another branch")]
    Switch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch, keeping its commits")]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Move the current branch to a commit and check it out"
    )]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(
        name = "merge",
        about = "Merge another branch into the current branch"
    )]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    let pwd = std::env::current_dir()?;

    match command {
        Commands::Init { path } => {
            let path = path.unwrap_or_else(|| pwd.clone());
            Repository::init(&path, Box::new(std::io::stdout()))?;
        }
        Commands::Add { paths } => open(&pwd)?.add(&paths)?,
        Commands::Rm { path } => open(&pwd)?.remove(&path)?,
        Commands::Commit {
            message,
            positional_message,
        } => {
            let message = message.or(positional_message).unwrap_or_default();
            open(&pwd)?.commit(&message)?;
        }
        Commands::Log => paged(&pwd, |repository| repository.log())?,
        Commands::GlobalLog => paged(&pwd, |repository| repository.global_log())?,
        Commands::Find { message } => open(&pwd)?.find(&message)?,
        Commands::Status => open(&pwd)?.print_status(std::io::stdout().is_terminal())?,
        Commands::Restore { commit, path } => open(&pwd)?.restore(commit.as_deref(), &path)?,
        Commands::Branch { name } => open(&pwd)?.branch(&name)?,
        Commands::Switch { name } => open(&pwd)?.switch_branch(&name)?,
        Commands::RmBranch { name } => open(&pwd)?.remove_branch(&name)?,
        Commands::Reset { commit } => open(&pwd)?.reset(&commit)?,
        Commands::Merge { branch } => {
            let outcome = open(&pwd)?.merge(&branch)?;
            return report_merge(&outcome);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open(pwd: &Path) -> graft::Result<Repository> {
    Repository::open(pwd, Box::new(std::io::stdout()))
}

/// Run a history command through the pager when a person is reading the output
fn paged(pwd: &Path, command: impl FnOnce(&Repository) -> graft::Result<()>) -> anyhow::Result<()> {
    if !std::io::stdout().is_terminal() || std::env::var_os(NO_PAGER_ENV).is_some() {
        return Ok(command(&open(pwd)?)?);
    }

    let pager = Pager::new();
    {
        let repository = Repository::open(pwd, Box::new(PagerWriter::new(pager.clone())))?;
        command(&repository)?;
    }
    minus::page_all(pager)?;

    Ok(())
}

fn report_merge(outcome: &MergeOutcome) -> anyhow::Result<ExitCode> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", outcome.message())?;

    if outcome.is_conflicted() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
