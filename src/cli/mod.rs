use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::Level;

use crate::cmd::{RewriteOpts, cmd_dep_map, cmd_path, cmd_rewrite, cmd_update};
use crate::hooks;
use crate::pkg::version::go_version;
use crate::rewrite::GoSourceRewriter;
use crate::workspace::Workspace;

const VERSION: &str = match option_env!("GX_GO_GIT_COMMIT") {
    Some(commit) => commit,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Debug, Parser)]
#[command(
    name = "gx-go",
    version = VERSION,
    about = "gx extensions for golang"
)]
pub struct Cli {
    /// Print verbose logging information
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints out a json dep map for usage by 'import --map'
    DepMap,
    /// Temporary hack to evade causing cyclic dependencies in the import graph
    Rewrite(RewriteArgs),
    /// Update a packages imports to a new path
    Update {
        /// Import path being replaced
        old: String,
        /// Replacement import path
        new: String,
    },
    /// Prints the import path of the current package within GOPATH
    Path,
    /// Go specific hooks to be called by the gx tool
    Hook {
        #[command(subcommand)]
        hook: Hook,
    },
}

#[derive(Debug, Args)]
pub struct RewriteArgs {
    /// Rewrite import paths back to dvcs
    #[arg(long)]
    pub undo: bool,
    /// Print out mapping without touching files
    #[arg(long)]
    pub dry_run: bool,
    /// Alternative location of the package directory
    #[arg(long)]
    pub pkgdir: Option<PathBuf>,
    /// Only rewrite imports of these direct dependencies
    pub deps: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Hook {
    /// Hook called after importing a new go package
    PostImport { hash: String },
    /// Hook called to check if requirements of a package are met
    ReqCheck { pkgpath: PathBuf },
    /// Hook called to determine install path
    InstallPath {
        /// Print global install directory
        #[arg(long)]
        global: bool,
    },
    /// Hook called to perform go specific package initialization
    PostInit { dir: Option<PathBuf> },
    /// Post install hook for newly installed go packages
    PostInstall {
        /// Specifies whether or not the install was global
        #[arg(long)]
        global: bool,
        pkgdir: PathBuf,
    },
    /// Rewrite go package imports to new versions
    PostUpdate { old: String, new: String },
}

pub fn run_cli<I>(args: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    let argv = std::iter::once("gx-go".to_string()).chain(args);
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    init_logging(cli.verbose);

    match dispatch(cli.command) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

fn dispatch(command: Command) -> anyhow::Result<()> {
    let ws = Workspace::from_env()?;
    let rewriter = GoSourceRewriter::new()?;
    let mut stdout = io::stdout().lock();

    match command {
        Command::DepMap => cmd_dep_map(&ws, &mut stdout),
        Command::Rewrite(args) => {
            let opts = RewriteOpts {
                undo: args.undo,
                dry_run: args.dry_run,
                pkgdir: args.pkgdir,
                deps: args.deps,
            };
            cmd_rewrite(&ws, &opts, &rewriter, &mut stdout)
        }
        Command::Update { old, new } => cmd_update(&ws, &old, &new, &rewriter),
        Command::Path => cmd_path(&ws, &mut stdout),
        Command::Hook { hook } => match hook {
            Hook::PostImport { hash } => {
                hooks::hook_post_import(&ws, &hash, &mut yes_no_prompt, &rewriter)
            }
            Hook::ReqCheck { pkgpath } => hooks::hook_req_check(&ws, &pkgpath, &go_version),
            Hook::InstallPath { global } => hooks::hook_install_path(&ws, global, &mut stdout),
            Hook::PostInit { dir } => hooks::hook_post_init(&ws, dir.as_deref()),
            Hook::PostInstall { global: _, pkgdir } => {
                hooks::hook_post_install(&ws, &pkgdir, &rewriter)
            }
            Hook::PostUpdate { old, new } => hooks::hook_post_update(&ws, &old, &new, &rewriter),
        },
    }
}

/// Ask on stdout, read a line from stdin; anything but y/yes is a no.
fn yes_no_prompt(question: &str) -> bool {
    print!("{} [y/N] ", question);
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
