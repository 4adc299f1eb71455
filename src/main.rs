use clap::{CommandFactory, Parser, Subcommand, value_parser};
use clap_complete::aot::{Shell, generate};
use nstree::{Tree, TreeError};
use std::io::stdout;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about = "A concurrent in-memory namespace tree")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, value_parser = value_parser!(Shell), help = "Generate shell completions")]
    generate: Option<Shell>,
}

#[derive(Subcommand)]
enum Command {
    /// List a folder's direct children.
    List { path: String },
    /// Create a folder.
    Create { path: String },
    /// Remove an empty folder.
    Remove { path: String },
    /// Move a folder, and everything under it, to a new path.
    Move { source: String, target: String },
    /// Exercise the tree with concurrent workers, for smoke-testing under contention.
    Stress {
        #[arg(long, default_value_t = 8)]
        workers: usize,
        #[arg(long, default_value_t = 2_000)]
        ops_per_worker: usize,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(generator) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_owned();
        generate(generator, &mut cmd, name, &mut stdout());
        return ExitCode::SUCCESS;
    }

    let Some(command) = args.command else {
        eprintln!("no command given, try --help");
        return ExitCode::FAILURE;
    };

    let tree = Tree::new();
    match run(&tree, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(tree: &Tree, command: Command) -> Result<(), TreeError> {
    match command {
        Command::List { path } => {
            let children = tree.list(&path)?;
            println!("{children}");
            Ok(())
        }
        Command::Create { path } => tree.create(&path),
        Command::Remove { path } => tree.remove(&path),
        Command::Move { source, target } => tree.move_(&source, &target),
        Command::Stress { workers, ops_per_worker } => {
            stress(tree, workers, ops_per_worker);
            Ok(())
        }
    }
}

/// Hammer the tree from several threads at once: each worker creates,
/// lists, and removes its own top-level folder, ignoring the transient
/// `NotFound`/`Exists` races that are expected when workers' folders
/// briefly overlap during `list`. Workers report their op count back
/// over a bounded channel rather than a shared counter, so the main
/// thread can print progress as results land instead of waiting on a
/// join of every handle at once.
fn stress(tree: &Tree, workers: usize, ops_per_worker: usize) {
    let (done_tx, done_rx) = crossbeam_channel::bounded::<usize>(workers);

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let tree: &Tree = tree;
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                let folder = format!("/{}/", alpha_name(worker, 0));
                if tree.create(&folder).is_err() {
                    log::warn!("worker {worker} could not create {folder:?}");
                }
                for op in 0..ops_per_worker {
                    let child = format!("{folder}{}/", alpha_name(worker, op));
                    let _ = tree.create(&child);
                    let _ = tree.list(&folder);
                    let _ = tree.remove(&child);
                }
                let _ = done_tx.send(worker);
            });
        }
        drop(done_tx);

        for worker in &done_rx {
            log::info!("worker {worker} done");
        }
    });
}

/// A lowercase-letters-only name unique enough for stress-test purposes,
/// since folder names in this tree may not contain digits.
fn alpha_name(worker: usize, op: usize) -> String {
    fn to_letters(mut n: usize) -> String {
        let mut out = Vec::new();
        loop {
            out.push(b'a' + u8::try_from(n % 26).expect("n % 26 fits in a u8"));
            n /= 26;
            if n == 0 {
                break;
            }
            n -= 1;
        }
        out.reverse();
        String::from_utf8(out).expect("ascii lowercase letters are valid utf8")
    }
    format!("w{}o{}", to_letters(worker), to_letters(op))
}
