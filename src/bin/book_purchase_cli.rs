use std::{env, path::PathBuf, process};

use book_purchase::{
    cli::run_cli,
    errors::CliError,
    init,
    storage::SqliteStore,
    utils::build_info,
};

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut args = args.iter().map(String::as_str);

    match args.next() {
        None | Some("run") => {
            let database = parse_run_options(args)?;
            run_cli(database)?;
        }
        Some("--db") => {
            let database = args.next().map(PathBuf::from).ok_or_else(usage)?;
            run_cli(Some(database))?;
        }
        Some("init-demo") => {
            let path = args.next().map(PathBuf::from).ok_or_else(usage)?;
            let mut store = SqliteStore::open(&path)?;
            store.seed_demo()?;
            println!("Created demo database at {}", path.display());
        }
        Some("--version") | Some("-V") => {
            println!("{}", build_info::current().summary());
        }
        Some("--help") | Some("-h") => print_usage(),
        Some(_) => return Err(usage()),
    }

    Ok(())
}

fn parse_run_options<'a>(
    mut args: impl Iterator<Item = &'a str>,
) -> Result<Option<PathBuf>, CliError> {
    let mut database = None;
    while let Some(arg) = args.next() {
        match arg {
            "--db" => database = Some(args.next().map(PathBuf::from).ok_or_else(usage)?),
            _ => return Err(usage()),
        }
    }
    Ok(database)
}

fn usage() -> CliError {
    print_usage();
    CliError::Usage("invalid arguments".into())
}

fn print_usage() {
    eprintln!(
        "Usage: book_purchase_cli <command>\n\
         Commands:\n  \
         run [--db <file.sqlite>]\n  \
         init-demo <file.sqlite>\n  \
         --version"
    );
}
