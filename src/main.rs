use clap::{Parser as ClapParser, Subcommand};
use sift_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing::Level;

#[derive(ClapParser)]
#[command(name = "sift")]
#[command(about = "Sift - A query language for filtering nested dictionary records")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a sift query and run it over JSON records
    Check {
        /// The sift query to run
        query: String,

        /// JSON input (reads from stdin if neither --input nor --file is given)
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Read JSON input from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Print every record's result instead of the matching records
        #[arg(long)]
        eval: bool,

        /// Leave out records that fail to evaluate
        #[arg(long)]
        skip_errors: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'sift docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            file,
            pretty,
            syntax_only,
            eval,
            skip_errors,
        } => read_input(input, file).and_then(|input| {
            let options = CheckOptions {
                query,
                input,
                pretty,
                syntax_only,
                eval,
                skip_errors,
            };
            run_check(&options)
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> Result<Option<String>, CliError> {
    match (input, file) {
        (Some(s), _) => Ok(Some(s)),
        (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        (None, None) => Ok(None),
    }
}

fn run_check(options: &CheckOptions) -> Result<(), CliError> {
    let result = match cli::execute_check(options) {
        Ok(result) => result,
        Err(CliError::Parse(e)) => {
            eprintln!("{}", e.render(&options.query));
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    let output = match result {
        CheckResult::SyntaxValid => {
            println!("Syntax is valid");
            return Ok(());
        }
        CheckResult::Matches(output) | CheckResult::Results(output) => output,
        CheckResult::Printed { index, value } => {
            eprintln!("print reached at record {}", index);
            value
        }
    };

    let json = if options.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;
    println!("{}", json);
    Ok(())
}
