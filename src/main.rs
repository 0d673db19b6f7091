use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;
use typeflow::EngineConfig;
use typeflow::cli::{self, CliError, ProcessOptions, ProcessResult};

#[derive(ClapParser)]
#[command(name = "typeflow")]
#[command(about = "Typeflow - resolve typed pipeline expressions like [TEXT(hi) => upper] embedded in text")]
#[command(version)]
struct Cli {
    /// Log evaluation steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every expression in a text
    Process {
        /// Text to process (reads from stdin if not provided)
        text: Option<String>,

        /// List and argument delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// Maximum number of substitution passes
        #[arg(long, default_value_t = 1024)]
        max_passes: usize,

        /// Read seeds that name existing files from disk
        #[arg(long)]
        resolve_files: bool,

        /// Store a TEXT variable before evaluation (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// JSON file with variables to store before evaluation
        #[arg(long = "vars", value_name = "FILE")]
        vars_file: Option<String>,

        /// Only check the first expression to resolve, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// List the operations of one type, or of all types
    Functions {
        /// Type keyword, e.g. LIST
        r#type: Option<String>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'typeflow docs' to list categories)
        category: String,
    },

    /// Guided tour
    Onboard,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Process {
            text,
            delimiter,
            max_passes,
            resolve_files,
            vars,
            vars_file,
            syntax_only,
        } => {
            let config = EngineConfig::default()
                .with_delimiter(delimiter)
                .with_max_passes(max_passes)
                .with_resolve_files(resolve_files);
            run_process(text, config, vars, vars_file, syntax_only)
        }
        Commands::Functions { r#type } => cli::list_functions(r#type.as_deref()).map(|listing| {
            print!("{}", listing);
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => match cli::get_doc_category(&category) {
            Ok(content) => {
                print!("{}", content);
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Onboard => {
            print!("{}", cli::get_onboarding_content());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_process(
    text: Option<String>,
    config: EngineConfig,
    vars: Vec<String>,
    vars_file: Option<String>,
    syntax_only: bool,
) -> Result<(), CliError> {
    let text = match text {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let vars_json = match vars_file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(CliError::Io)?),
        None => None,
    };

    let options = ProcessOptions {
        text,
        config,
        vars,
        vars_json,
        syntax_only,
    };

    match cli::execute_process(&options)? {
        ProcessResult::SyntaxValid(canonical) => println!("Syntax is valid: {}", canonical),
        ProcessResult::NoExpression => println!("No expression found"),
        ProcessResult::Output(output) => print!("{}", output),
    }
    Ok(())
}
