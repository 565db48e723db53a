use std::{
    borrow::Cow,
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use env_logger::{Env, Target};
use log::{error, info};
use na_bookscan::{BookDefaults, JsonExporter, Scanner, find_worlds, repair_directory};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(version, about = "Exports every written book found in Minecraft world saves")]
struct Cli {
    /// env_logger-style filter string; overrides RUST_LOG
    #[arg(long, global = true)]
    log_filter: Option<String>,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan every world under ROOT and export its books as JSON
    Scan {
        /// Directory searched recursively for worlds
        root: PathBuf,

        /// Export directory; books go to <OUTPUT>/books_json
        #[arg(short, long, default_value = "exported_books")]
        output: PathBuf,

        /// Title used for books without one
        #[arg(long, default_value = "Untitled")]
        default_title: String,

        /// Author used for books without one
        #[arg(long, default_value = "Unknown")]
        default_author: String,
    },
    /// Repair mis-decoded Cyrillic in exported books and drop duplicates
    Repair {
        #[arg(short, long, default_value = "exported_books/books_json")]
        input: PathBuf,

        #[arg(short, long, default_value = "exported_books/books_fixed")]
        output: PathBuf,
    },
}

/// Writes log output to stderr and a file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logging(filter: Option<&str>, log_file: Option<&Path>) -> io::Result<()> {
    let env = Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.format(|buf, record| {
        writeln!(buf, "{}  {}", buf.timestamp_seconds(), record.args())
    });
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(Tee { file })));
    }
    builder.init();
    Ok(())
}

fn scan(root: &Path, output: &Path, defaults: BookDefaults) -> ExitCode {
    let worlds = find_worlds(root);
    if worlds.is_empty() {
        println!("No worlds found in {}", root.display());
        return ExitCode::FAILURE;
    }

    let books_dir = output.join("books_json");
    let mut scanner = Scanner::new(JsonExporter::new(&books_dir)).with_defaults(defaults);
    for world in &worlds {
        scanner.scan_world(world);
    }

    let stats = scanner.stats();
    println!("Done!");
    println!("Regions processed: {}", stats.regions);
    println!("Chunks with containers: {}", stats.chunks_with_containers);
    println!("Written books found: {}", stats.books);
    if scanner.sink().written() > 0 {
        println!("Files saved to: {}", books_dir.display());
    }
    ExitCode::SUCCESS
}

fn repair(input: &Path, output: &Path) -> ExitCode {
    if !input.is_dir() {
        error!("Input directory {} not found", input.display());
        return ExitCode::FAILURE;
    }
    match repair_directory(input, output) {
        Ok(report) => {
            println!("Files found: {}", report.total);
            println!("Unique books written: {}", report.unique());
            println!("Duplicates dropped: {}", report.duplicates.len());
            println!("Failed: {}", report.failed);
            println!("Repaired files saved to: {}", output.display());
            for duplicate in &report.duplicates {
                println!("  - duplicate: {}", duplicate.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Repair failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_filter.as_deref(), cli.log_file.as_deref()) {
        eprintln!("Cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Scan {
            root,
            output,
            default_title,
            default_author,
        } => {
            info!("World scanner starting in {}", root.display());
            let defaults = BookDefaults {
                title: Cow::Owned(default_title),
                author: Cow::Owned(default_author),
            };
            scan(&root, &output, defaults)
        }
        Command::Repair { input, output } => repair(&input, &output),
    }
}
