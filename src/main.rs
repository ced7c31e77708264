//! Fill Docker Template CLI
//!
//! Usage:
//!   fill-docker-template [OPTIONS] <TEMPLATE>
//!
//! Options:
//!   -t, --table <FILE>  Substitution table (TOML format)
//!   -c, --check         Validate the template without writing Dockerfile
//!   -v, --verbose       Log file operations to stderr
//!   -h, --help          Print help

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Level;

use fill_docker_template::{
    check_str, fill_str, read_template, resolve_template_path, write_dockerfile, FillError,
    SubstitutionTable,
};

#[derive(Parser)]
#[command(name = "fill-docker-template")]
#[command(about = "Fill @@ placeholders in a Dockerfile template and write Dockerfile next to it")]
struct Cli {
    /// Template file to fill
    template: PathBuf,

    /// Substitution table file (TOML format); defaults to the Chapel apt blocks
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Validate the template and list its placeholders without writing Dockerfile
    #[arg(short, long)]
    check: bool,

    /// Log file operations to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let table = match &cli.table {
        Some(path) => match SubstitutionTable::from_file(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error loading substitution table '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SubstitutionTable::chapel_apt(),
    };
    tracing::debug!(
        table = table.name.as_deref().unwrap_or("<unnamed>"),
        entries = table.len(),
        "loaded substitution table"
    );

    let template_path = match resolve_template_path(&cli.template) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let source = match read_template(&template_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.check {
        match check_str(&source, &table) {
            Ok(names) => {
                for name in names {
                    println!("{}", name);
                }
            }
            Err(e) => exit_with(&template_path, &source, e),
        }
        return;
    }

    let filled = match fill_str(&source, &table) {
        Ok(f) => f,
        Err(e) => exit_with(&template_path, &source, e),
    };
    if let Err(e) = write_dockerfile(&template_path, &filled) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn exit_with(template_path: &Path, source: &str, err: FillError) -> ! {
    match &err {
        FillError::Template(errors) => {
            let filename = template_path.display().to_string();
            let color = std::io::stderr().is_terminal();
            for e in errors {
                eprint!("{}", e.format(source, &filename, color));
            }
        }
        _ => eprintln!("Error: {}", err),
    }
    std::process::exit(1);
}
