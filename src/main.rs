//! treemaker's main application entry point and orchestration logic.
//! Handles command-line argument parsing and runs every template file
//! through the processor in argument order.

use std::path::PathBuf;

use treemaker::{
    cli::{get_args, Args},
    config::get_config,
    error::{default_error_handler, Error, Result},
    lexer::LexerConfig,
    logger::init_logger,
    processor::{tokenize_file, Processor},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Builds the lexer configuration (file + command-line overrides)
/// 2. In token mode, dumps the tokens of every input and stops
/// 3. Otherwise lexes, parses and builds each input, stopping at the first failure;
///    with `--debug` each tree is printed before anything is created
fn run(args: Args) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let config = get_config(&current_dir, args.config.as_deref(), &args.overrides())?;
    let files = args.input_files();

    if args.tokens {
        return dump_tokens(&files, &config, args.json);
    }

    let dest = args.dest.clone().unwrap_or(current_dir);
    let processor = Processor::new(&config, &dest, args.debug, args.dry_run);

    for file in &files {
        let prepared = processor.prepare(file)?;
        if let Some(preview) = &prepared.preview {
            println!("{}:", prepared.file.display());
            print!("{}", preview);
        }

        let result = processor.build(prepared)?;
        for operation in &result.operations {
            if args.dry_run {
                println!("[dry-run] {}", operation);
            } else {
                println!("{}", operation);
            }
        }
        if let Some(report) = result.report {
            log::info!(
                "{}: {} directories, {} files",
                result.file.display(),
                report.directories,
                report.files
            );
        }
    }

    println!(
        "Tree generation completed successfully in {}.",
        dest.display()
    );
    Ok(())
}

/// Prints the token stream of every file and reports all lexer errors.
fn dump_tokens(files: &[PathBuf], config: &LexerConfig, json: bool) -> Result<()> {
    let mut failed = 0;
    for file in files {
        let dump = tokenize_file(file, config)?;
        for token in &dump.tokens {
            if json {
                let line = serde_json::to_string(token).map_err(|e| Error::IoError(e.into()))?;
                println!("{}", line);
            } else {
                println!("{}:{}", dump.file, token);
            }
        }
        for error in &dump.errors {
            eprintln!("{}", error.report(&dump.file));
        }
        if !dump.errors.is_empty() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(Error::TokenizeFailed(failed));
    }
    Ok(())
}
