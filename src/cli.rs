//! Command-line interface implementation for treemaker.
//! Provides argument parsing and help text formatting using clap.

use clap::{
    error::ErrorKind, value_parser, Arg, ArgAction, ArgMatches, Command, CommandFactory,
    FromArgMatches, Parser,
};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Command-line arguments structure for treemaker.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "treemaker: create directory trees from tree template files",
    long_about = None
)]
pub struct Args {
    #[command(flatten)]
    pub files: InputFiles,

    /// Directory where the trees are created (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Print each parsed tree before building it
    #[arg(long)]
    pub debug: bool,

    /// Only tokenize the inputs and print the token stream
    #[arg(long)]
    pub tokens: bool,

    /// Print tokens as JSON lines (with --tokens)
    #[arg(long, requires = "tokens")]
    pub json: bool,

    /// Print what would be created without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file (defaults to treemaker.{json,yml,yaml} in the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Width a tab counts for in indentation
    #[arg(long, value_name = "N")]
    pub tab_width: Option<usize>,

    /// Keep lexing after the first error and report all of them
    #[arg(long)]
    pub collect_errors: bool,

    /// Do not emit NEWLINE tokens for blank and comment-only lines
    #[arg(long)]
    pub no_blank_newlines: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// All input files, positional or given with `--tree`, in command-line order.
    pub fn input_files(&self) -> Vec<PathBuf> {
        self.files.paths.clone()
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            tab_width: self.tab_width,
            collect_errors: self.collect_errors,
            no_blank_newlines: self.no_blank_newlines,
        }
    }
}

const INPUTS: &str = "inputs";
const TREE: &str = "tree";

/// Template files from both the positional arguments and `-t/--tree`.
///
/// clap keeps the two sources apart, so the paths are merged back by the
/// index each value had on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFiles {
    pub paths: Vec<PathBuf>,
}

impl FromArgMatches for InputFiles {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut indexed = Vec::new();
        for id in [INPUTS, TREE] {
            if let (Some(values), Some(indices)) =
                (matches.get_many::<PathBuf>(id), matches.indices_of(id))
            {
                indexed.extend(indices.zip(values.cloned()));
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        Ok(Self {
            paths: indexed.into_iter().map(|(_, path)| path).collect(),
        })
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl clap::Args for InputFiles {
    fn augment_args(cmd: Command) -> Command {
        cmd.arg(
            Arg::new(INPUTS)
                .value_name("INPUT")
                .help("Tree template files, processed in the order given")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .action(ArgAction::Append)
                .required_unless_present(TREE),
        )
        .arg(
            Arg::new(TREE)
                .short('t')
                .long(TREE)
                .value_name("FILE")
                .help("Tree template files, same as the positional inputs")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .action(ArgAction::Append),
        )
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        Self::augment_args(cmd)
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if no input is given
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
