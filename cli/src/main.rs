mod config;
mod search;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use templates::{SessionOptions, TemplateManager};
use tracing::debug;

#[derive(Parser)]
#[command(name = "jstv", version, about = "Structural search over JavaScript with syntax templates")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Session config file (defaults to ./jstv.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Parse templates and sources as modules
    #[arg(long, global = true)]
    module: bool,

    /// ECMAScript version, as a year (2018) or edition number (9)
    #[arg(long, global = true)]
    ecma_version: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find every match of a template in JavaScript files
    Search(SearchArgs),

    /// Parse a JavaScript file and report syntax errors
    Parse(ParseArgs),

    /// Run .test.js template fixtures
    Test(TestArgs),
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Template source; `${name}` introduces a variable
    template: String,

    /// Files to search
    #[arg(required = true)]
    files: Vec<String>,

    /// Treat `${NAME}` as a spread variable. Repeatable.
    #[arg(long, value_name = "NAME")]
    spread: Vec<String>,

    /// Treat `${NAME}` as a declaration group variable. Repeatable.
    #[arg(long, value_name = "NAME")]
    group: Vec<String>,

    /// Print only the number of matches per file
    #[arg(long)]
    count: bool,
}

#[derive(clap::Args)]
struct ParseArgs {
    /// JavaScript source file
    file: String,

    /// Dump the parsed tree
    #[arg(long)]
    ast: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.js file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let overrides = config::Overrides {
        module: cli.module,
        ecma_version: cli.ecma_version,
    };
    let options = match config::load(cli.config.as_deref(), overrides) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };
    debug!(?options, "session options");

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match cli.command {
        Command::Search(args) => process::exit(do_search(args, options, color_choice)),
        Command::Parse(args) => process::exit(do_parse(args, options, color_choice)),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            process::exit(test_runner::run_tests(path, options, cli.no_color, &args.category));
        }
    }
}

/// Install a stderr subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=templates=trace jstv search ...`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn do_search(args: SearchArgs, options: SessionOptions, color_choice: ColorChoice) -> i32 {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let mut files = SimpleFiles::new();

    let mut manager = TemplateManager::with_options(options);
    let expanded = search::expand(&mut manager, &args.template, &args.spread, &args.group);
    let template_id = files.add("<template>".to_string(), expanded.source.clone());
    let template = match manager.template(&expanded.source) {
        Ok(template) => template,
        Err(error) => {
            let diagnostic = error.to_diagnostic(template_id);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            return 2;
        }
    };

    let mut exit_code = 0;
    for path in &args.files {
        let Some((file_id, tree)) = read_and_parse(path, options, &mut files, &writer, &config) else {
            exit_code = 2;
            continue;
        };
        let found = match search::find(&template, &expanded.names, &tree) {
            Ok(found) => found,
            Err(error) => {
                eprintln!("error: {}", error);
                return 2;
            }
        };

        if args.count {
            println!("{}: {}", path, found.len());
            continue;
        }
        for found in &found {
            let mut labels = vec![Label::primary(file_id, found.span.clone())];
            let mut notes = Vec::new();
            for (name, span) in &found.captures {
                match span {
                    Some(span) => labels.push(Label::secondary(file_id, span.clone()).with_message(name.clone())),
                    None => notes.push(format!("`{}` captured nothing", name)),
                }
            }
            let diagnostic = Diagnostic::note()
                .with_message("template matched")
                .with_labels(labels)
                .with_notes(notes);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
        }
    }
    exit_code
}

fn do_parse(args: ParseArgs, options: SessionOptions, color_choice: ColorChoice) -> i32 {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let mut files = SimpleFiles::new();

    let Some((_, tree)) = read_and_parse(&args.file, options, &mut files, &writer, &config) else {
        return 1;
    };
    if args.ast {
        println!("{:#?}", tree);
    } else {
        eprintln!("ok: {} parsed successfully", args.file);
    }
    0
}

/// Read `path`, register it with `files` and parse it. Read and syntax errors
/// are reported before returning None.
fn read_and_parse(
    path: &str,
    options: SessionOptions,
    files: &mut SimpleFiles<String, String>,
    writer: &StandardStream,
    config: &term::Config,
) -> Option<(usize, estree::Node)> {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path, e);
            return None;
        }
    };
    let file_id = files.add(path.to_string(), source.clone());
    let parser = estree::Parser::new(source, file_id).with_options(options.parser);
    match parser.parse() {
        Ok(tree) => Some((file_id, tree)),
        Err(error) => {
            let diagnostic = error.to_diagnostic();
            let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
            None
        }
    }
}
