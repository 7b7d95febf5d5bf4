//! MiniC Compiler Driver
//!
//! Command-line front of the compiler. The lexer and parser run outside
//! this program; `mcc` reads the parse tree they produce as JSON, builds
//! the AST and writes the generated assembly.

use clap::{Parser, Subcommand};
use log::{debug, info};
use mcc_codegen::{generate_assembly, CodegenOptions, LineEnding};
use mcc_frontend::Frontend;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mcc")]
#[command(about = "MiniC Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log pipeline progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON parse tree to assembly
    Compile {
        /// Input parse tree (JSON)
        input: PathBuf,

        /// Output assembly file, defaults to the input with an .asm extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Code generation options (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Procedure named by the END directive
        #[arg(long)]
        entry: Option<String>,

        /// Size given to the .stack directive
        #[arg(long)]
        stack_size: Option<u32>,

        /// Terminate lines with CR LF
        #[arg(long)]
        crlf: bool,

        /// Print the assembly to stdout instead of writing a file
        #[arg(long)]
        print: bool,
    },

    /// Build the AST of a JSON parse tree without generating code
    Check {
        /// Input parse tree (JSON)
        input: PathBuf,

        /// Print the AST as JSON
        #[arg(long)]
        dump: bool,
    },
}

/// Overrides given on the command line, applied on top of the config file
#[derive(Debug, Default)]
struct Overrides {
    entry: Option<String>,
    stack_size: Option<u32>,
    crlf: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            config,
            entry,
            stack_size,
            crlf,
            print,
        } => {
            let overrides = Overrides { entry, stack_size, crlf };
            load_options(config.as_deref(), overrides).and_then(|options| {
                let asm = compile_file(&input, &options)?;
                if print {
                    print!("{}", asm);
                    Ok(())
                } else {
                    let path = output.unwrap_or_else(|| input.with_extension("asm"));
                    fs::write(&path, asm)?;
                    println!("Assembly written to: {}", path.display());
                    Ok(())
                }
            })
        }
        Commands::Check { input, dump } => check_file(&input, dump),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Options from the optional config file, then the command-line overrides
fn load_options(config: Option<&Path>, overrides: Overrides) -> Result<CodegenOptions, Box<dyn Error>> {
    let mut options = match config {
        Some(path) => {
            debug!("loading options from {}", path.display());
            let text = fs::read_to_string(path)?;
            CodegenOptions::from_json(&text).map_err(|e| format!("invalid config {}: {}", path.display(), e))?
        }
        None => CodegenOptions::default(),
    };

    if let Some(entry) = overrides.entry {
        options.entry_point = entry;
    }
    if let Some(size) = overrides.stack_size {
        options.stack_size = size;
    }
    if overrides.crlf {
        options.line_ending = LineEnding::CrLf;
    }
    Ok(options)
}

fn compile_file(input: &Path, options: &CodegenOptions) -> Result<String, Box<dyn Error>> {
    info!("compiling {}", input.display());
    let json = fs::read_to_string(input)?;
    let ast = Frontend::build_from_json(&json, &input.display().to_string())?;
    Ok(generate_assembly(&ast, options)?)
}

fn check_file(input: &Path, dump: bool) -> Result<(), Box<dyn Error>> {
    let json = fs::read_to_string(input)?;
    let ast = Frontend::build_from_json(&json, &input.display().to_string())?;
    if dump {
        println!("{}", serde_json::to_string_pretty(&ast)?);
    }
    println!("{}: {} AST nodes", input.display(), ast.len());
    Ok(())
}
