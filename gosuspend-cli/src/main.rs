use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gosuspend")]
#[command(version = "0.2.0")]
#[command(about = "SL-to-cooperative-TL lowering compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower one or more packages to TL source
    Compile {
        /// Package paths to compile
        #[arg(value_name = "PACKAGE", required = true)]
        packages: Vec<String>,

        /// Output directory; one `<package>.ts` file is written per package
        #[arg(long, value_name = "ROOT")]
        out: Option<PathBuf>,

        /// Directory holding the handwritten-runtime `meta.json` tree
        #[arg(long, value_name = "DIR", default_value = "runtime-meta")]
        metadata_root: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    let result = match cli.command {
        Commands::Compile { packages, out, metadata_root } => run_compile(&packages, out.as_deref(), &metadata_root),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Lowers each package path. The shipped CLI has no real SL front end to
/// discover packages from disk with — it drives the in-memory demonstration
/// fixture (`gosuspend_compiler::demo_package`) under each requested name, the
/// same stand-in the WASM shim uses. A real deployment wires its own
/// `TypeOracle`/`Program` pair in here instead.
fn run_compile(packages: &[String], out: Option<&std::path::Path>, metadata_root: &std::path::Path) -> Result<()> {
    let root = gosuspend_compiler::config::RuntimeMetadataRoot::new(metadata_root);

    if let Some(dir) = out {
        std::fs::create_dir_all(dir)?;
    }

    for package_path in packages {
        log::info!("compiling package {package_path}");
        let (program, objects, types) = gosuspend_compiler::demo_package(package_path);

        let analysis = gosuspend_compiler::analyze_package(package_path, &program, &objects, &types, &root)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let output = gosuspend_compiler::compile_package(package_path, &program, &objects, &types, &analysis)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        match out {
            Some(dir) => {
                let file_name = package_path.replace('/', "_");
                let path = dir.join(format!("{file_name}.ts"));
                std::fs::write(&path, &output)?;
                println!("wrote {}", path.display());
            }
            None => {
                println!("{output}");
            }
        }
    }

    Ok(())
}
