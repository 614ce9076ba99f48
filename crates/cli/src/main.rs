//! Zima CLI
//!
//! Command-line driver for running `.zima` scripts and for building/
//! extracting the Huffman archive format, matching the teacher's
//! `seqc`/`seqr` binaries in shape: a `clap` subcommand enum, one
//! `run_*` function per subcommand, `tracing-subscriber` installed
//! once at startup from `RUST_LOG`.

mod config;

use clap::{Parser as ClapParser, Subcommand};
use config::ProjectConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use zima_runtime::Writers;

#[derive(ClapParser)]
#[command(name = "zima")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Zima scripting language interpreter and archive toolchain", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a .zima script
    Run {
        /// Input script file. Falls back to zima.toml's `entrypoint`
        /// in the current directory when omitted.
        script: Option<PathBuf>,
    },

    /// Build a Huffman archive (.zax) from a directory
    Archive {
        /// Directory to archive
        input_dir: PathBuf,
        /// Output archive path
        output: PathBuf,
    },

    /// Extract a Huffman archive (.zax) into a directory
    Extract {
        /// Archive file to extract
        archive: PathBuf,
        /// Directory to extract into
        output_dir: PathBuf,
    },

    /// Huffman-compress a single file (.zc stream)
    Compress {
        input: PathBuf,
        output: PathBuf,
    },

    /// Huffman-decompress a single file
    Decompress {
        input: PathBuf,
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run { script } => run_run(script),
        Commands::Archive { input_dir, output } => run_archive(&input_dir, &output),
        Commands::Extract { archive, output_dir } => run_extract(&archive, &output_dir),
        Commands::Compress { input, output } => run_compress(&input, &output),
        Commands::Decompress { input, output } => run_decompress(&input, &output),
    };
    process::exit(code);
}

fn run_run(script: Option<PathBuf>) -> i32 {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let script_path = match resolve_script_path(script, &cwd) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("zima: {msg}");
            return 1;
        }
    };

    let source = match fs::read_to_string(&script_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("zima: could not read {}: {e}", script_path.display());
            return 1;
        }
    };

    let writers = Writers::stdio();
    match zima_runtime::run_source(&source, writers) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("zima: {e}");
            1
        }
    }
}

fn resolve_script_path(script: Option<PathBuf>, cwd: &Path) -> Result<PathBuf, String> {
    if let Some(path) = script {
        return Ok(path);
    }
    let config = ProjectConfig::load_from_dir(cwd).map_err(|e| e.to_string())?;
    config
        .and_then(|c| c.entrypoint)
        .ok_or_else(|| "no script given and no zima.toml entrypoint found".to_string())
}

fn run_archive(input_dir: &Path, output: &Path) -> i32 {
    let file = match fs::File::create(output) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("zima: could not create {}: {e}", output.display());
            return 1;
        }
    };
    let mut writer = std::io::BufWriter::new(file);
    match zima_codec::archive::encode(input_dir, &mut writer) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("zima: {e}");
            1
        }
    }
}

fn run_extract(archive: &Path, output_dir: &Path) -> i32 {
    let file = match fs::File::open(archive) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("zima: could not open {}: {e}", archive.display());
            return 1;
        }
    };
    let mut reader = std::io::BufReader::new(file);
    if let Err(e) = fs::create_dir_all(output_dir) {
        eprintln!("zima: could not create {}: {e}", output_dir.display());
        return 1;
    }
    match zima_codec::archive::decode(&mut reader, output_dir) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("zima: {e}");
            1
        }
    }
}

fn run_compress(input: &Path, output: &Path) -> i32 {
    let data = match fs::read(input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("zima: could not read {}: {e}", input.display());
            return 1;
        }
    };
    let compressed = zima_codec::compress(&data);
    match fs::write(output, compressed) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("zima: could not write {}: {e}", output.display());
            1
        }
    }
}

fn run_decompress(input: &Path, output: &Path) -> i32 {
    let data = match fs::read(input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("zima: could not read {}: {e}", input.display());
            return 1;
        }
    };
    match zima_codec::decompress(&data) {
        Ok(original) => match fs::write(output, original) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("zima: could not write {}: {e}", output.display());
                1
            }
        },
        Err(e) => {
            eprintln!("zima: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_script_path_prefers_explicit_argument() {
        let cwd = tempfile::tempdir().unwrap();
        let explicit = PathBuf::from("explicit.zima");
        assert_eq!(resolve_script_path(Some(explicit.clone()), cwd.path()).unwrap(), explicit);
    }

    #[test]
    fn resolve_script_path_falls_back_to_project_config() {
        let cwd = tempfile::tempdir().unwrap();
        fs::write(cwd.path().join("zima.toml"), "entrypoint = \"main.zima\"\n").unwrap();
        assert_eq!(resolve_script_path(None, cwd.path()).unwrap(), PathBuf::from("main.zima"));
    }

    #[test]
    fn resolve_script_path_errors_with_no_argument_and_no_config() {
        let cwd = tempfile::tempdir().unwrap();
        assert!(resolve_script_path(None, cwd.path()).is_err());
    }

    #[test]
    fn archive_then_extract_round_trips_a_directory() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.txt"), "hello world").unwrap();
        let archive_path = src.path().join("out.zax");

        assert_eq!(run_archive(src.path(), &archive_path), 0);

        let dst = tempfile::tempdir().unwrap();
        assert_eq!(run_extract(&archive_path, dst.path()), 0);
        assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "hello world");
    }

    #[test]
    fn compress_then_decompress_round_trips_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        fs::write(&input, "the quick brown fox jumps over the lazy dog").unwrap();
        let compressed = dir.path().join("in.zc");
        let roundtripped = dir.path().join("out.txt");

        assert_eq!(run_compress(&input, &compressed), 0);
        assert_eq!(run_decompress(&compressed, &roundtripped), 0);
        assert_eq!(fs::read_to_string(&roundtripped).unwrap(), fs::read_to_string(&input).unwrap());
    }

    #[test]
    fn run_reports_script_errors_as_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("bad.zima");
        fs::write(&script, "let x = ;").unwrap();
        assert_eq!(run_run(Some(script)), 1);
    }

    #[test]
    fn run_executes_a_script_successfully() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("good.zima");
        fs::write(&script, "let x = 1 + 2; println(x);").unwrap();
        assert_eq!(run_run(Some(script)), 0);
    }
}
