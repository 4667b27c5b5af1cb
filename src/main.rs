// Run using: cargo run --bin cubecrypt --features="cli" -- encrypt in out

use cubecrypt::pipeline::{self, Mode};
use cubecrypt::prng::SystemRng;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rpassword::prompt_password;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

const PASSWORD_ENV: &str = "CUBECRYPT_PASSWORD";

/// Password based file encryption (CubeHash + RC4 + XTEA).
///
/// There is no integrity check: a wrong password decrypts to garbage
/// without any error.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log progress (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt INPUT into a new file OUTPUT
    Encrypt { input: PathBuf, output: PathBuf },
    /// Decrypt INPUT into a new file OUTPUT
    Decrypt { input: PathBuf, output: PathBuf },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

// Asks twice when encrypting: a typo would otherwise make the file unreadable.
fn read_password(mode: Mode) -> Result<Zeroizing<String>> {
    if let Ok(pwd) = std::env::var(PASSWORD_ENV) {
        info!("using password from ${}", PASSWORD_ENV);
        return Ok(Zeroizing::new(pwd));
    }
    let pwd = Zeroizing::new(prompt_password("Enter password: ").context("reading password")?);
    if mode == Mode::Encrypt {
        let again = Zeroizing::new(prompt_password("Confirm password: ").context("reading password")?);
        if *pwd != *again {
            bail!("passwords do not match");
        }
        if pwd.is_empty() {
            bail!("refusing to encrypt with an empty password");
        }
    }
    Ok(pwd)
}

fn process(mode: Mode, input: &Path, output: &Path) -> Result<()> {
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    let in_file = File::open(input).with_context(|| format!("opening {}", input.display()))?;

    let password = read_password(mode)?;

    // everything goes to a temporary file next to OUTPUT, renamed on success
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;

    let n = pipeline::run(mode, password.as_bytes(), in_file, tmp.as_file_mut(), &mut SystemRng)
        .with_context(|| format!("processing {}", input.display()))?;

    tmp.persist_noclobber(output)
        .with_context(|| format!("writing {}", output.display()))?;

    match mode {
        Mode::Encrypt => info!("encrypted {} bytes into {}", n, output.display()),
        Mode::Decrypt => info!("decrypted {} bytes into {}", n, output.display()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Encrypt { input, output } => process(Mode::Encrypt, &input, &output),
        Command::Decrypt { input, output } => process(Mode::Decrypt, &input, &output),
    }
}
