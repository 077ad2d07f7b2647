use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use cipherbox_stream::crypto::{bytes_to_hex, encrypt_aes_ctr, generate_file_key, generate_iv};
use cipherbox_stream::stream::LoggingObserver;
use cipherbox_stream::{EncryptedDataSourceFactory, ReadOutcome, StreamConfig};

/// Size of each plaintext chunk written while decrypting.
const COPY_CHUNK: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(name = "cipherbox-stream", about = "Seekable AES-CTR file decryption")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct KeyArgs {
    /// Hex-encoded AES key (falls back to CIPHERBOX_STREAM_KEY)
    #[arg(long)]
    key: Option<String>,
    /// Hex-encoded 16-byte initial counter (falls back to CIPHERBOX_STREAM_IV)
    #[arg(long)]
    iv: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a random key and IV as hex
    Keygen {
        /// Key size in bytes: 16, 24 or 32
        #[arg(long, default_value_t = 32, value_parser = parse_key_size)]
        key_size: usize,
    },
    /// Encrypt a whole file with AES-CTR
    Encrypt {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Decrypt a byte range of an encrypted file
    Decrypt {
        #[arg(long)]
        input: PathBuf,
        /// Plaintext offset to start at
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Number of bytes to decrypt (default: to end of file)
        #[arg(long)]
        length: Option<u64>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        keys: KeyArgs,
    },
}

fn parse_key_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n @ (16 | 24 | 32)) => Ok(n),
        _ => Err(format!("invalid key size '{}' (expected 16, 24 or 32)", s)),
    }
}

fn load_config(keys: &KeyArgs) -> Result<StreamConfig, Box<dyn std::error::Error>> {
    let config = match (&keys.key, &keys.iv) {
        (Some(key), Some(iv)) => StreamConfig::from_hex(key, iv)?,
        (None, None) => StreamConfig::from_env()?,
        _ => return Err("--key and --iv must be given together".into()),
    };
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Keygen { key_size } => {
            let key = generate_file_key(key_size);
            println!("key: {}", bytes_to_hex(key.as_bytes()));
            println!("iv:  {}", bytes_to_hex(&generate_iv()));
        }
        Command::Encrypt { input, output, keys } => {
            let config = load_config(&keys)?;
            let plaintext = fs::read(&input)?;
            let ciphertext = encrypt_aes_ctr(&plaintext, &config.key, &config.iv)?;
            fs::write(&output, ciphertext)?;
            log::info!("Encrypted {} bytes to {}", plaintext.len(), output.display());
        }
        Command::Decrypt {
            input,
            offset,
            length,
            output,
            keys,
        } => {
            let config = load_config(&keys)?;
            let factory =
                EncryptedDataSourceFactory::new(config).with_observer(Arc::new(LoggingObserver));
            let mut source = factory.create_data_source(&input)?;

            let mut sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
                None => Box::new(io::stdout().lock()),
            };

            source.open(offset, length)?;
            let mut buf = vec![0u8; COPY_CHUNK];
            let mut written = 0u64;
            while let ReadOutcome::Data(n) = source.read(&mut buf)? {
                sink.write_all(&buf[..n])?;
                written += n as u64;
            }
            sink.flush()?;
            source.close()?;
            log::info!("Decrypted {} bytes from offset {}", written, offset);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
