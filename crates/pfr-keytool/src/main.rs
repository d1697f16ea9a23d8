//! Offline key tooling for PFR release builds.
//!
//! The release pipeline runs this once per release:
//! - `pfr-keytool keygen` - generate the P-256 signing key (done once, offline)
//! - `pfr-keytool seal` - encrypt the key PEM into the embeddable blob
//! - `pfr-keytool unseal` - sanity-check that a blob opens for a given identity

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pfr_auth::{ArtifactIdentity, RequestSigner, WrappingKey, open_key, seal_key};

/// PFR release key tooling.
#[derive(Parser)]
#[command(name = "pfr-keytool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh P-256 signing key as PKCS#8 PEM.
    ///
    /// Refuses to overwrite an existing key file. Prints the compressed SEC1
    /// public key, which is what the server configuration needs.
    Keygen {
        /// Where to write the private key PEM.
        #[arg(long)]
        out: PathBuf,
    },

    /// Seal a private key PEM into the embeddable `IV || ciphertext` blob.
    Seal {
        /// Path to the private key PEM.
        #[arg(long)]
        key: PathBuf,
        /// Product name the blob is sealed for.
        #[arg(long)]
        product: String,
        /// Release version the blob is sealed for.
        #[arg(long)]
        version: String,
        /// Where to write the sealed blob.
        #[arg(long)]
        out: PathBuf,
    },

    /// Open a sealed blob and report what it contains.
    Unseal {
        /// Path to the sealed blob.
        #[arg(long)]
        blob: PathBuf,
        /// Product name to derive the wrapping key from.
        #[arg(long)]
        product: String,
        /// Release version to derive the wrapping key from.
        #[arg(long)]
        version: String,
        /// Print the recovered private key PEM instead of just the public key.
        #[arg(long)]
        show_pem: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs to stderr so stdout stays clean for key material and hex output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen { out } => keygen(&out),
        Commands::Seal {
            key,
            product,
            version,
            out,
        } => seal(&key, &product, &version, &out),
        Commands::Unseal {
            blob,
            product,
            version,
            show_pem,
        } => unseal(&blob, &product, &version, show_pem),
    }
}

fn keygen(out: &PathBuf) -> anyhow::Result<()> {
    if out.exists() {
        anyhow::bail!(
            "key file already exists at {}; remove it first or pick another --out",
            out.display()
        );
    }

    let signer = RequestSigner::generate();
    let pem = signer.to_pkcs8_pem()?;
    std::fs::write(out, pem.as_bytes())
        .with_context(|| format!("writing key to {}", out.display()))?;

    tracing::info!(path = %out.display(), "wrote private key");
    println!("public key (SEC1, compressed): {}", signer.public_key_hex());
    println!("keep the private key out of version control; only the sealed blob ships");
    Ok(())
}

fn seal(key: &PathBuf, product: &str, version: &str, out: &PathBuf) -> anyhow::Result<()> {
    let pem = std::fs::read_to_string(key)
        .with_context(|| format!("reading key from {}", key.display()))?;

    // Fail before sealing if the PEM is not a usable signing key.
    let signer = RequestSigner::from_pem(&pem).context("key file is not a valid P-256 key")?;

    let identity = ArtifactIdentity::new(product, version);
    let blob = seal_key(&pem, &identity.wrapping_key());
    std::fs::write(out, &blob).with_context(|| format!("writing blob to {}", out.display()))?;

    tracing::info!(
        product,
        version,
        blob_len = blob.len(),
        "sealed signing key"
    );
    println!("sealed {} -> {} ({} bytes)", key.display(), out.display(), blob.len());
    println!("public key (SEC1, compressed): {}", signer.public_key_hex());
    Ok(())
}

fn unseal(blob: &PathBuf, product: &str, version: &str, show_pem: bool) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(blob).with_context(|| format!("reading blob from {}", blob.display()))?;

    let key: WrappingKey = ArtifactIdentity::new(product, version).wrapping_key();
    let pem = open_key(&bytes, &key).context("blob did not open for this product/version")?;
    let signer = RequestSigner::from_pem(&pem).context("recovered text is not a usable key")?;

    println!("blob opens for {product} {version}");
    println!("public key (SEC1, compressed): {}", signer.public_key_hex());
    if show_pem {
        println!("{pem}");
    }
    Ok(())
}
