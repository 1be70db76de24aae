//! GhostPad CLI - drive the cryptographic core from the command line
//!
//! Session encryption lives only as long as this process, so the
//! `session-demo` command shows the full lifecycle in a single run. Password
//! hashing, the master-password gate and sealed exports persist through the
//! data directory.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use ghostpad_core::{
    ExportBundle, ExportedNote, FileStore, PasswordCipher, PasswordCredential, PasswordGate,
    SessionCipher, SettingsManager,
};

/// GhostPad - ephemeral notes with optional password protection
#[derive(Parser, Debug)]
#[command(name = "ghostpad")]
#[command(version)]
#[command(about = "GhostPad cryptographic core - session encryption, password gate, sealed exports")]
struct Args {
    /// Directory for the password record and settings
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Password to use instead of prompting
    #[arg(long, global = true, env = "GHOSTPAD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password and print the record as JSON
    Hash,

    /// Verify a password against a stored hash and salt
    Verify {
        /// Hex-encoded PBKDF2 hash
        #[arg(long)]
        hash: String,
        /// Hex-encoded salt
        #[arg(long)]
        salt: String,
    },

    /// Manage the master password
    Gate {
        #[command(subcommand)]
        action: GateAction,
    },

    /// Encrypt text under a password
    Encrypt {
        /// Text to encrypt
        text: String,
    },

    /// Decrypt a password envelope
    Decrypt {
        /// Base64 envelope
        envelope: String,
    },

    /// Export notes
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Encrypt, decrypt, rotate the key and decrypt again within one session
    SessionDemo {
        /// Text to protect
        #[arg(default_value = "hello ghost")]
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum GateAction {
    /// Set the master password
    Set,
    /// Check a password attempt
    Verify,
    /// Change the master password
    Change {
        /// New password (prompted if omitted)
        #[arg(long, env = "GHOSTPAD_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
    /// Remove the master password
    Remove,
    /// Show whether a master password is configured
    Status,
}

#[derive(Subcommand, Debug)]
enum ExportAction {
    /// Bundle a JSON array of notes, sealing it when exports are encrypted
    Seal {
        /// JSON file containing an array of notes
        #[arg(long)]
        input: PathBuf,
        /// Destination file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Open a sealed export
    Unseal {
        /// File containing the sealed envelope
        #[arg(long)]
        input: PathBuf,
        /// Destination file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => FileStore::default_dir()?,
    };
    let settings = SettingsManager::new(&data_dir);

    // Logs go to stderr so command output on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.get().log_filter)),
        )
        .init();

    match &args.command {
        Command::Hash => {
            let password = read_password(&args, "Password: ")?;
            let record = PasswordCredential::new().hash(&password)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Verify { hash, salt } => {
            let password = read_password(&args, "Password: ")?;
            if !PasswordCredential::new().verify(&password, hash, salt) {
                return Err("Incorrect password".into());
            }
            println!("Password verified");
        }

        Command::Gate { action } => {
            let store = Arc::new(FileStore::with_dir(data_dir.clone())?);
            store.load().await?;
            let gate = PasswordGate::new(store);

            match action {
                GateAction::Set => {
                    let password = read_password(&args, "New master password: ")?;
                    gate.set_password(&password).await?;
                    println!("Master password set");
                }
                GateAction::Verify => {
                    let password = read_password(&args, "Master password: ")?;
                    if !gate.verify_password(&password).await? {
                        return Err("Incorrect password".into());
                    }
                    println!("Unlocked");
                }
                GateAction::Change { new_password } => {
                    let old = read_password(&args, "Current master password: ")?;
                    let new = match new_password {
                        Some(password) => password.clone(),
                        None => rpassword::prompt_password("New master password: ")?,
                    };
                    gate.change_password(&old, &new).await?;
                    println!("Master password changed");
                }
                GateAction::Remove => {
                    let password = read_password(&args, "Master password: ")?;
                    if !gate.verify_password(&password).await? {
                        return Err("Incorrect password".into());
                    }
                    gate.remove_password().await?;
                    println!("Master password removed");
                }
                GateAction::Status => {
                    println!("{}", serde_json::to_string_pretty(&gate.status().await?)?);
                }
            }
        }

        Command::Encrypt { text } => {
            let password = read_password(&args, "Password: ")?;
            println!("{}", PasswordCipher::new().encrypt(text, &password)?);
        }

        Command::Decrypt { envelope } => {
            let password = read_password(&args, "Password: ")?;
            println!("{}", PasswordCipher::new().decrypt(envelope, &password)?);
        }

        Command::Export { action } => match action {
            ExportAction::Seal { input, output } => {
                let notes: Vec<ExportedNote> =
                    serde_json::from_str(&tokio::fs::read_to_string(input).await?)?;
                let bundle = ExportBundle::new(notes);

                let contents = if settings.get().encrypt_exports {
                    let password = read_password(&args, "Export password: ")?;
                    bundle.seal(&password, &PasswordCipher::new())?
                } else {
                    warn!("Writing unencrypted export");
                    bundle.to_json()?
                };
                write_output(output.as_deref(), &contents).await?;
            }
            ExportAction::Unseal { input, output } => {
                let envelope = tokio::fs::read_to_string(input).await?;
                let password = read_password(&args, "Export password: ")?;
                let bundle = ExportBundle::unseal(&envelope, &password, &PasswordCipher::new())?;
                write_output(output.as_deref(), &bundle.to_json()?).await?;
            }
        },

        Command::SessionDemo { text } => {
            let cipher = SessionCipher::new();
            cipher.initialize().await?;

            let envelope = cipher
                .encrypt(text)
                .await?
                .ok_or("Nothing to encrypt: text is empty")?;
            println!("envelope:  {}", envelope);
            println!("decrypted: {}", cipher.decrypt(&envelope).await?);

            cipher.initialize().await?;
            info!("Session key rotated");

            let revealed = cipher.reveal(&envelope).await;
            println!(
                "after rotation:\n{}",
                revealed.display_text(settings.get().include_backup_in_notice)
            );
        }
    }

    Ok(())
}

/// Password from `--password`/`GHOSTPAD_PASSWORD`, otherwise an interactive prompt
fn read_password(args: &Args, prompt: &str) -> std::io::Result<String> {
    match &args.password {
        Some(password) => Ok(password.clone()),
        None => rpassword::prompt_password(prompt),
    }
}

async fn write_output(path: Option<&Path>, contents: &str) -> std::io::Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, contents).await?;
            info!("Wrote {:?}", path);
            Ok(())
        }
        None => {
            println!("{}", contents);
            Ok(())
        }
    }
}
