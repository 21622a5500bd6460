use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::indexer::{ConversationIndex, build_index};
use crate::models::Message;

#[derive(Parser)]
#[command(name = "sms-backup-explorer")]
#[command(version = "0.1.0")]
#[command(about = "Browse and export SMS Backup & Restore XML exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the conversation partners found in a backup
    Contacts {
        /// Path to the backup XML file
        file: PathBuf,
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Show statistics about a backup
    Stats {
        /// Path to the backup XML file
        file: PathBuf,
    },
    /// Print one conversation (or all messages) as text
    Show {
        /// Path to the backup XML file
        file: PathBuf,
        /// Conversation partner; all messages when omitted
        #[arg(long)]
        contact: Option<String>,
        /// Print messages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a conversation to a text file and extract its attachments
    Export {
        /// Path to the backup XML file
        file: PathBuf,
        /// Output text file
        #[arg(short, long)]
        output: PathBuf,
        /// Conversation partner; all messages when omitted
        #[arg(long)]
        contact: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Contacts { file, json } => show_contacts(file, *json),
        Commands::Stats { file } => show_stats(file),
        Commands::Show { file, contact, json } => {
            show_conversation(file, contact.as_deref(), *json)
        }
        Commands::Export { file, output, contact } => {
            export_conversation(file, output, contact.as_deref())
        }
    }
}

/// Resolve the selected message sequence, failing on an unknown contact
fn select<'a>(index: &'a ConversationIndex, contact: Option<&str>) -> Result<&'a [Arc<Message>]> {
    match contact {
        None => Ok(index.all_messages()),
        Some(name) => match index.messages_for(name) {
            Some(messages) => Ok(messages),
            None => bail!("no conversation with '{}' in this backup", name),
        },
    }
}

fn show_contacts(file: &Path, json: bool) -> Result<()> {
    let index = build_index(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(index.contacts())?);
    } else {
        for contact in index.contacts() {
            println!("{}", contact);
        }
    }
    Ok(())
}

fn show_stats(file: &Path) -> Result<()> {
    let index = build_index(file)?;

    let sms = index.all_messages().iter().filter(|m| matches!(***m, Message::Sms(_))).count();
    let mms = index.len() - sms;
    let received = index.all_messages().iter().filter(|m| m.direction().is_received()).count();
    let sent = index.all_messages().iter().filter(|m| m.direction().is_sent()).count();
    let attachments: usize = index.all_messages().iter().map(|m| m.attachments().len()).sum();

    println!("SMS Backup Statistics");
    println!("=====================");
    println!("Total messages: {}", index.len());
    println!("  SMS: {}", sms);
    println!("  MMS: {}", mms);
    println!("  Received: {}, sent: {}", received, sent);
    println!("Attachments: {}", attachments);
    println!("Conversations: {}", index.contacts().len());

    if let Some(oldest) = index.all_messages().first() {
        println!("Oldest message: {}", oldest.readable_date());
    }
    if let Some(newest) = index.all_messages().last() {
        println!("Newest message: {}", newest.readable_date());
    }

    Ok(())
}

fn show_conversation(file: &Path, contact: Option<&str>, json: bool) -> Result<()> {
    let index = build_index(file)?;
    let messages = select(&index, contact)?;

    if json {
        let plain: Vec<&Message> = messages.iter().map(Arc::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&plain)?);
        return Ok(());
    }

    for message in messages {
        println!(
            "[{}] {}, {}",
            message.direction().label(),
            message.readable_date(),
            message.contact()
        );
        if !message.text().is_empty() {
            println!("{}", message.text());
        }
        for part in message.attachments() {
            println!("  attachment ({}): {}", part.content_type, part.file_name);
        }
        println!();
    }
    Ok(())
}

/// Write the conversation as text and decode every attachment into a
/// sibling directory derived from the output name
fn export_conversation(file: &Path, output: &Path, contact: Option<&str>) -> Result<()> {
    let index = build_index(file)?;
    let messages = select(&index, contact)?;

    let mut out = fs::File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;

    let attachments_dir = attachments_dir_for(output);
    let mut dir_created = false;

    for message in messages {
        writeln!(
            out,
            "{} {}, {}:",
            message.direction().label(),
            message.readable_date(),
            message.contact()
        )?;
        writeln!(out, "{}", message.text())?;
        for part in message.attachments() {
            writeln!(out, "+Attachment ({}): {}", part.content_type, part.file_name)?;
            if !dir_created {
                fs::create_dir(&attachments_dir).with_context(|| {
                    format!(
                        "Failed to create attachments directory: {}",
                        attachments_dir.display()
                    )
                })?;
                dir_created = true;
            }
            let payload = part.decode()?;
            let target = attachments_dir.join(&part.file_name);
            fs::write(&target, payload)
                .with_context(|| format!("Failed to write attachment: {}", target.display()))?;
            eprintln!("Saved attachment {}", target.display());
        }
        writeln!(out)?;
    }

    println!("Exported {} messages to {}", messages.len(), output.display());
    Ok(())
}

/// `<output stem>_attachments`, uniquified with a numeric suffix when the
/// directory already exists
fn attachments_dir_for(output: &Path) -> PathBuf {
    let stem = output.with_extension("");
    let base = format!("{}_attachments", stem.display());
    let mut dir = PathBuf::from(&base);
    let mut counter = 1;
    while dir.exists() {
        dir = PathBuf::from(format!("{}_{:02}", base, counter));
        counter += 1;
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachments_dir_derived_from_output_name() {
        let dir = attachments_dir_for(Path::new("/tmp/does-not-exist/chat.txt"));
        assert_eq!(dir, PathBuf::from("/tmp/does-not-exist/chat_attachments"));
    }

    #[test]
    fn test_attachments_dir_uniquified() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("chat.txt");
        let taken = temp.path().join("chat_attachments");
        fs::create_dir(&taken).unwrap();
        let dir = attachments_dir_for(&output);
        assert_eq!(dir, temp.path().join("chat_attachments_01"));
    }
}
