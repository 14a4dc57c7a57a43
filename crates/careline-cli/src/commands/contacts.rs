//! Emergency contact commands for CLI.

use std::path::Path;

use careline_core::{Config, EmergencyContact};
use clap::Subcommand;

use super::CommandResult;

#[derive(Subcommand)]
pub enum ContactsAction {
    /// List emergency contacts in notification order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a contact at the end of the list
    Add {
        /// Full name
        #[arg(long)]
        name: String,
        /// Phone number
        #[arg(long)]
        phone: String,
        /// Relationship to you (e.g. Spouse, Physician)
        #[arg(long)]
        relationship: String,
        /// Email address
        #[arg(long)]
        email: Option<String>,
    },
    /// Remove a contact by ID
    Remove {
        /// Contact ID
        id: String,
    },
}

pub fn run(action: ContactsAction, config_path: &Path) -> CommandResult {
    let mut config = Config::load_from(config_path)?;

    match action {
        ContactsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config.contacts)?);
            } else if config.contacts.is_empty() {
                println!("No emergency contacts configured.");
            } else {
                for contact in &config.contacts {
                    println!(
                        "{:<38} {:<4} {} ({})  {}",
                        contact.id,
                        contact.initials(),
                        contact.name,
                        contact.relationship,
                        contact.phone
                    );
                }
            }
        }
        ContactsAction::Add {
            name,
            phone,
            relationship,
            email,
        } => {
            let mut contact = EmergencyContact::new(name, phone, relationship);
            if let Some(email) = email {
                contact = contact.with_email(email);
            }
            let id = contact.id.clone();
            config.contacts.push(contact);
            config.save_to(config_path)?;
            println!("Contact added: {id}");
        }
        ContactsAction::Remove { id } => {
            let removed = config
                .contacts
                .remove(&id)
                .ok_or_else(|| format!("contact not found: {id}"))?;
            config.save_to(config_path)?;
            println!("Contact removed: {} ({})", removed.name, removed.id);
        }
    }
    Ok(())
}
