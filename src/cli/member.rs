//! Member CLI commands
//!
//! Registration, login and lookup of members. Login keeps the member's id in
//! the settings file as the session for later commands.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::crypto::SecretString;
use crate::display::{format_member_balances, format_member_details, format_member_list};
use crate::error::{PayupError, PayupResult};
use crate::services::{BalanceService, MemberService, RegisterMemberInput};
use crate::storage::Storage;

use super::{require_session, resolve_member};

/// Environment variable read for the password when `--password` is omitted
pub const PASSWORD_ENV: &str = "PAYUP_PASSWORD";

/// Member subcommands
#[derive(Subcommand)]
pub enum MemberCommands {
    /// Register a new member
    Register {
        /// Display name
        name: String,
        /// Email address
        #[arg(short, long)]
        email: String,
        /// WhatsApp number, e.g. +919876543210
        #[arg(short, long)]
        whatsapp: String,
        /// Password (prompted for when omitted)
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },
    /// Log in with email or WhatsApp number
    Login {
        /// Email or WhatsApp number
        login: String,
        /// Password (prompted for when omitted)
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out of the current session
    Logout,
    /// Show the logged-in member
    Whoami,
    /// List members, optionally filtered
    List {
        /// Match against name, email or WhatsApp number
        query: Option<String>,
    },
    /// Show member details
    Show {
        /// Member id, email or WhatsApp number
        member: String,
    },
    /// Show your balance in every group
    Balances,
}

/// Handle a member command
///
/// `settings` is the persisted copy; login and logout write it back.
pub fn handle_member_command(
    storage: &Storage,
    settings: &mut Settings,
    cmd: MemberCommands,
) -> PayupResult<()> {
    let service = MemberService::new(storage);

    match cmd {
        MemberCommands::Register {
            name,
            email,
            whatsapp,
            password,
        } => {
            let password = read_password(password, "Choose a password: ")?;
            let member = service.register(RegisterMemberInput {
                name,
                email,
                whatsapp,
                password,
            })?;

            println!("Registered: {} ({})", member.name, member.id);
            println!("Log in with: payup member login {}", member.email);
        }

        MemberCommands::Login { login, password } => {
            let password = read_password(password, "Password: ")?;
            let member = service.authenticate(&login, &password)?;

            settings.active_member = Some(member.id);
            settings.save(storage.paths())?;

            println!("Logged in as {}", member.name);
        }

        MemberCommands::Logout => {
            if settings.active_member.take().is_some() {
                settings.save(storage.paths())?;
                println!("Logged out.");
            } else {
                println!("Not logged in.");
            }
        }

        MemberCommands::Whoami => {
            let member = require_session(storage, settings)?;
            print!("{}", format_member_details(&member));
        }

        MemberCommands::List { query } => {
            let members = service.search(query.as_deref().unwrap_or(""))?;
            println!("{}", format_member_list(&members));
        }

        MemberCommands::Show { member } => {
            let member = resolve_member(storage, &member)?;
            print!("{}", format_member_details(&member));
        }

        MemberCommands::Balances => {
            let member = require_session(storage, settings)?;
            let balances = BalanceService::new(storage).member_balances(member.id)?;
            print!("{}", format_member_balances(&balances, &settings.currency_symbol));
        }
    }

    Ok(())
}

fn read_password(given: Option<String>, prompt: &str) -> PayupResult<SecretString> {
    match given {
        Some(password) => Ok(SecretString::new(password)),
        None => rpassword::prompt_password(prompt)
            .map(SecretString::new)
            .map_err(|e| PayupError::Credential(format!("Failed to read password: {}", e))),
    }
}
