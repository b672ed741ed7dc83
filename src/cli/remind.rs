//! Reminder and WhatsApp CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_reminder_report;
use crate::error::PayupResult;
use crate::notify::{LogGateway, TwilioGateway};
use crate::services::ReminderService;
use crate::storage::Storage;

use super::resolve_group;

/// WhatsApp gateway subcommands
#[derive(Subcommand)]
pub enum WhatsAppCommands {
    /// Check that the configured Twilio credentials work
    Test,
}

/// Send payment reminders to everyone who owes money in a group
pub fn handle_remind_command(
    storage: &Storage,
    settings: &Settings,
    group: &str,
    dry_run: bool,
) -> PayupResult<()> {
    let group = resolve_group(storage, group)?;
    let symbol = settings.currency_symbol.as_str();

    if dry_run {
        let gateway = LogGateway::new();
        let report = ReminderService::new(storage, &gateway, symbol).send_reminders(group.id)?;
        print!("{}", format_reminder_report(&report, symbol));

        for (to, body) in gateway.sent()? {
            println!("\n--- to {} ---\n{}", to, body);
        }
        return Ok(());
    }

    let gateway = TwilioGateway::from_settings(&settings.whatsapp)?;
    let report = ReminderService::new(storage, &gateway, symbol)
        .send_reminders(group.id)?;
    print!("{}", format_reminder_report(&report, symbol));

    Ok(())
}

/// Handle a WhatsApp gateway command
pub fn handle_whatsapp_command(settings: &Settings, cmd: WhatsAppCommands) -> PayupResult<()> {
    match cmd {
        WhatsAppCommands::Test => {
            let gateway = TwilioGateway::from_settings(&settings.whatsapp)?;
            let account = gateway.check_connection()?;

            println!("Twilio connection OK");
            println!("  Account: {}", account.sid);
            if let Some(name) = &account.friendly_name {
                println!("  Name:    {}", name);
            }
            if let Some(status) = &account.status {
                println!("  Status:  {}", status);
            }
            println!("  Sender:  {}", settings.whatsapp.from_number);
        }
    }

    Ok(())
}
