//! Member display formatting

use crate::models::Member;

/// Format a list of members as a table
pub fn format_member_list(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members found.".to_string();
    }

    let name_width = members
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let email_width = members
        .iter()
        .map(|m| m.email.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:<email_width$}  {}\n",
        "ID",
        "Name",
        "Email",
        "WhatsApp",
        name_width = name_width,
        email_width = email_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:-<email_width$}  {:-<14}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
        email_width = email_width,
    ));

    for member in members {
        output.push_str(&format!(
            "{:<12}  {:<name_width$}  {:<email_width$}  {}\n",
            member.id.to_string(),
            member.name,
            member.email,
            member.contact().unwrap_or("-"),
            name_width = name_width,
            email_width = email_width,
        ));
    }

    output
}

/// Format a member's details
pub fn format_member_details(member: &Member) -> String {
    let mut output = String::new();
    output.push_str(&format!("Member:    {}\n", member.name));
    output.push_str(&format!("ID:        {}\n", member.id));
    output.push_str(&format!("Email:     {}\n", member.email));
    output.push_str(&format!("WhatsApp:  {}\n", member.contact().unwrap_or("(none)")));
    output.push_str(&format!(
        "Joined:    {}\n",
        member.created_at.format("%Y-%m-%d")
    ));
    output
}
