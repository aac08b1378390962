use colored::*;
use reflectiv_core::{ClientError, Message, Role, RoleplayReply, StatusReport};

pub fn print_message(message: &Message) {
    let speaker = match message.role {
        Role::User => "You".bold().cyan(),
        Role::Assistant => "Coach".bold().green(),
        Role::System => "System".bold().dimmed(),
    };
    println!("\n{}: {}", speaker, message.content);

    if let Some(feedback) = &message.feedback {
        if let Some(score) = feedback.eq_score {
            println!("  {} {}", "EQ Score:".bold().magenta(), score);
        }
        if !feedback.frameworks.is_empty() {
            println!("  {} {}", "Frameworks:".bold().blue(), feedback.frameworks.join(", "));
        }
        for suggestion in &feedback.suggestions {
            println!("  {} {}", "•".yellow(), suggestion);
        }
    }
    println!();
}

pub fn print_roleplay_reply(reply: &RoleplayReply) {
    for message in &reply.messages {
        print_message(message);
    }

    if !reply.extra.is_empty() {
        println!("{}", "Analysis".bold().blue());
        println!("{}", "=".repeat(30).dimmed());
        for (key, value) in &reply.extra {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
            };
            println!("{} {}", format!("{}:", key).bold().yellow(), rendered);
        }
        println!();
    }
}

pub fn print_status(url: &str, report: &StatusReport) {
    if report.is_online() {
        println!(
            "{} {} ({}ms)",
            "● Online".green().bold(),
            url.dimmed(),
            report.latency_ms
        );
    } else {
        println!("{} {}", "● Offline".red().bold(), url.dimmed());
        println!("{}", "The chat worker is unreachable; coaching features may not work.".yellow());
    }
}

pub fn print_error(error: &ClientError) {
    match error {
        ClientError::Cancelled => println!("{}", "Request cancelled".yellow()),
        other => println!("{}: {}", "Error from chat worker".red(), other),
    }
}
