use crate::cli::HistoryCommand;
use crate::commands::{at_position, terminal_confirm};
use crate::error::Result;
use crate::session::ChatLog;
use crate::storage::{ChatExchange, KeyValueStore};
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

/// Handle history commands
///
/// Works on the stored log directly, so no provider or API key is needed.
pub fn handle_history(command: HistoryCommand, store: Arc<dyn KeyValueStore>) -> Result<()> {
    let mut log = ChatLog::load(store);

    match command {
        HistoryCommand::List { pinned } => {
            let (entries, label) = if pinned {
                (log.pinned(), "Pinned Chats")
            } else {
                (log.history(), "Chat History")
            };

            if entries.is_empty() {
                println!("{}", format!("No {} found.", label.to_lowercase()).yellow());
                return Ok(());
            }

            println!("\n{}:", label);
            exchange_table(entries, log.pinned()).printstd();
            println!();
            println!(
                "Use {} to read a chat in full.",
                "askverse history show <N>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { index, pinned } => {
            let entries = if pinned { log.pinned() } else { log.history() };
            let exchange = at_position(entries, index, "chat")?;
            print_exchange(exchange, log.is_pinned(exchange));
        }
        HistoryCommand::Pin { index, pinned } => {
            let exchange = if pinned {
                at_position(log.pinned(), index, "pinned chat")?.clone()
            } else {
                at_position(log.history(), index, "chat")?.clone()
            };
            if log.toggle_pin(&exchange) {
                println!("{}", format!("Pinned \"{}\"", exchange.title()).green());
            } else {
                println!("{}", format!("Unpinned \"{}\"", exchange.title()).green());
            }
        }
        HistoryCommand::Delete { index, yes } => {
            let exchange = at_position(log.history(), index, "chat")?.clone();
            let removed = if yes {
                log.delete(&exchange, &|_: &str| true)
            } else {
                log.delete(&exchange, &terminal_confirm)
            };
            report_deletion(removed);
        }
    }

    Ok(())
}

/// Table of exchanges with 1-based positions
///
/// Questions are shortened to their title; a star marks pinned chats.
pub fn exchange_table(entries: &[ChatExchange], pinned: &[ChatExchange]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.set_titles(prettytable::row!["#".bold(), "Question".bold(), "Pinned".bold()]);

    for (i, exchange) in entries.iter().enumerate() {
        let star = if pinned.contains(exchange) { "*" } else { "" };
        table.add_row(prettytable::row![
            (i + 1).to_string().cyan(),
            exchange.title(),
            star
        ]);
    }

    table
}

/// Print one exchange in full
pub fn print_exchange(exchange: &ChatExchange, pinned: bool) {
    let marker = if pinned { " (pinned)" } else { "" };
    println!("\n{}{}", "Question:".bold(), marker.yellow());
    println!("{}\n", exchange.question);
    println!("{}", "Answer:".bold());
    println!("{}\n", exchange.answer);
}

/// Print the result of a delete request
pub fn report_deletion(removed: usize) {
    match removed {
        0 => println!("{}", "Chat kept.".yellow()),
        1 => println!("{}", "Deleted 1 chat".green()),
        n => println!(
            "{}",
            format!("Deleted {} chats with the same question and answer", n).green()
        ),
    }
}
