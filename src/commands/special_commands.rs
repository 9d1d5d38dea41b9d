//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands available during an interactive
//! chat session. Special commands allow users to:
//! - Start a new chat or restore a saved one
//! - Pin, unpin, and delete saved chats
//! - Toggle the typing effect and the colour theme
//! - Generate, preview, and delete images
//! - Exit the session
//!
//! Command names are case-insensitive. Arguments keep their case, so image
//! prompts are sent exactly as typed. Positions are 1-based, matching the
//! numbered lists the session prints.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// A position argument is not a positive number
    #[error("Invalid position for {command}: {arg} (positions start at 1)")]
    InvalidPosition { command: String, arg: String },

    /// A position does not name an entry in the listed collection
    #[error("No {what} at position {position}")]
    OutOfRange { what: &'static str, position: usize },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session rather than being sent as questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the current question and answer
    NewChat,

    /// List the chat history
    ShowHistory,

    /// List pinned chats
    ShowPinned,

    /// Restore the chat at this history position
    Restore(usize),

    /// Restore the chat at this pinned position
    RestorePinned(usize),

    /// Pin or unpin the chat at this history position
    TogglePin(usize),

    /// Unpin the chat at this pinned position, even if it left the history
    Unpin(usize),

    /// Delete the chat at this history position, after confirmation
    Delete(usize),

    /// Set the typing effect; `None` toggles it
    Typing(Option<bool>),

    /// Generate an image from the prompt
    GenerateImage(String),

    /// List the image gallery
    ShowImages,

    /// Show the image at this gallery position full size
    Preview(usize),

    /// Close the image preview
    ClosePreview,

    /// Delete the image at this gallery position
    DeleteImage(usize),

    /// Switch between the dark and light palettes
    ToggleTheme,

    /// Display provider, typing, and collection sizes
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a question.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is
/// not a valid command, `CommandError::MissingArgument` or
/// `CommandError::InvalidPosition` for missing or malformed arguments, and
/// `CommandError::UnsupportedArgument` for arguments a command does not take.
///
/// # Examples
///
/// ```
/// use askverse::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/restore 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Restore(2));
///
/// let cmd = parse_special_command("/IMAGE A Red Fox").unwrap();
/// assert_eq!(cmd, SpecialCommand::GenerateImage("A Red Fox".to_string()));
///
/// let cmd = parse_special_command("what is rust?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => no_argument(&name, arg, SpecialCommand::NewChat),
        "/history" => no_argument(&name, arg, SpecialCommand::ShowHistory),
        "/pinned" => no_argument(&name, arg, SpecialCommand::ShowPinned),
        "/images" => no_argument(&name, arg, SpecialCommand::ShowImages),
        "/close" => no_argument(&name, arg, SpecialCommand::ClosePreview),
        "/theme" => no_argument(&name, arg, SpecialCommand::ToggleTheme),
        "/status" => no_argument(&name, arg, SpecialCommand::ShowStatus),
        "/help" | "/?" => no_argument(&name, arg, SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        "/restore" => position(&name, arg).map(SpecialCommand::Restore),
        "/restore-pinned" => position(&name, arg).map(SpecialCommand::RestorePinned),
        "/pin" => position(&name, arg).map(SpecialCommand::TogglePin),
        "/unpin" => position(&name, arg).map(SpecialCommand::Unpin),
        "/delete" => position(&name, arg).map(SpecialCommand::Delete),
        "/preview" => position(&name, arg).map(SpecialCommand::Preview),
        "/delete-image" => position(&name, arg).map(SpecialCommand::DeleteImage),

        "/typing" => match arg.to_lowercase().as_str() {
            "" => Ok(SpecialCommand::Typing(None)),
            "on" => Ok(SpecialCommand::Typing(Some(true))),
            "off" => Ok(SpecialCommand::Typing(Some(false))),
            other => Err(CommandError::UnsupportedArgument {
                command: name.clone(),
                arg: other.to_string(),
            }),
        },

        "/image" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: name.clone(),
                    usage: "/image <prompt>".to_string(),
                })
            } else {
                Ok(SpecialCommand::GenerateImage(arg.to_string()))
            }
        }

        _ => Err(CommandError::UnknownCommand(name.clone())),
    }
}

fn no_argument(
    command: &str,
    arg: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        })
    }
}

fn position(command: &str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: format!("{} <number>", command),
        });
    }

    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::InvalidPosition {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use askverse::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CHATS:
  /new                - Start a new chat
  /history            - List saved chats
  /pinned             - List pinned chats
  /restore <n>        - Show saved chat n again
  /restore-pinned <n> - Show pinned chat n again
  /pin <n>            - Pin or unpin saved chat n
  /unpin <n>          - Unpin pinned chat n
  /delete <n>         - Delete saved chat n (asks first)

DISPLAY:
  /typing [on|off]    - Toggle the typing effect
  /theme              - Switch between dark and light colours

IMAGES:
  /image <prompt>     - Generate an image
  /images             - List generated images
  /preview <n>        - Show image n full size
  /close              - Close the preview
  /delete-image <n>   - Remove image n from the gallery

SESSION:
  /status             - Show provider and session details
  /help               - Show this help message
  /?                  - Same as /help
  exit                - Exit interactive mode
  quit                - Same as exit

NOTES:
  - Command names are case-insensitive
  - Anything not starting with / is sent as a question
  - Press Ctrl-C while an answer is typing to show it at once
"#
    );
}
