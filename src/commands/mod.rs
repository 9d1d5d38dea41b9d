/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`: Interactive chat session
- `ask`: One question, answered on stdout
- `history`: Saved and pinned chats
- `images`: Generated image gallery
- `theme`: Colour preference

The handlers are thin: the session, gallery, and storage types do the work
and these functions print the results.
*/

use crate::config::Config;
use crate::error::{AskverseError, Result};
use crate::session::{ChatSession, SessionState};
use crate::storage::{KeyValueStore, MemoryStore, SledStore};
use special_commands::CommandError;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::watch;

// Special commands parser for the chat loop
pub mod special_commands;

// History subcommands
pub mod history;

// Image subcommands
pub mod images;

// Theme preference and palette
pub mod theme;

/// Open the store the commands persist to
///
/// `--ephemeral` keeps everything in memory. Otherwise the configured path
/// is used, falling back to `ASKVERSE_STORE` and then the platform data
/// directory.
pub fn open_store(config: &Config, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        tracing::info!("Using in-memory storage for this run");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = match &config.storage.path {
        Some(path) => SledStore::open(path)?,
        None => SledStore::new()?,
    };
    tracing::info!("Using storage at {}", store.path().display());
    Ok(Arc::new(store))
}

/// Look up a 1-based position in a listed collection
pub(crate) fn at_position<'a, T>(
    items: &'a [T],
    position: usize,
    what: &'static str,
) -> std::result::Result<&'a T, CommandError> {
    position
        .checked_sub(1)
        .and_then(|index| items.get(index))
        .ok_or(CommandError::OutOfRange { what, position })
}

/// Whether a reply to a yes/no prompt means yes
pub fn is_yes(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on the terminal; anything but yes declines
pub fn terminal_confirm(prompt: &str) -> bool {
    let mut rl = match rustyline::DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            tracing::warn!("Cannot prompt for confirmation: {}", e);
            return false;
        }
    };

    match rl.readline(&format!("{} [y/N] ", prompt)) {
        Ok(reply) => is_yes(&reply),
        Err(_) => false,
    }
}

/// Print the answer as the session reveals it
///
/// Appended characters are written as they arrive. Returns once the whole
/// answer is displayed and no request is pending. Ctrl-C skips to the full
/// answer.
pub async fn render_answer<W: Write>(
    session: &ChatSession,
    rx: &mut watch::Receiver<SessionState>,
    out: &mut W,
) -> Result<()> {
    let mut printed = String::new();

    loop {
        let state = rx.borrow_and_update().clone();

        match state.displayed_answer.strip_prefix(printed.as_str()) {
            Some(rest) if !rest.is_empty() => {
                write!(out, "{}", rest)?;
                out.flush()?;
                printed.push_str(rest);
            }
            Some(_) => {}
            None => {
                // A new reveal started over the one on screen
                writeln!(out)?;
                write!(out, "{}", state.displayed_answer)?;
                out.flush()?;
                printed = state.displayed_answer.clone();
            }
        }

        if state.is_settled() {
            break;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Skipping to the full answer");
                session.finish_reveal();
            }
        }
    }

    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn readline_error(e: rustyline::error::ReadlineError) -> AskverseError {
    AskverseError::Readline(e.to_string())
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Builds the session and gallery and runs a readline loop. Plain input
    //! is sent as a question; input starting with `/` is a special command.

    use super::*;
    use crate::commands::history::{exchange_table, report_deletion};
    use crate::commands::images::{image_table, print_generated, print_image};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::commands::theme::Palette;
    use crate::gallery::ImageGallery;
    use crate::providers::{create_provider, ImageEndpoint, Provider};
    use crate::session::{Confirmation, SubmitOutcome};
    use crate::storage::ChatExchange;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Whether the loop should keep reading input
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Flow {
        /// Read the next line
        Continue,
        /// Leave the session
        Exit,
    }

    /// The terminal view over one chat session and the image gallery
    pub struct ChatView {
        session: ChatSession,
        gallery: ImageGallery,
        store: Arc<dyn KeyValueStore>,
        palette: Palette,
        confirmation: Box<dyn Confirmation>,
    }

    impl ChatView {
        /// Create a view; the palette comes from the stored preference
        pub fn new(
            session: ChatSession,
            gallery: ImageGallery,
            store: Arc<dyn KeyValueStore>,
            confirmation: Box<dyn Confirmation>,
        ) -> Self {
            let palette = Palette::load(store.as_ref());
            Self {
                session,
                gallery,
                store,
                palette,
                confirmation,
            }
        }

        /// The chat session
        pub fn session(&self) -> &ChatSession {
            &self.session
        }

        /// The image gallery
        pub fn gallery(&self) -> &ImageGallery {
            &self.gallery
        }

        /// The palette in use
        pub fn palette(&self) -> Palette {
            self.palette
        }

        /// Handle one line of input
        ///
        /// Command errors are printed and never end the session.
        pub async fn handle_line(&mut self, line: &str) -> Flow {
            let command = match parse_special_command(line) {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{}\n", e.to_string().red());
                    return Flow::Continue;
                }
            };

            if command == SpecialCommand::Exit {
                return Flow::Exit;
            }

            if let Err(e) = self.run(command, line).await {
                eprintln!("{}\n", format!("Error: {:#}", e).red());
            }
            Flow::Continue
        }

        async fn run(&mut self, command: SpecialCommand, line: &str) -> Result<()> {
            // Any interaction outside the preview closes it
            let previewing = self.gallery.preview().is_some();
            if !matches!(command, SpecialCommand::Preview(_)) {
                self.gallery.select_for_preview(None);
            }

            match command {
                SpecialCommand::None => self.ask(line).await?,
                SpecialCommand::NewChat => {
                    self.session.start_new_chat();
                    println!("{}\n", "Started a new chat.".green());
                }
                SpecialCommand::ShowHistory => {
                    self.print_exchanges("Chat History", &self.session.history());
                }
                SpecialCommand::ShowPinned => {
                    self.print_exchanges("Pinned Chats", &self.session.pinned());
                }
                SpecialCommand::Restore(position) => {
                    let history = self.session.history();
                    let exchange = at_position(&history, position, "chat")?;
                    self.restore(exchange).await?;
                }
                SpecialCommand::RestorePinned(position) => {
                    let pinned = self.session.pinned();
                    let exchange = at_position(&pinned, position, "pinned chat")?;
                    self.restore(exchange).await?;
                }
                SpecialCommand::TogglePin(position) => {
                    let history = self.session.history();
                    let exchange = at_position(&history, position, "chat")?;
                    let verb = if self.session.toggle_pin(exchange) {
                        "Pinned"
                    } else {
                        "Unpinned"
                    };
                    println!("{} \"{}\"\n", verb.green(), exchange.title());
                }
                SpecialCommand::Unpin(position) => {
                    let pinned = self.session.pinned();
                    let exchange = at_position(&pinned, position, "pinned chat")?;
                    self.session.toggle_pin(exchange);
                    println!("{} \"{}\"\n", "Unpinned".green(), exchange.title());
                }
                SpecialCommand::Delete(position) => {
                    let history = self.session.history();
                    let exchange = at_position(&history, position, "chat")?;
                    let removed = self
                        .session
                        .delete_chat(exchange, self.confirmation.as_ref());
                    report_deletion(removed);
                }
                SpecialCommand::Typing(enabled) => {
                    let enabled = enabled.unwrap_or(!self.session.typing_enabled());
                    self.session.set_typing_enabled(enabled);
                    let label = if enabled { "on" } else { "off" };
                    println!("Typing effect {}\n", self.palette.accent(label));
                }
                SpecialCommand::GenerateImage(prompt) => match self.gallery.generate(&prompt) {
                    Some(image) => print_generated(&image),
                    None => println!("{}", "Nothing to generate: the prompt is empty.".yellow()),
                },
                SpecialCommand::ShowImages => {
                    if self.gallery.images().is_empty() {
                        println!("{}\n", "No generated images yet.".yellow());
                    } else {
                        println!("\n{}", self.palette.heading("Generated Images"));
                        image_table(self.gallery.images()).printstd();
                        println!();
                    }
                }
                SpecialCommand::Preview(position) => {
                    let image = at_position(self.gallery.images(), position, "image")?.clone();
                    print_image(&image);
                    println!("{}\n", self.palette.muted("Type /close to close the preview"));
                    self.gallery.select_for_preview(Some(image));
                }
                SpecialCommand::ClosePreview => {
                    if previewing {
                        println!("{}\n", "Preview closed.".green());
                    } else {
                        println!("{}\n", "No preview is open.".yellow());
                    }
                }
                SpecialCommand::DeleteImage(position) => {
                    let removed = position
                        .checked_sub(1)
                        .and_then(|index| self.gallery.delete_image(index))
                        .ok_or(CommandError::OutOfRange {
                            what: "image",
                            position,
                        })?;
                    println!("{} \"{}\"\n", "Removed image for".green(), removed.prompt);
                }
                SpecialCommand::ToggleTheme => {
                    self.palette = self.palette.toggled();
                    if let Err(e) = self.palette.save(self.store.as_ref()) {
                        tracing::warn!("Failed to persist theme: {:#}", e);
                    }
                    println!("Theme set to {}\n", self.palette.accent(self.palette.name()));
                }
                SpecialCommand::ShowStatus => print_status_display(self),
                SpecialCommand::Help => print_help(),
                SpecialCommand::Exit => {}
            }

            Ok(())
        }

        async fn ask(&self, question: &str) -> Result<()> {
            let mut rx = self.session.subscribe();
            println!("{}", self.palette.muted("Thinking..."));

            // Dropping the submit abandons the request and clears busy
            let outcome = tokio::select! {
                outcome = self.session.submit_question(question) => outcome,
                _ = tokio::signal::ctrl_c() => {
                    println!("{}\n", "Request cancelled.".yellow());
                    return Ok(());
                }
            };

            match outcome {
                SubmitOutcome::Answered(_) | SubmitOutcome::Failed(_) => {
                    render_answer(&self.session, &mut rx, &mut std::io::stdout()).await?;
                    println!();
                }
                SubmitOutcome::Superseded => {
                    tracing::debug!("Answer superseded by a newer question");
                }
                SubmitOutcome::Ignored => {}
            }
            Ok(())
        }

        async fn restore(&self, exchange: &ChatExchange) -> Result<()> {
            let mut rx = self.session.subscribe();
            println!("{} {}\n", self.palette.accent(">"), exchange.question);
            self.session.restore_chat(exchange);
            render_answer(&self.session, &mut rx, &mut std::io::stdout()).await?;
            println!();
            Ok(())
        }

        fn print_exchanges(&self, label: &str, entries: &[ChatExchange]) {
            if entries.is_empty() {
                println!("{}\n", format!("No {} yet.", label.to_lowercase()).yellow());
                return;
            }

            println!("\n{}", self.palette.heading(label));
            exchange_table(entries, &self.session.pinned()).printstd();
            println!();
        }
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `store` - Where history, pinned chats, images, and the theme live
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be built (for example a
    /// missing Gemini API key) or the terminal cannot be opened.
    pub async fn run_chat(config: Config, store: Arc<dyn KeyValueStore>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let provider: Arc<dyn Provider> = Arc::from(create_provider(&config.provider)?);
        let session = ChatSession::new(provider, store.clone(), config.session.typing_effect);
        let endpoint = ImageEndpoint::new(&config.images.endpoint)?;
        let gallery = ImageGallery::load(store.clone(), endpoint);

        let mut view = ChatView::new(session, gallery, store, Box::new(terminal_confirm));
        let mut rl = DefaultEditor::new().map_err(readline_error)?;

        print_welcome_banner(&view);

        loop {
            match rl.readline(&view.palette().prompt()) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if let Err(e) = rl.add_history_entry(trimmed) {
                        tracing::debug!("Could not add readline history entry: {}", e);
                    }

                    if view.handle_line(trimmed).await == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(view: &ChatView) {
        let palette = view.palette();
        let typing = if view.session().typing_enabled() {
            "on"
        } else {
            "off"
        };

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              AskVerse Interactive Chat - Welcome!            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Provider: {} ({})",
            palette.accent(view.session().provider_name()),
            view.session().provider_model()
        );
        println!("Typing:   {}\n", palette.accent(typing));
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display detailed status information about the current session
    fn print_status_display(view: &ChatView) {
        let palette = view.palette();
        let session = view.session();
        let typing = if session.typing_enabled() { "on" } else { "off" };

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    AskVerse Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Provider:        {} ({})",
            palette.accent(session.provider_name()),
            session.provider_model()
        );
        println!("Typing Effect:   {}", typing);
        println!("Theme:           {}", palette.name());
        println!("Saved Chats:     {}", session.history().len());
        println!("Pinned Chats:    {}", session.pinned().len());
        println!("Images:          {}", view.gallery().images().len());
        println!("Image Endpoint:  {}", view.gallery().endpoint().base());
        println!();
    }

}

// Ask command handler
pub mod ask {
    //! One-shot question handler.

    use super::*;
    use crate::providers::{create_provider, Provider};
    use crate::session::SubmitOutcome;
    use colored::Colorize;

    /// Ask one question and print the answer
    ///
    /// The exchange is recorded in the history like any chat question. A
    /// failed request prints the fallback answer and is not an error.
    pub async fn run_ask(config: Config, store: Arc<dyn KeyValueStore>, question: &str) -> Result<()> {
        let provider: Arc<dyn Provider> = Arc::from(create_provider(&config.provider)?);
        ask_with(provider, store, config.session.typing_effect, question, &mut std::io::stdout())
            .await
            .map(|_| ())
    }

    /// Ask through an already built provider, writing the answer to `out`
    pub async fn ask_with<W: Write>(
        provider: Arc<dyn Provider>,
        store: Arc<dyn KeyValueStore>,
        typing_enabled: bool,
        question: &str,
        out: &mut W,
    ) -> Result<SubmitOutcome> {
        let session = ChatSession::new(provider, store, typing_enabled);
        let mut rx = session.subscribe();

        let outcome = session.submit_question(question).await;
        match &outcome {
            SubmitOutcome::Answered(_) | SubmitOutcome::Failed(_) => {
                render_answer(&session, &mut rx, out).await?;
            }
            SubmitOutcome::Ignored => {
                eprintln!("{}", "Nothing to ask: the question is empty.".yellow());
            }
            SubmitOutcome::Superseded => {}
        }
        Ok(outcome)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::providers::FakeProvider;
        use crate::session::{ChatLog, FALLBACK_ANSWER};
        use crate::storage::{ChatExchange, MemoryStore};
        use crate::test_utils::assert_error_contains;

        #[tokio::test(start_paused = true)]
        async fn test_ask_types_answer_and_records_it() {
            let store = Arc::new(MemoryStore::new());
            let mut out = Vec::new();

            let outcome = ask_with(
                Arc::new(FakeProvider::with_answers(["hello"])),
                store.clone(),
                true,
                "greet me",
                &mut out,
            )
            .await
            .unwrap();

            assert!(matches!(outcome, SubmitOutcome::Answered(_)));
            assert_eq!(String::from_utf8(out).unwrap(), "hello\n");
            assert_eq!(
                ChatLog::load(store).history(),
                &[ChatExchange::new("greet me", "hello")]
            );
        }

        #[tokio::test]
        async fn test_ask_failure_prints_fallback() {
            let provider = FakeProvider::new();
            provider.push_error("unavailable");
            let mut out = Vec::new();

            let outcome = ask_with(
                Arc::new(provider),
                Arc::new(MemoryStore::new()),
                false,
                "anything",
                &mut out,
            )
            .await
            .unwrap();

            assert!(matches!(outcome, SubmitOutcome::Failed(_)));
            assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", FALLBACK_ANSWER));
        }

        #[tokio::test]
        async fn test_ask_blank_question_prints_nothing() {
            let provider = Arc::new(FakeProvider::new());
            let mut out = Vec::new();

            let outcome = ask_with(
                provider.clone(),
                Arc::new(MemoryStore::new()),
                true,
                "  ",
                &mut out,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SubmitOutcome::Ignored);
            assert!(out.is_empty());
            assert_eq!(provider.call_count(), 0);
        }

        #[tokio::test]
        async fn test_run_ask_without_gemini_key_fails() {
            let mut cfg = Config::default();
            cfg.provider.gemini.api_key = None;

            let result = run_ask(cfg, Arc::new(MemoryStore::new()), "hi").await;
            assert_error_contains(result, "Missing credentials");
        }
    }
}
