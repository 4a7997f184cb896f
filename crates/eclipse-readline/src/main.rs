use std::borrow::Cow::{self, Borrowed, Owned};
use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::{ColoredString, Colorize};
use eclipse_application::{AppContext, RejectReason, SubmitOutcome};
use eclipse_core::chat::{Message, MessageRole};
use eclipse_core::locale::Locale;
use eclipse_core::settings::{ModelId, Settings, Theme};
use eclipse_core::store::{SessionStore, StoreEvent};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

mod bootstrap;
mod commands;

use commands::{COMMANDS, Command};

#[derive(Parser)]
#[command(name = "eclipse")]
#[command(about = "Eclipse - multi-chat terminal front end for Claude", long_about = None)]
struct Args {
    /// Path to config.toml (default: ~/.config/eclipse/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for chats, exports and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Interface language (en, ru)
    #[arg(long)]
    locale: Option<Locale>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

type LineEditor = Editor<CliHelper, DefaultHistory>;

fn paint(theme: Theme, message: &Message, text: &str) -> ColoredString {
    match (message.role, message.is_error, theme) {
        (_, true, _) => text.red(),
        (MessageRole::User, _, Theme::Dark) => text.bright_green(),
        (MessageRole::User, _, Theme::Light) => text.green(),
        (MessageRole::Assistant, _, Theme::Dark) => text.bright_blue(),
        (MessageRole::Assistant, _, Theme::Light) => text.blue(),
    }
}

fn print_message(store: &SessionStore, message: &Message) {
    let label = store.locale().role_label(message.role);
    println!("{}", format!("[{label}]").bright_magenta());
    for line in message.content.lines() {
        println!("{}", paint(store.theme(), message, line));
    }
    println!();
}

fn print_chat_line(store: &SessionStore, position: usize, chat_id: &str) {
    let Some(chat) = store.chat(chat_id) else {
        return;
    };
    let marker = if store.selected_chat_id() == Some(chat_id) { "*" } else { " " };
    let short_id: String = chat.id.chars().take(8).collect();
    println!(
        "{} {:>3}. {} {}",
        marker.bright_yellow(),
        position,
        chat.title,
        format!("({} messages, {})", chat.messages.len(), short_id).bright_black()
    );
}

/// Resolves a 1-based list position or a unique id prefix to a chat id.
fn resolve_chat(store: &SessionStore, reference: &str) -> Option<String> {
    if let Ok(position) = reference.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| store.chats().get(index))
            .map(|chat| chat.id.clone());
    }

    let mut matches = store.chats().iter().filter(|c| c.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(chat), None) => Some(chat.id.clone()),
        _ => None,
    }
}

fn print_help() {
    let lines = [
        ("<text>", "send a message to the selected chat (creates one if needed)"),
        ("/new", "start a new chat"),
        ("/chats", "list chats, newest first"),
        ("/select <n|id>", "switch to a chat"),
        ("/show", "print the selected chat"),
        ("/delete [n|id]", "delete a chat (default: selected)"),
        ("/export [n|id]", "write a chat transcript to a text file"),
        ("/search <term>", "find chats by title or content"),
        ("/settings", "show model, temperature and token limit"),
        ("/model <id>", "choose the model"),
        ("/temperature <0-1>", "set sampling temperature"),
        ("/tokens <100-8000>", "set the reply token limit"),
        ("/theme [dark|light]", "set or toggle the color theme"),
        ("/prompts [n]", "list quick prompts or start a message with one"),
        ("/purge", "delete all chats and reset settings"),
        ("/quit", "exit"),
    ];
    for (usage, description) in lines {
        println!("  {:<22} {}", usage.bright_cyan(), description.bright_black());
    }
}

/// Prints assistant messages as the store reports them.
fn spawn_reply_printer(ctx: AppContext, mut events: broadcast::Receiver<StoreEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(StoreEvent::MessageAppended { chat_id, index }) => {
                    let store = ctx.store().read().await;
                    let Some(message) = store.chat(&chat_id).and_then(|c| c.messages.get(index))
                    else {
                        continue;
                    };
                    if message.role == MessageRole::Assistant {
                        println!();
                        print_message(&store, message);
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Repl] Missed {} store event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

struct Repl {
    ctx: AppContext,
    has_api_key: bool,
    export_dir: PathBuf,
    /// Text placed on the next prompt line by `/prompts <n>`.
    pending_input: Option<String>,
}

impl Repl {
    fn submit(&self, text: String) {
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            // Replies are printed by the event listener.
            match ctx.orchestrator().submit(&text).await {
                SubmitOutcome::Rejected(RejectReason::Busy) => {
                    println!("{}", "Still waiting for the previous reply.".yellow());
                }
                SubmitOutcome::Dropped { .. } => {
                    println!("{}", "Reply discarded: its chat was deleted.".bright_black());
                }
                SubmitOutcome::Rejected(RejectReason::EmptyInput)
                | SubmitOutcome::Replied { .. }
                | SubmitOutcome::Failed { .. } => {}
            }
        });
    }

    async fn handle(&mut self, command: Command, rl: &mut LineEditor) -> ControlFlow<()> {
        match command {
            Command::Submit(text) => self.submit(text),
            Command::New => {
                let mut store = self.ctx.store().write().await;
                let title = store.create_chat().title.clone();
                println!("{}", format!("Started '{title}'").green());
            }
            Command::Chats => {
                let store = self.ctx.store().read().await;
                if store.is_empty() {
                    println!("{}", "No chats yet.".bright_black());
                }
                for (index, chat) in store.chats().iter().enumerate() {
                    print_chat_line(&store, index + 1, &chat.id);
                }
            }
            Command::Select(reference) => {
                let mut store = self.ctx.store().write().await;
                let switched = resolve_chat(&store, &reference)
                    .is_some_and(|chat_id| store.select_chat(&chat_id));
                match store.selected_chat() {
                    Some(chat) if switched => {
                        println!("{}", format!("Switched to '{}'", chat.title).green());
                    }
                    _ => println!("{}", format!("No chat matches '{reference}'").red()),
                }
            }
            Command::Show => {
                let store = self.ctx.store().read().await;
                match store.selected_chat() {
                    Some(chat) => {
                        println!("{}", format!("=== {} ===", chat.title).bright_magenta().bold());
                        for message in &chat.messages {
                            print_message(&store, message);
                        }
                    }
                    None => println!("{}", "No chat selected.".bright_black()),
                }
            }
            Command::Delete(reference) => {
                let mut store = self.ctx.store().write().await;
                let target = match reference {
                    Some(reference) => resolve_chat(&store, &reference),
                    None => store.selected_chat_id().map(str::to_string),
                };
                match target.and_then(|id| store.delete_chat(&id)) {
                    Some(chat) => println!("{}", format!("Deleted '{}'", chat.title).green()),
                    None => println!("{}", "Nothing to delete.".bright_black()),
                }
            }
            Command::Export(reference) => {
                let target = {
                    let store = self.ctx.store().read().await;
                    match reference {
                        Some(reference) => resolve_chat(&store, &reference),
                        None => store.selected_chat_id().map(str::to_string),
                    }
                };
                let Some(chat_id) = target else {
                    println!("{}", "Nothing to export.".bright_black());
                    return ControlFlow::Continue(());
                };
                match self.ctx.export_chat(&chat_id).await {
                    Ok(Some(path)) => println!("{}", format!("Exported to {}", path.display()).green()),
                    Ok(None) => println!("{}", "Nothing to export.".bright_black()),
                    Err(e) => println!("{}", format!("Export failed: {e}").red()),
                }
            }
            Command::Search(term) => {
                let store = self.ctx.store().read().await;
                let found = store.search(&term);
                if found.is_empty() {
                    println!("{}", format!("No chats match '{term}'").bright_black());
                }
                for chat in found {
                    let position = store
                        .chats()
                        .iter()
                        .position(|c| c.id == chat.id)
                        .map_or(0, |index| index + 1);
                    print_chat_line(&store, position, &chat.id);
                }
            }
            Command::Settings => {
                let store = self.ctx.store().read().await;
                let settings = store.settings();
                println!("  model        {} ({})", settings.model.display_name(), settings.model);
                println!("  temperature  {}", settings.temperature);
                println!("  max tokens   {}", settings.max_tokens);
                println!("  theme        {}", store.theme().as_str());
                println!("  exports      {}", self.export_dir.display());
                if !self.has_api_key {
                    println!("{}", "  no API key configured".yellow());
                }
                let models: Vec<&str> = ModelId::ALL.iter().map(|m| m.as_str()).collect();
                println!("{}", format!("  models: {}", models.join(", ")).bright_black());
            }
            Command::Model(model) => self.change_settings(|s| s.model = model).await,
            Command::Temperature(value) => self.change_settings(|s| s.temperature = value).await,
            Command::Tokens(value) => self.change_settings(|s| s.max_tokens = value).await,
            Command::Theme(theme) => {
                let mut store = self.ctx.store().write().await;
                let theme = match theme {
                    Some(theme) => {
                        store.set_theme(theme);
                        theme
                    }
                    None => store.toggle_theme(),
                };
                println!("{}", format!("Theme: {}", theme.as_str()).green());
            }
            Command::Prompts(choice) => {
                let locale = self.ctx.store().read().await.locale();
                let prompts = locale.quick_prompts();
                match choice {
                    None => {
                        for (index, prompt) in prompts.iter().enumerate() {
                            println!("  {:>2}. {}", index + 1, prompt);
                        }
                    }
                    Some(n) => match prompts.get(n - 1) {
                        Some(prompt) => self.pending_input = Some(format!("{prompt} ")),
                        None => println!("{}", format!("No quick prompt #{n}").red()),
                    },
                }
            }
            Command::Purge => {
                let answer = rl.readline("Delete all chats and reset settings? (yes/no) ");
                if matches!(answer.as_deref().map(str::trim), Ok("yes")) {
                    match self.ctx.store().write().await.purge() {
                        Ok(()) => println!("{}", "All data removed.".green()),
                        Err(e) => println!("{}", format!("Purge failed: {e}").red()),
                    }
                }
            }
            Command::Help => print_help(),
            Command::Quit => return ControlFlow::Break(()),
            Command::Invalid(message) => println!("{}", message.red()),
        }
        ControlFlow::Continue(())
    }

    async fn change_settings(&self, change: impl FnOnce(&mut Settings)) {
        let mut store = self.ctx.store().write().await;
        let mut settings = store.settings().clone();
        change(&mut settings);
        match store.update_settings(settings) {
            Ok(()) => println!("{}", "Settings updated.".green()),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let boot = bootstrap::run(bootstrap::Overrides {
        config: args.config,
        data_dir: args.data_dir,
        locale: args.locale,
    })?;

    let mut rl: LineEditor = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Eclipse ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, '/help' for commands, or '/quit' to exit.".bright_black()
    );
    if !boot.has_api_key {
        println!(
            "{}",
            "No API key found. Add it to ~/.config/eclipse/secret.json or set ANTHROPIC_API_KEY."
                .yellow()
        );
    }
    println!();

    let events = boot.context.store().read().await.subscribe();
    spawn_reply_printer(boot.context.clone(), events);

    let mut repl = Repl {
        ctx: boot.context.clone(),
        has_api_key: boot.has_api_key,
        export_dir: boot.export_dir.clone(),
        pending_input: None,
    };
    tracing::info!("[Repl] Started with locale {:?}", boot.config.locale);

    loop {
        let readline = match repl.pending_input.take() {
            Some(initial) => rl.readline_with_initial(">> ", (initial.as_str(), "")),
            None => rl.readline(">> "),
        };

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if repl.handle(commands::parse(&line), &mut rl).await.is_break() {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
