//! Line-oriented terminal front end
//!
//! Plain lines are chat messages; lines starting with `/` are commands.
//! Sends run in a spawned task so resets and email actions stay available
//! while the backend is thinking.

use crate::backend::Backend;
use crate::dispatch::{AddressPrompt, EventActionDispatcher};
use crate::identity::Credentials;
use crate::model::{Message, Role, SocialEvent};
use crate::session::{LoginOutcome, SendOutcome, Session, SessionError};
use crate::store::KeyValueStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;

pub const HELP: &str = "\
Commands:
  <text>                             chat with SocialSync
  /reset                             start a fresh conversation
  /login <email> <password>          log in
  /register <name> <email> <password> create an account
  /logout                            log out
  /email <n> [address]               email event #n to yourself
  /vibe                              show what SocialSync knows about you
  /history                           show the whole conversation
  /help                              show this help
  /quit                              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Reset,
    Auth(Credentials),
    Logout,
    /// `index` is 1-based over every event shown so far
    Email {
        index: usize,
        address: Option<String>,
    },
    Vibe,
    History,
    Help,
    Quit,
}

/// Parse one non-blank input line
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(Command::Send(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("/reset", []) => Ok(Command::Reset),
        ("/login", [email, password]) => Ok(Command::Auth(Credentials::Login {
            email: (*email).to_string(),
            password: (*password).to_string(),
        })),
        ("/register", [name, email, password]) => Ok(Command::Auth(Credentials::Register {
            name: (*name).to_string(),
            email: (*email).to_string(),
            password: (*password).to_string(),
        })),
        ("/logout", []) => Ok(Command::Logout),
        ("/email", [index, rest @ ..]) if rest.len() <= 1 => {
            let index = index
                .parse::<usize>()
                .ok()
                .filter(|i| *i > 0)
                .ok_or_else(|| format!("'{index}' is not an event number"))?;
            Ok(Command::Email {
                index,
                address: rest.first().map(|a| (*a).to_string()),
            })
        }
        ("/vibe", []) => Ok(Command::Vibe),
        ("/history", []) => Ok(Command::History),
        ("/help", []) => Ok(Command::Help),
        ("/quit" | "/exit", []) => Ok(Command::Quit),
        ("/login", _) => Err("Usage: /login <email> <password>".to_string()),
        ("/register", _) => Err("Usage: /register <name> <email> <password>".to_string()),
        ("/email", _) => Err("Usage: /email <n> [address]".to_string()),
        _ => Err(format!("Unknown command {name}, try /help")),
    }
}

/// Render one event card
pub fn render_event(number: usize, event: &SocialEvent) -> String {
    let mut out = format!("  [{number}] {}", event.title);
    for (label, value) in [
        ("When", &event.date),
        ("Where", &event.location),
        ("Cost", &event.cost),
    ] {
        if !value.trim().is_empty() {
            out.push_str(&format!("\n      {label}: {value}"));
        }
    }
    if !event.description.trim().is_empty() {
        out.push_str(&format!("\n      {}", event.description));
    }
    if !event.url.trim().is_empty() {
        out.push_str(&format!("\n      {}", event.url));
    }
    out
}

/// Render a message whose first event is numbered `first_event`
///
/// Events that cannot be shown still take a number so numbering matches
/// [`Session::events`].
pub fn render_message(message: &Message, first_event: usize) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "socialsync",
    };
    let mut out = format!("{speaker}> {}", message.text);
    for (offset, event) in message.events.iter().enumerate() {
        if event.is_renderable() {
            out.push('\n');
            out.push_str(&render_event(first_event + offset, event));
        }
    }
    out
}

pub fn render_log(messages: &[Message]) -> String {
    let mut next_event = 1;
    let mut rendered = Vec::with_capacity(messages.len());
    for message in messages {
        rendered.push(render_message(message, next_event));
        next_event += message.events.len();
    }
    rendered.join("\n")
}

/// Reads the address from the next input line unless one was typed with
/// the command
struct LinePrompt<'a, R> {
    preset: Option<String>,
    lines: &'a mut Lines<R>,
}

#[async_trait]
impl<R> AddressPrompt for LinePrompt<'_, R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn solicit(&mut self, event: &SocialEvent) -> Option<String> {
        if let Some(address) = self.preset.take() {
            return Some(address);
        }
        println!("Where should I send \"{}\"? (empty to cancel)", event.title);
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read address");
                None
            }
        }
    }
}

/// Drive the session from `input` until `/quit` or end of input
pub async fn run<B, S, R>(
    session: Arc<Session<B, S>>,
    dispatcher: EventActionDispatcher<B>,
    input: R,
) -> std::io::Result<()>
where
    B: Backend + 'static,
    S: KeyValueStore + Clone + 'static,
    R: AsyncBufRead + Unpin + Send,
{
    let mut lines = input.lines();
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<SendOutcome, SessionError>>();

    println!("{}", render_log(&session.messages()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(usage) => {
                        println!("{usage}");
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                handle_command(&session, &dispatcher, command, &mut lines, &tx).await;
            }
            Some(result) = rx.recv() => {
                if let Some(text) = send_result_text(&result) {
                    println!("{text}");
                }
            }
        }
    }

    Ok(())
}

async fn handle_command<B, S, R>(
    session: &Arc<Session<B, S>>,
    dispatcher: &EventActionDispatcher<B>,
    command: Command,
    lines: &mut Lines<R>,
    tx: &mpsc::UnboundedSender<Result<SendOutcome, SessionError>>,
) where
    B: Backend + 'static,
    S: KeyValueStore + Clone + 'static,
    R: AsyncBufRead + Unpin + Send,
{
    match command {
        Command::Send(text) => {
            let session = Arc::clone(session);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = session.send(&text).await;
                // Receiver only goes away on shutdown
                let _ = tx.send(result);
            });
        }

        Command::Reset => {
            if let Err(e) = session.reset().await {
                println!("(couldn't tell the server to start over: {e})");
            }
            println!("{}", render_log(&session.messages()));
        }

        Command::Auth(credentials) => match session.login(&credentials).await {
            Ok(LoginOutcome { user, reset_error }) => {
                println!("Logged in as {} <{}>", user.name, user.email);
                if let Some(e) = reset_error {
                    println!("(couldn't tell the server to start over: {e})");
                }
                println!("{}", render_log(&session.messages()));
            }
            Err(e) => println!("Login failed: {e}"),
        },

        Command::Logout => {
            if let Err(e) = session.logout().await {
                println!("(couldn't tell the server to start over: {e})");
            }
            println!("Logged out");
            println!("{}", render_log(&session.messages()));
        }

        Command::Email { index, address } => {
            let Some(event) = session.events().into_iter().nth(index - 1) else {
                println!("There is no event #{index}");
                return;
            };
            let user = session.current_user();
            let mut prompt = LinePrompt {
                preset: address,
                lines,
            };
            match dispatcher
                .dispatch_email(&event, user.as_ref(), &mut prompt)
                .await
            {
                Ok(receipt) => {
                    println!("Sent \"{}\" to {}", event.title, receipt.address);
                    if let Some(message) = receipt.message {
                        println!("{message}");
                    }
                }
                Err(e) => println!("{e}"),
            }
        }

        Command::Vibe => match session.current_user() {
            Some(user) => match user.profile {
                Some(profile) => println!("{profile}"),
                None => println!("No vibe yet, keep chatting!"),
            },
            None => println!("Log in so SocialSync can remember your vibe"),
        },

        Command::History => {
            println!("{}", render_log(&session.messages()));
            if session.is_busy() {
                println!("(waiting on SocialSync...)");
            } else if session.is_complete() {
                println!("(mission complete, /reset to plan something new)");
            }
        }

        Command::Help => println!("{HELP}"),

        Command::Quit => {}
    }
}

/// What to print once a spawned send settles; `None` prints nothing
fn send_result_text(result: &Result<SendOutcome, SessionError>) -> Option<String> {
    match result {
        Ok(SendOutcome::Discarded) => None,
        Ok(SendOutcome::Fallback { reply }) => Some(render_message(reply, 1)),
        Ok(SendOutcome::Answered {
            reply,
            first_event,
            mission_complete,
        }) => {
            let mut lines = vec![render_message(reply, *first_event)];
            if reply.events.iter().any(SocialEvent::is_renderable) {
                lines.push("(/email <n> sends an event to your inbox)".to_string());
            }
            if *mission_complete {
                lines.push("(mission complete, /reset to plan something new)".to_string());
            }
            Some(lines.join("\n"))
        }
        Err(e) => Some(e.to_string()),
    }
}
