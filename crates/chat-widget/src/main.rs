//! A terminal front-end for the chat widget.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::time::Duration;

use chat_widget::core::conversation::{Message, Origin};
use chat_widget::{WidgetBuilder, WidgetConfig};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = WidgetConfig::from_env();
    let widget = match WidgetBuilder::new(config)
        .on_error(|err| debug!("widget error: {err}"))
        .init()
    {
        Ok(widget) => widget,
        Err(err) => {
            eprintln!("Cannot start the chat widget: {err}");
            eprintln!("Set CHAT_WIDGET_API_URL and CHAT_WIDGET_TOKEN.");
            return;
        }
    };
    widget.toggle_open();

    let display = widget.display();
    println!("{}", display.title.bold());
    println!("{}", display.subtitle.dimmed());
    println!("{}", "/clear, /intents, /session, /quit".dimmed());

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    // Number of history entries already printed.
    let mut rendered = 0;

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let text = match Command::parse(&line) {
            Command::Quit => break,
            Command::Clear => {
                widget.clear();
                rendered = 0;
                println!("{}", "History cleared.".dimmed());
                continue;
            }
            Command::Session => {
                println!("{}", widget.session_id());
                continue;
            }
            Command::Intents => {
                match widget.available_intents().await {
                    Ok(intents) => {
                        for intent in intents {
                            println!("{}{intent}", BAR_CHAR.bright_cyan());
                        }
                    }
                    Err(err) => println!("{}", err.bright_red()),
                }
                continue;
            }
            Command::Send(text) => text,
        };

        let mut pending = widget.send(text);
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");

        loop {
            select! {
                _ = &mut pending => break,
                _ = sleep(Duration::from_millis(100)) => {
                    progress_bar.inc(1);
                }
            }
        }
        progress_bar.finish_and_clear();

        let state = widget.state();
        let history = state.history();
        for msg in history.iter().skip(rendered) {
            render(msg);
        }
        rendered = history.len();
    }

    widget.destroy();
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Clear,
    Session,
    Intents,
    /// Text to send, with surrounding whitespace removed.
    Send(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" => Self::Quit,
            "/clear" => Self::Clear,
            "/session" => Self::Session,
            "/intents" => Self::Intents,
            text => Self::Send(text),
        }
    }
}

fn render(msg: &Message) {
    if msg.origin() != Origin::Bot {
        return;
    }
    let time = msg.timestamp().format("%H:%M");
    match msg.intent() {
        Some(intent) => println!(
            "{}🤖 {} {}",
            BAR_CHAR.bright_cyan(),
            msg.text().bright_white(),
            format!("[{intent} · {time}]").dimmed()
        ),
        None => println!(
            "{}🤖 {} {}",
            BAR_CHAR.bright_cyan(),
            msg.text().bright_white(),
            format!("[{time}]").dimmed()
        ),
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/quit\n"), Command::Quit);
        assert_eq!(Command::parse("  /clear\r\n"), Command::Clear);
        assert_eq!(Command::parse("/session"), Command::Session);
        assert_eq!(Command::parse("/intents\n"), Command::Intents);
    }

    #[test]
    fn test_parse_trims_text() {
        assert_eq!(
            Command::parse("  book a room \t\r\n"),
            Command::Send("book a room")
        );
        assert_eq!(Command::parse("   \n"), Command::Send(""));
    }
}
