//! Interactive chat loop

use anyhow::Result;
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use ethos_core::prelude::*;

pub struct ReplOptions {
    pub stream: bool,
    pub export_dir: PathBuf,
}

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Help,
    Clear,
    Export(Option<&'a str>),
    Personality(Option<&'a str>),
    Model(Option<&'a str>),
    Temperature(Option<&'a str>),
    Examples(Option<&'a str>),
    Stats,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(input: &'a str) -> Self {
        let mut parts = input.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match name {
            "help" | "h" | "?" => Command::Help,
            "clear" => Command::Clear,
            "export" => Command::Export(arg),
            "personality" | "p" => Command::Personality(arg),
            "model" | "m" => Command::Model(arg),
            "temperature" | "temp" | "t" => Command::Temperature(arg),
            "examples" | "e" => Command::Examples(arg),
            "stats" => Command::Stats,
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Unknown(other),
        }
    }
}

pub async fn run(mut manager: SessionManager, options: ReplOptions) -> Result<()> {
    print_banner(manager.personality());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = line.strip_prefix('/') else {
            reply(&mut manager, line, options.stream).await?;
            continue;
        };

        match Command::parse(command) {
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Clear => {
                manager.clear();
                println!("Chat cleared.");
                print_banner(manager.personality());
            }
            Command::Export(dir) => {
                let dir = dir.map(PathBuf::from).unwrap_or_else(|| options.export_dir.clone());
                match manager.export_transcript(&dir) {
                    Ok(path) => println!("Saved transcript to {}", path.display()),
                    Err(e) => println!("Export failed: {}", e),
                }
            }
            Command::Personality(None) => {
                for p in manager.catalog().iter() {
                    let marker = if p.id == manager.personality().id { "*" } else { " " };
                    println!("{} {:<24} {}", marker, p.id, p.label());
                }
            }
            Command::Personality(Some(id)) => match manager.select_personality(id) {
                Ok(true) => print_banner(manager.personality()),
                Ok(false) => println!("Already talking to {}.", manager.personality().label()),
                Err(e) => println!("{}", e),
            },
            Command::Model(None) => {
                for model in GroqModel::ALL {
                    let marker = if model == manager.selection().model { "*" } else { " " };
                    println!("{} {:<26} {}", marker, model.as_str(), model.description());
                }
            }
            Command::Model(Some(id)) => match id.parse::<GroqModel>() {
                Ok(model) => {
                    let switched = manager.select_model(model);
                    println!("{}", model_switch_message(model, switched));
                }
                Err(e) => println!("{}", e),
            },
            Command::Temperature(None) => {
                println!("Temperature: {:.2}", manager.selection().temperature);
            }
            Command::Temperature(Some(value)) => match parse_temperature(value) {
                Ok(t) => {
                    manager.set_temperature(t);
                    println!("Temperature: {:.2}", manager.selection().temperature);
                }
                Err(e) => println!("{}", e),
            },
            Command::Examples(None) => {
                for (i, prompt) in manager.personality().example_prompts.iter().enumerate() {
                    println!("  {}. {}", i + 1, prompt);
                }
            }
            Command::Examples(Some(n)) => {
                let prompt = n
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| manager.personality().example_prompts.get(i).cloned());
                match prompt {
                    Some(prompt) => {
                        println!("you> {}", prompt);
                        reply(&mut manager, &prompt, options.stream).await?;
                    }
                    None => println!("No example {}. Try /examples.", n),
                }
            }
            Command::Stats => print_stats(&manager),
            Command::Unknown(name) => println!("Unknown command /{}. Try /help.", name),
        }
    }

    Ok(())
}

fn model_switch_message(model: GroqModel, switched: bool) -> String {
    if switched {
        format!("Switched to {}. History starts fresh.", model)
    } else {
        format!("Already using {}.", model)
    }
}

/// Parse a temperature, rejecting anything but a finite number
pub fn parse_temperature(value: &str) -> std::result::Result<f32, String> {
    match value.trim().parse::<f32>() {
        Ok(t) if t.is_finite() => Ok(t),
        _ => Err("Temperature must be a number between 0.0 and 1.0".to_string()),
    }
}

async fn reply(manager: &mut SessionManager, text: &str, stream: bool) -> Result<()> {
    let avatar = manager.personality().avatar.clone();
    let mut stdout = std::io::stdout();
    write!(stdout, "{} ", avatar)?;

    if stream {
        let mut events = manager.stream(text);
        while let Some(event) = events.next().await {
            write!(stdout, "{}", event)?;
            stdout.flush()?;
        }
        writeln!(stdout)?;
    } else {
        let reply = manager.send(text).await;
        writeln!(stdout, "{}", reply)?;
    }

    writeln!(stdout)?;
    Ok(())
}

fn print_banner(personality: &PersonalityConfig) {
    println!();
    println!("{}  Welcome to {}", personality.emoji, personality.name);
    if !personality.description.is_empty() {
        println!("   {}", personality.description);
    }
    println!("   Type a message, or /help for commands.");
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  /personality [id]   list or switch personality (starts a new session)");
    println!("  /model [id]         list or switch model (starts a new session)");
    println!("  /temperature [t]    show or set temperature (0.0-1.0)");
    println!("  /examples [n]       list quick starters, or send number n");
    println!("  /clear              clear the chat");
    println!("  /export [dir]       save the transcript as text");
    println!("  /stats              session statistics");
    println!("  /quit               leave");
}

fn print_stats(manager: &SessionManager) {
    let selection = manager.selection();
    println!("Personality: {}", selection.personality.label());
    println!("Model:       {}", selection.model);
    println!("Temperature: {:.2}", selection.temperature);
    println!("Messages:    {}", manager.message_count());
    if let Some(session) = manager.active_session() {
        println!(
            "History:     {} of {} exchanges",
            session.exchange_count(),
            session.history().max_history()
        );
        println!("Started:     {}", session.created_at().format("%H:%M:%S"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(
            Command::parse("personality creative_writer"),
            Command::Personality(Some("creative_writer"))
        );
        assert_eq!(Command::parse("model"), Command::Model(None));
        assert_eq!(Command::parse("temp  0.4 "), Command::Temperature(Some("0.4")));
        assert_eq!(Command::parse("export ./out"), Command::Export(Some("./out")));
        assert_eq!(Command::parse("dance"), Command::Unknown("dance"));
    }

    #[test]
    fn test_model_switch_message() {
        assert_eq!(
            model_switch_message(GroqModel::Gemma2It, true),
            "Switched to gemma2-9b-it. History starts fresh."
        );
        assert_eq!(
            model_switch_message(GroqModel::Llama33Versatile, false),
            "Already using llama-3.3-70b-versatile."
        );
    }

    #[test]
    fn test_parse_temperature() {
        assert_eq!(parse_temperature("0.4"), Ok(0.4));
        assert_eq!(parse_temperature(" 1 "), Ok(1.0));
        assert!(parse_temperature("NaN").is_err());
        assert!(parse_temperature("inf").is_err());
        assert!(parse_temperature("-infinity").is_err());
        assert!(parse_temperature("warm").is_err());
    }
}
