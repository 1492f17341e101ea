use clap::{Parser, Subcommand};
use colored::*;
use pfd_chat::builder::ChatBuilder;
use pfd_chat::chat::{ChatMessage, ChatRole};
use pfd_chat::error::LLMError;
use pfd_chat::persona::{self, Persona};
use pfd_chat::session::Session;
use pfd_chat::streamer::CompletionStreamer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use spinners::{Spinner, Spinners};
use std::io::{self, IsTerminal, Read, Write};
use std::time::Duration;

/// Command line arguments for the PFD research assistant
#[derive(Parser)]
#[command(
    name = "pfd-chat",
    about = "Chat with the PFD Toolkit research assistant"
)]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model name to use
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Temperature setting (0.0-1.0)
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Maximum tokens in the response
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Whole-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Seconds to wait for the next piece of a reply; 0 waits forever
    #[arg(long, default_value_t = 60, global = true)]
    idle_timeout: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Chat in the terminal (the default)
    Chat {
        /// Ask a single question and exit; stdin is appended when piped
        prompt: Option<String>,
    },
    /// Serve the single-page web chat
    #[cfg(feature = "api")]
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

fn chat_builder(args: &CliArgs) -> ChatBuilder {
    let mut builder = ChatBuilder::new();
    if let Some(model) = args.model.clone() {
        builder = builder.model(model);
    }
    if let Some(url) = args.base_url.clone() {
        builder = builder.base_url(url);
    }
    if let Some(temp) = args.temperature {
        builder = builder.temperature(temp);
    }
    if let Some(mt) = args.max_tokens {
        builder = builder.max_tokens(mt);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout_seconds(secs);
    }
    builder
}

fn streamer(args: &CliArgs) -> CompletionStreamer {
    let idle = (args.idle_timeout > 0).then(|| Duration::from_secs(args.idle_timeout));
    CompletionStreamer::new().idle_timeout(idle)
}

fn rule() {
    println!("{}", "─".repeat(50).bright_black());
}

fn print_message(msg: &ChatMessage) {
    match msg.role {
        ChatRole::User => println!("{} {}", "> You:".bright_cyan(), msg.content),
        ChatRole::Assistant => println!("{} {}", "> Assistant:".bright_green(), msg.content),
        ChatRole::System => {}
    }
}

fn print_transcript(session: &mut Session) {
    for msg in session.transcript() {
        print_message(msg);
    }
    rule();
}

/// Runs one turn, printing the reply as it streams in.
///
/// Ctrl-C while the reply is streaming cancels the turn.
async fn run_turn(session: &mut Session, input: String) -> Result<(), LLMError> {
    let mut spinner = Some(Spinner::new(
        Spinners::Dots12,
        "Thinking...".bright_magenta().to_string(),
    ));
    let mut observer = |fragment: &str, _: &str| {
        if let Some(mut sp) = spinner.take() {
            sp.stop();
            print!("\r\x1B[K{} ", "> Assistant:".bright_green());
        }
        print!("{fragment}");
        let _ = io::stdout().flush();
    };
    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let result = session.submit_until(input, &mut observer, cancel).await;

    let started = spinner.is_none();
    if let Some(mut sp) = spinner.take() {
        sp.stop();
        print!("\r\x1B[K");
    }
    let turn = result?;
    if turn.failed() {
        if started {
            println!();
        }
        println!("{} {}", "> Assistant:".bright_green(), turn.reply.bright_red());
    } else {
        println!();
    }
    Ok(())
}

async fn single_turn(
    mut session: Session,
    prompt: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    if !io::stdin().is_terminal() {
        io::stdin().read_to_string(&mut input)?;
    }
    let message = match prompt {
        Some(p) if !input.trim().is_empty() => format!("{p}\n\n{input}"),
        Some(p) => p,
        None => input,
    };
    if message.trim().is_empty() {
        return Err("Nothing to ask: pass a prompt or pipe text on stdin".into());
    }

    let mut observer = |fragment: &str, _: &str| {
        print!("{fragment}");
        let _ = io::stdout().flush();
    };
    let turn = session.submit(message, &mut observer).await.map_err(|e| match e {
        LLMError::MissingCredential => LLMError::AuthError(persona::MISSING_KEY_NOTICE.into()),
        other => other,
    })?;
    if turn.failed() {
        eprintln!("{}", turn.reply);
    } else {
        println!();
    }
    Ok(())
}

async fn interactive(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", persona::PAGE_TITLE.bright_cyan());
    println!("{}", persona::CAPTION.bright_black());
    println!("{}", persona::WELCOME);
    println!(
        "{}",
        "Commands: /key <api key>, /reset, /exit".bright_black()
    );
    if !session.has_credential() {
        println!("{}", persona::ADD_KEY_HINT.bright_yellow());
    }
    rule();
    print_transcript(&mut session);

    let mut rl = DefaultEditor::new()?;

    loop {
        io::stdout().flush()?;
        let readline = rl.readline("> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "/exit" || trimmed.eq_ignore_ascii_case("exit") {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                if trimmed == "/reset" {
                    session.reset();
                    println!("{}", "Conversation reset.".bright_black());
                    print_transcript(&mut session);
                    continue;
                }
                if let Some(key) = trimmed.strip_prefix("/key") {
                    let key = key.trim();
                    if key.is_empty() {
                        eprintln!("{} Usage: /key <api key>", "Error:".bright_red());
                    } else {
                        session.set_credential(key);
                        println!("{} API key set.", "✓".bright_green());
                    }
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match run_turn(&mut session, trimmed.to_string()).await {
                    Ok(()) => rule(),
                    Err(LLMError::MissingCredential) => {
                        println!("{}", persona::MISSING_KEY_NOTICE.bright_yellow());
                    }
                    Err(e) => {
                        eprintln!("{} {}", "Error:".bright_red(), e);
                        rule();
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{}", "Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".bright_red(), err);
                break;
            }
        }
    }

    Ok(())
}

/// Main entry point for the PFD chat CLI
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pfd_chat::init_logging();
    let args = CliArgs::parse();

    let builder = chat_builder(&args);
    let streamer = streamer(&args);

    match args.command {
        #[cfg(feature = "api")]
        Some(Command::Serve { ref addr }) => {
            let mut server = pfd_chat::api::Server::new(builder, Persona::pfd_toolkit())
                .with_streamer(streamer);
            if let Some(key) = args.api_key.clone() {
                server = server.with_credential(key);
            }
            println!("Serving {} on http://{}", persona::PAGE_TITLE.bright_cyan(), addr);
            server.run(addr).await?;
            Ok(())
        }
        Some(Command::Chat { ref prompt }) => {
            let session = new_session(builder, streamer, &args);
            if prompt.is_some() || !io::stdin().is_terminal() {
                single_turn(session, prompt.clone()).await
            } else {
                interactive(session).await
            }
        }
        None => {
            let session = new_session(builder, streamer, &args);
            if !io::stdin().is_terminal() {
                single_turn(session, None).await
            } else {
                interactive(session).await
            }
        }
    }
}

fn new_session(builder: ChatBuilder, streamer: CompletionStreamer, args: &CliArgs) -> Session {
    let mut session = Session::new(builder, Persona::pfd_toolkit()).with_streamer(streamer);
    if let Some(key) = args.api_key.clone() {
        session.set_credential(key);
    }
    session
}
