//! pubsub-bridge
//!
//! Процесс-мост: читает команды построчно из stdin, публикует сообщения и
//! управляет подписками. Пачки сообщений и ответы на команды пишутся в
//! stdout построчным JSON, логи идут в stderr.
//!
//! Команды:
//! - `SUB <server> [pattern]`
//! - `UNSUB <server>`
//! - `PUB <server> <channel> <payload...>`
//! - `LIST`
//! - `QUIT`

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use pubsub_bridge::{
    init_logging, BrokerHub, JsonLinesSink, ProfileStore, PubsubBridge, Response, Settings,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Аргументы командной строки.
#[derive(Parser)]
#[command(name = "pubsub-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Batched publish/subscribe bridge", long_about = None)]
struct Cli {
    /// Путь к TOML-файлу конфигурации
    #[arg(
        short,
        long,
        env = "PUBSUB_BRIDGE_CONFIG",
        help = "Путь к TOML-файлу конфигурации"
    )]
    config: Option<PathBuf>,
    /// Уровень логирования (перекрывает logging.level)
    #[arg(short, long, help = "Уровень или директива фильтра логов")]
    log_level: Option<String>,
}

/// Команда из stdin.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Sub { server: &'a str, pattern: &'a str },
    Unsub { server: &'a str },
    Pub { server: &'a str, channel: &'a str, payload: &'a str },
    List,
    Quit,
}

#[derive(Serialize)]
struct Reply<'a, T> {
    command: &'a str,
    response: &'a Response<T>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    let logging = init_logging(settings.logging.clone())
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    let hub = Arc::new(BrokerHub::new(settings.broker.channel_capacity));
    let store = Arc::new(ProfileStore::new(settings.profiles.clone(), hub));
    let sink = Arc::new(JsonLinesSink::new(std::io::stdout()));
    let bridge = PubsubBridge::with_profile_store(store, sink, settings.batch_options());

    let shutdown = CancellationToken::new();
    bridge.start(&shutdown);
    info!(servers = settings.profiles.len(), "bridge ready");

    let res = run_commands(&bridge).await;

    shutdown.cancel();
    bridge.stop_all().await;
    logging.shutdown();
    res
}

/// Читает команды до EOF, `QUIT` или Ctrl-C.
async fn run_commands(bridge: &PubsubBridge) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    debug!("stdin closed");
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => return Ok(()),
                    Ok(command) => execute(bridge, command).await?,
                    Err(usage) => reply("ERROR", &Response::<()>::fail(usage))?,
                }
            }
        }
    }
}

async fn execute(
    bridge: &PubsubBridge,
    command: Command<'_>,
) -> Result<()> {
    match command {
        Command::Sub { server, pattern } => {
            reply("SUB", &bridge.start_subscribe(server, pattern).await)
        }
        Command::Unsub { server } => reply("UNSUB", &bridge.stop_subscribe(server).await),
        Command::Pub {
            server,
            channel,
            payload,
        } => reply(
            "PUB",
            &bridge
                .publish(server, channel, payload.to_string())
                .await,
        ),
        Command::List => reply("LIST", &Response::ok(bridge.subscriptions().await)),
        Command::Quit => Ok(()),
    }
}

fn reply<T: Serialize>(
    command: &str,
    response: &Response<T>,
) -> Result<()> {
    let line = serde_json::to_string(&Reply { command, response })?;
    println!("{line}");
    Ok(())
}

/// Отделяет первое слово строки от остатка.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse_command(line: &str) -> Result<Command<'_>, String> {
    let (verb, rest) = next_word(line.trim());
    match verb.to_ascii_uppercase().as_str() {
        "SUB" => {
            let (server, rest) = next_word(rest);
            let (pattern, _) = next_word(rest);
            if server.is_empty() {
                return Err("usage: SUB <server> [pattern]".into());
            }
            Ok(Command::Sub { server, pattern })
        }
        "UNSUB" => {
            let (server, _) = next_word(rest);
            if server.is_empty() {
                return Err("usage: UNSUB <server>".into());
            }
            Ok(Command::Unsub { server })
        }
        "PUB" => {
            let (server, rest) = next_word(rest);
            let (channel, payload) = next_word(rest);
            if server.is_empty() || channel.is_empty() {
                return Err("usage: PUB <server> <channel> <payload>".into());
            }
            Ok(Command::Pub {
                server,
                channel,
                payload,
            })
        }
        "LIST" => Ok(Command::List),
        "QUIT" | "EXIT" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sub_with_and_without_pattern() {
        assert_eq!(
            parse_command("SUB local news.*"),
            Ok(Command::Sub {
                server: "local",
                pattern: "news.*"
            })
        );
        assert_eq!(
            parse_command("sub local"),
            Ok(Command::Sub {
                server: "local",
                pattern: ""
            })
        );
    }

    #[test]
    fn test_parse_pub_keeps_payload_spaces() {
        assert_eq!(
            parse_command("PUB local chan  hello  world"),
            Ok(Command::Pub {
                server: "local",
                channel: "chan",
                payload: "hello  world"
            })
        );
        assert_eq!(
            parse_command("PUB local chan"),
            Ok(Command::Pub {
                server: "local",
                channel: "chan",
                payload: ""
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("SUB").is_err());
        assert!(parse_command("UNSUB").is_err());
        assert!(parse_command("PUB local").is_err());
        assert_eq!(
            parse_command("FLY away"),
            Err("unknown command: FLY".to_string())
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("LIST"), Ok(Command::List));
        assert_eq!(parse_command(" quit "), Ok(Command::Quit));
        assert_eq!(parse_command("UNSUB local"), Ok(Command::Unsub { server: "local" }));
    }
}
