use std::sync::Arc;

use clap::{Parser, Subcommand};

use helga::application::errors::BotError;
use helga::application::services::MessageService;
use helga::domain::entities::{Message, Response};
use helga::infrastructure::adapters::{ConsoleAdapter, ConsoleInput};
use helga::infrastructure::config::Config;
use helga::plugins::{
    CatalogSource, Command, Match, Pattern, PluginEntry, Registry, Signal, SignalSink, Signals, PRIORITY_NORMAL,
};

#[derive(Parser)]
#[command(name = "helga")]
#[command(about = "A pluggable chat bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot nickname (overrides config)
    #[arg(short, long)]
    nick: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.nick) {
                tracing::error!("Bot stopped: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("helga v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: &str, nick_override: Option<String>) -> Result<(), BotError> {
    // Load config
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(nick) = nick_override {
        config.bot.nick = nick;
    }
    config.validate()?;

    tracing::info!("Starting helga: {}", config.bot.nick);

    let signals = Arc::new(Signals::new());
    signals.on(Signal::PluginsLoaded, |signal| {
        tracing::info!(signal = %signal, "Plugin source scanned");
    });
    signals.on(Signal::Signon, |signal| {
        tracing::info!(signal = %signal, "Signed on");
    });

    let mut registry = Registry::new(config.registry_settings(), Box::new(builtin_catalog()), signals.clone());
    let loaded = registry.load();
    tracing::info!("Plugin system initialized with {} plugins", loaded);

    let console = config.adapters.console.clone().unwrap_or_default();
    if !console.enabled {
        tracing::warn!("No adapter enabled, nothing to do");
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let adapter = ConsoleAdapter::new(config.bot.nick.clone());
        let service = MessageService::new(adapter, registry);
        run_console_bot(service, signals, console.channel, console.nick).await
    })
}

/// Plugins shipped with the binary
fn builtin_catalog() -> CatalogSource {
    CatalogSource::new()
        .with("ping", || {
            let ping = Command::new("ping")
                .with_help("Check that the bot is alive")
                .with_runner(|_, _, _, _| Ok(Response::text("pong")));
            Ok(PluginEntry::instance(ping))
        })
        .with("greet", || {
            let greet = Match::new(Pattern::regex(r"(?i)^(?:hi|hello)\b")?)
                .with_priority(PRIORITY_NORMAL)
                .with_runner(|_, message, _| Ok(Response::text(format!("hello, {}", message.nick))));
            Ok(PluginEntry::instance(greet))
        })
}

async fn run_console_bot(
    mut service: MessageService<ConsoleAdapter>,
    signals: Arc<Signals>,
    mut channel: String,
    nick: String,
) -> Result<(), BotError> {
    join_channel(&mut service, &channel);
    signals.emit(Signal::Signon);

    println!("helga console on {} as {}. Type /help for operator commands.", channel, nick);

    let mut input = ConsoleInput::new();
    while let Some(line) = input.read_line("> ").await? {
        if line.is_empty() {
            continue;
        }

        if let Some(control) = line.strip_prefix('/') {
            match run_control(&mut service, &mut channel, control) {
                Some(reply) => println!("{}", reply),
                None => break,
            }
            continue;
        }

        let message = Message::new(channel.as_str(), nick.as_str(), line);
        if let Err(e) = service.handle(message).await {
            tracing::error!("Failed to handle message: {}", e);
        }
    }

    tracing::info!("Console closed");
    Ok(())
}

fn join_channel(service: &mut MessageService<ConsoleAdapter>, channel: &str) {
    let registry = service.registry_mut();
    registry.enable_defaults(channel);
    // Built-ins are always on in the console
    registry.enable(channel, ["ping", "greet"]);
    tracing::info!(channel = %channel, "Joined channel");
}

/// Operator commands, `None` asks the console to quit
fn run_control(service: &mut MessageService<ConsoleAdapter>, channel: &mut String, control: &str) -> Option<String> {
    let mut parts = control.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let reply = match command {
        "help" => {
            let mut lines =
                vec!["/plugins, /enable NAME.., /disable NAME.., /reload NAME, /join CHANNEL, /nick NICK, /quit".to_string()];
            lines.extend(service.registry().help(channel.as_str()));
            lines.join("\n")
        }
        "plugins" => {
            let registry = service.registry();
            registry
                .all_plugins()
                .into_iter()
                .map(|name| {
                    let mark = if registry.is_enabled(channel.as_str(), name) { "*" } else { " " };
                    format!("{} {}", mark, name)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        "enable" if !args.is_empty() => {
            service.registry_mut().enable(channel.as_str(), args.iter().copied());
            format!("Enabled on {}: {}", channel, args.join(", "))
        }
        "disable" if !args.is_empty() => {
            service.registry_mut().disable(channel.as_str(), args.iter().copied());
            format!("Disabled on {}: {}", channel, args.join(", "))
        }
        "reload" if args.len() == 1 => service.registry_mut().reload(args[0]).to_string(),
        "join" if args.len() == 1 => {
            *channel = args[0].to_string();
            join_channel(service, channel.as_str());
            format!("Now talking on {}", channel)
        }
        "nick" if args.len() == 1 => {
            service.client_mut().set_nickname(args[0]);
            format!("Bot is now known as {}", args[0])
        }
        "quit" => return None,
        _ => format!("Unknown or malformed command '/{}', try /help", control),
    };

    Some(reply)
}

fn init_config() {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render default config: {}", e),
    }
}
