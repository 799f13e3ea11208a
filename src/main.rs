use std::path::Path;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use respondbot::config::Config;
use respondbot::quotes::QuoteListener;
use respondbot::respond::{
    IncomingMessage, OutboundSender, RespondEngine, RoomId, RuleDatabase, RuleRepository, RuleStore,
    RuleWriter, TelegramSender,
};

struct BotState {
    config: Config,
    engine: RespondEngine,
    quotes: Option<QuoteListener>,
    sender: Arc<TelegramSender>,
}

impl BotState {
    /// Build the state; also returns the rule writer task when persisting.
    async fn new(config: Config, bot: &Bot) -> (Self, Option<JoinHandle<()>>) {
        // Commands are addressed to the configured name, else the Telegram username
        let bot_name = match config.bot_name.clone() {
            Some(name) => Some(name),
            None => match bot.get_me().await {
                Ok(me) => {
                    info!("Bot user ID: {}, username: @{}", me.id, me.username());
                    Some(me.username().to_string())
                }
                Err(e) => {
                    warn!("Failed to get bot info: {e}");
                    None
                }
            },
        };

        let sender = Arc::new(TelegramSender::new(bot.clone(), config.dry_run));
        let outbound: Arc<dyn OutboundSender> = sender.clone();
        let mut engine = RespondEngine::new(outbound, bot_name);
        let mut writer_task = None;

        if config.persist {
            let path = config.database_path();
            match RuleDatabase::open(&path) {
                Ok(db) => {
                    let db = Arc::new(db);
                    let mut store = RuleStore::new();
                    match db.load() {
                        Ok(rules) => store.restore(rules),
                        Err(e) => warn!("Failed to load rules, starting empty: {e}"),
                    }
                    info!("Loaded {} rules", store.len());

                    let (writer, task) = RuleWriter::spawn(db);
                    engine = engine.with_store(store).with_writer(writer);
                    writer_task = Some(task);
                }
                Err(e) => warn!("Rules will not persist: {e}"),
            }
        } else {
            info!("Persistence disabled, rules live in memory");
        }

        let quotes = config
            .quotes_enabled
            .then(|| QuoteListener::new(config.quote_pattern.clone()));

        (Self { config, engine, quotes, sender }, writer_task)
    }
}

fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let file_writer = std::fs::create_dir_all(log_dir)
        .and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join("respondbot.log"))
        })
        .map(tracing_appender::non_blocking);

    let (file_layer, guard) = match file_writer {
        Ok((non_blocking, guard)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                );
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "respondbot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let _guard = init_logging(&config.log_dir());

    info!("🚀 Starting respondbot...");
    info!("Loaded config from {config_path}");
    if config.dry_run {
        info!("DRY RUN mode enabled");
    }

    let bot = Bot::new(&config.telegram_bot_token);
    let (state, writer_task) = BotState::new(config, &bot).await;
    let state = Arc::new(state);
    match state.engine.bot_name() {
        Some(name) => info!("Listening for commands addressed to @{name}"),
        None => warn!("No bot name known, every message is parsed as a command"),
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_new_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state.clone()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    // Dropping the engine closes the writer queue; wait for the last save
    if let (Ok(state), Some(task)) = (Arc::try_unwrap(state), writer_task) {
        drop(state);
        if let Err(e) = task.await {
            warn!("Rule writer did not finish: {e}");
        }
    }

    info!("👋 Shutting down");
}

async fn handle_new_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let is_group = matches!(msg.chat.kind, ChatKind::Public(_));
    let is_private = matches!(msg.chat.kind, ChatKind::Private(_));

    if is_group && !state.config.is_allowed_group(msg.chat.id) {
        return Ok(());
    }
    if !is_group && !is_private {
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(incoming) = telegram_to_incoming(&msg, text, is_private) else {
        return Ok(());
    };

    let reply = state.engine.handle_message(&incoming).await;
    if let Some(reply) = reply.text() {
        let preview: String = reply.chars().take(100).collect();
        info!("↩️ {} in {}: \"{preview}\"", incoming.sender_name, incoming.room_name);
    }

    if let Some(ref quotes) = state.quotes {
        if let Some(quote) = quotes.hear(text) {
            info!("🎭 Quote for {} in {}", incoming.sender_name, incoming.room_name);
            state.sender.send(incoming.room_id, quote);
        }
    }

    Ok(())
}

fn telegram_to_incoming(msg: &Message, text: &str, direct: bool) -> Option<IncomingMessage> {
    let Some(user) = msg.from.as_ref() else {
        debug!("Message {} without sender", msg.id);
        return None;
    };
    if user.is_bot {
        return None;
    }

    let sender_name = user.username.as_deref().unwrap_or(&user.first_name).to_string();
    let room_name = msg
        .chat
        .title()
        .or_else(|| msg.chat.username())
        .unwrap_or(sender_name.as_str())
        .to_string();

    Some(IncomingMessage {
        text: text.to_string(),
        sender_name,
        room_id: RoomId(msg.chat.id.0),
        room_name,
        direct,
    })
}
