//! Multi-table chat poker service using the async actor model.
//!
//! Without a chat front end attached, the service opens a number of tables,
//! seats built-in bots funded from the free-chips faucet and lets every table
//! play its hands concurrently. When done (or on Ctrl+C) it cashes everybody
//! out and checks that the ledger still holds every chip it handed out.

mod bots;
mod config;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Error;
use chatpoker::{
    EngineError,
    game::entities::{Action, PlayerId},
    ledger::{Ledger, MemoryLedger, TableKey},
    table::{ManagerError, SessionError, TableManager, TableOptions},
};
use ctrlc::set_handler;
use log::{debug, error, info, warn};
use pico_args::Arguments;

use bots::{Bot, BotStyle};
use config::ServerConfig;

const HELP: &str = "\
Run chat poker tables played by built-in bots

USAGE:
  chatpoker_server [OPTIONS]

OPTIONS:
  --tables     N           Number of tables to open       [default: env TABLES or 1]
  --bots       N           Bots seated at each table      [default: env BOTS_PER_TABLE or 4]
  --hands      N           Hands played at each table     [default: env HANDS_PER_TABLE or 100]
  --options    OPTIONS     Table options, comma-separated [default: env TABLE_OPTIONS or 20,100,0,2,1,0,6,30]
                           minBuy,maxBuy,matchStack,bb,sb,ante,seats,timeBank

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  FREE_CHIPS               Chips handed out per faucet claim
  FREE_CHIPS_COOLDOWN_SECS Seconds between faucet claims
  MAX_TABLES_PER_OWNER     Tables a single owner may store
  RUST_LOG                 Log level (e.g., info, chatpoker=debug)
";

/// Owner id the service opens its own tables under.
const HOUSE: PlayerId = 0;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let tables_override: Option<usize> = pargs.opt_value_from_str("--tables")?;
    let bots_override: Option<usize> = pargs.opt_value_from_str("--bots")?;
    let hands_override: Option<u64> = pargs.opt_value_from_str("--hands")?;
    let options_override: Option<String> = pargs.opt_value_from_str("--options")?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(
        tables_override,
        bots_override,
        hands_override,
        options_override,
    )?;

    // Catching signals for a graceful stop between hands.
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    set_handler(move || {
        if flag.swap(false, Ordering::SeqCst) {
            info!("Stopping after the current hands");
        } else {
            std::process::exit(0);
        }
    })?;

    info!(
        "Starting {} table(s) with {} bots each ({})",
        config.tables, config.bots_per_table, config.table_options
    );

    let ledger = Arc::new(MemoryLedger::new(config.ledger.clone()));
    let manager = Arc::new(TableManager::new(ledger.clone()));

    let mut tasks = Vec::with_capacity(config.tables);
    for i in 0..config.tables {
        let key = TableKey::new(HOUSE, format!("table-{}", i + 1));
        manager
            .create_table(&key, config.table_options.clone())
            .await?;
        manager.open_table(key.clone()).await?;
        info!("✓ Opened table {key}");

        let bots = (0..config.bots_per_table)
            .map(|seat| {
                let player = (i * 100 + seat + 1) as PlayerId;
                Bot::new(player, BotStyle::ALL[seat % BotStyle::ALL.len()])
            })
            .collect();
        tasks.push(tokio::spawn(run_table(
            manager.clone(),
            key,
            config.table_options.clone(),
            bots,
            config.hands_per_table,
            running.clone(),
        )));
    }

    let mut hands = 0;
    for task in tasks {
        match task.await {
            Ok(Ok(played)) => hands += played,
            Ok(Err(e)) => error!("Table stopped with an error: {e}"),
            Err(e) => error!("Table task failed: {e}"),
        }
    }
    info!("Played {hands} hand(s)");

    let mut handed_out = 0u64;
    for key in manager.table_keys().await {
        match manager.close_table(&key).await {
            Ok(cashed) => {
                for (player, chips) in cashed {
                    debug!("{player} left {key} with {chips}");
                }
            }
            Err(e) => error!("Failed to close table {key}: {e}"),
        }
    }
    for i in 0..config.tables {
        for seat in 0..config.bots_per_table {
            let player = (i * 100 + seat + 1) as PlayerId;
            let balance = ledger.get_chips(player).await?;
            info!("Player {player} finishes with {balance} chips");
        }
        handed_out += u64::from(config.ledger.free_chips) * config.bots_per_table as u64;
    }

    let total = ledger.total_balance().await;
    if total == handed_out {
        info!("Ledger balanced: {total} chips");
    } else {
        error!("Ledger holds {total} chips but {handed_out} were handed out");
    }

    Ok(())
}

/// Seat the bots and play hands until done, out of players or stopped.
async fn run_table(
    manager: Arc<TableManager>,
    key: TableKey,
    options: TableOptions,
    mut bots: Vec<Bot>,
    hands: u64,
    running: Arc<AtomicBool>,
) -> Result<u64, ManagerError> {
    let ledger = manager.ledger().clone();
    for (seat, bot) in bots.iter().enumerate() {
        let claim = ledger.claim_free_chips(bot.player).await?;
        let buy_in = claim
            .balance_after
            .clamp(options.min_buy_in_chips(), options.max_buy_in_chips(0));
        manager.buy_in(&key, bot.player, seat, buy_in).await?;
        manager.sit_in(&key, bot.player).await?;
    }

    let mut played = 0;
    while played < hands && running.load(Ordering::SeqCst) {
        match manager.start_hand(&key).await {
            Ok(()) => {}
            Err(ManagerError::Session(SessionError::Engine(
                EngineError::InsufficientPlayers | EngineError::ShortStack,
            ))) => {
                info!("{key}: not enough players left after {played} hand(s)");
                break;
            }
            Err(e) => return Err(e),
        }
        play_hand(&manager, &key, &mut bots).await?;
        played += 1;

        if let Some(result) = manager.table_view(&key, None).await?.last_result {
            info!("{key}: hand {played}: {result}");
        }
    }
    Ok(played)
}

async fn play_hand(
    manager: &TableManager,
    key: &TableKey,
    bots: &mut [Bot],
) -> Result<(), ManagerError> {
    loop {
        let view = manager.table_view(key, None).await?;
        let Some(seat) = view.acting_seat else {
            return Ok(());
        };
        let Some(player) = view.seats[seat].player else {
            return Ok(());
        };
        let Some(bot) = bots.iter_mut().find(|bot| bot.player == player) else {
            warn!("{key}: seat {seat} is not one of ours");
            return Ok(());
        };

        let own_view = manager.table_view(key, Some(player)).await?;
        let action = bot.decide(&own_view).unwrap_or(Action::Fold);
        if let Err(e) = manager.take_action(key, player, action).await {
            warn!("{key}: {player} {action} rejected: {e}");
            manager.take_action(key, player, Action::Fold).await?;
        }
    }
}
