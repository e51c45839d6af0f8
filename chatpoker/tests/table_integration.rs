//! Integration tests for tables driven through the manager and ledger.

use chatpoker::{
    game::{
        EngineError,
        entities::{Action, ActionChoice, Chips, PlayerId, Street},
    },
    ledger::{Ledger, LedgerError, MemoryLedger, TableKey},
    table::{ManagerError, SessionError, TableManager, TableOptions, TimeBank},
};
use std::sync::Arc;

const PLAYERS: [PlayerId; 4] = [101, 102, 103, 104];

async fn setup(options: TableOptions) -> (TableManager, Arc<MemoryLedger>, TableKey) {
    let ledger = Arc::new(MemoryLedger::default());
    let manager = TableManager::new(ledger.clone());
    let key = TableKey::new(1, "integration");
    manager.create_table(&key, options).await.unwrap();
    manager.open_table(key.clone()).await.unwrap();
    (manager, ledger, key)
}

fn to_action(choice: ActionChoice) -> Action {
    match choice {
        ActionChoice::AllIn(_) => Action::AllIn,
        ActionChoice::Bet(chips) => Action::Bet(chips),
        ActionChoice::Call(_) => Action::Call,
        ActionChoice::Check => Action::Check,
        ActionChoice::Fold => Action::Fold,
    }
}

/// Play one hand choosing among the legal actions in rotation.
async fn play_hand(manager: &TableManager, key: &TableKey, step: &mut usize) {
    loop {
        let view = manager.table_view(key, None).await.unwrap();
        let Some(seat) = view.acting_seat else {
            break;
        };
        let player = view.seats[seat].player.unwrap();
        let view = manager.table_view(key, Some(player)).await.unwrap();
        let choices = view.action_choices.unwrap().0;
        // Skip all-ins most of the time so hands last a while.
        let mut choice = choices[*step % choices.len()];
        if matches!(choice, ActionChoice::AllIn(_)) && *step % 7 != 0 {
            choice = choices[0];
        }
        *step += 1;
        manager
            .take_action(key, player, to_action(choice))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_many_hands_conserve_chips() {
    let options = TableOptions {
        time_bank: TimeBank::Unlimited,
        ante: 1,
        ..TableOptions::default()
    };
    let (manager, ledger, key) = setup(options).await;
    for (seat, &player) in PLAYERS.iter().enumerate() {
        ledger.add_chips(player, 150).await.unwrap();
        manager.buy_in(&key, player, seat, 100 + 10 * seat as Chips).await.unwrap();
        manager.sit_in(&key, player).await.unwrap();
    }
    let funded = 600u64;

    let mut step = 0;
    let mut hands = 0;
    while hands < 40 {
        match manager.start_hand(&key).await {
            Ok(()) => {}
            Err(ManagerError::Session(SessionError::Engine(
                EngineError::InsufficientPlayers | EngineError::ShortStack,
            ))) => break,
            Err(err) => panic!("unexpected error: {err}"),
        }
        play_hand(&manager, &key, &mut step).await;
        hands += 1;

        let view = manager.table_view(&key, None).await.unwrap();
        assert_eq!(view.street, Street::End);
        assert_eq!(view.pot, 0);
        let at_table: Chips = view.seats.iter().map(|seat| seat.stack).sum();
        let off_table: u64 = ledger.total_balance().await;
        assert_eq!(u64::from(at_table) + off_table, funded);
        assert!(view.recent_hands.len() <= 5);
    }
    assert!(hands > 0);

    manager.close_table(&key).await.unwrap();
    assert_eq!(ledger.total_balance().await, funded);
    assert_eq!(manager.active_table_count().await, 0);
}

#[tokio::test]
async fn test_buy_in_limits_surface_through_manager() {
    let (manager, ledger, key) = setup(TableOptions::default()).await;
    ledger.add_chips(101, 1000).await.unwrap();

    assert_eq!(
        manager.buy_in(&key, 101, 0, 500).await,
        Err(ManagerError::Session(SessionError::BuyInOutOfRange {
            min: 40,
            max: 200
        }))
    );
    assert_eq!(
        manager.buy_in(&key, 102, 0, 100).await,
        Err(ManagerError::Session(SessionError::InsufficientChips {
            required: 100,
            available: 0
        }))
    );
    manager.buy_in(&key, 101, 0, 200).await.unwrap();
    assert_eq!(ledger.get_chips(101).await, Ok(800));
    assert_eq!(manager.cash_out(&key, 101).await, Ok(200));
    assert_eq!(ledger.get_chips(101).await, Ok(1000));
}

#[tokio::test]
async fn test_table_limit_per_owner() {
    let ledger = Arc::new(MemoryLedger::default());
    let manager = TableManager::new(ledger.clone());
    for name in ["a", "b", "c"] {
        manager
            .create_table(&TableKey::new(9, name), TableOptions::default())
            .await
            .unwrap();
    }
    assert_eq!(
        manager
            .create_table(&TableKey::new(9, "d"), TableOptions::default())
            .await,
        Err(ManagerError::Ledger(LedgerError::TableLimitReached { limit: 3 }))
    );
    assert_eq!(
        manager
            .create_table(&TableKey::new(9, "a"), TableOptions::default())
            .await,
        Err(ManagerError::Ledger(LedgerError::TableExists(TableKey::new(9, "a"))))
    );
}

#[tokio::test]
async fn test_parsed_options_open_a_table() {
    let ledger = Arc::new(MemoryLedger::default());
    let manager = TableManager::new(ledger.clone());
    let key = TableKey::new(3, "heads-up");
    let options: TableOptions = "10,50,1,4,2,0,2,-1".parse().unwrap();
    manager.create_table(&key, options).await.unwrap();
    manager.open_table(key.clone()).await.unwrap();

    let view = manager.table_view(&key, None).await.unwrap();
    assert_eq!(view.seats.len(), 2);
    assert_eq!(view.blinds.big, 4);
    assert_eq!(view.street, Street::End);
}
