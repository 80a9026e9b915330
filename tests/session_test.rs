//! Tests for full matches played through a game session.

use gridtoe::{
    GameSession, KeyValueStore, LEADERBOARD_KEY, MemoryStore, ROUNDS_KEY, RecordService,
    SETTINGS_KEY, SessionError, SettingsChange, StorageError, TimerSignal,
};
use gridtoe_core::{
    Coord, GameResult, MatchError, MatchPhase, MatchResult, MoveError, Player, Settings, Symbol,
};

/// Player one takes the top row.
const ONE_WINS: [(usize, usize); 5] = [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)];

/// Player two takes the middle row.
const TWO_WINS: [(usize, usize); 6] = [(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (1, 2)];

/// Fills a 3x3 board with no line.
const TIE: [(usize, usize); 9] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 1),
    (1, 0),
    (1, 2),
    (2, 1),
    (2, 0),
    (2, 2),
];

fn new_session() -> GameSession<MemoryStore> {
    GameSession::new(RecordService::new(MemoryStore::new()))
}

fn session_with(settings: Settings) -> GameSession<MemoryStore> {
    let mut session = new_session();
    assert_eq!(
        session.apply_settings(settings).unwrap(),
        SettingsChange::Applied
    );
    session
}

fn play<S: KeyValueStore>(session: &mut GameSession<S>, moves: &[(usize, usize)]) {
    for &cell in moves {
        session.apply_move(cell.into()).expect("legal move");
    }
}

/// Store whose every call fails.
#[derive(Debug, Default)]
struct OfflineStore;

impl KeyValueStore for OfflineStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::new("offline"))
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::new("offline"))
    }

    fn remove(&mut self, _key: &str) -> Result<bool, StorageError> {
        Err(StorageError::new("offline"))
    }
}

#[test]
fn test_top_row_wins_round() {
    let mut session = new_session();
    play(&mut session, &ONE_WINS[..4]);
    let outcome = session.apply_move(Coord::new(0, 2)).unwrap();

    let GameResult::Won { player, line } = outcome.result() else {
        panic!("expected a win");
    };
    assert_eq!(*player, Player::One);
    assert_eq!(
        line.cells(),
        &[Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
    );
    assert!(matches!(outcome.phase(), MatchPhase::RoundJustEnded { .. }));
    assert_eq!(*session.score().player1_wins(), 1);
}

#[test]
fn test_majority_ends_match_early() {
    let mut session = new_session();
    play(&mut session, &ONE_WINS);
    assert_eq!(session.next_round().unwrap(), 2);
    play(&mut session, &ONE_WINS[..4]);
    let outcome = session.apply_move(Coord::new(0, 2)).unwrap();

    assert_eq!(
        outcome.phase(),
        &MatchPhase::Complete {
            result: MatchResult::Winner(Player::One)
        }
    );
    assert_eq!(session.match_result(), Some(MatchResult::Winner(Player::One)));
    assert_eq!(session.round(), 2);
}

#[test]
fn test_single_round_tie_ends_match_tied() {
    let mut settings = Settings::new();
    settings.set_max_rounds(1).unwrap();
    let mut session = session_with(settings);

    play(&mut session, &TIE[..8]);
    let outcome = session.apply_move(Coord::new(2, 2)).unwrap();

    assert_eq!(outcome.result(), &GameResult::Tie);
    assert_eq!(session.match_result(), Some(MatchResult::Tie));
    assert!(outcome.entry().is_none());
    assert!(session.leaderboard().is_empty());
}

#[test]
fn test_exhausted_rounds_with_level_score_is_tie() {
    let mut session = new_session();
    play(&mut session, &ONE_WINS);
    session.next_round().unwrap();
    play(&mut session, &TWO_WINS);
    session.next_round().unwrap();
    play(&mut session, &TIE);

    assert_eq!(session.match_result(), Some(MatchResult::Tie));
    assert_eq!(*session.score().ties(), 1);
}

#[test]
fn test_exhausted_rounds_leader_wins() {
    let mut settings = Settings::new();
    settings.set_max_rounds(5).unwrap();
    let mut session = session_with(settings);

    for moves in [&TIE[..], &TIE[..], &TWO_WINS[..], &TIE[..]] {
        play(&mut session, moves);
        session.next_round().unwrap();
    }
    play(&mut session, &TIE);

    assert_eq!(session.match_result(), Some(MatchResult::Winner(Player::Two)));
}

#[test]
fn test_moves_rejected_between_rounds_and_after_match() {
    let mut session = new_session();
    play(&mut session, &ONE_WINS);
    assert_eq!(
        session.apply_move(Coord::new(2, 2)),
        Err(SessionError::Match(MatchError::NoRoundInProgress))
    );

    session.next_round().unwrap();
    play(&mut session, &ONE_WINS);
    assert!(session.next_round().is_err());
    assert_eq!(
        session.apply_move(Coord::new(2, 2)),
        Err(SessionError::Match(MatchError::NoRoundInProgress))
    );

    session.reset_match();
    assert_eq!(session.round(), 1);
    assert_eq!(session.score().rounds_played(), 0);
    assert!(session.board().is_blank());
}

#[test]
fn test_illegal_moves_change_nothing() {
    let mut session = new_session();
    session.apply_move(Coord::new(1, 1)).unwrap();
    assert_eq!(
        session.apply_move(Coord::new(1, 1)),
        Err(SessionError::Move(MoveError::SquareOccupied(Coord::new(1, 1))))
    );
    assert_eq!(
        session.apply_move(Coord::new(3, 0)),
        Err(SessionError::Move(MoveError::OutOfBounds(Coord::new(3, 0), 3)))
    );
    assert_eq!(session.current_player(), Player::Two);
    assert_eq!(session.board().count(Player::Two), 0);
}

#[test]
fn test_next_round_opens_with_player_one() {
    let mut session = new_session();
    play(&mut session, &TWO_WINS);
    session.next_round().unwrap();
    assert_eq!(session.current_player(), Player::One);
    assert!(session.board().is_blank());
}

#[test]
fn test_timer_ticks_and_stale_handles() {
    let mut session = new_session();
    let outcome = session.apply_move(Coord::new(0, 0)).unwrap();
    let TimerSignal::Started(handle) = *outcome.timer() else {
        panic!("first move starts the timer");
    };
    assert!(session.tick(handle));
    assert!(session.tick(handle));
    assert_eq!(session.elapsed_seconds(), 2);

    session.reset_round().unwrap();
    assert!(!session.tick(handle));
    assert_eq!(session.elapsed_seconds(), 0);
}

#[test]
fn test_timed_wins_produce_leaderboard_entry() {
    let mut session = new_session();

    let TimerSignal::Started(handle) = *session.apply_move(Coord::new(0, 0)).unwrap().timer()
    else {
        panic!("timer should start");
    };
    session.tick(handle);
    play(&mut session, &ONE_WINS[1..4]);
    let outcome = session.apply_move(Coord::new(0, 2)).unwrap();
    assert_eq!(*outcome.timer(), TimerSignal::Stopped);
    assert_eq!(session.round_records().len(), 1);
    assert_eq!(*session.round_records().records()[0].elapsed_seconds(), 1);
    assert!(!session.tick(handle));

    session.next_round().unwrap();
    let TimerSignal::Started(handle) = *session.apply_move(Coord::new(0, 0)).unwrap().timer()
    else {
        panic!("timer should restart");
    };
    for _ in 0..3 {
        session.tick(handle);
    }
    play(&mut session, &ONE_WINS[1..]);

    let best = session.leaderboard().best().expect("entry recorded").clone();
    assert_eq!(*best.average_win_time(), 2.0);
    assert_eq!(best.player_label(), "Player 1");
    assert_eq!(best.symbol(), &Symbol::new("X"));
    assert!(session.round_records().is_empty());

    let stored = session.service().store().get(LEADERBOARD_KEY).unwrap();
    assert!(stored.expect("leaderboard saved").contains("averageWinTime"));
}

#[test]
fn test_timer_disabled_records_nothing() {
    let mut settings = Settings::new();
    settings.set_timer(false);
    let mut session = session_with(settings);

    let outcome = session.apply_move(Coord::new(0, 0)).unwrap();
    assert_eq!(*outcome.timer(), TimerSignal::Unchanged);
    play(&mut session, &ONE_WINS[1..]);
    session.next_round().unwrap();
    play(&mut session, &ONE_WINS);

    assert_eq!(session.match_result(), Some(MatchResult::Winner(Player::One)));
    assert!(session.leaderboard().is_empty());
    assert!(session.round_records().is_empty());
}

#[test]
fn test_tied_match_writes_no_entry() {
    let mut session = new_session();
    play(&mut session, &ONE_WINS);
    session.next_round().unwrap();
    play(&mut session, &TWO_WINS);
    session.next_round().unwrap();
    play(&mut session, &TIE);
    assert!(session.leaderboard().is_empty());
}

#[test]
fn test_clear_leaderboard_removes_stored_records() {
    let mut session = new_session();
    play(&mut session, &ONE_WINS);
    session.next_round().unwrap();
    play(&mut session, &ONE_WINS);
    assert_eq!(session.leaderboard().len(), 1);

    session.clear_leaderboard();
    assert!(session.leaderboard().is_empty());
    assert_eq!(session.service().store().get(LEADERBOARD_KEY).unwrap(), None);
    assert_eq!(session.service().store().get(ROUNDS_KEY).unwrap(), None);
}

#[test]
fn test_critical_change_mid_match_waits_for_answer() {
    let mut session = new_session();
    session.apply_move(Coord::new(1, 1)).unwrap();

    let mut bigger = session.settings().clone();
    bigger.set_grid_size(4).unwrap();
    let SettingsChange::NeedsConfirmation(change) = session.apply_settings(bigger.clone()).unwrap()
    else {
        panic!("grid change mid-match must ask first");
    };
    assert!(change.grid_size);
    assert_eq!(session.pending_settings(), Some(&bigger));

    assert!(session.resolve_pending_settings(false));
    assert_eq!(*session.settings().grid_size(), 3);
    assert_eq!(session.board().count(Player::One), 1);
    assert!(!session.resolve_pending_settings(false));

    session.apply_settings(bigger).unwrap();
    assert!(session.resolve_pending_settings(true));
    assert_eq!(*session.settings().grid_size(), 4);
    assert_eq!(session.board().size(), 4);
    assert!(session.board().is_blank());
}

#[test]
fn test_cosmetic_change_mid_match_applies_at_once() {
    let mut session = new_session();
    session.apply_move(Coord::new(1, 1)).unwrap();

    let mut renamed = session.settings().clone();
    renamed.set_name(Player::One, "Ada");
    renamed.set_symbol(Player::One, Symbol::new("@")).unwrap();
    assert_eq!(
        session.apply_settings(renamed).unwrap(),
        SettingsChange::Applied
    );
    assert_eq!(session.settings().name(Player::One), "Ada");
    assert_eq!(session.board().count(Player::One), 1);
    assert_eq!(session.current_symbol(), &Symbol::new("O"));
}

#[test]
fn test_critical_change_before_play_applies_at_once() {
    let mut session = new_session();
    let mut settings = session.settings().clone();
    settings.set_grid_size(5).unwrap();
    settings.set_win_length(4).unwrap();
    assert_eq!(
        session.apply_settings(settings).unwrap(),
        SettingsChange::Applied
    );
    assert_eq!(session.board().size(), 5);
}

#[test]
fn test_larger_board_needs_longer_run() {
    let mut settings = Settings::new();
    settings.set_grid_size(5).unwrap();
    settings.set_win_length(4).unwrap();
    let mut session = session_with(settings);

    play(
        &mut session,
        &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)],
    );
    assert_eq!(session.game_result(), &GameResult::InProgress);
    let outcome = session.apply_move(Coord::new(0, 3)).unwrap();
    assert_eq!(outcome.result().winner(), Some(Player::One));
    assert_eq!(outcome.result().line().map(|l| l.len()), Some(4));
}

#[test]
fn test_focus_reloads_saved_settings() {
    let mut session = new_session();
    let mut settings = session.settings().clone();
    settings.set_max_rounds(5).unwrap();
    let mut service = RecordService::new(session.service().store().clone());
    service.save_settings(&settings).unwrap();

    let mut other = GameSession::new(service);
    assert_eq!(*other.settings().max_rounds(), 5);
    assert_eq!(*other.on_focus().unwrap().settings(), SettingsChange::Applied);

    session.on_blur();
    assert_eq!(*session.on_focus().unwrap().settings(), SettingsChange::Applied);
    assert_eq!(*session.settings().max_rounds(), 3);
}

#[test]
fn test_session_reopens_with_stored_state() {
    let mut session = new_session();
    let mut settings = session.settings().clone();
    settings.set_name(Player::Two, "Grace");
    session.apply_settings(settings).unwrap();
    play(&mut session, &TWO_WINS);
    session.next_round().unwrap();
    play(&mut session, &TWO_WINS);
    session.next_round().ok();
    session.apply_move(Coord::new(0, 0)).ok();

    let store = session.service().store().clone();
    let reopened = GameSession::new(RecordService::new(store));
    assert_eq!(reopened.settings().name(Player::Two), "Grace");
    assert_eq!(reopened.leaderboard().len(), 1);
    assert_eq!(
        reopened.leaderboard().entries()[0].player_name(),
        "Grace"
    );
    assert!(reopened.round_records().is_empty());
    assert!(reopened.board().is_blank());
}

#[test]
fn test_stale_round_records_dropped_on_open() {
    let mut store = MemoryStore::new();
    store
        .set(
            ROUNDS_KEY,
            r#"[{"player":"One","symbol":"X","elapsedSeconds":4,"round":1}]"#.to_string(),
        )
        .unwrap();
    let session = GameSession::new(RecordService::new(store));
    assert!(session.round_records().is_empty());
    assert_eq!(
        session.service().store().get(ROUNDS_KEY).unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn test_offline_store_never_interrupts_play() {
    let mut session = GameSession::new(RecordService::new(OfflineStore));
    assert_eq!(session.settings(), &Settings::default());

    play(&mut session, &ONE_WINS);
    session.next_round().unwrap();
    play(&mut session, &ONE_WINS);

    assert_eq!(session.match_result(), Some(MatchResult::Winner(Player::One)));
    assert_eq!(session.leaderboard().len(), 1);

    let mut settings = session.settings().clone();
    settings.set_name(Player::One, "Ada");
    assert_eq!(
        session.apply_settings(settings).unwrap(),
        SettingsChange::Applied
    );
    session.clear_leaderboard();
    assert!(session.leaderboard().is_empty());
}

#[test]
fn test_duplicate_symbol_settings_rejected() {
    let mut session = new_session();
    let before = session.settings().clone();
    let mut settings = before.clone();
    assert!(settings.set_symbol(Player::Two, Symbol::new("X")).is_err());
    assert_eq!(settings, before);

    let bad: Settings =
        serde_json::from_str(r#"{"player1Symbol":"Z","player2Symbol":"Z"}"#).unwrap();
    assert!(session.apply_settings(bad).is_err());
    assert_eq!(session.settings(), &before);
    assert_eq!(session.service().store().get(SETTINGS_KEY).unwrap(), None);
}

#[test]
fn test_focus_with_offline_store_keeps_settings() {
    let mut session = GameSession::new(RecordService::new(OfflineStore));
    let mut settings = session.settings().clone();
    settings.set_name(Player::One, "Ada");
    settings.set_grid_size(5).unwrap();
    session.apply_settings(settings.clone()).unwrap();

    let focus = session.on_focus().unwrap();
    assert_eq!(*focus.settings(), SettingsChange::Applied);
    assert_eq!(session.settings(), &settings);
    assert_eq!(session.board().size(), 5);
}

#[test]
fn test_timer_enabled_mid_round_does_not_record_round() {
    let mut settings = Settings::new();
    settings.set_timer(false);
    settings.set_max_rounds(1).unwrap();
    let mut session = session_with(settings.clone());

    session.apply_move(Coord::new(0, 0)).unwrap();
    settings.set_timer(true);
    assert_eq!(
        session.apply_settings(settings).unwrap(),
        SettingsChange::Applied
    );
    play(&mut session, &ONE_WINS[1..]);

    assert_eq!(session.match_result(), Some(MatchResult::Winner(Player::One)));
    assert!(session.round_records().is_empty());
    assert!(session.leaderboard().is_empty());
}

#[test]
fn test_timer_enabled_between_rounds_times_next_round() {
    let mut settings = Settings::new();
    settings.set_timer(false);
    let mut session = session_with(settings.clone());
    play(&mut session, &ONE_WINS);

    settings.set_timer(true);
    session.apply_settings(settings).unwrap();
    session.next_round().unwrap();
    let TimerSignal::Started(handle) = *session.apply_move(Coord::new(0, 0)).unwrap().timer()
    else {
        panic!("timed round starts the timer");
    };
    session.tick(handle);
    play(&mut session, &ONE_WINS[1..]);

    let best = session.leaderboard().best().expect("entry recorded");
    assert_eq!(*best.average_win_time(), 1.0);
}

#[test]
fn test_timer_disabled_mid_round_stops_clock() {
    let mut session = new_session();
    let TimerSignal::Started(handle) = *session.apply_move(Coord::new(0, 0)).unwrap().timer()
    else {
        panic!("timer should start");
    };
    let mut settings = session.settings().clone();
    settings.set_timer(false);
    session.apply_settings(settings).unwrap();

    assert!(!session.tick(handle));
    assert_eq!(session.timer_handle(), None);
    play(&mut session, &ONE_WINS[1..]);
    assert!(session.round_records().is_empty());
}

#[test]
fn test_blur_and_focus_resume_round_timer() {
    let mut session = new_session();
    let TimerSignal::Started(first) = *session.apply_move(Coord::new(0, 0)).unwrap().timer()
    else {
        panic!("timer should start");
    };
    session.tick(first);

    session.on_blur();
    assert_eq!(session.timer_handle(), None);
    assert!(!session.tick(first));

    let focus = session.on_focus().unwrap();
    let TimerSignal::Resumed(second) = *focus.timer() else {
        panic!("focus resumes the timer");
    };
    assert_ne!(first, second);
    assert!(!session.tick(first));
    assert!(session.tick(second));
    assert!(session.tick(second));
    assert_eq!(session.elapsed_seconds(), 3);

    play(&mut session, &ONE_WINS[1..]);
    assert_eq!(*session.round_records().records()[0].elapsed_seconds(), 3);
}

#[test]
fn test_focus_without_play_leaves_timer_idle() {
    let mut session = new_session();
    session.on_blur();
    assert_eq!(*session.on_focus().unwrap().timer(), TimerSignal::Unchanged);

    play(&mut session, &ONE_WINS);
    session.on_blur();
    assert_eq!(*session.on_focus().unwrap().timer(), TimerSignal::Unchanged);
    assert_eq!(session.timer_handle(), None);
}

#[test]
fn test_focus_while_running_keeps_handle() {
    let mut session = new_session();
    let TimerSignal::Started(handle) = *session.apply_move(Coord::new(0, 0)).unwrap().timer()
    else {
        panic!("timer should start");
    };
    assert_eq!(*session.on_focus().unwrap().timer(), TimerSignal::Unchanged);
    assert!(session.tick(handle));
}
