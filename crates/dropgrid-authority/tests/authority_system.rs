//! Integration tests for the authority actor and handover using a
//! recording substrate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dropgrid_authority::{
    AuthorityConfig, AuthorityError, AuthorityState, GameResult, MoveOutcome,
    take_over,
};
use dropgrid_board::{Alliance, BoardConfig, CellCoord};
use dropgrid_protocol::{
    MoveRejection, MoveRequest, MoveResult, PlayerId, ProtocolError, Recipient,
    SessionMessage, Substrate,
};
use dropgrid_replication::{
    BOARD_KEY, MemoryStore, PropertyStore, PropertyValue, Replicator,
};

// =========================================================================
// Recording substrate
// =========================================================================

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(Recipient, SessionMessage)>>,
    clears: Mutex<usize>,
}

impl Recorder {
    fn take(&self) -> Vec<(Recipient, SessionMessage)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl Substrate for Recorder {
    async fn deliver(
        &self,
        _from: PlayerId,
        to: Recipient,
        msg: SessionMessage,
    ) -> Result<(), ProtocolError> {
        self.sent.lock().unwrap().push((to, msg));
        Ok(())
    }

    async fn clear_buffer(&self) {
        *self.clears.lock().unwrap() += 1;
    }
}

// =========================================================================
// Helpers
// =========================================================================

const HOST: PlayerId = PlayerId(1);
const GUEST: PlayerId = PlayerId(2);

fn config() -> AuthorityConfig {
    AuthorityConfig {
        move_cooldown: Duration::ZERO,
        ..AuthorityConfig::default()
    }
}

fn replicator(store: &MemoryStore) -> Replicator<MemoryStore> {
    Replicator::new(store.clone(), BoardConfig::default(), Alliance::PlayerA)
}

fn mv(column: usize, requester: PlayerId) -> MoveRequest {
    MoveRequest { column, requester }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn take_over_alone_waits_and_resyncs() {
    let store = MemoryStore::new();
    let recorder = Arc::new(Recorder::default());

    let handle = take_over(HOST, vec![HOST], config(), replicator(&store), recorder.clone())
        .await
        .unwrap();
    let info = handle.get_info().await.unwrap();

    assert_eq!(info.state, AuthorityState::WaitingForOpponent);
    assert!(!info.ready);
    assert_eq!(
        recorder.take(),
        vec![(
            Recipient::All,
            SessionMessage::Resync {
                turn: Alliance::PlayerA,
                ready: false
            }
        )]
    );
    // Every key exists after a takeover.
    assert_eq!(store.entries().await.len(), 3);
}

#[tokio::test]
async fn join_makes_game_ready_and_moves_broadcast() {
    let store = MemoryStore::new();
    let recorder = Arc::new(Recorder::default());
    let handle = take_over(HOST, vec![HOST], config(), replicator(&store), recorder.clone())
        .await
        .unwrap();
    handle.join(GUEST).await.unwrap();
    recorder.take();

    let outcome = handle.submit_move(mv(4, HOST)).await.unwrap();

    assert!(matches!(outcome, MoveOutcome::Continue { .. }));
    let sent = recorder.take();
    assert_eq!(sent.len(), 2);
    let (to, SessionMessage::ApplyResult(apply)) = &sent[0] else {
        panic!("expected ApplyResult first, got {sent:?}");
    };
    assert_eq!(*to, Recipient::AllBuffered);
    assert_eq!(apply.move_number, 1);
    assert_eq!(apply.placed.coord, CellCoord::new(7, 4));
    assert_eq!(
        apply.result,
        MoveResult::Continue {
            next_turn: Alliance::PlayerB
        }
    );
    assert_eq!(
        sent[1],
        (
            Recipient::Player(HOST),
            SessionMessage::UnlockRequester {
                requester: HOST,
                rejection: None
            }
        )
    );

    // The snapshot followed the move.
    let snapshot = replicator(&store).try_load().await.unwrap();
    assert_eq!(snapshot.turn, Alliance::PlayerB);
    assert_eq!(snapshot.board.piece_count(), 1);
}

#[tokio::test]
async fn rejected_move_still_unlocks_requester() {
    let store = MemoryStore::new();
    let recorder = Arc::new(Recorder::default());
    let handle = take_over(HOST, vec![HOST, GUEST], config(), replicator(&store), recorder.clone())
        .await
        .unwrap();
    recorder.take();

    let outcome = handle.submit_move(mv(0, GUEST)).await.unwrap();

    assert_eq!(outcome, MoveOutcome::Rejected(MoveRejection::WrongTurn));
    assert_eq!(
        recorder.take(),
        vec![(
            Recipient::Player(GUEST),
            SessionMessage::UnlockRequester {
                requester: GUEST,
                rejection: Some(MoveRejection::WrongTurn)
            }
        )]
    );
    assert_eq!(handle.get_info().await.unwrap().move_number, 0);
}

#[tokio::test]
async fn stranger_is_not_a_participant() {
    let store = MemoryStore::new();
    let recorder = Arc::new(Recorder::default());
    let handle = take_over(HOST, vec![HOST, GUEST], config(), replicator(&store), recorder)
        .await
        .unwrap();

    let outcome = handle.submit_move(mv(0, PlayerId(99))).await.unwrap();
    assert_eq!(outcome, MoveOutcome::Rejected(MoveRejection::NotParticipant));
}

#[tokio::test]
async fn duplicate_join_and_unknown_leave_are_errors() {
    let store = MemoryStore::new();
    let handle = take_over(
        HOST,
        vec![HOST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();

    assert!(matches!(
        handle.join(HOST).await,
        Err(AuthorityError::AlreadyJoined(p)) if p == HOST
    ));
    assert!(matches!(
        handle.leave(GUEST).await,
        Err(AuthorityError::NotParticipant(p)) if p == GUEST
    ));
}

#[tokio::test]
async fn leave_mid_game_parks_the_game() {
    let store = MemoryStore::new();
    let handle = take_over(
        HOST,
        vec![HOST, GUEST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();
    handle.submit_move(mv(0, HOST)).await.unwrap();

    handle.leave(GUEST).await.unwrap();

    let info = handle.get_info().await.unwrap();
    assert_eq!(info.state, AuthorityState::WaitingForOpponent);
    assert_eq!(info.board.piece_count(), 1);
    assert_eq!(
        handle.submit_move(mv(1, HOST)).await.unwrap(),
        MoveOutcome::Rejected(MoveRejection::NotReady)
    );
    assert!(!replicator(&store).read_ready().await.unwrap());
}

#[tokio::test]
async fn join_persists_the_whole_snapshot() {
    let store = MemoryStore::new();
    let handle = take_over(HOST, vec![HOST], config(), replicator(&store), Arc::new(Recorder::default()))
        .await
        .unwrap();
    store
        .set(BOARD_KEY, PropertyValue::Str("12".into()))
        .await
        .unwrap();

    handle.join(GUEST).await.unwrap();

    let snapshot = replicator(&store).try_load().await.unwrap();
    let info = handle.get_info().await.unwrap();
    assert_eq!(snapshot.board, info.board);
    assert_eq!(snapshot.turn, info.turn);
    assert!(snapshot.ready);
}

#[tokio::test]
async fn handover_resumes_from_persisted_snapshot() {
    let store = MemoryStore::new();
    let first = take_over(
        HOST,
        vec![HOST, GUEST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();
    first.submit_move(mv(3, HOST)).await.unwrap();
    first.submit_move(mv(3, GUEST)).await.unwrap();
    first.submit_move(mv(5, HOST)).await.unwrap();
    first.shutdown().await.unwrap();

    // The guest takes over after the host left.
    let recorder = Arc::new(Recorder::default());
    let second = take_over(GUEST, vec![GUEST], config(), replicator(&store), recorder.clone())
        .await
        .unwrap();
    let info = second.get_info().await.unwrap();

    assert_eq!(info.holder, GUEST);
    assert_eq!(info.board.piece_count(), 3);
    assert_eq!(info.turn, Alliance::PlayerB);
    assert_eq!(info.move_number, 3);
    assert_eq!(info.state, AuthorityState::WaitingForOpponent);
    assert_eq!(
        recorder.take(),
        vec![(
            Recipient::All,
            SessionMessage::Resync {
                turn: Alliance::PlayerB,
                ready: false
            }
        )]
    );
}

#[tokio::test]
async fn handover_over_corrupt_board_starts_fresh() {
    let store = MemoryStore::new();
    store
        .set(BOARD_KEY, PropertyValue::Str("12".into()))
        .await
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    let handle = take_over(
        HOST,
        vec![HOST, GUEST],
        config(),
        replicator(&store),
        recorder.clone(),
    )
    .await
    .unwrap();

    let info = handle.get_info().await.unwrap();
    assert_eq!(info.board.piece_count(), 0);
    assert_eq!(info.state, AuthorityState::AwaitingMove(Alliance::PlayerA));
    assert!(replicator(&store).try_load().await.is_ok());

    // Old history is dropped and mirrors are told to start over.
    assert_eq!(*recorder.clears.lock().unwrap(), 1);
    assert_eq!(
        recorder.take(),
        vec![
            (Recipient::AllBuffered, SessionMessage::Reset),
            (
                Recipient::All,
                SessionMessage::Resync {
                    turn: Alliance::PlayerA,
                    ready: true
                }
            ),
        ]
    );
}

#[tokio::test]
async fn handover_after_win_stays_over() {
    let store = MemoryStore::new();
    let first = take_over(
        HOST,
        vec![HOST, GUEST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();
    for column in 0..4 {
        first.submit_move(mv(column, HOST)).await.unwrap();
        first.submit_move(mv(8, GUEST)).await.unwrap();
    }
    let winning = first.submit_move(mv(4, HOST)).await.unwrap();
    assert!(matches!(winning, MoveOutcome::Win { .. }));
    first.shutdown().await.unwrap();

    let second = take_over(
        GUEST,
        vec![GUEST, HOST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();

    let state = second.get_info().await.unwrap().state;
    let AuthorityState::GameOver(GameResult::Won(line)) = state else {
        panic!("expected a finished game, got {state}");
    };
    assert_eq!(line.alliance, Alliance::PlayerA);
    assert_eq!(
        second.submit_move(mv(6, HOST)).await.unwrap(),
        MoveOutcome::Rejected(MoveRejection::GameAlreadyOver)
    );
}

#[tokio::test]
async fn restart_clears_buffer_and_broadcasts_reset() {
    let store = MemoryStore::new();
    let recorder = Arc::new(Recorder::default());
    let handle = take_over(HOST, vec![HOST, GUEST], config(), replicator(&store), recorder.clone())
        .await
        .unwrap();
    handle.submit_move(mv(2, HOST)).await.unwrap();
    recorder.take();

    handle.restart().await.unwrap();

    assert_eq!(*recorder.clears.lock().unwrap(), 1);
    assert_eq!(
        recorder.take(),
        vec![(Recipient::AllBuffered, SessionMessage::Reset)]
    );
    let info = handle.get_info().await.unwrap();
    assert_eq!(info.board.piece_count(), 0);
    assert_eq!(info.state, AuthorityState::AwaitingMove(Alliance::PlayerA));
    let snapshot = replicator(&store).try_load().await.unwrap();
    assert_eq!(snapshot.board.piece_count(), 0);
    assert!(snapshot.ready);
}

#[tokio::test]
async fn shut_down_authority_is_unavailable() {
    let store = MemoryStore::new();
    let handle = take_over(
        HOST,
        vec![HOST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();
    handle.shutdown().await.unwrap();

    // Give the actor a moment to drop its receiver.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(
        handle.get_info().await,
        Err(AuthorityError::Unavailable(p)) if p == HOST
    ));
}

#[tokio::test]
async fn queued_requests_are_processed_one_at_a_time() {
    let store = MemoryStore::new();
    let handle = take_over(
        HOST,
        vec![HOST, GUEST],
        config(),
        replicator(&store),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();

    // Both race for the same column; exactly one is the host's turn.
    let a = handle.clone();
    let b = handle.clone();
    let (first, second) = tokio::join!(
        a.submit_move(mv(0, HOST)),
        b.submit_move(mv(0, HOST)),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    let accepted = outcomes.iter().filter(|o| o.placed().is_some()).count();
    assert_eq!(accepted, 1);
    assert!(outcomes.contains(&MoveOutcome::Rejected(MoveRejection::WrongTurn)));
    assert_eq!(handle.get_info().await.unwrap().board.piece_count(), 1);
}
