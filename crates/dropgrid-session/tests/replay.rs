//! Replaying the authority's broadcasts converges every mirror.

use std::time::Duration;

use dropgrid_authority::{AuthorityConfig, TurnAuthority};
use dropgrid_board::{Alliance, BoardConfig};
use dropgrid_protocol::{ApplyResult, PlayerId, SessionMessage};
use dropgrid_session::{ClientSession, ClientStatus, Mirror, Role};
use proptest::prelude::*;

/// Plays `columns` for whoever is to move and collects every broadcast
/// alongside the authority's board right after it.
fn play(columns: &[usize]) -> (Vec<ApplyResult>, Vec<dropgrid_board::BoardState>) {
    let mut authority = TurnAuthority::new(AuthorityConfig {
        move_cooldown: Duration::ZERO,
        ..AuthorityConfig::default()
    });
    authority.set_ready(true);

    let mut results = Vec::new();
    let mut boards = Vec::new();
    for &column in columns {
        let outcome = authority.process_move_request(column, authority.turn());
        if let Some(apply) = outcome.to_apply_result(authority.move_number()) {
            results.push(apply);
            boards.push(authority.board().clone());
        }
        if authority.state().is_over() {
            break;
        }
    }
    (results, boards)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fresh_mirror_matches_authority_at_every_step(
        columns in prop::collection::vec(0usize..9, 0..100),
    ) {
        let (results, boards) = play(&columns);
        let mut mirror = Mirror::new(BoardConfig::default(), Alliance::PlayerA);

        for (apply, expected) in results.iter().zip(&boards) {
            prop_assert_eq!(mirror.apply(apply), Ok(true));
            prop_assert_eq!(mirror.board().serialize(), expected.serialize());
        }
    }

    #[test]
    fn replaying_twice_is_harmless(
        columns in prop::collection::vec(0usize..9, 0..100),
    ) {
        let (results, boards) = play(&columns);
        let mut mirror = Mirror::new(BoardConfig::default(), Alliance::PlayerA);

        for apply in results.iter().chain(results.iter()) {
            mirror.apply(apply).unwrap();
        }
        if let Some(last) = boards.last() {
            prop_assert_eq!(mirror.board(), last);
        }
    }
}

#[test]
fn two_sessions_agree_on_a_finished_game() {
    // PlayerA builds the bottom row while PlayerB stacks column 8.
    let (results, _) = play(&[0, 8, 1, 8, 2, 8, 3, 8, 4]);
    let config = BoardConfig::default();
    let mut host = ClientSession::new(PlayerId(1), Role::Authority, config, Alliance::PlayerA);
    let mut guest = ClientSession::new(PlayerId(2), Role::Replica, config, Alliance::PlayerA);
    host.join(None);
    guest.join(None);

    for apply in &results {
        let msg = SessionMessage::ApplyResult(*apply);
        host.handle_message(&msg).unwrap();
        guest.handle_message(&msg).unwrap();
    }

    assert_eq!(host.mirror(), guest.mirror());
    let over = ClientStatus::GameOver {
        winner: Some(Alliance::PlayerA),
    };
    assert_eq!(host.status(), over);
    assert_eq!(guest.status(), over);
}
