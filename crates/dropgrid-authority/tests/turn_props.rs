//! Property tests for move validation.

use std::time::Duration;

use dropgrid_authority::{AuthorityConfig, MoveOutcome, TurnAuthority};
use dropgrid_board::Alliance;
use proptest::prelude::*;

fn authority() -> TurnAuthority {
    let mut authority = TurnAuthority::new(AuthorityConfig {
        move_cooldown: Duration::ZERO,
        ..AuthorityConfig::default()
    });
    authority.set_ready(true);
    authority
}

fn any_alliance() -> impl Strategy<Value = Alliance> {
    prop_oneof![Just(Alliance::PlayerA), Just(Alliance::PlayerB)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Arbitrary requests, including wrong turns and bad columns.
    #[test]
    fn rejections_never_touch_the_game(
        requests in prop::collection::vec((0usize..12, any_alliance()), 0..120),
    ) {
        let mut authority = authority();
        for (column, alliance) in requests {
            let board = authority.board().clone();
            let turn = authority.turn();
            let moves = authority.move_number();
            let state = authority.state();

            let outcome = authority.process_move_request(column, alliance);

            if let MoveOutcome::Rejected(_) = outcome {
                prop_assert_eq!(authority.board(), &board);
                prop_assert_eq!(authority.turn(), turn);
                prop_assert_eq!(authority.move_number(), moves);
                prop_assert_eq!(authority.state(), state);
            } else {
                prop_assert_eq!(authority.move_number(), moves + 1);
                prop_assert_eq!(authority.board().piece_count(), board.piece_count() + 1);
            }
        }
    }

    /// Always asking for the side to move, turns strictly alternate.
    #[test]
    fn turns_alternate_from_the_starting_alliance(
        columns in prop::collection::vec(0usize..9, 1..80),
    ) {
        let mut authority = authority();
        let mut expected = Alliance::PlayerA;
        for column in columns {
            let mover = authority.turn();
            prop_assert_eq!(mover, expected);
            match authority.process_move_request(column, mover) {
                MoveOutcome::Continue { next_turn, .. } => {
                    prop_assert_eq!(next_turn, mover.opponent());
                    expected = next_turn;
                }
                MoveOutcome::Rejected(_) => {}
                MoveOutcome::Win { .. } | MoveOutcome::Draw { .. } => break,
            }
        }
    }
}
