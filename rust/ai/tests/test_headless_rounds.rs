use mille_ai::baseline::BaselineAI;
use mille_ai::random::RandomAI;
use mille_ai::{create_ai, play_round, play_turn, seat_to_act, Strategy, TurnAction};
use mille_engine::cards::full_deck;
use mille_engine::game::GameManager;
use mille_engine::player::{Seat, TRIP_LENGTH};

fn cards_on_table(game: &GameManager) -> usize {
    let mut total = game.deck_remaining() + game.discard_pile().len();
    for seat in Seat::BOTH {
        let p = game.player(seat);
        total += p.hand().len()
            + p.battle_pile().len()
            + p.speed_pile().len()
            + p.safety_area().len()
            + p.distance_cards().len();
    }
    total
}

fn assert_round_invariants(game: &GameManager) {
    assert!(game.is_round_over());
    assert!(!game.is_awaiting_coup_fourre());
    assert_eq!(cards_on_table(game), full_deck().len());
    for seat in Seat::BOTH {
        let p = game.player(seat);
        assert!(p.total_distance() <= TRIP_LENGTH);
        assert!(p.two_hundreds_played() <= 2);
    }
    let finished = Seat::BOTH
        .iter()
        .any(|s| game.player(*s).total_distance() == TRIP_LENGTH);
    let exhausted = game.deck_remaining() == 0
        && Seat::BOTH.iter().all(|s| game.player(*s).hand().is_empty());
    assert!(finished || exhausted, "round ended without a reason");
}

#[test]
fn baseline_mirror_rounds_finish_cleanly() {
    let ai = BaselineAI::new();
    for seed in 0..25 {
        let mut game = GameManager::new(Some(seed));
        game.start_new_round().expect("round");
        let steps = play_round(&mut game, &ai, &ai).expect("round plays out");
        assert!(steps > 0);
        assert_round_invariants(&game);
    }
}

#[test]
fn baseline_against_random_rounds_finish_cleanly() {
    let baseline = BaselineAI::new();
    for seed in 0..25 {
        let random = RandomAI::with_seed(seed * 31 + 7);
        let mut game = GameManager::new(Some(seed));
        game.start_new_round().expect("round");
        play_round(&mut game, &random, &baseline).expect("round plays out");
        assert_round_invariants(&game);
    }
}

#[test]
fn the_same_seeds_replay_the_same_round() {
    let run = || {
        let mut game = GameManager::new(Some(77));
        game.start_new_round().expect("round");
        let random = RandomAI::with_seed(3);
        let baseline = BaselineAI::new();
        play_round(&mut game, &random, &baseline).expect("round");
        (
            game.compute_score(Seat::Player),
            game.compute_score(Seat::Ai),
            game.discard_pile().to_vec(),
        )
    };
    assert_eq!(run(), run());
}

#[test]
fn coup_fourre_windows_are_answered_by_the_defender() {
    let ai = BaselineAI::new();
    for seed in 0..60 {
        let mut game = GameManager::new(Some(seed));
        game.start_new_round().expect("round");
        while let Some(seat) = seat_to_act(&game) {
            let defending = game.is_awaiting_coup_fourre();
            let before = game.player(seat).coup_fourre_count();
            let action = play_turn(&mut game, seat, &ai).expect("turn");
            if defending {
                assert!(matches!(action, TurnAction::CoupFourre(_)));
                assert_eq!(game.player(seat).coup_fourre_count(), before + 1);
            }
        }
    }
}

#[test]
fn full_match_reaches_the_target() {
    let player = create_ai("baseline").expect("baseline");
    let ai = create_ai("random").expect("random");
    let mut game = GameManager::new(Some(2024)).with_match_target(2500);

    for _ in 0..50 {
        game.start_new_round().expect("round");
        play_round(&mut game, player.as_ref(), ai.as_ref()).expect("round");
        let summary = game.tally_round().expect("tally");
        assert_eq!(
            summary.player_total,
            game.player(Seat::Player).match_score()
        );
        if game.match_leader().is_some() {
            game.end_match();
            break;
        }
    }
    assert!(game.is_match_over());
    let winner = game.match_leader().expect("leader");
    assert!(game.player(winner).match_score() >= 2500);
}

#[test]
fn strategies_identify_themselves() {
    let strategies: [Box<dyn Strategy>; 2] = [
        create_ai("baseline").expect("baseline"),
        create_ai("random").expect("random"),
    ];
    let names: Vec<_> = strategies.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, ["BaselineAI", "RandomAI"]);
}
