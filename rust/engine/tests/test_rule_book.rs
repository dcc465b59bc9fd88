use mille_engine::cards::{Card, Hazard, Remedy, Safety};
use mille_engine::player::PlayerState;
use mille_engine::rules::{validate_move, IllegalMove};

fn rolling(name: &str) -> PlayerState {
    let mut p = PlayerState::new(name);
    p.battle_pile_mut().push(Card::Remedy(Remedy::Roll));
    p
}

#[test]
fn cannot_play_accident_on_opponent_who_is_already_stopped() {
    let me = rolling("me");
    let mut opponent = rolling("them");
    opponent.battle_pile_mut().push(Card::Hazard(Hazard::Stop));

    let result = validate_move(&Card::Hazard(Hazard::Accident), &me, &opponent);
    assert_eq!(result, Err(IllegalMove::TargetNotRolling));
}

#[test]
fn cannot_play_hazard_on_opponent_who_never_rolled() {
    let me = rolling("me");
    let opponent = PlayerState::new("them");
    assert_eq!(
        validate_move(&Card::Hazard(Hazard::Accident), &me, &opponent),
        Err(IllegalMove::TargetNotRolling)
    );
}

#[test]
fn hazard_is_refused_against_an_immune_opponent() {
    let me = rolling("me");
    let mut opponent = rolling("them");
    opponent.add_safety(Safety::ExtraTank);
    assert!(matches!(
        validate_move(&Card::Hazard(Hazard::OutOfGas), &me, &opponent),
        Err(IllegalMove::TargetImmune(_))
    ));
    assert!(validate_move(&Card::Hazard(Hazard::FlatTire), &me, &opponent).is_ok());
}

#[test]
fn right_of_way_allows_distance_without_roll_card() {
    let mut player = PlayerState::new("me");
    player.add_safety(Safety::RightOfWay);
    assert!(validate_move(&Card::Distance(100), &player, &player).is_ok());
}

#[test]
fn right_of_way_ignores_speed_limit_and_stop_but_not_other_hazards() {
    let mut player = PlayerState::new("me");
    player.add_safety(Safety::RightOfWay);
    player.speed_pile_mut().push(Card::SpeedLimit);
    assert!(!player.is_speed_limited());
    assert!(validate_move(&Card::Distance(200), &player, &player).is_ok());

    player.battle_pile_mut().push(Card::Hazard(Hazard::FlatTire));
    assert!(!player.can_move());
    assert_eq!(
        validate_move(&Card::Distance(25), &player, &player),
        Err(IllegalMove::NotRolling)
    );

    player.battle_pile_mut().push(Card::Remedy(Remedy::SpareTire));
    assert!(player.can_move());
}

#[test]
fn end_limit_allows_100km_after_being_limited() {
    let mut player = rolling("me");
    player.speed_pile_mut().push(Card::SpeedLimit);

    assert_eq!(
        validate_move(&Card::Distance(100), &player, &player),
        Err(IllegalMove::OverSpeedLimit)
    );
    assert!(validate_move(&Card::Distance(50), &player, &player).is_ok());
    assert!(validate_move(&Card::EndLimit, &player, &player).is_ok());

    player.speed_pile_mut().push(Card::EndLimit);
    assert!(validate_move(&Card::Distance(100), &player, &player).is_ok());
    assert_eq!(
        validate_move(&Card::EndLimit, &player, &player),
        Err(IllegalMove::NotSpeedLimited)
    );
}

#[test]
fn speed_limit_cannot_stack() {
    let me = rolling("me");
    let mut opponent = rolling("them");
    assert!(validate_move(&Card::SpeedLimit, &me, &opponent).is_ok());
    opponent.speed_pile_mut().push(Card::SpeedLimit);
    assert_eq!(
        validate_move(&Card::SpeedLimit, &me, &opponent),
        Err(IllegalMove::AlreadySpeedLimited)
    );
}

#[test]
fn speed_limit_may_hit_a_stopped_opponent() {
    let me = rolling("me");
    let opponent = PlayerState::new("them");
    assert!(validate_move(&Card::SpeedLimit, &me, &opponent).is_ok());
}

#[test]
fn distance_never_overshoots_the_trip() {
    let mut player = rolling("me");
    for _ in 0..9 {
        player.add_distance(Card::Distance(100));
    }
    assert_eq!(player.total_distance(), 900);
    assert!(matches!(
        validate_move(&Card::Distance(200), &player, &player),
        Err(IllegalMove::Overshoot { current: 900, value: 200, .. })
    ));
    assert!(validate_move(&Card::Distance(75), &player, &player).is_ok());
    assert!(validate_move(&Card::Distance(100), &player, &player).is_ok());
}

#[test]
fn exactly_two_200s_are_allowed_per_round() {
    let mut player = rolling("me");
    assert!(validate_move(&Card::Distance(200), &player, &player).is_ok());
    player.add_distance(Card::Distance(200));
    assert!(validate_move(&Card::Distance(200), &player, &player).is_ok());
    player.add_distance(Card::Distance(200));
    assert_eq!(player.total_distance(), 400);
    // plenty of distance budget left, the cap still applies
    assert_eq!(
        validate_move(&Card::Distance(200), &player, &player),
        Err(IllegalMove::TooManyTwoHundreds)
    );
    assert!(validate_move(&Card::Distance(100), &player, &player).is_ok());
}

#[test]
fn matching_remedy_is_accepted_and_others_refused() {
    let mut player = rolling("me");
    player.battle_pile_mut().push(Card::Hazard(Hazard::FlatTire));

    assert!(validate_move(&Card::Remedy(Remedy::SpareTire), &player, &player).is_ok());
    assert!(matches!(
        validate_move(&Card::Remedy(Remedy::Repairs), &player, &player),
        Err(IllegalMove::WrongRemedy { .. })
    ));
    assert!(matches!(
        validate_move(&Card::Remedy(Remedy::Roll), &player, &player),
        Err(IllegalMove::InvalidRoll(_))
    ));
}

#[test]
fn remedy_on_empty_battle_pile_has_nothing_to_fix() {
    let player = PlayerState::new("me");
    assert_eq!(
        validate_move(&Card::Remedy(Remedy::Gasoline), &player, &player),
        Err(IllegalMove::NothingToFix)
    );
}

#[test]
fn roll_after_stop_and_not_while_moving() {
    let mut player = rolling("me");
    assert_eq!(
        validate_move(&Card::Remedy(Remedy::Roll), &player, &player),
        Err(IllegalMove::AlreadyMoving)
    );
    player.battle_pile_mut().push(Card::Hazard(Hazard::Stop));
    assert!(validate_move(&Card::Remedy(Remedy::Roll), &player, &player).is_ok());
}

#[test]
fn safeties_are_always_legal() {
    let mut player = PlayerState::new("me");
    player.battle_pile_mut().push(Card::Hazard(Hazard::Accident));
    for safety in Safety::ALL {
        assert!(validate_move(&Card::Safety(safety), &player, &player).is_ok());
    }
}

#[test]
fn validation_is_idempotent() {
    let mut player = rolling("me");
    player.speed_pile_mut().push(Card::SpeedLimit);
    let opponent = rolling("them");
    for card in [
        Card::Distance(100),
        Card::Distance(50),
        Card::Hazard(Hazard::Stop),
        Card::EndLimit,
        Card::SpeedLimit,
    ] {
        let target = if card.is_attack() { &opponent } else { &player };
        let first = validate_move(&card, &player, target);
        let second = validate_move(&card, &player, target);
        assert_eq!(first, second, "{card}");
    }
    assert_eq!(player.total_distance(), 0);
    assert_eq!(player.battle_pile().len(), 1);
}
