use holdem_engine::engine::Engine;
use holdem_engine::errors::GameError;
use holdem_engine::game::Phase;
use holdem_engine::logger::{HandEvent, MemorySink};
use holdem_engine::player::Action;

fn table(stacks: &[u32], sb: u32, bb: u32) -> Engine {
    let mut eng = Engine::new(sb, bb, Some(11));
    for (i, &stack) in stacks.iter().enumerate() {
        eng.sit(i, i as u32 + 1, stack).unwrap();
    }
    eng
}

/// Submits a check for whoever holds the turn.
fn check_current(eng: &mut Engine) {
    let id = eng.seat_to_act().unwrap().id();
    eng.submit(Action::check(id)).unwrap();
}

#[test]
fn heads_up_blinds_and_flop() {
    let mut eng = table(&[1000, 1000], 5, 10);
    eng.start_hand().unwrap();

    assert_eq!(eng.button(), Some(0));
    assert_eq!(eng.phase(), Phase::Preflop);
    assert_eq!(eng.pot(), 15);
    assert_eq!(eng.highest_wager(), 10);
    // button posts the small blind and acts first
    assert_eq!(eng.turn(), Some(0));
    assert_eq!(eng.seat(0).unwrap().wager(), 5);
    assert_eq!(eng.seat(1).unwrap().wager(), 10);
    for (_, s) in eng.seats() {
        assert!(s.hole_cards().iter().all(Option::is_some));
    }

    eng.submit(Action::call(1, 5)).unwrap();
    assert_eq!(eng.pot(), 20);
    assert_eq!(eng.seat(0).unwrap().stack(), 990);
    assert_eq!(eng.phase(), Phase::Preflop);
    assert_eq!(eng.turn(), Some(1));

    eng.submit(Action::check(2)).unwrap();
    assert_eq!(eng.phase(), Phase::Flop);
    assert_eq!(eng.board().len(), 3);
    assert_eq!(eng.highest_wager(), 0);
    assert!(eng.seats().all(|(_, s)| s.wager() == 0));
    // postflop the big blind acts first heads-up
    assert_eq!(eng.turn(), Some(1));
}

#[test]
fn three_handed_check_down_reaches_showdown() {
    let mut eng = table(&[500, 500, 500], 5, 10);
    eng.start_hand().unwrap();
    // button 0, small blind 1, big blind 2, seat 0 first
    assert_eq!(eng.turn(), Some(0));
    eng.submit(Action::call(1, 10)).unwrap();
    eng.submit(Action::call(2, 5)).unwrap();
    eng.submit(Action::check(3)).unwrap();
    assert_eq!(eng.phase(), Phase::Flop);
    assert_eq!(eng.turn(), Some(1));

    let mut outcome = None;
    while outcome.is_none() {
        let id = eng.seat_to_act().unwrap().id();
        outcome = eng.submit(Action::check(id)).unwrap();
    }
    let outcome = outcome.unwrap();

    assert_eq!(eng.phase(), Phase::Showdown);
    assert!(eng.is_hand_complete());
    assert_eq!(outcome.pot, 30);
    assert_eq!(outcome.board.len(), 5);
    // every seat still in was evaluated once
    assert_eq!(outcome.hands.len(), 3);
    assert!(!outcome.ended_by_fold);
    let paid: u32 = outcome.payouts.iter().map(|&(_, c)| c).sum();
    assert_eq!(paid, 30);
    assert_eq!(eng.total_chips(), 1500);
    assert_eq!(eng.pot(), 0);
}

#[test]
fn folding_to_one_ends_the_hand() {
    let mut eng = table(&[500, 500, 500], 5, 10);
    eng.start_hand().unwrap();
    eng.submit(Action::raise(1, 20)).unwrap();
    eng.submit(Action::fold(2)).unwrap();
    let outcome = eng.submit(Action::fold(3)).unwrap().unwrap();

    assert!(outcome.ended_by_fold);
    assert!(outcome.hands.is_empty());
    assert_eq!(outcome.winners, vec![0]);
    assert_eq!(outcome.pot, 45);
    assert_eq!(eng.seat(0).unwrap().stack(), 515);
    assert_eq!(eng.seat(1).unwrap().stack(), 495);
    assert_eq!(eng.seat(2).unwrap().stack(), 490);
    assert!(eng.board().is_empty());
    assert!(!eng.in_hand());
}

#[test]
fn chips_are_conserved_at_every_step() {
    let mut eng = table(&[300, 300, 300, 300], 5, 10);
    eng.start_hand().unwrap();
    let total = eng.total_chips();
    let script = [
        Action::call(4, 10),
        Action::raise(1, 30),
        Action::call(2, 35),
        Action::fold(3),
        Action::call(4, 30),
    ];
    for a in script {
        eng.submit(a).unwrap();
        let on_table: u32 = eng.seats().map(|(_, s)| s.stack()).sum();
        assert_eq!(on_table + eng.pot(), total);
        let wagered: u32 = eng.seats().map(|(_, s)| s.total_wager()).sum();
        assert_eq!(wagered, eng.pot());
    }
    assert_eq!(eng.phase(), Phase::Flop);
    assert_eq!(eng.pot(), 130);
}

#[test]
fn phase_never_regresses() {
    let sink = MemorySink::new();
    let mut eng = table(&[200, 200, 200], 1, 2);
    eng.set_event_sink(Box::new(sink.clone()));
    eng.start_hand().unwrap();

    let mut last = eng.phase();
    while eng.in_hand() {
        let seat = eng.turn().unwrap();
        let s = eng.seat(seat).unwrap();
        let to_call = eng.betting().call_amount(s);
        let a = if to_call > 0 {
            Action::call(s.id(), to_call)
        } else {
            Action::check(s.id())
        };
        eng.submit(a).unwrap();
        assert!(eng.phase() >= last);
        last = eng.phase();
    }
    assert_eq!(last, Phase::Showdown);

    let changes: Vec<(Phase, Phase)> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            HandEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (Phase::Preflop, Phase::Flop),
            (Phase::Flop, Phase::Turn),
            (Phase::Turn, Phase::River),
            (Phase::River, Phase::Showdown),
        ]
    );
}

#[test]
fn all_in_call_runs_out_the_board() {
    let mut eng = table(&[100, 400], 5, 10);
    eng.start_hand().unwrap();
    eng.submit(Action::all_in(1, 95)).unwrap();
    assert_eq!(eng.highest_wager(), 100);
    let outcome = eng.submit(Action::call(2, 90)).unwrap().unwrap();

    assert_eq!(eng.phase(), Phase::Showdown);
    assert_eq!(outcome.board.len(), 5);
    assert_eq!(outcome.pot, 200);
    assert_eq!(outcome.hands.len(), 2);
    assert_eq!(eng.total_chips(), 500);
}

#[test]
fn button_rotates_and_broke_seats_sit_out() {
    let mut eng = table(&[100, 100, 100], 5, 10);

    eng.start_hand().unwrap();
    assert_eq!(eng.button(), Some(0));
    eng.submit(Action::fold(1)).unwrap();
    eng.submit(Action::fold(2)).unwrap();
    assert!(eng.is_hand_complete());

    eng.start_hand().unwrap();
    assert_eq!(eng.button(), Some(1));
    assert_eq!(eng.hand_number(), 2);
    // seat 1 is the button; seat 2 posts the small blind, seat 0 the big
    assert_eq!(eng.seat(2).unwrap().wager(), 5);
    assert_eq!(eng.seat(0).unwrap().wager(), 10);
    assert_eq!(eng.turn(), Some(1));
    eng.submit(Action::fold(2)).unwrap();
    eng.submit(Action::fold(3)).unwrap();

    eng.leave(2).unwrap();
    eng.sit(1, 9, 0).unwrap();
    eng.start_hand().unwrap();
    // seat 1 has no chips and is dealt out
    let broke = eng.seat(1).unwrap();
    assert!(broke.is_folded());
    assert!(broke.hole_cards().iter().all(Option::is_none));
    assert_eq!(eng.button(), Some(2));
    assert_eq!(eng.occupied_seats(), vec![0, 1, 2]);
}

#[test]
fn seating_errors() {
    let mut eng = Engine::new(5, 10, None);
    eng.sit(3, 1, 100).unwrap();
    assert_eq!(eng.sit(3, 2, 100), Err(GameError::SeatTaken(3)));
    assert_eq!(eng.sit(4, 1, 100), Err(GameError::PlayerAlreadySeated(1)));
    assert_eq!(eng.sit(10, 2, 100), Err(GameError::SeatOutOfRange(10)));
    assert_eq!(eng.seat_of(1), Some(3));
    assert!(matches!(eng.leave(2), Err(GameError::InvalidPlayer { .. })));
    assert_eq!(eng.start_hand(), Err(GameError::NotEnoughPlayers(1)));
}

#[test]
fn seating_keeps_the_table_total_within_range() {
    let mut eng = Engine::new(5, 10, None);
    eng.sit(0, 1, u32::MAX).unwrap();
    assert!(matches!(
        eng.sit(1, 2, 10),
        Err(GameError::InvalidAmount { amount: 10, .. })
    ));
    assert_eq!(eng.seat_of(2), None);
    eng.sit(1, 2, 0).unwrap();
    assert_eq!(eng.total_chips(), u32::MAX);
    assert_eq!(eng.start_hand(), Err(GameError::NotEnoughPlayers(1)));

    // room frees up once chips leave the table
    eng.leave(1).unwrap();
    eng.sit(1, 3, 10).unwrap();
    assert_eq!(eng.seat(1).unwrap().stack(), 10);
}

#[test]
fn short_big_blind_is_all_in_and_the_board_runs_out() {
    let mut eng = table(&[1000, 4], 5, 10);
    eng.start_hand().unwrap();

    let bb = eng.seat(1).unwrap();
    assert_eq!(bb.wager(), 4);
    assert_eq!(bb.stack(), 0);
    assert!(bb.is_all_in());
    assert_eq!(eng.pot(), 9);
    // the full big blind is still owed
    assert_eq!(eng.highest_wager(), 10);
    assert_eq!(eng.turn(), Some(0));
    assert_eq!(eng.total_chips(), 1004);

    let outcome = eng.submit(Action::call(1, 5)).unwrap().expect("hand over");
    assert!(!outcome.ended_by_fold);
    assert_eq!(outcome.board.len(), 5);
    assert_eq!(outcome.pot, 14);
    assert_eq!(eng.phase(), Phase::Showdown);
    assert!(eng.is_hand_complete());
    assert_eq!(eng.total_chips(), 1004);
}

#[test]
fn heads_up_checks_through_the_flop() {
    let mut eng = table(&[1000, 1000], 5, 10);
    eng.start_hand().unwrap();
    eng.submit(Action::call(1, 5)).unwrap();
    check_current(&mut eng);
    assert_eq!(eng.phase(), Phase::Flop);
    check_current(&mut eng);
    check_current(&mut eng);
    assert_eq!(eng.phase(), Phase::Turn);
    assert_eq!(eng.board().len(), 4);
}
