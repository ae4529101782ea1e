use holdem_engine::cards::Card;
use holdem_engine::hand::{compare_hands, evaluate_hand, evaluate_seat, Category};

fn cards(s: &str) -> Vec<Card> {
    s.split_whitespace().map(|c| c.parse().unwrap()).collect()
}

#[test]
fn categories_rank_in_order() {
    let hands = [
        ("2c 5d 9h Js Kc", Category::HighCard),
        ("2c 2d 9h Js Kc", Category::OnePair),
        ("2c 2d 9h 9s Kc", Category::TwoPair),
        ("2c 2d 2h 9s Kc", Category::ThreeOfAKind),
        ("5c 6d 7h 8s 9c", Category::Straight),
        ("2h 5h 9h Jh Kh", Category::Flush),
        ("2c 2d 2h 9s 9c", Category::FullHouse),
        ("2c 2d 2h 2s Kc", Category::FourOfAKind),
        ("5s 6s 7s 8s 9s", Category::StraightFlush),
        ("Ts Js Qs Ks As", Category::RoyalFlush),
    ];
    let results: Vec<_> = hands
        .iter()
        .map(|(h, expected)| {
            let r = evaluate_hand(&cards(h));
            assert_eq!(r.category, *expected, "{}", h);
            r
        })
        .collect();
    for pair in results.windows(2) {
        assert!(compare_hands(&pair[1], &pair[0]).is_gt());
        assert!(pair[1].value > pair[0].value);
    }
}

#[test]
fn wheel_is_lowest_straight() {
    let wheel = evaluate_hand(&cards("Ah 2c 3d 4s 5h"));
    let six_high = evaluate_hand(&cards("2c 3d 4s 5h 6c"));
    assert_eq!(wheel.category, Category::Straight);
    assert_eq!(six_high.category, Category::Straight);
    assert!(compare_hands(&wheel, &six_high).is_lt());
}

#[test]
fn steel_wheel_is_a_straight_flush_not_royal() {
    let r = evaluate_hand(&cards("Ad 2d 3d 4d 5d"));
    assert_eq!(r.category, Category::StraightFlush);
}

#[test]
fn kickers_break_ties() {
    let a = evaluate_hand(&cards("Ac Ad Kh 9s 4c"));
    let b = evaluate_hand(&cards("Ah As Kd 9c 3c"));
    assert_eq!(a.category, Category::OnePair);
    assert!(compare_hands(&a, &b).is_gt());

    let c = evaluate_hand(&cards("Ah As Kd 9c 4d"));
    assert!(compare_hands(&a, &c).is_eq());
}

#[test]
fn best_five_of_seven() {
    let r = evaluate_seat(
        ["Ah".parse().ok(), "Kh".parse().ok()],
        &cards("Qh Jh Th 2c 2d"),
    );
    assert_eq!(r.category, Category::RoyalFlush);
    assert_eq!(r.cards.len(), 5);

    // two pair plus a board pair: best two pairs with the best kicker
    let r = evaluate_hand(&cards("9c 9d 5h 5s 3c 3d Ac"));
    assert_eq!(r.category, Category::TwoPair);
    assert_eq!(r.kickers, [9, 5, 14, 0, 0]);
}

#[test]
fn missing_hole_cards_are_skipped() {
    let r = evaluate_seat([None, "7c".parse().ok()], &cards("7d 7h"));
    assert_eq!(r.category, Category::ThreeOfAKind);
    let empty = evaluate_seat([None, None], &[]);
    assert_eq!(empty.value, 0);
}

#[test]
fn describe_names_the_category() {
    let r = evaluate_hand(&cards("Kc Kd 9h 9s 9c"));
    assert!(r.describe().starts_with("Full House"));
}
