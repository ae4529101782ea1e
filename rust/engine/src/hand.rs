use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Hand categories, weakest first. The derived ordering is the ranking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
            Category::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The best hand a seat can make.
///
/// `value` packs the category and up to five tie-break ranks into one
/// integer, four bits per rank: the category sits in the top nibble, then
/// the primary ranks (quad rank, trip-then-pair rank, pair ranks, straight
/// high card), then the remaining kickers in descending order. Since every
/// rank is below 16, no lower term can outweigh a higher one and comparing
/// two values is the same as comparing category first and kickers
/// position by position.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub category: Category,
    pub value: u32,
    /// Tie-break ranks, most significant first, zero padded.
    pub kickers: [u8; 5],
    /// The cards forming the hand, ordered by significance.
    pub cards: Vec<Card>,
}

impl HandResult {
    /// The zero-value result used when fewer than two cards are known.
    pub fn empty() -> Self {
        Self {
            category: Category::HighCard,
            value: 0,
            kickers: [0; 5],
            cards: Vec::new(),
        }
    }

    fn new(category: Category, kickers: [u8; 5], cards: Vec<Card>) -> Self {
        let value = kickers
            .iter()
            .fold(category as u32, |acc, &k| (acc << 4) | u32::from(k));
        Self {
            category,
            value,
            kickers,
            cards,
        }
    }

    pub fn describe(&self) -> String {
        let cards: Vec<String> = self.cards.iter().map(ToString::to_string).collect();
        format!("{} ({})", self.category, cards.join(" "))
    }
}

/// Category, then composite value, then kickers position by position.
pub fn compare_hands(a: &HandResult, b: &HandResult) -> Ordering {
    a.category
        .cmp(&b.category)
        .then(a.value.cmp(&b.value))
        .then(a.kickers.cmp(&b.kickers))
}

/// Best hand from a seat's hole cards and the board. Missing hole cards are
/// skipped.
pub fn evaluate_seat(hole: [Option<Card>; 2], board: &[Card]) -> HandResult {
    let cards: Vec<Card> = hole.iter().flatten().chain(board.iter()).copied().collect();
    evaluate_hand(&cards)
}

/// Best hand from any number of cards.
///
/// With five or more cards every five-card subset is classified and the
/// strongest kept. With two to four cards the best partial structure is
/// returned (pairs, trips, quads); straights and flushes need five cards.
/// Fewer than two cards yields [`HandResult::empty`].
pub fn evaluate_hand(cards: &[Card]) -> HandResult {
    if cards.len() < 2 {
        return HandResult::empty();
    }
    if cards.len() <= 5 {
        return classify(cards);
    }
    let mut best: Option<HandResult> = None;
    for combo in Combinations::new(cards.len(), 5) {
        let subset: Vec<Card> = combo.iter().map(|&i| cards[i]).collect();
        let candidate = classify(&subset);
        if best.as_ref().is_none_or(|b| compare_hands(&candidate, b).is_gt()) {
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(HandResult::empty)
}

/// Lexicographic k-of-n index combinations: `[0,1,2,3,4]`, `[0,1,2,3,5]`, ...
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let k = self.indices.len();
        // rightmost index that can still move right
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}

/// Classifies at most five cards.
fn classify(cards: &[Card]) -> HandResult {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    for c in cards {
        rank_counts[c.rank.value() as usize] += 1;
    }

    let complete = cards.len() == 5;
    let flush = complete && cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = if complete {
        detect_straight_high(&rank_counts)
    } else {
        None
    };

    // Groups by (count desc, rank desc): quads before trips before pairs.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_by(|a, b| b.cmp(a));

    if let Some(high) = straight_high {
        let ordered = order_straight(cards, high);
        let category = match (flush, high) {
            (true, 14) => Category::RoyalFlush,
            (true, _) => Category::StraightFlush,
            (false, _) => Category::Straight,
        };
        return HandResult::new(category, [high, 0, 0, 0, 0], ordered);
    }

    let mut kickers = [0u8; 5];
    for (slot, &(_, r)) in kickers.iter_mut().zip(groups.iter()) {
        *slot = r;
    }
    let shape: Vec<u8> = groups.iter().map(|&(c, _)| c).collect();
    let category = match shape.as_slice() {
        [4, ..] => Category::FourOfAKind,
        [3, 2] => Category::FullHouse,
        _ if flush => Category::Flush,
        [3, ..] => Category::ThreeOfAKind,
        [2, 2, ..] => Category::TwoPair,
        [2, ..] => Category::OnePair,
        _ => Category::HighCard,
    };

    HandResult::new(category, kickers, order_by_groups(cards, &groups))
}

/// High card of a five-card straight, or `None`. The wheel A-2-3-4-5 counts
/// as five-high.
fn detect_straight_high(rank_counts: &[u8; 15]) -> Option<u8> {
    let distinct: Vec<u8> = (2..=14u8).filter(|&r| rank_counts[r as usize] > 0).collect();
    if distinct.len() != 5 {
        return None;
    }
    if distinct == [2, 3, 4, 5, 14] {
        return Some(5);
    }
    if distinct[4] - distinct[0] == 4 {
        Some(distinct[4])
    } else {
        None
    }
}

fn order_by_groups(cards: &[Card], groups: &[(u8, u8)]) -> Vec<Card> {
    let mut ordered = Vec::with_capacity(cards.len());
    for &(_, r) in groups {
        ordered.extend(cards.iter().filter(|c| c.rank.value() == r).copied());
    }
    ordered
}

fn order_straight(cards: &[Card], high: u8) -> Vec<Card> {
    let mut ordered = cards.to_vec();
    // in a wheel the ace plays low
    let low_ace = high == 5;
    let key = |c: &Card| match (low_ace, c.rank.value()) {
        (true, 14) => 1,
        (_, v) => v,
    };
    ordered.sort_by_key(|c| std::cmp::Reverse(key(c)));
    ordered
}
