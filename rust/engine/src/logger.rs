use std::fs::{create_dir_all, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::Phase;
use crate::player::{Action, PlayerId};

/// Everything observable that happens during a hand.
///
/// System events come from the engine itself (dealing, blinds, awards);
/// `PlayerActed` is the only user event. Events are a side channel: sinks
/// see them after the state change and cannot influence it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandEvent {
    HandStarted {
        hand_number: u64,
        button: usize,
        seed: Option<u64>,
    },
    BlindPosted {
        seat: usize,
        player: PlayerId,
        amount: u32,
    },
    HoleCardsDealt {
        cards: usize,
    },
    PlayerActed {
        seat: usize,
        phase: Phase,
        action: Action,
    },
    StreetDealt {
        phase: Phase,
        cards: Vec<Card>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    PotAwarded {
        seat: usize,
        player: PlayerId,
        amount: u32,
    },
    HandEnded {
        pot: u32,
        winners: Vec<usize>,
        by_fold: bool,
    },
}

impl HandEvent {
    pub fn is_system(&self) -> bool {
        !matches!(self, HandEvent::PlayerActed { .. })
    }
}

/// Receiver for hand events.
pub trait EventSink: Send {
    fn emit(&mut self, event: &HandEvent);
}

/// Keeps every event in memory, mostly for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: std::sync::Arc<std::sync::Mutex<Vec<HandEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far. Clones of a sink share the
    /// same buffer, so a caller can keep one clone and hand the other to
    /// the engine.
    pub fn events(&self) -> Vec<HandEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: &HandEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

/// Records a single player action during a hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    pub seat: usize,
    /// The betting phase when this action occurred
    pub phase: Phase,
    pub action: Action,
}

/// Complete record of a hand: actions, board and outcome. Serialized as one
/// JSON line per hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Unique identifier for this hand (format: YYYYMMDD-NNNNNN)
    pub hand_id: String,
    /// RNG seed used for deck shuffling (enables deterministic replay)
    pub seed: Option<u64>,
    /// Chronological list of all player actions
    pub actions: Vec<ActionRecord>,
    /// Community cards on the board (up to 5 cards)
    pub board: Vec<Card>,
    /// Hand result summary
    pub result: Option<String>,
    /// Timestamp when the hand was played (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Additional metadata (extensible JSON object)
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Who took the pot and how.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    /// Seat indices of the winners
    pub winners: Vec<usize>,
    /// Chips awarded per winner, in seat order
    #[serde(default)]
    pub payouts: Vec<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Writes one [`HandRecord`] per finished hand as JSON lines.
///
/// As an [`EventSink`] it assembles the record from the hand's events and
/// appends it when `HandEnded` arrives.
pub struct HandLogger {
    writer: Option<BufWriter<std::fs::File>>,
    date: String,
    seq: u32,
    current: Option<HandRecord>,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
            current: None,
        })
    }

    /// A logger that assigns ids but writes nowhere.
    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
            current: None,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

impl EventSink for HandLogger {
    fn emit(&mut self, event: &HandEvent) {
        match event {
            HandEvent::HandStarted {
                hand_number, seed, ..
            } => {
                let hand_id = self.next_id();
                self.current = Some(HandRecord {
                    hand_id,
                    seed: *seed,
                    actions: Vec::new(),
                    board: Vec::new(),
                    result: None,
                    ts: None,
                    meta: Some(serde_json::json!({ "hand_number": hand_number })),
                    showdown: None,
                });
            }
            HandEvent::PlayerActed {
                seat,
                phase,
                action,
            } => {
                if let Some(rec) = &mut self.current {
                    rec.actions.push(ActionRecord {
                        player_id: action.actor,
                        seat: *seat,
                        phase: *phase,
                        action: *action,
                    });
                }
            }
            HandEvent::StreetDealt { cards, .. } => {
                if let Some(rec) = &mut self.current {
                    rec.board.extend(cards.iter().copied());
                }
            }
            HandEvent::PotAwarded { amount, .. } => {
                if let Some(info) = self.current.as_mut().and_then(|r| r.showdown.as_mut()) {
                    info.payouts.push(*amount);
                } else if let Some(rec) = &mut self.current {
                    rec.showdown = Some(ShowdownInfo {
                        winners: Vec::new(),
                        payouts: vec![*amount],
                        notes: None,
                    });
                }
            }
            HandEvent::HandEnded {
                pot,
                winners,
                by_fold,
            } => {
                let Some(mut rec) = self.current.take() else {
                    return;
                };
                let mut info = rec.showdown.take().unwrap_or(ShowdownInfo {
                    winners: Vec::new(),
                    payouts: Vec::new(),
                    notes: None,
                });
                info.winners = winners.clone();
                if *by_fold {
                    info.notes = Some("uncontested".to_string());
                } else if winners.len() > 1 {
                    info.notes = Some("split pot".to_string());
                }
                rec.result = Some(format!("pot {} to seats {:?}", pot, winners));
                rec.showdown = Some(info);
                if let Err(e) = self.write(&rec) {
                    tracing::warn!(hand_id = %rec.hand_id, error = %e, "failed to write hand record");
                }
            }
            HandEvent::BlindPosted { .. }
            | HandEvent::HoleCardsDealt { .. }
            | HandEvent::PhaseChanged { .. } => {}
        }
    }
}
