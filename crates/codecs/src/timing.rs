//! Text to timed Morse elements
//!
//! Timing follows the ITU ratios: a dot lasts `1.2 / wpm` seconds, a dash
//! three dots, symbols inside a character are one dot apart, characters
//! three dots apart and words seven dots (scaled by the word gap
//! multiplier). Text inside `[` ... `]` is sent as a prosign: its characters
//! run together with one-dot gaps and spaces inside are ignored. A missing
//! `]` extends the prosign to the end of the text.
//!
//! Characters without a pattern are skipped without leaving a gap.

use crate::element::{Element, ElementKind};
use crate::patterns::{lookup, Pattern};
use crate::{CodecError, Result};
use morse_core::buffer::{Counter, SliceSink, Sink};
use morse_core::rng::{seeded, MorseRng};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::Chars;
use tracing::{debug, warn};

/// ITU dot duration numerator: dot seconds = 1.2 / wpm
pub const DOT_LENGTH_WPM: f64 = 1.2;
const DOTS_PER_DASH: f64 = 3.0;
const DOTS_PER_CHAR_GAP: f64 = 3.0;
const DOTS_PER_WORD_GAP: f64 = 7.0;

/// Largest humanized deviation as a fraction of the base duration
const HUMANIZATION_MAX_VARIANCE: f64 = 0.3;
/// Humanized durations never drop below this fraction of the base
const HUMANIZATION_FLOOR: f64 = 0.1;

const PROSIGN_OPEN: char = '[';
const PROSIGN_CLOSE: char = ']';

/// Timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingParams {
    /// Words per minute (PARIS standard)
    pub wpm: u32,
    /// Scales the 7-dot inter-word gap; 1.0 is standard
    pub word_gap_multiplier: f64,
    /// 0.0 = machine-perfect keying, 1.0 = very loose
    pub humanization_factor: f64,
    /// Humanization seed; 0 picks a fresh random seed per call
    pub random_seed: u32,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            wpm: 20,
            word_gap_multiplier: 1.0,
            humanization_factor: 0.0,
            random_seed: 0,
        }
    }
}

impl TimingParams {
    pub fn with_wpm(wpm: u32) -> Self {
        Self {
            wpm,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.wpm == 0 {
            return Err(CodecError::InvalidParameters {
                msg: "WPM must be greater than 0".to_string(),
            });
        }
        if !(self.word_gap_multiplier.is_finite() && self.word_gap_multiplier >= 0.0) {
            return Err(CodecError::InvalidParameters {
                msg: format!("Invalid word gap multiplier: {}", self.word_gap_multiplier),
            });
        }
        if !(0.0..=1.0).contains(&self.humanization_factor) {
            return Err(CodecError::InvalidParameters {
                msg: format!("Humanization factor out of range: {}", self.humanization_factor),
            });
        }
        Ok(())
    }

    /// Dot duration in seconds
    pub fn dot_duration(&self) -> f64 {
        DOT_LENGTH_WPM / self.wpm as f64
    }

    pub fn dash_duration(&self) -> f64 {
        self.dot_duration() * DOTS_PER_DASH
    }

    pub fn char_gap_duration(&self) -> f64 {
        self.dot_duration() * DOTS_PER_CHAR_GAP
    }

    pub fn word_gap_duration(&self) -> f64 {
        self.dot_duration() * DOTS_PER_WORD_GAP * self.word_gap_multiplier
    }

    fn is_humanized(&self) -> bool {
        self.humanization_factor > 0.0
    }
}

/// Randomly perturb `base` by up to `factor * 0.3 * base` either way.
///
/// The result stays within `[0.1 * base, (1 + factor * 0.3) * base]`, which
/// keeps every humanized dot shorter than any humanized dash.
pub fn humanize<R: Rng + ?Sized>(base: f64, factor: f64, rng: &mut R) -> f64 {
    if factor <= 0.0 {
        return base;
    }
    let max_variation = base * factor * HUMANIZATION_MAX_VARIANCE;
    let variation = (rng.gen::<f64>() - 0.5) * 2.0 * max_variation;

    let floor = base * HUMANIZATION_FLOOR;
    let ceiling = base * (1.0 + factor * HUMANIZATION_MAX_VARIANCE);
    (base + variation).clamp(floor, ceiling)
}

/// Exact number of elements [`encode`] would produce
pub fn encode_size(text: &str, params: &TimingParams) -> usize {
    let mut counter = Counter::new();
    key_text::<_, MorseRng>(text, params, None, &mut counter)
}

/// Fill `out` with at most `out.len()` elements; returns how many were written.
///
/// Humanization draws from a generator seeded with `params.random_seed`.
pub fn encode_into(text: &str, params: &TimingParams, out: &mut [Element]) -> usize {
    let mut rng = humanization_rng(params);
    let mut sink = SliceSink::new(out);
    key_text(text, params, rng.as_mut(), &mut sink)
}

/// [`encode_into`] with a caller-owned generator
pub fn encode_into_with_rng<R: Rng + ?Sized>(
    text: &str,
    params: &TimingParams,
    rng: &mut R,
    out: &mut [Element],
) -> usize {
    let mut sink = SliceSink::new(out);
    key_text(text, params, Some(rng), &mut sink)
}

/// Encode text into an owned element sequence
///
/// Invalid parameters yield an empty sequence.
pub fn encode(text: &str, params: &TimingParams) -> Vec<Element> {
    let mut rng = humanization_rng(params);
    let mut elements = Vec::new();
    key_text(text, params, rng.as_mut(), &mut elements);
    elements
}

/// [`encode`] with a caller-owned generator
pub fn encode_with_rng<R: Rng + ?Sized>(
    text: &str,
    params: &TimingParams,
    rng: &mut R,
) -> Vec<Element> {
    let mut elements = Vec::new();
    key_text(text, params, Some(rng), &mut elements);
    elements
}

fn humanization_rng(params: &TimingParams) -> Option<MorseRng> {
    params.is_humanized().then(|| seeded(params.random_seed))
}

fn key_text<S, R>(text: &str, params: &TimingParams, rng: Option<&mut R>, sink: &mut S) -> usize
where
    S: Sink<Element>,
    R: Rng + ?Sized,
{
    if let Err(err) = params.validate() {
        debug!(%err, "rejecting timing parameters");
        return 0;
    }

    let mut keyer = Keyer {
        params,
        dot: params.dot_duration(),
        rng,
        sink,
        last: None,
    };

    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        let accepted = match ch {
            ' ' => keyer.emit(ElementKind::Gap, params.word_gap_duration()),
            PROSIGN_OPEN => keyer.prosign(&mut chars),
            _ => match lookup(ch) {
                Some(pattern) => keyer.char_gap() && keyer.pattern(pattern),
                None => true,
            },
        };
        if !accepted {
            warn!(capacity = keyer.sink.written(), "element buffer full, output truncated");
            break;
        }
    }

    keyer.sink.written()
}

/// Emits elements for one encode call
struct Keyer<'a, S, R: ?Sized> {
    params: &'a TimingParams,
    dot: f64,
    rng: Option<&'a mut R>,
    sink: &'a mut S,
    last: Option<ElementKind>,
}

impl<S, R> Keyer<'_, S, R>
where
    S: Sink<Element>,
    R: Rng + ?Sized,
{
    /// Push one element; `false` once the sink is full
    fn emit(&mut self, kind: ElementKind, base: f64) -> bool {
        let duration = match self.rng.as_mut() {
            Some(rng) if self.params.is_humanized() => {
                humanize(base, self.params.humanization_factor, &mut **rng)
            }
            _ => base,
        };
        let accepted = self.sink.push(Element::new(kind, duration));
        if accepted {
            self.last = Some(kind);
        }
        accepted
    }

    /// Inter-character gap, unless nothing was sent yet or a gap precedes
    fn char_gap(&mut self) -> bool {
        match self.last {
            Some(kind) if kind.is_tone() => {
                self.emit(ElementKind::Gap, self.params.char_gap_duration())
            }
            _ => true,
        }
    }

    fn pattern(&mut self, pattern: Pattern) -> bool {
        for (i, &symbol) in pattern.symbols().iter().enumerate() {
            if i > 0 && !self.emit(ElementKind::Gap, self.dot) {
                return false;
            }
            let kind = ElementKind::from(symbol);
            let base = match kind {
                ElementKind::Dash => self.params.dash_duration(),
                _ => self.dot,
            };
            if !self.emit(kind, base) {
                return false;
            }
        }
        true
    }

    /// Consume up to the closing bracket, joining characters with one-dot gaps
    fn prosign(&mut self, chars: &mut Chars<'_>) -> bool {
        let mut sent = 0usize;
        for ch in chars.by_ref() {
            if ch == PROSIGN_CLOSE {
                break;
            }
            let Some(pattern) = lookup(ch) else {
                continue;
            };
            let separated = if sent == 0 {
                self.char_gap()
            } else {
                self.emit(ElementKind::Gap, self.dot)
            };
            if !(separated && self.pattern(pattern)) {
                return false;
            }
            sent += 1;
        }
        true
    }
}
