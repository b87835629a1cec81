//! On/off durations to text
//!
//! Nothing about the sender's speed is known up front. Key-down durations
//! are split into dots and dashes with 2-means, key-up durations into up to
//! three gap classes with 3-means, and the resulting symbol groups are
//! resolved through the reverse pattern table.
//!
//! When every key-down has the same length there is nothing to split, and
//! the gaps decide: a sender keying only dashes leaves intra-character gaps
//! a third of the tone length, or word gaps of 7/3 tones.

use crate::element::Signal;
use crate::patterns::{reverse_lookup, Symbol};
use crate::{CodecError, Result};
use morse_core::cluster::{Clustering, KMeans, KMeansConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Adjacent gap clusters closer than this ratio are merged
const MERGE_THRESHOLD: f64 = 1.9;
/// Dash and dot centroids closer than this ratio are one tone class
const TONE_SPLIT_RATIO: f64 = 2.0;
/// Dash length in dots
const DASH_UNITS: f64 = 3.0;
/// Nominal gap lengths in dots: intra-character, character, word
const GAP_UNITS: [f64; 3] = [1.0, 3.0, 7.0];
/// A lone gap class longer than this many dots separates characters
const CHAR_GAP_RATIO: f64 = 2.0;
/// A gap class longer than this many dots separates words
const WORD_GAP_RATIO: f64 = 5.0;
/// Symbols accumulated before a group is resolved regardless of gaps
const PATTERN_CAP: usize = 9;
/// Slack added to the signal count by [`decode_size`]
const TEXT_SIZE_SLACK: usize = 100;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpretParams {
    pub max_kmeans_iterations: usize,
    pub convergence_threshold: f64,
    /// Signals shorter than this (seconds) are ignored
    pub noise_threshold: f64,
    /// Longest text returned, in characters
    pub max_output_length: usize,
}

impl Default for InterpretParams {
    fn default() -> Self {
        Self {
            max_kmeans_iterations: 100,
            convergence_threshold: 0.001,
            noise_threshold: 0.001,
            max_output_length: 1000,
        }
    }
}

impl InterpretParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold > 0.0) {
            return Err(CodecError::InvalidParameters {
                msg: format!("Invalid convergence threshold: {}", self.convergence_threshold),
            });
        }
        if !(self.noise_threshold.is_finite() && self.noise_threshold >= 0.0) {
            return Err(CodecError::InvalidParameters {
                msg: format!("Invalid noise threshold: {}", self.noise_threshold),
            });
        }
        if self.max_output_length == 0 {
            return Err(CodecError::InvalidParameters {
                msg: "Maximum output length must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn kmeans(&self) -> KMeans {
        KMeans::new(KMeansConfig {
            max_iterations: self.max_kmeans_iterations,
            convergence_threshold: self.convergence_threshold,
        })
    }
}

/// Decoded text and how much of the input made sense
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterpretResult {
    pub text: String,
    /// Recognized characters per expected character group, in `[0, 1]`
    pub confidence: f64,
    /// Signals walked after dropping the boundary key-ups and noise.
    ///
    /// A trimmed leading or trailing key-up is not counted, so `N` sent as
    /// on, off, on, off reports 3 here and a confidence of 2/3.
    pub signals_processed: usize,
    pub patterns_recognized: usize,
}

/// Upper bound on the length of the text [`decode`] returns
pub fn decode_size(signals: &[Signal], params: &InterpretParams) -> usize {
    if signals.is_empty() {
        return 0;
    }
    (signals.len() + TEXT_SIZE_SLACK).min(params.max_output_length)
}

/// Decode on/off durations into text.
///
/// Invalid parameters, empty input, or input without any key-down signal
/// give an empty result with zero confidence.
pub fn decode(signals: &[Signal], params: &InterpretParams) -> InterpretResult {
    if signals.is_empty() {
        return InterpretResult::default();
    }
    if let Err(err) = params.validate() {
        debug!(%err, "rejecting interpret parameters");
        return InterpretResult::default();
    }

    let kept = usable_signals(signals, params.noise_threshold);
    let on: Vec<f64> = kept.iter().filter(|s| s.on).map(|s| s.seconds).collect();
    let off: Vec<f64> = kept.iter().filter(|s| !s.on).map(|s| s.seconds).collect();

    if on.is_empty() {
        debug!(signals = signals.len(), "no key-down signals to decode");
        return InterpretResult::default();
    }

    let engine = params.kmeans();
    let gap_clusters = cluster_populated(&engine, &off, 3, "gap");
    let gap_centroids = gap_clusters.as_ref().map_or(&[][..], |c| &c.centroids[..]);
    let Some(tones) = classify_tones(&engine, &on, gap_centroids) else {
        return InterpretResult::default();
    };
    let gaps = classify_gaps(gap_clusters, &off, tones.dot);
    debug!(
        on = on.len(),
        off = off.len(),
        dot = tones.dot,
        gap_classes = gaps.classes.len(),
        "classified signal durations"
    );

    let mut reader = Reader::new(params.max_output_length);
    let mut tone_labels = tones.symbols.iter();
    let mut gap_labels = gaps.assignments.iter();

    for signal in &kept {
        if reader.is_full() {
            break;
        }
        reader.processed += 1;
        if signal.on {
            if let Some(&symbol) = tone_labels.next() {
                reader.pattern.push(symbol);
            }
        } else {
            let class = gap_labels
                .next()
                .and_then(|&label| gaps.classes.get(label))
                .copied()
                .unwrap_or(GapClass::Intra);
            reader.gap(class);
        }
        if reader.pattern.len() >= PATTERN_CAP {
            reader.resolve();
        }
    }
    reader.resolve();
    reader.finish()
}

/// Drop one boundary key-up at each end, then noise and unusable durations
fn usable_signals(signals: &[Signal], noise_threshold: f64) -> Vec<Signal> {
    let mut slice = signals;
    if let Some((first, rest)) = slice.split_first() {
        if !first.on {
            slice = rest;
        }
    }
    if let Some((last, rest)) = slice.split_last() {
        if !last.on {
            slice = rest;
        }
    }
    slice
        .iter()
        .filter(|s| s.seconds.is_finite() && s.seconds >= noise_threshold)
        .copied()
        .collect()
}

struct Tones {
    symbols: Vec<Symbol>,
    /// Estimated dot length in seconds
    dot: f64,
}

/// Cluster `points` into at most `k` groups, dropping groups left empty
fn cluster_populated(
    engine: &KMeans,
    points: &[f64],
    k: usize,
    what: &str,
) -> Option<Clustering> {
    if points.is_empty() {
        return None;
    }
    match engine.cluster(points, points.len().min(k)) {
        Ok(clustering) => {
            let clustering = clustering.without_empty();
            trace!(what, centroids = ?clustering.centroids, "clusters");
            Some(clustering)
        }
        Err(err) => {
            debug!(%err, what, "clustering failed");
            None
        }
    }
}

fn classify_tones(engine: &KMeans, on: &[f64], gap_centroids: &[f64]) -> Option<Tones> {
    if let [only] = on {
        // one sample cannot be split; call it a dot
        return Some(Tones {
            symbols: vec![Symbol::Dot],
            dot: *only,
        });
    }

    let clustering = cluster_populated(engine, on, 2, "tone")?;

    if let &[dot, dash] = &clustering.centroids[..] {
        if dash >= dot * TONE_SPLIT_RATIO {
            let symbols = clustering
                .assignments
                .iter()
                .map(|&a| if a == 0 { Symbol::Dot } else { Symbol::Dash })
                .collect();
            return Some(Tones { symbols, dot });
        }
    }

    // one tone class: dots unless the gaps fit a dash-only sender better
    let tone = on.iter().sum::<f64>() / on.len() as f64;
    let dashes = gap_misfit(gap_centroids, tone / DASH_UNITS) < gap_misfit(gap_centroids, tone);
    let (symbol, dot) = if dashes {
        (Symbol::Dash, tone / DASH_UNITS)
    } else {
        (Symbol::Dot, tone)
    };
    Some(Tones {
        symbols: vec![symbol; on.len()],
        dot,
    })
}

/// Summed log distance of each gap centroid to its nearest nominal gap
fn gap_misfit(gap_centroids: &[f64], dot: f64) -> f64 {
    gap_centroids
        .iter()
        .map(|&gap| {
            GAP_UNITS
                .iter()
                .map(|&units| (gap / (dot * units)).ln().abs())
                .fold(f64::INFINITY, f64::min)
        })
        .sum()
}

/// What a key-up span means between two key-downs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GapClass {
    Intra,
    Char,
    Word,
}

#[derive(Debug, Default)]
struct Gaps {
    /// Dense class label per key-up span, in input order
    assignments: Vec<usize>,
    /// Meaning of each dense label
    classes: Vec<GapClass>,
}

fn classify_gaps(clustering: Option<Clustering>, off: &[f64], dot: f64) -> Gaps {
    let Some(clustering) = clustering else {
        return Gaps::default();
    };

    let labels = merged_labels(&clustering.centroids);
    let assignments: Vec<usize> = clustering.assignments.iter().map(|&a| labels[a]).collect();
    let class_count = labels.last().map_or(0, |&l| l + 1);

    if class_count == 3 {
        return Gaps {
            assignments,
            classes: vec![GapClass::Intra, GapClass::Char, GapClass::Word],
        };
    }

    let mut sums = vec![0.0; class_count];
    let mut counts = vec![0usize; class_count];
    for (&label, &d) in assignments.iter().zip(off) {
        sums[label] += d;
        counts[label] += 1;
    }
    let classes = (0..class_count)
        .map(|label| {
            let mean = if counts[label] > 0 {
                sums[label] / counts[label] as f64
            } else {
                0.0
            };
            if mean > dot * WORD_GAP_RATIO {
                GapClass::Word
            } else if label > 0 || mean > dot * CHAR_GAP_RATIO {
                GapClass::Char
            } else {
                GapClass::Intra
            }
        })
        .collect();

    Gaps {
        assignments,
        classes,
    }
}

/// Dense labels per sorted cluster after merging close neighbours.
///
/// Only three clusters are merged: the upper pair first, then the lower.
fn merged_labels(centroids: &[f64]) -> Vec<usize> {
    let mut groups: Vec<usize> = (0..centroids.len()).collect();
    if let &[c0, c1, c2] = centroids {
        if c2 / c1 < MERGE_THRESHOLD {
            groups[2] = groups[1];
        }
        if c1 / c0 < MERGE_THRESHOLD {
            for g in groups.iter_mut().filter(|g| **g == 1) {
                *g = 0;
            }
        }
    }

    let mut labels = vec![0; groups.len()];
    for i in 1..groups.len() {
        labels[i] = labels[i - 1] + usize::from(groups[i] != groups[i - 1]);
    }
    labels
}

/// Accumulates symbols and assembles the text
struct Reader {
    text: String,
    chars: usize,
    max_chars: usize,
    pattern: Vec<Symbol>,
    processed: usize,
    recognized: usize,
}

impl Reader {
    fn new(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            chars: 0,
            max_chars,
            pattern: Vec::with_capacity(PATTERN_CAP),
            processed: 0,
            recognized: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.chars >= self.max_chars
    }

    fn push(&mut self, ch: char) {
        if !self.is_full() {
            self.text.push(ch);
            self.chars += 1;
        }
    }

    fn gap(&mut self, class: GapClass) {
        if self.pattern.is_empty() {
            return;
        }
        match class {
            GapClass::Intra => {}
            GapClass::Char => self.resolve(),
            GapClass::Word => {
                self.resolve();
                if !self.text.is_empty() && !self.text.ends_with(' ') {
                    self.push(' ');
                }
            }
        }
    }

    /// Resolve the pending group; unknown groups are dropped
    fn resolve(&mut self) {
        if self.pattern.is_empty() {
            return;
        }
        match reverse_lookup(&self.pattern) {
            Some(ch) if !self.is_full() => {
                self.push(ch);
                self.recognized += 1;
            }
            Some(_) => {}
            None => trace!(len = self.pattern.len(), "dropping unknown symbol group"),
        }
        self.pattern.clear();
    }

    fn finish(mut self) -> InterpretResult {
        let trimmed = self.text.trim_end_matches(' ').len();
        self.text.truncate(trimmed);

        let confidence = if self.processed > 0 {
            (self.recognized as f64 / (self.processed as f64 / 2.0)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        InterpretResult {
            text: self.text,
            confidence,
            signals_processed: self.processed,
            patterns_recognized: self.recognized,
        }
    }
}
