//! Timed elements produced by the encoder and raw signals read by the decoder

use crate::patterns::Symbol;
use morse_core::buffer::{SliceSink, Sink};
use serde::{Deserialize, Serialize};

/// What a timed element sounds like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Dot,
    Dash,
    Gap,
}

impl ElementKind {
    /// Dots and dashes key the transmitter; gaps do not
    pub fn is_tone(self) -> bool {
        !matches!(self, ElementKind::Gap)
    }
}

impl From<Symbol> for ElementKind {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Dot => ElementKind::Dot,
            Symbol::Dash => ElementKind::Dash,
        }
    }
}

/// One dot, dash or gap with its duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub duration: f64,
}

impl Element {
    pub fn new(kind: ElementKind, duration: f64) -> Self {
        Self { kind, duration }
    }

    pub fn gap(duration: f64) -> Self {
        Self::new(ElementKind::Gap, duration)
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::gap(0.0)
    }
}

/// Untagged key-down/key-up span, as captured from a key or microphone
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signal {
    pub on: bool,
    pub seconds: f64,
}

impl Signal {
    pub fn on(seconds: f64) -> Self {
        Self { on: true, seconds }
    }

    pub fn off(seconds: f64) -> Self {
        Self { on: false, seconds }
    }
}

impl From<Element> for Signal {
    fn from(element: Element) -> Self {
        Self {
            on: element.kind.is_tone(),
            seconds: element.duration,
        }
    }
}

/// Drop the dot/dash/gap tags, keeping only on/off and duration
pub fn elements_to_signals(elements: &[Element]) -> Vec<Signal> {
    elements.iter().copied().map(Signal::from).collect()
}

/// Bounded variant of [`elements_to_signals`]; returns signals written
pub fn elements_to_signals_into(elements: &[Element], out: &mut [Signal]) -> usize {
    let mut sink = SliceSink::new(out);
    for &element in elements {
        if !sink.push(Signal::from(element)) {
            break;
        }
    }
    sink.written()
}
