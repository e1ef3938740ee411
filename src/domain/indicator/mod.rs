//! Derived columns computed from the close-price sequence.
//!
//! - `IndicatorType`: identity of a derived column, with its export name
//! - `EmaColumns`: EMA values keyed by span, each aligned with the bars

pub mod ema;
pub mod pct_change;

use std::collections::BTreeMap;
use std::fmt;

/// Spans the strategy reads, fastest first.
pub const DEFAULT_SPANS: [usize; 4] = [20, 50, 100, 200];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    PctChange,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(span) => write!(f, "EMA_{}", span),
            IndicatorType::PctChange => write!(f, "pct_change"),
        }
    }
}

/// EMA columns keyed by span. Iteration is in ascending span order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmaColumns {
    columns: BTreeMap<usize, Vec<f64>>,
}

impl EmaColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, span: usize, values: Vec<f64>) {
        self.columns.insert(span, values);
    }

    pub fn get(&self, span: usize) -> Option<&[f64]> {
        self.columns.get(&span).map(Vec::as_slice)
    }

    pub fn spans(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> {
        self.columns.iter().map(|(span, v)| (*span, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
