//! Factories for identifiers and participant colors.
//!
//! 乱数に依存する生成処理は trait として注入し、テストでは決定的な実装に差し替えます。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rand::Rng;

use super::value_object::{Color, OperationId, Timestamp};

/// Generates ids for operations that arrive without one.
pub trait OperationIdGenerator: Send + Sync {
    fn next_id(&self, created_at: Timestamp) -> OperationId;
}

/// `<created_at millis>-<uuid v4>` ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidOperationIdGenerator;

impl OperationIdGenerator for UuidOperationIdGenerator {
    fn next_id(&self, created_at: Timestamp) -> OperationId {
        let value = format!("{}-{}", created_at.value(), uuid::Uuid::new_v4().simple());
        OperationId::generated(value)
    }
}

/// Deterministic `<prefix>-<n>` ids, starting at 1.
#[derive(Debug)]
pub struct SequentialOperationIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialOperationIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl OperationIdGenerator for SequentialOperationIdGenerator {
    fn next_id(&self, _created_at: Timestamp) -> OperationId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        OperationId::generated(format!("{}-{}", self.prefix, n))
    }
}

/// Picks a display color for participants that join without one.
///
/// Collisions between participants are tolerated.
pub trait ColorPicker: Send + Sync {
    fn pick(&self) -> Color;
}

/// Random `rgb(r,g,b)` with each channel in `30..230`, avoiding near-black and near-white.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomColorPicker;

impl ColorPicker for RandomColorPicker {
    fn pick(&self) -> Color {
        let mut rng = rand::rng();
        let r: u8 = rng.random_range(30..230);
        let g: u8 = rng.random_range(30..230);
        let b: u8 = rng.random_range(30..230);
        Color::new(format!("rgb({},{},{})", r, g, b))
    }
}

/// Cycles through a fixed palette.
#[derive(Debug)]
pub struct PaletteColorPicker {
    palette: Vec<Color>,
    next: AtomicUsize,
}

impl PaletteColorPicker {
    /// Falls back to the default palette when `palette` is empty.
    pub fn new(palette: Vec<Color>) -> Self {
        let palette = if palette.is_empty() {
            Self::default_palette()
        } else {
            palette
        };
        Self {
            palette,
            next: AtomicUsize::new(0),
        }
    }

    fn default_palette() -> Vec<Color> {
        ["#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4"]
            .into_iter()
            .map(Color::new)
            .collect()
    }
}

impl Default for PaletteColorPicker {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ColorPicker for PaletteColorPicker {
    fn pick(&self) -> Color {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.palette.len();
        self.palette[index].clone()
    }
}
