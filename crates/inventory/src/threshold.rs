//! Threshold classification: `(quantity, reorder_threshold)` to severity band.

use serde::{Deserialize, Serialize};

use stockpulse_core::ValueObject;

use crate::item::InventoryItem;

/// Units above the reorder threshold that still count as `Warning`.
pub const WARNING_MARGIN: i64 = 2;

/// Restock severity of a single item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    /// `quantity <= threshold`
    Urgent,
    /// `threshold < quantity <= threshold + WARNING_MARGIN`
    Warning,
    /// `quantity > threshold + WARNING_MARGIN`
    None,
}

impl ValueObject for SeverityBand {}

impl SeverityBand {
    pub fn of(item: &InventoryItem) -> Self {
        classify(item.quantity, item.reorder_threshold)
    }

    pub fn is_urgent(self) -> bool {
        self == SeverityBand::Urgent
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityBand::Urgent => "urgent",
            SeverityBand::Warning => "warning",
            SeverityBand::None => "none",
        }
    }
}

impl core::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a stock level.
///
/// Negative inputs are treated as 0.
pub fn classify(quantity: i64, threshold: i64) -> SeverityBand {
    let quantity = quantity.max(0);
    let threshold = threshold.max(0);

    if quantity <= threshold {
        SeverityBand::Urgent
    } else if quantity <= threshold.saturating_add(WARNING_MARGIN) {
        SeverityBand::Warning
    } else {
        SeverityBand::None
    }
}
