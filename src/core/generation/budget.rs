//! Output budget sizing
//!
//! Maps the caller's desired length onto a concrete output-token ceiling and
//! a target section count. Reasoning-style models burn an unpredictable share
//! of their budget deliberating before any visible output, so their ceiling
//! is inflated.

use serde::{Deserialize, Serialize};

/// Budget constants. The reasoning multipliers and floors are empirical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Ceiling at length 0
    pub min_tokens: u32,
    /// Ceiling at length 100, before reasoning inflation
    pub max_tokens: u32,
    /// Lengths at or below this use the short-request multiplier and floor
    pub reasoning_short_threshold: u8,
    pub reasoning_short_multiplier: u32,
    pub reasoning_short_floor: u32,
    pub reasoning_multiplier: u32,
    pub reasoning_floor: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_tokens: 500,
            max_tokens: 16_000,
            reasoning_short_threshold: 10,
            reasoning_short_multiplier: 5,
            reasoning_short_floor: 4_000,
            reasoning_multiplier: 4,
            reasoning_floor: 3_000,
        }
    }
}

/// Qualitative length bucket used for tone guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthDescriptor {
    VeryBrief,
    Brief,
    Standard,
    Detailed,
    Extensive,
}

impl LengthDescriptor {
    /// Bucket for a 0-100 length
    pub fn for_length(length_percent: u8) -> Self {
        match length_percent {
            0..=10 => LengthDescriptor::VeryBrief,
            11..=25 => LengthDescriptor::Brief,
            26..=50 => LengthDescriptor::Standard,
            51..=75 => LengthDescriptor::Detailed,
            _ => LengthDescriptor::Extensive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthDescriptor::VeryBrief => "very brief",
            LengthDescriptor::Brief => "brief",
            LengthDescriptor::Standard => "standard",
            LengthDescriptor::Detailed => "detailed",
            LengthDescriptor::Extensive => "extensive",
        }
    }

    pub fn section_range(&self) -> &'static str {
        match self {
            LengthDescriptor::VeryBrief => "2-3",
            LengthDescriptor::Brief => "3-5",
            LengthDescriptor::Standard => "5-8",
            LengthDescriptor::Detailed => "8-12",
            LengthDescriptor::Extensive => "12+",
        }
    }
}

impl std::fmt::Display for LengthDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable per-request budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetPlan {
    pub max_output_tokens: u32,
    pub target_section_range: &'static str,
    pub length_descriptor: LengthDescriptor,
}

impl BudgetConfig {
    /// Linear interpolation between `min_tokens` and `max_tokens`
    fn base_ceiling(&self, length_percent: u8) -> u32 {
        let span = f64::from(self.max_tokens.saturating_sub(self.min_tokens));
        let scaled = (f64::from(length_percent) / 100.0) * span;
        self.min_tokens + scaled.round() as u32
    }

    fn reasoning_ceiling(&self, length_percent: u8) -> u32 {
        let base = self.base_ceiling(length_percent);
        if length_percent <= self.reasoning_short_threshold {
            base.saturating_mul(self.reasoning_short_multiplier)
                .max(self.reasoning_short_floor)
        } else {
            // The short tier's larger multiplier would otherwise let the
            // ceiling dip just past the threshold.
            let short_tier_top = self.reasoning_ceiling(self.reasoning_short_threshold);
            base.saturating_mul(self.reasoning_multiplier)
                .max(self.reasoning_floor)
                .max(short_tier_top)
        }
    }

    /// Compute the budget for one request
    pub fn plan(&self, length_percent: u8, is_reasoning_model: bool) -> BudgetPlan {
        let length_percent = length_percent.min(100);
        let max_output_tokens = if is_reasoning_model {
            self.reasoning_ceiling(length_percent)
        } else {
            self.base_ceiling(length_percent)
        };
        let length_descriptor = LengthDescriptor::for_length(length_percent);

        BudgetPlan {
            max_output_tokens,
            target_section_range: length_descriptor.section_range(),
            length_descriptor,
        }
    }
}

/// Compute a budget with the default constants
pub fn compute_budget(length_percent: u8, is_reasoning_model: bool) -> BudgetPlan {
    BudgetConfig::default().plan(length_percent, is_reasoning_model)
}
