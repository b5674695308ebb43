//! Cost estimation from token usage.
//!
//! Purely derived figures: token counts times configured per-1000-token
//! rates. Advisory only, never fails.

use crate::llm::TokenUsage;

/// Per-1000-token prices in the configured currency.
#[derive(Debug, Clone, Copy)]
pub struct PricePer1kTokens {
    pub input: f64,
    pub output: f64,
}

/// Monetary estimate derived from one response's token usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostEstimate {
    pub const ZERO: CostEstimate = CostEstimate {
        input_cost: 0.0,
        output_cost: 0.0,
        total_cost: 0.0,
    };
}

/// Estimate the cost of a call and format a human-readable summary.
///
/// Absent usage (some providers omit it) yields zero cost annotated as such.
pub fn estimate(usage: Option<&TokenUsage>, rates: PricePer1kTokens) -> (CostEstimate, String) {
    let Some(usage) = usage else {
        return (CostEstimate::ZERO, "no usage info".to_string());
    };

    let input_cost = (usage.prompt_tokens as f64 / 1000.0) * rates.input;
    let output_cost = (usage.completion_tokens as f64 / 1000.0) * rates.output;
    let estimate = CostEstimate {
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
    };

    let summary = format!(
        "cost: ¥{:.6} (input: {} tokens, output: {} tokens)",
        estimate.total_cost, usage.prompt_tokens, usage.completion_tokens
    );
    (estimate, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: PricePer1kTokens = PricePer1kTokens {
        input: 0.0030,
        output: 0.0090,
    };

    #[test]
    fn test_zero_usage_is_zero_cost() {
        let usage = TokenUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
        };
        let (estimate, _) = estimate(Some(&usage), RATES);
        assert_eq!(estimate, CostEstimate::ZERO);
    }

    #[test]
    fn test_absent_usage_annotated() {
        let (cost, summary) = estimate(None, RATES);
        assert_eq!(cost, CostEstimate::ZERO);
        assert_eq!(summary, "no usage info");
    }

    #[test]
    fn test_cost_is_linear_in_each_component() {
        let base = TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 500,
        };
        let doubled_prompt = TokenUsage {
            prompt_tokens: 2000,
            completion_tokens: 500,
        };
        let doubled_completion = TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 1000,
        };

        let (c0, _) = estimate(Some(&base), RATES);
        let (c1, _) = estimate(Some(&doubled_prompt), RATES);
        let (c2, _) = estimate(Some(&doubled_completion), RATES);

        assert!((c1.input_cost - 2.0 * c0.input_cost).abs() < 1e-12);
        assert_eq!(c1.output_cost, c0.output_cost);
        assert!((c2.output_cost - 2.0 * c0.output_cost).abs() < 1e-12);
        assert_eq!(c2.input_cost, c0.input_cost);
    }

    #[test]
    fn test_summary_formatting() {
        let usage = TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 1000,
        };
        let (cost, summary) = estimate(Some(&usage), RATES);
        assert!((cost.total_cost - 0.0120).abs() < 1e-12);
        assert_eq!(summary, "cost: ¥0.012000 (input: 1000 tokens, output: 1000 tokens)");
    }
}
