//! Per-token prices used for cost estimates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// USD per input token ($3 per million)
pub const INPUT_PRICE_PER_TOKEN: Decimal = Decimal::from_parts(3, 0, 0, false, 6);

/// USD per output token ($15 per million)
pub const OUTPUT_PRICE_PER_TOKEN: Decimal = Decimal::from_parts(15, 0, 0, false, 6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_token: Decimal,
    pub output_per_token: Decimal,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_token: INPUT_PRICE_PER_TOKEN,
            output_per_token: OUTPUT_PRICE_PER_TOKEN,
        }
    }
}

impl Pricing {
    /// `input_tokens * input_price + output_tokens * output_price`
    pub fn cost(&self, input_tokens: i64, output_tokens: i64) -> Decimal {
        Decimal::from(input_tokens) * self.input_per_token
            + Decimal::from(output_tokens) * self.output_per_token
    }
}
