//! `validator` checks for money fields. Amounts must fit their
//! `NUMERIC(12, 2)` column exactly.

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::domain::pricing::is_storable_amount;

pub fn amount(value: &Decimal) -> Result<(), ValidationError> {
    if is_storable_amount(value) { Ok(()) } else { Err(ValidationError::new("amount_out_of_range")) }
}

pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    amount(value)
}

pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("must_be_positive"));
    }
    amount(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_checks() {
        assert!(amount(&dec!(-5.25)).is_ok());
        assert!(amount(&dec!(33.333)).is_err());
        assert!(non_negative_amount(&dec!(0)).is_ok());
        assert!(non_negative_amount(&dec!(-0.01)).is_err());
        assert!(non_negative_amount(&dec!(10000000000)).is_err());
        assert!(positive_amount(&dec!(0)).is_err());
        assert!(positive_amount(&dec!(0.01)).is_ok());
    }
}
