//! Create-order input validation
//!
//! Shared so the client can reject an order before any money moves, and the
//! server can reject it before anything is persisted. Totals are recomputed
//! from the lines and the pricing policy; submitted figures only have to
//! agree.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{CreateOrderRequest, OrderLine, lines_subtotal};
use crate::money::{PricingPolicy, Quote, amounts_match};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_NOTE_LEN: usize = 500;
pub const MAX_LINES: usize = 100;
pub const MAX_QUANTITY: i32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Invalid(String),

    #[error("order has no lines")]
    Empty,

    #[error("{field} does not match: expected {expected}, got {submitted}")]
    TotalMismatch {
        field: &'static str,
        expected: Decimal,
        submitted: Decimal,
    },
}

fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Invalid(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ValidationError::Invalid(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(())
}

fn validate_line(index: usize, line: &OrderLine) -> Result<(), ValidationError> {
    if line.food_id.trim().is_empty() {
        return Err(ValidationError::Invalid(format!(
            "lines[{index}].food_id is required"
        )));
    }
    if line.quantity < 1 {
        return Err(ValidationError::Invalid(format!(
            "lines[{index}].quantity must be at least 1"
        )));
    }
    if line.quantity > MAX_QUANTITY {
        return Err(ValidationError::Invalid(format!(
            "lines[{index}].quantity exceeds {MAX_QUANTITY}"
        )));
    }
    if line.unit_price.is_sign_negative() {
        return Err(ValidationError::Invalid(format!(
            "lines[{index}].unit_price must not be negative"
        )));
    }
    Ok(())
}

/// Validate a create request and return the quote it must agree with
pub fn validate_create(
    req: &CreateOrderRequest,
    pricing: &PricingPolicy,
) -> Result<Quote, ValidationError> {
    require_text("customer_name", &req.customer_name, MAX_NAME_LEN)?;
    require_text("restaurant_id", &req.restaurant_id, MAX_NAME_LEN)?;
    if let Some(note) = &req.note
        && note.chars().count() > MAX_NOTE_LEN
    {
        return Err(ValidationError::Invalid(format!(
            "note exceeds {MAX_NOTE_LEN} characters"
        )));
    }

    if req.lines.is_empty() {
        return Err(ValidationError::Empty);
    }
    if req.lines.len() > MAX_LINES {
        return Err(ValidationError::Invalid(format!(
            "an order may have at most {MAX_LINES} lines"
        )));
    }
    for (i, line) in req.lines.iter().enumerate() {
        validate_line(i, line)?;
    }

    if req.delivery_fee.is_sign_negative() || req.tax.is_sign_negative() {
        return Err(ValidationError::Invalid(
            "delivery_fee and tax must not be negative".into(),
        ));
    }

    let quote = pricing.quote(lines_subtotal(&req.lines));
    check_amount("delivery_fee", quote.delivery_fee, req.delivery_fee)?;
    check_amount("tax", quote.tax, req.tax)?;
    check_amount("total_amount", quote.total, req.total_amount)?;
    Ok(quote)
}

fn check_amount(
    field: &'static str,
    expected: Decimal,
    submitted: Decimal,
) -> Result<(), ValidationError> {
    if amounts_match(expected, submitted) {
        Ok(())
    } else {
        Err(ValidationError::TotalMismatch {
            field,
            expected,
            submitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::PaymentMethod;
    use rust_decimal_macros::dec;

    fn line(food_id: &str, quantity: i32, unit_price: Decimal) -> OrderLine {
        OrderLine {
            food_id: food_id.into(),
            name: food_id.into(),
            quantity,
            unit_price,
        }
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Asha".into(),
            restaurant_id: "r1".into(),
            lines: vec![line("a", 2, dec!(100)), line("b", 1, dec!(50))],
            total_amount: dec!(300),
            delivery_fee: dec!(30),
            tax: dec!(20),
            payment_method: PaymentMethod::Cash,
            payment: None,
            note: None,
        }
    }

    #[test]
    fn test_consistent_request_passes() {
        let quote = validate_create(&request(), &PricingPolicy::default()).unwrap();
        assert_eq!(quote.subtotal, dec!(250));
        assert_eq!(quote.total, dec!(300));
    }

    #[test]
    fn test_total_within_tolerance_passes() {
        let mut req = request();
        req.total_amount = dec!(300.005);
        assert!(validate_create(&req, &PricingPolicy::default()).is_ok());
    }

    #[test]
    fn test_inflated_or_deflated_totals_fail() {
        let mut req = request();
        req.total_amount = dec!(1);
        let err = validate_create(&req, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TotalMismatch {
                field: "total_amount",
                ..
            }
        ));

        let mut req = request();
        req.tax = dec!(0);
        req.total_amount = dec!(280);
        let err = validate_create(&req, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(err, ValidationError::TotalMismatch { field: "tax", .. }));
    }

    #[test]
    fn test_empty_lines_fail() {
        let mut req = request();
        req.lines.clear();
        assert_eq!(
            validate_create(&req, &PricingPolicy::default()),
            Err(ValidationError::Empty)
        );
    }

    #[test]
    fn test_bad_lines_fail() {
        let mut req = request();
        req.lines[0].quantity = 0;
        assert!(matches!(
            validate_create(&req, &PricingPolicy::default()),
            Err(ValidationError::Invalid(_))
        ));

        let mut req = request();
        req.lines[0].quantity = MAX_QUANTITY + 1;
        req.total_amount = dec!(108030);
        assert_eq!(
            validate_create(&req, &PricingPolicy::default()),
            Err(ValidationError::Invalid(
                "lines[0].quantity exceeds 999".into()
            ))
        );

        let mut req = request();
        req.lines[1].unit_price = dec!(-1);
        assert!(matches!(
            validate_create(&req, &PricingPolicy::default()),
            Err(ValidationError::Invalid(_))
        ));
    }

    #[test]
    fn test_too_many_lines_fail() {
        let mut req = request();
        req.lines = (0..=MAX_LINES)
            .map(|i| line(&format!("f{i}"), 1, dec!(1)))
            .collect();
        assert!(matches!(
            validate_create(&req, &PricingPolicy::default()),
            Err(ValidationError::Invalid(_))
        ));
    }

    #[test]
    fn test_required_strings_and_note_length() {
        let mut req = request();
        req.customer_name = "   ".into();
        assert_eq!(
            validate_create(&req, &PricingPolicy::default()),
            Err(ValidationError::Invalid("customer_name is required".into()))
        );

        let mut req = request();
        req.note = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_create(&req, &PricingPolicy::default()).is_err());

        let mut req = request();
        req.note = Some("x".repeat(MAX_NOTE_LEN));
        assert!(validate_create(&req, &PricingPolicy::default()).is_ok());
    }
}
