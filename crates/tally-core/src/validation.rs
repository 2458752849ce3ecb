//! # Validation Module
//!
//! Input and invariant validation for the settlement engine.
//!
//! ## Validation Strategy
//! All validation runs synchronously BEFORE any state mutates: a failed
//! call leaves ledgers, pools, and splits exactly as they were, so the
//! cashier corrects the input and retries the same operation.

use crate::currency::{ApplicationSettings, Currency};
use crate::error::ValidationError;
use crate::money::Money;
use crate::settlement::DUE_METHOD;
use crate::types::OrderSnapshot;
use crate::{MAX_DECIMAL_PLACES, MAX_PAYMENT_MINOR, MONEY_EPSILON};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a base-currency payment amount.
///
/// ## Rules
/// - Must be positive (> 0) - zero tenders never enter a ledger
/// - Must not exceed `MAX_PAYMENT_MINOR`
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    if amount.minor() > MAX_PAYMENT_MINOR {
        return Err(ValidationError::OutOfRange {
            field: "payment amount".to_string(),
            min: 1,
            max: MAX_PAYMENT_MINOR,
        });
    }

    Ok(())
}

/// Validates a tip amount.
///
/// ## Rules
/// - Must not be negative
/// - Zero is allowed (clears the tip)
pub fn validate_tip_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "tip amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Payment Method Gating
// =============================================================================

/// Validates that a payment method is usable at this outlet.
///
/// "Due" is ALWAYS implicitly available alongside whatever list the
/// outlet enabled.
pub fn validate_method_enabled(method: &str, enabled: &[String]) -> ValidationResult<()> {
    let method = method.trim();

    if method.is_empty() {
        return Err(ValidationError::Required {
            field: "method".to_string(),
        });
    }

    if method == DUE_METHOD || enabled.iter().any(|m| m == method) {
        return Ok(());
    }

    let mut allowed = enabled.to_vec();
    allowed.push(DUE_METHOD.to_string());
    Err(ValidationError::NotAllowed {
        field: "method".to_string(),
        allowed,
    })
}

// =============================================================================
// Snapshot & Currency Invariants
// =============================================================================

/// Validates the consistency of a finalized order snapshot.
///
/// ## Rules
/// - Every item quantity is positive, every unit price non-negative
/// - `grand_total == sub_total + Σ taxes` within one minor unit
///
/// An inconsistent snapshot is refused outright: settling it would bake
/// the inconsistency into every split.
pub fn validate_order_snapshot(order: &OrderSnapshot) -> ValidationResult<()> {
    for item in &order.items {
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity of {}", item.name),
            });
        }
        if item.unit_price.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: format!("unit price of {}", item.name),
            });
        }
    }

    let expected = order.sub_total + order.tax_total();
    let drift = (order.grand_total - expected).abs();
    if drift > MONEY_EPSILON {
        return Err(ValidationError::Inconsistent {
            field: "grand total".to_string(),
            reason: format!(
                "expected sub total {} + taxes {} = {}, got {}",
                order.sub_total,
                order.tax_total(),
                expected,
                order.grand_total
            ),
        });
    }

    Ok(())
}

/// Validates an outlet's currency list.
///
/// ## Rules
/// - Every code is non-empty with no embedded whitespace
/// - Exactly one currency flagged `is_default`
/// - The default's exchange rate is exactly 1
/// - Every rate is positive
pub fn validate_currencies(currencies: &[Currency]) -> ValidationResult<()> {
    let defaults = currencies.iter().filter(|c| c.is_default).count();
    if defaults != 1 {
        return Err(ValidationError::Inconsistent {
            field: "currencies".to_string(),
            reason: format!("expected exactly one default currency, found {}", defaults),
        });
    }

    for currency in currencies {
        if currency.code.trim().is_empty() || currency.code.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "currency code".to_string(),
                reason: format!("{:?} is empty or contains whitespace", currency.code),
            });
        }
        if currency.exchange_rate <= rust_decimal::Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: format!("exchange rate of {}", currency.code),
            });
        }
        if currency.is_default && currency.exchange_rate != rust_decimal::Decimal::ONE {
            return Err(ValidationError::Inconsistent {
                field: "currencies".to_string(),
                reason: format!(
                    "default currency {} must have rate 1, got {}",
                    currency.code, currency.exchange_rate
                ),
            });
        }
    }

    Ok(())
}

/// Validates outlet display settings.
///
/// ## Rules
/// `decimal_places ≤ MAX_DECIMAL_PLACES`: the minor-unit factor is
/// `10^decimal_places` in i64, and every converted amount scales by it.
pub fn validate_settings(settings: &ApplicationSettings) -> ValidationResult<()> {
    if settings.decimal_places > MAX_DECIMAL_PLACES {
        return Err(ValidationError::OutOfRange {
            field: "decimal places".to_string(),
            min: 0,
            max: MAX_DECIMAL_PLACES as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
