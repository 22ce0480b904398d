// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! One-time-code delivery.
//!
//! The gateway is a trait so handlers stay transport-agnostic; the default
//! [`LogSmsGateway`] writes the code to the log instead of sending anything,
//! which is what development and CI run with.
//!
//! Phone numbers starting with [`TEST_PHONE_PREFIX`] are test numbers: they
//! always receive [`TEST_CODE`] and no delivery is attempted, so end-to-end
//! flows can run without an SMS provider.

/// Numbers with this prefix are test numbers (never real E.164).
pub const TEST_PHONE_PREFIX: &str = "+0";

/// Fixed code issued for test numbers.
pub const TEST_CODE: &str = "123456";

const CODE_DIGITS: u128 = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("sms delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Whether the number is a test number (exempt from delivery and format
/// validation).
pub fn is_test_phone(phone: &str) -> bool {
    phone.starts_with(TEST_PHONE_PREFIX)
}

/// E.164 shape: `+` then 2..=15 digits, first digit nonzero.
pub fn is_valid_phone(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (2..=15).contains(&digits.len())
        && digits.starts_with(|c: char| ('1'..='9').contains(&c))
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// Generate a zero-padded six digit code, e.g. `"034921"`.
///
/// Test numbers always get [`TEST_CODE`].
pub fn generate_code(phone: &str) -> String {
    if is_test_phone(phone) {
        return TEST_CODE.to_string();
    }
    let raw = u128::from_le_bytes(*uuid::Uuid::new_v4().as_bytes());
    format!("{:06}", raw % CODE_DIGITS)
}

/// Delivery backend for one-time codes.
pub trait SmsGateway: Send + Sync {
    /// Deliver `code` to `phone`. Implementations must not log the code at
    /// levels above debug in production backends.
    fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError>;
}

/// Logs the code instead of delivering it. Default for development.
pub struct LogSmsGateway;

impl SmsGateway for LogSmsGateway {
    fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        if is_test_phone(phone) {
            return Ok(());
        }
        if !is_valid_phone(phone) {
            return Err(SmsError::InvalidPhone(phone.to_string()));
        }
        tracing::info!(phone, code, "sms gateway (log only): verification code");
        Ok(())
    }
}
