//! # Configuration State
//!
//! Shop-level settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DUKA_*`)
//! 2. Defaults (this file)
//!
//! Remote endpoints and keys live in `duka_remote::RemoteConfig`, not here.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};

use duka_core::round_for_display;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in the shell banner
    pub store_name: String,

    /// Currency code prefixed to every amount (ISO 4217)
    pub currency_code: String,

    /// Allow recording a sale while the customer still owes money
    pub allow_credit_sales: bool,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Duka POS Dev Store"
    /// - Currency: KES
    /// - Credit sales: refused
    fn default() -> Self {
        ConfigState {
            store_name: "Duka POS Dev Store".to_string(),
            currency_code: "KES".to_string(),
            allow_credit_sales: false,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `DUKA_STORE_NAME`: Override store name
    /// - `DUKA_CURRENCY`: Override currency code
    /// - `DUKA_ALLOW_CREDIT`: `1`/`true`/`yes` to allow credit sales
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("DUKA_STORE_NAME").filter(|s| !s.trim().is_empty()) {
            config.store_name = store_name;
        }

        if let Some(currency) = lookup("DUKA_CURRENCY").filter(|s| !s.trim().is_empty()) {
            config.currency_code = currency.trim().to_uppercase();
        }

        if let Some(flag) = lookup("DUKA_ALLOW_CREDIT") {
            config.allow_credit_sales = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config
    }

    /// Formats an amount as `CODE 1,234.50`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(1234.5), "KES 1,234.50");
    /// ```
    pub fn format_currency(&self, amount: f64) -> String {
        let cents = if amount.is_finite() {
            (round_for_display(amount) * 100.0).round() as i64
        } else {
            0
        };
        let whole = (cents / 100).abs();
        let frac = (cents % 100).abs();

        format!(
            "{}{} {}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_code,
            group_thousands(whole),
            frac
        )
    }
}

/// `1234567` → `1,234,567`.
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(1234.5), "KES 1,234.50");
        assert_eq!(config.format_currency(220.0), "KES 220.00");
        assert_eq!(config.format_currency(0.01), "KES 0.01");
        assert_eq!(config.format_currency(0.0), "KES 0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(-12.34), "-KES 12.34");
        assert_eq!(config.format_currency(-0.0), "KES 0.00");
    }

    #[test]
    fn test_format_currency_float_drift() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(0.1 * 3.0), "KES 0.30");
        assert_eq!(config.format_currency(3.0 * 33.33), "KES 99.99");
        assert_eq!(config.format_currency(-0.001), "KES 0.00");
    }

    #[test]
    fn test_format_currency_large() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(1234567.891), "KES 1,234,567.89");
        assert_eq!(config.format_currency(f64::NAN), "KES 0.00");
    }

    #[test]
    fn test_from_lookup() {
        let config = ConfigState::from_lookup(|key| match key {
            "DUKA_STORE_NAME" => Some("Mama Mboga".to_string()),
            "DUKA_CURRENCY" => Some("ugx".to_string()),
            "DUKA_ALLOW_CREDIT" => Some("yes".to_string()),
            _ => None,
        });

        assert_eq!(config.store_name, "Mama Mboga");
        assert_eq!(config.currency_code, "UGX");
        assert!(config.allow_credit_sales);

        let config = ConfigState::from_lookup(|_| None);
        assert!(!config.allow_credit_sales);
        assert_eq!(config.currency_code, "KES");
    }
}
