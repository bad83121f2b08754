//! Regional formatting and validation rules for the primary deployment
//! locale (Kenya, en-KE) plus the bundled Swahili phrase table.

pub mod format;
pub mod holidays;
pub mod translate;

use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;

static KENYA_PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+254[0-9]{9}$").expect("hard-coded pattern"));
static KENYA_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("hard-coded pattern"));
static KENYA_POSTAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("hard-coded pattern"));

/// Static configuration for one deployment region.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    pub locale: &'static str,
    pub country_code: &'static str,
    pub currency_code: &'static str,
    pub currency_symbol: &'static str,
    pub timezone: &'static str,
    pub first_weekday: Weekday,
    phone_pattern: Regex,
    id_number_pattern: Regex,
    postal_code_pattern: Regex,
}

impl LocaleConfig {
    pub fn kenya() -> Self {
        Self {
            locale: "en-KE",
            country_code: "+254",
            currency_code: "KES",
            currency_symbol: "KSh",
            timezone: "Africa/Nairobi",
            first_weekday: Weekday::Mon,
            phone_pattern: KENYA_PHONE_PATTERN.clone(),
            id_number_pattern: KENYA_ID_PATTERN.clone(),
            postal_code_pattern: KENYA_POSTAL_PATTERN.clone(),
        }
    }

    /// Accepts the canonical international form, ignoring display spacing.
    pub fn is_valid_phone(&self, phone: &str) -> bool {
        let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        !compact.is_empty() && self.phone_pattern.is_match(&compact)
    }

    pub fn is_valid_national_id(&self, id: &str) -> bool {
        self.id_number_pattern.is_match(id)
    }

    pub fn is_valid_postal_code(&self, code: &str) -> bool {
        self.postal_code_pattern.is_match(code)
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::kenya()
    }
}
