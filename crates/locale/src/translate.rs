//! The two bundled phrase dictionaries (English, Swahili).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Sw,
}

impl Lang {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "en" | "en-ke" => Some(Lang::En),
            "sw" | "sw-ke" => Some(Lang::Sw),
            _ => None,
        }
    }
}

const PHRASES: &[(&str, &str, &str)] = &[
    ("loading", "Loading...", "Inapakia..."),
    ("save", "Save", "Hifadhi"),
    ("cancel", "Cancel", "Ghairi"),
    ("delete", "Delete", "Futa"),
    ("edit", "Edit", "Hariri"),
    ("create", "Create", "Unda"),
    ("search", "Search", "Tafuta"),
    ("today", "Today", "Leo"),
    ("tomorrow", "Tomorrow", "Kesho"),
    ("yesterday", "Yesterday", "Jana"),
    ("next_week", "Next Week", "Wiki ijayo"),
    ("this_month", "This Month", "Mwezi huu"),
    ("next_month", "Next Month", "Mwezi ujao"),
    ("select_date", "Select Date", "Chagua Tarehe"),
    ("select_time", "Select Time", "Chagua Wakati"),
    ("contact_info", "Contact Information", "Maelezo ya Mawasiliano"),
    ("payment_info", "Payment Information", "Maelezo ya Malipo"),
    ("customer_info", "Customer Information", "Maelezo ya Mteja"),
    ("project_info", "Project Information", "Maelezo ya Mradi"),
];

pub fn phrase(lang: Lang, key: &str) -> Option<&'static str> {
    PHRASES
        .iter()
        .find(|(phrase_key, _, _)| *phrase_key == key)
        .map(|(_, en, sw)| match lang {
            Lang::En => *en,
            Lang::Sw => *sw,
        })
}

/// Falls back to the raw key for unknown phrases so callers always have
/// something printable.
pub fn phrase_or_key<'a>(lang: Lang, key: &'a str) -> &'a str {
    phrase(lang, key).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundled_key_resolves_in_both_languages() {
        for (key, en, sw) in PHRASES {
            assert_eq!(phrase(Lang::En, key), Some(*en));
            assert_eq!(phrase(Lang::Sw, key), Some(*sw));
        }
    }

    #[test]
    fn unknown_keys_fall_back_to_the_key() {
        assert_eq!(phrase(Lang::Sw, "does_not_exist"), None);
        assert_eq!(phrase_or_key(Lang::En, "does_not_exist"), "does_not_exist");
    }

    #[test]
    fn language_tags_resolve_regional_variants() {
        assert_eq!(Lang::from_tag("en-KE"), Some(Lang::En));
        assert_eq!(Lang::from_tag("sw"), Some(Lang::Sw));
        assert_eq!(Lang::from_tag("fr"), None);
    }
}
