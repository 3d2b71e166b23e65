//! Per-user preferred country.

use std::collections::HashMap;

use crate::domain::Country;

/// In-memory `user id -> country` map. Not persisted across runs.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    countries: HashMap<i64, &'static Country>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's country, or the default country when none was chosen.
    pub fn get(&self, user: i64) -> &'static Country {
        self.countries.get(&user).copied().unwrap_or_else(Country::default_country)
    }

    pub fn set(&mut self, user: i64, country: &'static Country) {
        self.countries.insert(user, country);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_user_gets_default() {
        let store = PreferenceStore::new();
        assert_eq!(store.get(42).key, "US");
    }

    #[test]
    fn set_overwrites() {
        let mut store = PreferenceStore::new();
        store.set(7, Country::by_key("russia").unwrap());
        assert_eq!(store.get(7).server_id, "Russia");
        store.set(7, Country::by_key("ITALY").unwrap());
        assert_eq!(store.get(7).key, "ITALY");
        assert_eq!(store.get(8).key, "US");
    }
}
