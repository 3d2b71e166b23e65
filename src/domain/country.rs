//! Countries the chat menu offers as shortcuts.
//!
//! `key` is the command token (`/RUSSIA_cases_daily`), `server_id` is the
//! entity name in the upstream snapshot.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Country {
    pub key: &'static str,
    pub server_id: &'static str,
    pub flag: &'static str,
    pub title: &'static str,
}

impl Country {
    const fn new(key: &'static str, server_id: &'static str, flag: &'static str, title: &'static str) -> Self {
        Self {
            key,
            server_id,
            flag,
            title,
        }
    }

    /// `"🇷🇺 Russia"`, as shown on keyboard buttons.
    pub fn display(&self) -> String {
        format!("{} {}", self.flag, self.title)
    }

    /// Case-insensitive lookup by command key.
    pub fn by_key(key: &str) -> Option<&'static Country> {
        TRACKED_COUNTRIES.iter().find(|c| c.key.eq_ignore_ascii_case(key))
    }

    /// Exact lookup by snapshot entity name.
    pub fn by_server_id(server_id: &str) -> Option<&'static Country> {
        TRACKED_COUNTRIES.iter().find(|c| c.server_id == server_id)
    }

    /// Lookup by flag emoji (keyboard labels start with it).
    pub fn by_flag(flag: &str) -> Option<&'static Country> {
        TRACKED_COUNTRIES.iter().find(|c| c.flag == flag)
    }

    /// Country used when a user has not picked one.
    pub fn default_country() -> &'static Country {
        &TRACKED_COUNTRIES[0]
    }
}

pub const TRACKED_COUNTRIES: [Country; 28] = [
    Country::new("US", "US", "🇺🇸", "US"),
    Country::new("GERMANY", "Germany", "🇩🇪", "Germany"),
    Country::new("ITALY", "Italy", "🇮🇹", "Italy"),
    Country::new("SPAIN", "Spain", "🇪🇸", "Spain"),
    Country::new("UK", "United Kingdom", "🇬🇧", "United Kingdom"),
    Country::new("BELGIUM", "Belgium", "🇧🇪", "Belgium"),
    Country::new("IRAN", "Iran", "🇮🇷", "Iran"),
    Country::new("CHINA", "China", "🇨🇳", "China"),
    Country::new("NL", "Netherlands", "🇳🇱", "Netherlands"),
    Country::new("RUSSIA", "Russia", "🇷🇺", "Russia"),
    Country::new("FRANCE", "France", "🇫🇷", "France"),
    Country::new("TURKEY", "Turkey", "🇹🇷", "Turkey"),
    Country::new("BRAZIL", "Brazil", "🇧🇷", "Brazil"),
    Country::new("CANADA", "Canada", "🇨🇦", "Canada"),
    Country::new("SWITZERLAND", "Switzerland", "🇨🇭", "Switzerland"),
    Country::new("INDIA", "India", "🇮🇳", "India"),
    Country::new("PERU", "Peru", "🇵🇪", "Peru"),
    Country::new("PORTUGAL", "Portugal", "🇵🇹", "Portugal"),
    Country::new("ECUADOR", "Ecuador", "🇪🇨", "Ecuador"),
    Country::new("SAUDIARABIA", "Saudi Arabia", "🇸🇦", "Saudi Arabia"),
    Country::new("SWEDEN", "Sweden", "🇸🇪", "Sweden"),
    Country::new("IRELAND", "Ireland", "🇮🇪", "Ireland"),
    Country::new("MEXICO", "Mexico", "🇲🇽", "Mexico"),
    Country::new("PAKISTAN", "Pakistan", "🇵🇰", "Pakistan"),
    Country::new("SINGAPORE", "Singapore", "🇸🇬", "Singapore"),
    Country::new("CHILE", "Chile", "🇨🇱", "Chile"),
    Country::new("ISRAEL", "Israel", "🇮🇱", "Israel"),
    Country::new("AUSTRIA", "Austria", "🇦🇹", "Austria"),
];
