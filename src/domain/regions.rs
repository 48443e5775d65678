use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

pub const CA_PROVINCES: &[&str] = &[
    "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
];

static COUNTRY_STATES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("US", US_STATES);
    table.insert("CA", CA_PROVINCES);
    table
});

/// 國家代碼展開成所屬州代碼；未知國家回傳空陣列
pub fn states_of(country: &str) -> &'static [&'static str] {
    COUNTRY_STATES
        .get(country.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(&[])
}
