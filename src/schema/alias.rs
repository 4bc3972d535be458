// src/schema/alias.rs

use super::{
    ABOARD, AIRCRAFT, AIRCRAFT_MANUFACTURER, CITY, COUNTRY, FATALITIES_AIR, GROUND, MONTH,
    MONTH_NAME, OPERATOR, REGION, YEAR,
};

/// Accepted raw header → canonical column name.
///
/// Lookup is exact: case and spacing matter, and a header not listed here is
/// left as it is. New spellings are added as rows, never as branches.
pub const ALIASES: &[(&str, &str)] = &[
    ("year", YEAR),
    ("Year", YEAR),
    ("month", MONTH),
    ("Month", MONTH),
    ("month_name", MONTH_NAME),
    ("Month Name", MONTH_NAME),
    ("country", COUNTRY),
    ("Country", COUNTRY),
    ("city", CITY),
    ("City", CITY),
    ("region", REGION),
    ("Region", REGION),
    ("operator", OPERATOR),
    ("Operator", OPERATOR),
    ("aircraft", AIRCRAFT),
    ("Aircraft", AIRCRAFT),
    ("aircraft_manufacturer", AIRCRAFT_MANUFACTURER),
    ("Aircraft Manufacturer", AIRCRAFT_MANUFACTURER),
    ("aboard", ABOARD),
    ("Aboard", ABOARD),
    ("fatalities_(air)", FATALITIES_AIR),
    ("Fatalities (Air)", FATALITIES_AIR),
    ("ground", GROUND),
    ("Ground", GROUND),
];

/// Canonical columns coerced to integers during normalization.
pub const NUMERIC_COLUMNS: &[&str] = &[YEAR, MONTH, ABOARD, FATALITIES_AIR, GROUND];

pub fn canonical_name(raw: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, canonical)| *canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_variant_maps_to_same_canonical() {
        assert_eq!(canonical_name("year"), Some("Year"));
        assert_eq!(canonical_name("Year"), Some("Year"));
        assert_eq!(canonical_name("fatalities_(air)"), Some("Fatalities (Air)"));
        assert_eq!(canonical_name("Fatalities (Air)"), Some("Fatalities (Air)"));
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(canonical_name("YEAR"), None);
        assert_eq!(canonical_name(" year"), None);
        assert_eq!(canonical_name("aircraft manufacturer"), None);
        assert_eq!(canonical_name("Registration"), None);
    }

    #[test]
    fn canonical_names_map_to_themselves() {
        for (_, canonical) in ALIASES {
            assert_eq!(canonical_name(canonical), Some(*canonical));
        }
    }
}
