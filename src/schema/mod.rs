pub mod alias;
pub mod derive;
pub mod normalize;

pub use alias::{canonical_name, ALIASES, NUMERIC_COLUMNS};
pub use derive::{add_derived_metrics, month_name, survival_rate, MONTH_NAMES};
pub use normalize::normalize;

// Canonical column names.
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const MONTH_NAME: &str = "Month Name";
pub const COUNTRY: &str = "Country";
pub const CITY: &str = "City";
pub const REGION: &str = "Region";
pub const OPERATOR: &str = "Operator";
pub const AIRCRAFT: &str = "Aircraft";
pub const AIRCRAFT_MANUFACTURER: &str = "Aircraft Manufacturer";
pub const ABOARD: &str = "Aboard";
pub const FATALITIES_AIR: &str = "Fatalities (Air)";
pub const GROUND: &str = "Ground";
pub const SURVIVAL_RATE: &str = "Survival Rate";
