use serde::{Deserialize, Serialize};

const PEAK_START_HOUR: u32 = 18;
const PEAK_END_HOUR: u32 = 20;

/// The shopper's confirmed delivery location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPreference {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl LocationPreference {
    pub fn confirm(&mut self, city: impl Into<String>, state: impl Into<String>) {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self.confirmed = true;
    }

    pub fn reset(&mut self) {
        *self = LocationPreference::default();
    }
}

/// Estimated delivery time bounds, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindow {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl DeliveryWindow {
    pub fn label(&self) -> String {
        format!("{}-{} min", self.min_minutes, self.max_minutes)
    }
}

/// Delivery estimate for the given local hour. Dinner rush (18h up to,
/// not including, 20h) widens the window.
pub fn delivery_window(hour: u32) -> DeliveryWindow {
    if (PEAK_START_HOUR..PEAK_END_HOUR).contains(&hour) {
        DeliveryWindow {
            min_minutes: 45,
            max_minutes: 60,
        }
    } else {
        DeliveryWindow {
            min_minutes: 25,
            max_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_peak_hours_get_the_short_window() {
        assert_eq!(delivery_window(12).label(), "25-30 min");
        assert_eq!(delivery_window(17).label(), "25-30 min");
        assert_eq!(delivery_window(20).label(), "25-30 min");
        assert_eq!(delivery_window(21).label(), "25-30 min");
    }

    #[test]
    fn dinner_rush_gets_the_wide_window() {
        assert_eq!(delivery_window(18).label(), "45-60 min");
        assert_eq!(delivery_window(19).label(), "45-60 min");
    }

    #[test]
    fn confirm_records_the_location() {
        let mut preference = LocationPreference::default();

        preference.confirm("Foz do Iguaçu", "PR");

        assert!(preference.confirmed);
        assert_eq!(preference.city.as_deref(), Some("Foz do Iguaçu"));
        assert_eq!(preference.state.as_deref(), Some("PR"));
    }

    #[test]
    fn reset_clears_the_confirmation() {
        let mut preference = LocationPreference::default();
        preference.confirm("Foz do Iguaçu", "PR");

        preference.reset();

        assert_eq!(preference, LocationPreference::default());
    }
}
