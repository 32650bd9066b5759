//! The provider abstraction consumed by the planner.

use crate::domain::{Direction, TransportKind};

use super::error::ProviderError;
use super::types::ScheduleEntry;

/// Source of real-time boards and mission station lists.
///
/// This abstraction allows the planner to be tested with stub data and run
/// offline from fixtures.
pub trait ScheduleProvider {
    /// Fetch the departure board for a line at a station, in board order.
    fn fetch_schedules(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> Result<Vec<ScheduleEntry>, ProviderError>;

    /// Fetch the stations served by a line variant (RER mission), in calling
    /// order.
    ///
    /// Fails with [`ProviderError::BadRequest`] when the variant carries no
    /// passengers.
    fn fetch_variant_stations(&self, line: &str, code: &str)
    -> Result<Vec<String>, ProviderError>;
}

/// Convert a station name to the API's slug form.
///
/// Lower-cases the name and replaces every space or hyphen with `+`.
///
/// # Examples
///
/// ```
/// use itinerary_planner::ratp::station_slug;
///
/// assert_eq!(station_slug("Villejuif - Louis Aragon"), "villejuif+++louis+aragon");
/// assert_eq!(station_slug("Bourg la Reine"), "bourg+la+reine");
/// ```
pub fn station_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '+' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(station_slug("Bourg-la-Reine"), "bourg+la+reine");
        assert_eq!(station_slug("  Massy Verrieres "), "massy+verrieres");
        assert_eq!(station_slug("Châtelet"), "châtelet");
    }

    #[test]
    fn slug_of_slug_is_stable() {
        let once = station_slug("Villejuif - Louis Aragon");
        assert_eq!(station_slug(&once), once);
    }
}
