//! Deterministic (modulo name sampling) itinerary synthesis.
//!
//! Used whenever generation fails outright, and as the source of filler when
//! repair finds too few usable activities or restaurants.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::coerce::truncate_chars;
use crate::curation::{Curation, TripContext};
use crate::dates::trip_window;
use crate::model::{Activity, Blocks, DayPlan, Itinerary, PriceTier, Restaurant, SearchResult};

pub const DEFAULT_PACKING_LIST: &[&str] = &[
    "Comfortable shoes",
    "Sunscreen",
    "Reusable water bottle",
    "Light jacket",
];

pub(crate) const MIN_ACTIVITIES: usize = 3;
pub(crate) const MIN_RESTAURANTS: usize = 3;
const MAX_SEARCH_ACTIVITIES: usize = 5;
const SEARCH_TITLE_MAX_CHARS: usize = 80;
const PARK_VISIT: &str = "City park visit";

/// Build a complete itinerary without any generator input.
///
/// ```
/// use chrono::NaiveDate;
/// use concierge_core::curation::{Curation, TripContext};
/// use concierge_core::fallback::synthesize;
/// use concierge_core::model::{Booking, Preferences};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let booking = Booking::default();
/// let preferences = Preferences::default();
/// let trip = TripContext {
///     booking: &booking,
///     preferences: &preferences,
///     search_results: &[],
///     today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// };
/// let itinerary = synthesize(&Curation::default(), &trip, &mut StdRng::seed_from_u64(7));
/// assert_eq!(itinerary.plan.len(), 2);
/// assert_eq!(itinerary.activities.len(), 3);
/// assert_eq!(itinerary.restaurants.len(), 3);
/// ```
pub fn synthesize<R: Rng + ?Sized>(
    curation: &Curation,
    trip: &TripContext<'_>,
    rng: &mut R,
) -> Itinerary {
    let activities = activities_from_search(curation, trip.search_results);
    let mut restaurants = Vec::with_capacity(MIN_RESTAURANTS);
    top_up_restaurants(curation, &mut restaurants, &trip.preferences.dietary, rng);
    let days = trip_window(&trip.booking.start_date, &trip.booking.end_date, trip.today);

    let seeds = RoundRobin::new(&activities, &restaurants);
    let plan = days
        .into_iter()
        .enumerate()
        .map(|(i, date)| DayPlan {
            date,
            blocks: Blocks {
                morning: seeds.morning(i),
                afternoon: seeds.afternoon(i),
                evening: seeds.evening(i),
            },
        })
        .collect();

    tracing::debug!(
        activities = activities.len(),
        restaurants = restaurants.len(),
        search_results = trip.search_results.len(),
        "fallback.synthesized"
    );

    Itinerary {
        plan,
        activities,
        restaurants,
        packing_checklist: default_packing_list(),
    }
}

/// Up to five activities built from non-aggregator search rows, padded to three.
pub fn activities_from_search(curation: &Curation, results: &[SearchResult]) -> Vec<Activity> {
    let mut activities: Vec<Activity> = results
        .iter()
        .filter_map(|row| {
            let title = truncate_chars(row.title.trim(), SEARCH_TITLE_MAX_CHARS);
            let blocked = curation.is_blocked(&row.url)
                || curation.is_blocked(&row.title)
                || curation.is_blocked(&title);
            if blocked {
                tracing::trace!(url = %row.url, "fallback.search_row.blocked");
                return None;
            }
            Some(Activity {
                title: if title.is_empty() {
                    "Activity".to_string()
                } else {
                    title
                },
                address: row.url.clone(),
                price_tier: PriceTier::Moderate,
                duration_min: 90,
                tags: vec!["outdoor".to_string()],
                wheelchair_friendly: true,
                child_friendly: true,
            })
        })
        .take(MAX_SEARCH_ACTIVITIES)
        .collect();

    while activities.len() < MIN_ACTIVITIES {
        activities.push(park_visit());
    }
    activities
}

pub(crate) fn park_visit() -> Activity {
    Activity {
        title: PARK_VISIT.to_string(),
        address: String::new(),
        price_tier: PriceTier::Budget,
        duration_min: 60,
        tags: vec!["outdoor".to_string()],
        wheelchair_friendly: true,
        child_friendly: true,
    }
}

/// Fill `restaurants` up to three entries.
///
/// Pool names already present (case-insensitive) are excluded and the rest
/// sampled without replacement; once the pool runs dry, numbered
/// `Neighborhood Kitchen #N` placeholders cover the remainder.
pub(crate) fn top_up_restaurants<R: Rng + ?Sized>(
    curation: &Curation,
    restaurants: &mut Vec<Restaurant>,
    dietary: &[String],
    rng: &mut R,
) {
    let need = MIN_RESTAURANTS.saturating_sub(restaurants.len());
    if need == 0 {
        return;
    }
    let mut taken: HashSet<String> = restaurants.iter().map(|r| r.name.to_lowercase()).collect();
    let available: Vec<&String> = curation
        .restaurant_pool()
        .iter()
        .filter(|name| !taken.contains(&name.to_lowercase()))
        .collect();
    let drawn: Vec<String> = available
        .choose_multiple(rng, need.min(available.len()))
        .map(|name| name.to_string())
        .collect();
    for name in drawn {
        taken.insert(name.to_lowercase());
        restaurants.push(fallback_restaurant(name, dietary));
    }

    let mut n = restaurants.len() + 1;
    while restaurants.len() < MIN_RESTAURANTS {
        let name = format!("Neighborhood Kitchen #{n}");
        n += 1;
        if taken.insert(name.to_lowercase()) {
            restaurants.push(fallback_restaurant(name, dietary));
        }
    }
}

pub(crate) fn fallback_restaurant(name: String, dietary: &[String]) -> Restaurant {
    Restaurant {
        name,
        address: String::new(),
        price_tier: PriceTier::Budget,
        diet_tags: dietary.to_vec(),
        notes: "fallback".to_string(),
    }
}

pub(crate) fn default_packing_list() -> Vec<String> {
    DEFAULT_PACKING_LIST.iter().map(|s| s.to_string()).collect()
}

/// Round-robin block seeding over the available activity and restaurant pools.
pub(crate) struct RoundRobin<'a> {
    activities: &'a [Activity],
    restaurants: &'a [Restaurant],
}

impl<'a> RoundRobin<'a> {
    pub(crate) fn new(activities: &'a [Activity], restaurants: &'a [Restaurant]) -> Self {
        Self {
            activities,
            restaurants,
        }
    }

    pub(crate) fn morning(&self, day: usize) -> Vec<String> {
        self.activity_at(day)
    }

    pub(crate) fn afternoon(&self, day: usize) -> Vec<String> {
        self.activity_at(day + 1)
    }

    pub(crate) fn evening(&self, day: usize) -> Vec<String> {
        match self.restaurants.len() {
            0 => vec!["Dinner".to_string()],
            n => vec![format!("{} dinner", self.restaurants[day % n].name)],
        }
    }

    fn activity_at(&self, idx: usize) -> Vec<String> {
        match self.activities.len() {
            0 => vec![PARK_VISIT.to_string()],
            n => vec![self.activities[idx % n].title.clone()],
        }
    }
}
