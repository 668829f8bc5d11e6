//! Shape repair: turn whatever the extractor produced into a valid itinerary.
//!
//! Every list is filtered through the curation policy, normalized into the
//! output types, then padded from the fallback synthesizer. This is the one
//! place the output invariants are established: at least two plan days with
//! filled blocks, 3..=12 activities and restaurants free of aggregator or
//! listicle content, and a non-empty packing list of at most 20 entries.

use std::collections::HashSet;

use rand::Rng;
use serde_json::{Map, Value};

use crate::coerce::{field, positive_minutes, string_list, stringify, truncate_chars, truthy};
use crate::curation::{ActivityShortfall, Curation, TripContext};
use crate::dates::trip_window;
use crate::fallback::{
    MIN_ACTIVITIES, RoundRobin, activities_from_search, default_packing_list, park_visit, synthesize,
    top_up_restaurants,
};
use crate::model::{Activity, Blocks, DayPlan, Itinerary, PriceTier, Restaurant};

const MAX_ACTIVITIES: usize = 12;
const MAX_RESTAURANTS: usize = 12;
const MAX_PACKING_ITEMS: usize = 20;
const NAME_MAX_CHARS: usize = 120;
const DEFAULT_DURATION_MIN: u32 = 60;

/// Repair a candidate itinerary. Anything that is not a JSON object is
/// handed to [`synthesize`] wholesale.
///
/// Fewer than three usable activities are handled per
/// [`ActivityShortfall`]. Under the default `Replace` the survivors are
/// discarded and the list is rebuilt from search results, so a lone valid
/// activity is not carried over. Only `Retain` keeps survivors
/// ahead of the filler. Restaurants are always topped up, never replaced.
pub fn repair<R: Rng + ?Sized>(
    curation: &Curation,
    candidate: Option<&Value>,
    trip: &TripContext<'_>,
    rng: &mut R,
) -> Itinerary {
    let Some(obj) = candidate.and_then(Value::as_object) else {
        tracing::info!("repair.candidate.not_object");
        return synthesize(curation, trip, rng);
    };

    let activities = repair_activities(curation, obj, trip);
    let restaurants = repair_restaurants(curation, obj, trip, rng);
    let packing_checklist = repair_packing_list(obj);
    let plan = repair_plan(obj, trip, &activities, &restaurants);

    Itinerary {
        plan,
        activities,
        restaurants,
        packing_checklist,
    }
}

fn entries<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    field(obj, key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn repair_activities(
    curation: &Curation,
    obj: &Map<String, Value>,
    trip: &TripContext<'_>,
) -> Vec<Activity> {
    let raw = entries(obj, "activities");
    let mut cleaned: Vec<Activity> = raw
        .iter()
        .filter_map(|entry| normalize_activity(curation, entry))
        .take(MAX_ACTIVITIES)
        .collect();
    tracing::debug!(candidates = raw.len(), kept = cleaned.len(), "repair.activities.cleaned");

    if cleaned.len() >= MIN_ACTIVITIES {
        return cleaned;
    }

    let fallback = activities_from_search(curation, trip.search_results);
    match curation.activity_shortfall() {
        ActivityShortfall::Replace => {
            tracing::info!(kept = cleaned.len(), "repair.activities.swap");
            fallback
        }
        ActivityShortfall::Retain => {
            tracing::info!(kept = cleaned.len(), "repair.activities.retain");
            let mut titles: HashSet<String> =
                cleaned.iter().map(|a| a.title.to_lowercase()).collect();
            for activity in fallback {
                if cleaned.len() >= MAX_ACTIVITIES {
                    break;
                }
                if titles.insert(activity.title.to_lowercase()) {
                    cleaned.push(activity);
                }
            }
            while cleaned.len() < MIN_ACTIVITIES {
                cleaned.push(park_visit());
            }
            cleaned
        }
    }
}

fn normalize_activity(curation: &Curation, entry: &Value) -> Option<Activity> {
    let empty = Map::new();
    let (raw_title, obj) = match entry {
        Value::Object(obj) => (field(obj, "title").map(stringify).unwrap_or_default(), obj),
        Value::String(title) => (title.clone(), &empty),
        _ => return None,
    };
    let address = field(obj, "address").map(stringify).unwrap_or_default();
    let title = truncate_chars(raw_title.trim(), NAME_MAX_CHARS);
    if curation.is_blocked(&raw_title) || curation.is_blocked(&title) || curation.is_blocked(&address) {
        tracing::trace!(title = %raw_title, "repair.activity.blocked");
        return None;
    }

    Some(Activity {
        title: if title.is_empty() {
            "Activity".to_string()
        } else {
            title
        },
        address,
        price_tier: price_tier(obj).unwrap_or(PriceTier::Budget),
        duration_min: field(obj, "duration_min")
            .and_then(positive_minutes)
            .unwrap_or(DEFAULT_DURATION_MIN),
        tags: field(obj, "tags").map(string_list).unwrap_or_default(),
        wheelchair_friendly: field(obj, "wheelchair_friendly").is_some_and(truthy),
        child_friendly: field(obj, "child_friendly").is_some_and(truthy),
    })
}

fn repair_restaurants<R: Rng + ?Sized>(
    curation: &Curation,
    obj: &Map<String, Value>,
    trip: &TripContext<'_>,
    rng: &mut R,
) -> Vec<Restaurant> {
    let dietary = &trip.preferences.dietary;
    let raw = entries(obj, "restaurants");
    let mut cleaned: Vec<Restaurant> = raw
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|r| normalize_restaurant(curation, r, dietary))
        .collect();
    tracing::debug!(candidates = raw.len(), kept = cleaned.len(), "repair.restaurants.cleaned");

    let before = cleaned.len();
    top_up_restaurants(curation, &mut cleaned, dietary, rng);
    if cleaned.len() > before {
        tracing::info!(kept = before, added = cleaned.len() - before, "repair.restaurants.topped_up");
    }
    cleaned.truncate(MAX_RESTAURANTS);
    cleaned
}

fn normalize_restaurant(
    curation: &Curation,
    obj: &Map<String, Value>,
    dietary: &[String],
) -> Option<Restaurant> {
    let raw_name = field(obj, "name").map(stringify).unwrap_or_default();
    let address = field(obj, "address").map(stringify).unwrap_or_default();
    let name = truncate_chars(raw_name.trim(), NAME_MAX_CHARS);
    let name = if name.is_empty() {
        "Restaurant".to_string()
    } else {
        name
    };
    if curation.is_blocked(&raw_name)
        || curation.is_blocked(&name)
        || curation.is_blocked(&address)
        || curation.is_banned_restaurant(&name)
    {
        tracing::trace!(name = %raw_name, "repair.restaurant.blocked");
        return None;
    }

    let diet_tags = field(obj, "diet_tags").map(string_list).unwrap_or_default();
    Some(Restaurant {
        name,
        address,
        price_tier: price_tier(obj).unwrap_or(PriceTier::Moderate),
        diet_tags: if diet_tags.is_empty() {
            dietary.to_vec()
        } else {
            diet_tags
        },
        notes: field(obj, "notes").map(stringify).unwrap_or_default(),
    })
}

fn price_tier(obj: &Map<String, Value>) -> Option<PriceTier> {
    field(obj, "price_tier").and_then(|v| PriceTier::parse(&stringify(v)))
}

fn repair_packing_list(obj: &Map<String, Value>) -> Vec<String> {
    let mut items = field(obj, "packing_checklist")
        .map(string_list)
        .unwrap_or_default();
    if items.is_empty() {
        return default_packing_list();
    }
    items.truncate(MAX_PACKING_ITEMS);
    items
}

fn repair_plan(
    obj: &Map<String, Value>,
    trip: &TripContext<'_>,
    activities: &[Activity],
    restaurants: &[Restaurant],
) -> Vec<DayPlan> {
    let mut templates: Vec<Blocks> = entries(obj, "plan").iter().map(block_template).collect();
    if templates.is_empty() {
        templates.push(Blocks::default());
    }

    let seeds = RoundRobin::new(activities, restaurants);
    trip_window(&trip.booking.start_date, &trip.booking.end_date, trip.today)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let mut blocks = templates[i % templates.len()].clone();
            if blocks.morning.is_empty() {
                blocks.morning = seeds.morning(i);
            }
            if blocks.afternoon.is_empty() {
                blocks.afternoon = seeds.afternoon(i);
            }
            if blocks.evening.is_empty() {
                blocks.evening = seeds.evening(i);
            }
            DayPlan { date, blocks }
        })
        .collect()
}

fn block_template(entry: &Value) -> Blocks {
    let Some(blocks) = entry
        .as_object()
        .and_then(|day| field(day, "blocks"))
        .and_then(Value::as_object)
    else {
        return Blocks::default();
    };
    let slot = |key: &str| field(blocks, key).map(string_list).unwrap_or_default();
    Blocks {
        morning: slot("morning"),
        afternoon: slot("afternoon"),
        evening: slot("evening"),
    }
}
