use super::choices::{Refinement, TripPreferences};

/// Placeholder for an optional selection that was left open.
const ANY: &str = "Any";

/// Builds the first request of a plan from the selections, or `None` if
/// interest or duration is missing.
pub fn initial_prompt(prefs: &TripPreferences) -> Option<String> {
    let interest = prefs.interest?;
    let duration = prefs.duration?;
    let difficulty = prefs.difficulty.map_or(ANY, |d| d.as_str());
    let budget = prefs.budget.map_or(ANY, |b| b.as_str());
    Some(format!(
        "I want to plan a trip to Nepal with the following preferences:\n\
         - Interest: {interest}\n\
         - Duration: {duration}\n\
         - Difficulty: {difficulty}\n\
         - Budget: {budget}\n\
         \n\
         Please provide a detailed itinerary with day-by-day activities, \
         estimated costs, and travel tips."
    ))
}

/// Builds a revision request that quotes the latest itinerary and nothing
/// else.
pub fn refinement_prompt(refinement: &Refinement, itinerary: &str) -> String {
    format!(
        "I liked the plan, but can you make it {}? Here is the previous \
         plan: {itinerary}",
        refinement.descriptor()
    )
}
