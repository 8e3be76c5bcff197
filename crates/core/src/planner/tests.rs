use std::time::Duration;

use gonepal_model::{ErrorKind, Role};
use gonepal_test_model::TestModelProvider;
use tokio::task::yield_now;

use super::*;

fn adventure_in_five_days(planner: &Planner) {
    planner.update_preferences(|prefs| {
        prefs.toggle_interest(Interest::Adventure);
        prefs.toggle_duration(TripDuration::FiveDays);
    });
}

#[tokio::test]
async fn test_plan_from_selections() {
    let provider = TestModelProvider::default();
    provider.push_reply("# Day 1...");
    let planner = Planner::with_model_provider(provider.clone());
    adventure_in_five_days(&planner);

    let itinerary = planner.plan().await.unwrap();
    assert_eq!(itinerary, "# Day 1...");
    assert_eq!(planner.itinerary().as_deref(), Some("# Day 1..."));
    assert_eq!(planner.stage(), Stage::Done);

    let sent = provider.last_request().unwrap().messages;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], Message::system(PLANNER_SYSTEM_PROMPT));
    let user_turn = &sent[1];
    assert_eq!(user_turn.role, Role::User);
    assert!(user_turn.content.contains("Adventure"));
    assert!(user_turn.content.contains("5 days"));
    assert!(user_turn.content.contains("Difficulty: Any"));
    assert!(user_turn.content.contains("Budget: Any"));
}

#[tokio::test]
async fn test_plan_requires_interest_and_duration() {
    let provider = TestModelProvider::default();
    let planner = Planner::with_model_provider(provider.clone());

    assert!(matches!(
        planner.plan().await,
        Err(PlanError::MissingInterest)
    ));
    planner.update_preferences(|prefs| {
        prefs.toggle_interest(Interest::Nature);
        prefs.toggle_budget(Budget::Luxury);
    });
    assert!(matches!(
        planner.plan().await,
        Err(PlanError::MissingDuration)
    ));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(planner.stage(), Stage::Idle);
}

#[tokio::test]
async fn test_refinement_quotes_only_latest_itinerary() {
    let provider = TestModelProvider::default();
    provider.push_reply("# Day 1: Everest base camp flight");
    provider.push_reply("# Day 1: Bus to Jiri");
    provider.push_reply("# Day 1: Bungee at Bhote Koshi");
    let planner = Planner::with_model_provider(provider.clone());
    adventure_in_five_days(&planner);

    planner.plan().await.unwrap();
    planner.refine(Refinement::Cheaper).await.unwrap();
    let latest = planner.refine(Refinement::MoreAdventurous).await.unwrap();
    assert_eq!(latest, "# Day 1: Bungee at Bhote Koshi");

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    for req in &requests {
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
    }

    let last_prompt = &requests[2].messages[1].content;
    assert!(last_prompt.contains("# Day 1: Bus to Jiri"));
    assert!(last_prompt.contains("more adventurous and thrilling"));
    assert!(!last_prompt.contains("Everest base camp flight"));
    assert!(!last_prompt.contains("more cheaper and budget-friendly"));
    assert!(!last_prompt.contains("following preferences"));
}

#[tokio::test]
async fn test_refine_without_itinerary() {
    let provider = TestModelProvider::default();
    let planner = Planner::with_model_provider(provider.clone());
    assert!(matches!(
        planner.refine(Refinement::MoreRelaxed).await,
        Err(PlanError::NoItinerary)
    ));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_failure_keeps_previous_itinerary() {
    let provider = TestModelProvider::default();
    provider.push_reply("# Day 1: Patan");
    provider.push_failure(ErrorKind::Remote, "rate limited");
    let planner = Planner::with_model_provider(provider.clone());
    adventure_in_five_days(&planner);

    planner.plan().await.unwrap();
    let err = planner.refine(Refinement::MoreRelaxed).await.unwrap_err();
    let err = match err {
        PlanError::Request(err) => err,
        other => panic!("unexpected error: {other:?}"),
    };
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.to_string(), "rate limited");
    assert_eq!(planner.itinerary().as_deref(), Some("# Day 1: Patan"));
    assert_eq!(planner.stage(), Stage::Error);
    assert_eq!(planner.pending_refinement(), None);
}

#[tokio::test]
async fn test_panicking_provider_does_not_wedge_planner() {
    let provider = TestModelProvider::default();
    provider.push_reply("# Day 1: Lumbini");
    provider.push_response(gonepal_test_model::PresetResponse::Panic);
    provider.push_reply("# Day 1: Lumbini, cheaper");
    let planner = Planner::with_model_provider(provider.clone());
    adventure_in_five_days(&planner);

    planner.plan().await.unwrap();
    let err = planner.refine(Refinement::Cheaper).await.unwrap_err();
    let PlanError::Request(err) = err else {
        panic!("expected a request error");
    };
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert_eq!(planner.stage(), Stage::Error);
    assert_eq!(planner.itinerary().as_deref(), Some("# Day 1: Lumbini"));

    let refined = planner.refine(Refinement::Cheaper).await.unwrap();
    assert_eq!(refined, "# Day 1: Lumbini, cheaper");
}

#[tokio::test(start_paused = true)]
async fn test_busy_planner_rejects_request() {
    let mut provider = TestModelProvider::default();
    provider.set_delay(Duration::from_secs(10));
    provider.push_reply("# Day 1: Chitwan");
    provider.push_reply("# Day 1: Chitwan, slowly");
    let planner = Planner::with_model_provider(provider.clone());
    adventure_in_five_days(&planner);

    planner.plan().await.unwrap();
    let refining = tokio::spawn({
        let planner = planner.clone();
        async move { planner.refine(Refinement::MoreRelaxed).await }
    });
    while planner.stage() != Stage::Sending {
        yield_now().await;
    }
    assert_eq!(planner.pending_refinement(), Some(Refinement::MoreRelaxed));
    assert!(matches!(planner.plan().await, Err(PlanError::Busy)));
    assert!(matches!(
        planner.refine(Refinement::Cheaper).await,
        Err(PlanError::Busy)
    ));

    let refined = refining.await.unwrap().unwrap();
    assert_eq!(refined, "# Day 1: Chitwan, slowly");
    assert_eq!(provider.request_count(), 2);
    assert_eq!(planner.pending_refinement(), None);
}
