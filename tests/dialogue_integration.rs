//! End-to-end dialogue scenarios wired with the in-process adapters.

use std::sync::Arc;
use std::time::Duration;

use transit_guide::adapters::ai::MockAIProvider;
use transit_guide::adapters::geocoding::MockGeocoder;
use transit_guide::adapters::ojp::MockTripPlanner;
use transit_guide::adapters::stops::InMemoryStopDirectory;
use transit_guide::adapters::storage::InMemorySessionStore;
use transit_guide::application::handlers::{
    DialogueSettings, StopResolver, SubmitMessageCommand, SubmitMessageHandler, TripSearch,
};
use transit_guide::domain::dialogue::DialogueState;
use transit_guide::domain::foundation::SessionKey;
use transit_guide::domain::transit::{Coordinates, Itinerary, Leg, Stop, StopId};
use transit_guide::ports::SessionStore;

struct World {
    ai: MockAIProvider,
    planner: MockTripPlanner,
    store: Arc<InMemorySessionStore>,
    handler: Arc<SubmitMessageHandler>,
}

fn stop(id: &str, name: &str, lat: f64, lon: f64) -> Stop {
    Stop::new(StopId::new(id).unwrap(), name, Coordinates::new(lat, lon).unwrap())
}

fn world(planner: MockTripPlanner) -> World {
    world_with(planner, MockAIProvider::new())
}

fn world_with(planner: MockTripPlanner, ai: MockAIProvider) -> World {
    let directory = Arc::new(InMemoryStopDirectory::with_stops([
        stop("8501008", "Genève, Cornavin", 46.2102, 6.1424),
        stop("8587057", "Genève, Plainpalais", 46.1986, 6.1418),
        stop("8501120", "Lausanne", 46.5167, 6.6291),
        stop("8507000", "Bern", 46.9488, 7.4391),
    ]));
    let geocoder = MockGeocoder::new().with_place("Genève", Coordinates::new(46.2080, 6.1430).unwrap());
    let settings = Arc::new(DialogueSettings::default());
    let store = Arc::new(InMemorySessionStore::with_welcome("Bonjour"));

    let handler = Arc::new(SubmitMessageHandler::new(
        store.clone(),
        Arc::new(ai.clone()),
        Arc::new(StopResolver::new(
            directory.clone(),
            Arc::new(geocoder),
            settings.call_timeout,
        )),
        Arc::new(TripSearch::new(
            directory,
            Arc::new(planner.clone()),
            settings.call_timeout,
        )),
        settings,
    ));

    World {
        ai,
        planner,
        store,
        handler,
    }
}

fn key(id: &str) -> SessionKey {
    SessionKey::new(id).unwrap()
}

fn queue(ai: &MockAIProvider, completions: &[&str]) {
    for completion in completions {
        ai.push(transit_guide::adapters::ai::MockResponse::Success {
            content: completion.to_string(),
            usage: transit_guide::ports::TokenUsage::new(1, 1),
            finish_reason: transit_guide::ports::FinishReason::Stop,
        });
    }
}

async fn say(w: &World, session: &str, text: &str) -> transit_guide::application::handlers::SubmitMessageResult {
    w.handler
        .handle(SubmitMessageCommand::new(key(session), text))
        .await
        .unwrap()
}

fn itinerary() -> Itinerary {
    Itinerary::new(vec![Leg {
        boarding_stop: "Lausanne".to_string(),
        alighting_stop: "Genève, Cornavin".to_string(),
        line_name: "IR 15".to_string(),
        ..Leg::default()
    }])
}

#[tokio::test]
async fn place_without_exact_match_resolves_through_geocoding() {
    let w = world(MockTripPlanner::new());
    queue(&w.ai, &["#Genève#", "D'où partez-vous ?"]);

    let result = say(&w, "u1", "Je veux aller à Genève").await;

    assert_eq!(result.outcome, "place_resolved");
    assert_eq!(result.state, DialogueState::AwaitingOrigin);
    let handle = w.store.get_or_create(&key("u1")).await.unwrap();
    let session = handle.lock().await;
    assert_eq!(
        session.slots().destination.as_ref().unwrap().name,
        "Genève, Cornavin"
    );
}

#[tokio::test]
async fn out_of_range_time_is_rejected_while_date_is_kept() {
    let w = world(MockTripPlanner::new());
    queue(&w.ai, &["#Genève#", "ok", "#Lausanne#", "ok"]);
    say(&w, "u1", "à Genève").await;
    say(&w, "u1", "depuis Lausanne").await;

    queue(&w.ai, &["#2025-03-01# $25:00:00$", "Quelle heure ?"]);
    let result = say(&w, "u1", "le 1er mars à 25h").await;

    assert_eq!(result.state, DialogueState::AwaitingDateTime);
    assert_eq!(w.planner.call_count(), 0);
    let handle = w.store.get_or_create(&key("u1")).await.unwrap();
    let session = handle.lock().await;
    assert_eq!(
        session.slots().date.map(|d| d.to_string()).as_deref(),
        Some("2025-03-01")
    );
    assert!(session.slots().time.is_none());
}

#[tokio::test]
async fn complete_conversation_plans_once_and_starts_over() {
    let w = world(MockTripPlanner::new().with_itineraries(vec![itinerary()]));
    queue(
        &w.ai,
        &[
            "#Genève#",
            "D'où partez-vous ?",
            "#Lausanne#",
            "Quand ?",
            "#2025-03-01# $08:15:00$",
            "Voici votre trajet",
        ],
    );

    assert_eq!(say(&w, "u1", "à Genève").await.state, DialogueState::AwaitingOrigin);
    assert_eq!(
        say(&w, "u1", "depuis Lausanne").await.state,
        DialogueState::AwaitingDateTime
    );
    let result = say(&w, "u1", "samedi à 8h15").await;

    assert_eq!(result.outcome, "trip_found");
    assert_eq!(result.reply_text, "Voici votre trajet");
    assert_eq!(result.state, DialogueState::AwaitingDestination);
    assert_eq!(w.planner.call_count(), 1);

    let request = &w.planner.calls()[0];
    assert_eq!(request.origin_id.as_str(), "8501120");
    assert_eq!(request.destination_id.as_str(), "8501008");
    assert_eq!(request.departure, "2025-03-01T08:15:00Z");

    let handle = w.store.get_or_create(&key("u1")).await.unwrap();
    let session = handle.lock().await;
    assert_eq!(session.state(), DialogueState::AwaitingDestination);
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn failed_searches_are_counted_one_call_per_turn() {
    let w = world(MockTripPlanner::new().with_outage().with_outage());
    queue(
        &w.ai,
        &[
            "#Genève#",
            "ok",
            "#Lausanne#",
            "ok",
            "#2025-03-01# $08:15:00$",
            "Réessayer ?",
            "Toujours indisponible",
        ],
    );
    say(&w, "u1", "à Genève").await;
    say(&w, "u1", "depuis Lausanne").await;

    let first = say(&w, "u1", "le 1er mars à 8h15").await;
    assert_eq!(first.outcome, "trip_failed");
    assert_eq!(w.planner.call_count(), 1);

    let second = say(&w, "u1", "réessaie").await;
    assert_eq!(second.outcome, "trip_failed");
    assert_eq!(second.state, DialogueState::Ready);
    assert_eq!(w.planner.call_count(), 2);

    let handle = w.store.get_or_create(&key("u1")).await.unwrap();
    assert_eq!(handle.lock().await.failure_count(), 2);
}

#[tokio::test]
async fn termination_keyword_ends_the_session() {
    let w = world(MockTripPlanner::new());
    queue(&w.ai, &["#Genève#", "ok", "Au revoir"]);
    say(&w, "u1", "à Genève").await;

    let result = say(&w, "u1", "Stop, merci").await;

    assert_eq!(result.outcome, "farewell");
    assert_eq!(result.reply_text, "Au revoir");
    assert!(!w.store.exists(&key("u1")).await.unwrap());
}

#[tokio::test]
async fn concurrent_sessions_do_not_share_slots() {
    let w = world(MockTripPlanner::new());
    // identical completions so interleaving cannot matter
    queue(&w.ai, &["#Lausanne#"; 4]);

    let a = tokio::spawn({
        let handler = w.handler.clone();
        async move {
            handler
                .handle(SubmitMessageCommand::new(key("a"), "à Lausanne"))
                .await
        }
    });
    let b = tokio::spawn({
        let handler = w.handler.clone();
        async move {
            handler
                .handle(SubmitMessageCommand::new(key("b"), "à Lausanne"))
                .await
        }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    queue(&w.ai, &["#Genève#", "ok"]);
    say(&w, "a", "depuis Genève").await;

    let a = w.store.get_or_create(&key("a")).await.unwrap();
    let b = w.store.get_or_create(&key("b")).await.unwrap();
    assert_eq!(a.lock().await.state(), DialogueState::AwaitingDateTime);
    assert_eq!(b.lock().await.state(), DialogueState::AwaitingOrigin);
    assert_eq!(w.store.len().await.unwrap(), 2);
}

#[tokio::test]
async fn overlapping_turns_on_one_session_run_one_after_the_other() {
    let slow = MockAIProvider::new().with_delay(Duration::from_millis(50));
    let w = world_with(MockTripPlanner::new(), slow);
    queue(&w.ai, &["#Lausanne#", "D'où partez-vous ?", "#Bern#", "Quand ?"]);

    let first = tokio::spawn({
        let handler = w.handler.clone();
        async move {
            handler
                .handle(SubmitMessageCommand::new(key("u1"), "à Lausanne"))
                .await
        }
    });
    // let the first turn take the session lock
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = tokio::spawn({
        let handler = w.handler.clone();
        async move {
            handler
                .handle(SubmitMessageCommand::new(key("u1"), "depuis Bern"))
                .await
        }
    });

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.state, DialogueState::AwaitingOrigin);
    assert_eq!(first.reply_text, "D'où partez-vous ?");
    assert_eq!(second.outcome, "place_resolved");
    assert_eq!(second.state, DialogueState::AwaitingDateTime);
    assert_eq!(second.reply_text, "Quand ?");

    let handle = w.store.get_or_create(&key("u1")).await.unwrap();
    let session = handle.lock().await;
    assert_eq!(session.slots().destination.as_ref().unwrap().name, "Lausanne");
    assert_eq!(session.slots().origin.as_ref().unwrap().name, "Bern");
    assert_eq!(session.transcript().len(), 5);
}
