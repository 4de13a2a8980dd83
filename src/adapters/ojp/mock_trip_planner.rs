//! Mock trip planner for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::transit::Itinerary;
use crate::ports::{TripPlan, TripPlanner, TripRequest, TripServiceError};

#[derive(Debug, Clone)]
enum Scripted {
    Plan(Vec<Itinerary>),
    Rejected { status: u16, body: String },
    Unavailable,
}

/// Returns scripted results in order, then empty plans.
#[derive(Debug, Clone, Default)]
pub struct MockTripPlanner {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<TripRequest>>>,
}

impl MockTripPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_itineraries(self, itineraries: Vec<Itinerary>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Plan(itineraries));
        self
    }

    pub fn with_rejection(self, status: u16, body: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Rejected {
            status,
            body: body.into(),
        });
        self
    }

    pub fn with_outage(self) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Unavailable);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<TripRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TripPlanner for MockTripPlanner {
    async fn plan(&self, request: &TripRequest) -> Result<TripPlan, TripServiceError> {
        self.calls.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Plan(itineraries)) => Ok(TripPlan { itineraries }),
            Some(Scripted::Rejected { status, body }) => {
                Err(TripServiceError::Rejected { status, body })
            }
            Some(Scripted::Unavailable) => {
                Err(TripServiceError::Unavailable("mock outage".to_string()))
            }
            None => Ok(TripPlan {
                itineraries: Vec::new(),
            }),
        }
    }
}
