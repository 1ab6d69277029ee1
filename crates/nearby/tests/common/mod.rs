#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use nearby::{
    AddressCandidate, DirectoryClient, DirectoryError, GeocodeError, GeocodeResolver, NearbyQuery,
    NewUser, User,
};
use parking_lot::Mutex;

pub fn setup_test_env() {
    let _ = nearby::init_logging(tracing::Level::WARN);
}

pub fn candidate(name: &str, latitude: f64, longitude: f64) -> AddressCandidate {
    AddressCandidate::new(name, latitude, longitude)
}

/// Geocoder answering from a script. Unknown queries are `NotFound`.
#[derive(Default)]
pub struct FakeGeocoder {
    answers: Mutex<HashMap<String, Result<Vec<AddressCandidate>, GeocodeError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
    answered: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, query: &str, candidates: Vec<AddressCandidate>) {
        self.answers
            .lock()
            .insert(query.to_string(), Ok(candidates));
    }

    pub fn fail(&self, query: &str, error: GeocodeError) {
        self.answers.lock().insert(query.to_string(), Err(error));
    }

    pub fn delay(&self, query: &str, delay: Duration) {
        self.delays.lock().insert(query.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Queries whose lookup ran to completion, i.e. was not dropped mid-flight.
    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().clone()
    }
}

#[async_trait]
impl GeocodeResolver for FakeGeocoder {
    async fn resolve(&self, query: &str) -> Result<Vec<AddressCandidate>, GeocodeError> {
        self.calls.lock().push(query.to_string());
        let delay = self.delays.lock().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.answered.lock().push(query.to_string());
        let answer = self.answers.lock().get(query).cloned();
        match answer {
            Some(Ok(candidates)) if candidates.is_empty() => Err(GeocodeError::not_found(query)),
            Some(answer) => answer,
            None => Err(GeocodeError::not_found(query)),
        }
    }
}

/// How a scripted directory call behaves.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Answer(T),
    Fail(DirectoryError),
    /// Never completes.
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn play(&self) -> Result<T, DirectoryError> {
        match self {
            Reply::Answer(value) => Ok(value.clone()),
            Reply::Fail(error) => Err(error.clone()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub struct FakeDirectory {
    pub list: Mutex<Reply<Vec<User>>>,
    pub signup: Mutex<Option<Reply<User>>>,
    pub nearby: Mutex<Reply<Vec<User>>>,
    pub signups: Mutex<Vec<NewUser>>,
    pub nearby_queries: Mutex<Vec<NearbyQuery>>,
    pub list_calls: Mutex<usize>,
}

impl FakeDirectory {
    /// Answers every call with an empty listing; signups echo back with increasing ids.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            list: Mutex::new(Reply::Answer(Vec::new())),
            signup: Mutex::new(None),
            nearby: Mutex::new(Reply::Answer(Vec::new())),
            signups: Mutex::new(Vec::new()),
            nearby_queries: Mutex::new(Vec::new()),
            list_calls: Mutex::new(0),
        })
    }

    /// A directory where every call fails at the transport level.
    pub fn unreachable() -> Arc<Self> {
        let directory = Self::new();
        let down = DirectoryError::unreachable("connection refused");
        *directory.list.lock() = Reply::Fail(down.clone());
        *directory.signup.lock() = Some(Reply::Fail(down.clone()));
        *directory.nearby.lock() = Reply::Fail(down);
        directory
    }

    pub fn total_calls(&self) -> usize {
        *self.list_calls.lock() + self.signups.lock().len() + self.nearby_queries.lock().len()
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        *self.list_calls.lock() += 1;
        let reply = self.list.lock().clone();
        reply.play().await
    }

    async fn register_user(&self, new_user: &NewUser) -> Result<User, DirectoryError> {
        let id = {
            let mut signups = self.signups.lock();
            signups.push(new_user.clone());
            signups.len() as i64
        };
        let reply = self.signup.lock().clone();
        match reply {
            Some(reply) => reply.play().await,
            None => Ok(User::new(
                id,
                new_user.username.clone(),
                new_user.latitude,
                new_user.longitude,
            )),
        }
    }

    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<User>, DirectoryError> {
        self.nearby_queries.lock().push(*query);
        let reply = self.nearby.lock().clone();
        reply.play().await
    }
}
