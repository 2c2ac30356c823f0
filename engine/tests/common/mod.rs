#![allow(dead_code)]

use async_trait::async_trait;
use permit_finder_engine::Condition;
use permit_finder_engine::Permit;
use permit_finder_engine::PermitQuery;
use permit_finder_engine::PermitSource;
use permit_finder_engine::TransportError;
use permit_finder_engine::ViewModel;
use permit_finder_engine::ViewSink;
use permit_finder_engine::fields;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Rows(Vec<Permit>),
    Fail(TransportError),
    Panic,
}

/// In-memory source keyed by the house number of address queries, or by the
/// first equality value of any other query. Unscripted keys return no rows.
#[derive(Default)]
pub struct ScriptedSource {
    replies: HashMap<String, (Duration, Reply)>,
    queries: Mutex<Vec<PermitQuery>>,
    offline: bool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, key: &str, rows: Vec<Permit>) -> Self {
        self.script(key, Duration::ZERO, Reply::Rows(rows))
    }

    pub fn delayed(self, key: &str, delay: Duration, rows: Vec<Permit>) -> Self {
        self.script(key, delay, Reply::Rows(rows))
    }

    pub fn fail(self, key: &str, err: TransportError) -> Self {
        self.script(key, Duration::ZERO, Reply::Fail(err))
    }

    pub fn panic_on(self, key: &str) -> Self {
        self.script(key, Duration::ZERO, Reply::Panic)
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn script(mut self, key: &str, delay: Duration, reply: Reply) -> Self {
        self.replies.insert(key.to_string(), (delay, reply));
        self
    }

    pub fn queries(&self) -> Vec<PermitQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Keys of every query received, sorted.
    pub fn queried_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.queries().iter().map(key_of).collect();
        keys.sort();
        keys
    }
}

fn key_of(query: &PermitQuery) -> String {
    query
        .equals_value(fields::HOUSE_NO)
        .or_else(|| {
            query.conditions.iter().find_map(|condition| match condition {
                Condition::Equals { value, .. } => Some(value.as_str()),
                _ => None,
            })
        })
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl PermitSource for ScriptedSource {
    async fn query(&self, query: &PermitQuery) -> Result<Vec<Permit>, TransportError> {
        self.queries.lock().unwrap().push(query.clone());
        let key = key_of(query);
        let Some((delay, reply)) = self.replies.get(&key).cloned() else {
            return Ok(Vec::new());
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Rows(rows) => Ok(rows),
            Reply::Fail(err) => Err(err),
            Reply::Panic => panic!("scripted panic for {key}"),
        }
    }

    fn is_offline(&self) -> bool {
        self.offline
    }
}

#[derive(Default)]
pub struct RecordingSink {
    views: Mutex<Vec<ViewModel>>,
}

impl RecordingSink {
    pub fn views(&self) -> Vec<ViewModel> {
        self.views.lock().unwrap().clone()
    }
}

impl ViewSink for RecordingSink {
    fn publish(&self, view: &ViewModel) {
        self.views.lock().unwrap().push(view.clone());
    }
}

pub fn permit(filing: &str, issued: &str, status: &str) -> Permit {
    [
        ("job_filing_number", filing),
        ("issued_date", issued),
        ("permit_status", status),
        ("borough", "BROOKLYN"),
        ("house_no", "100"),
        ("street_name", "MAIN ST"),
    ]
    .into_iter()
    .collect()
}

pub fn filings(records: &[Permit]) -> Vec<String> {
    records.iter().filter_map(Permit::filing_number).collect()
}
