//! In-memory metadata source that records every query

use async_trait::async_trait;
use isbn_bib::MetadataSource;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct FakeSource {
    tag: String,
    responses: HashMap<String, Value>,
    answer_everything: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeSource {
    /// Source with no matches at all
    pub fn empty() -> Self {
        Self {
            tag: "google".to_string(),
            responses: HashMap::new(),
            answer_everything: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Source that returns a Google-style volume for every identifier
    pub fn resolving_all() -> Self {
        Self {
            answer_everything: true,
            ..Self::empty()
        }
    }

    pub fn with_response(mut self, identifier: &str, metadata: Value) -> Self {
        self.responses.insert(identifier.to_string(), metadata);
        self
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

/// Google Books volume carrying both identifiers
pub fn google_volume(title: &str, isbn_10: &str, isbn_13: &str) -> Value {
    json!({
        "volumeInfo": {
            "title": title,
            "authors": ["Test Author"],
            "publishedDate": "2001-05-01",
            "industryIdentifiers": [
                {"type": "ISBN_10", "identifier": isbn_10},
                {"type": "ISBN_13", "identifier": isbn_13}
            ]
        }
    })
}

#[async_trait]
impl MetadataSource for FakeSource {
    fn tag(&self) -> &str {
        &self.tag
    }

    async fn query(&self, identifier: &str) -> Option<Value> {
        self.queries.lock().unwrap().push(identifier.to_string());

        if let Some(metadata) = self.responses.get(identifier) {
            return Some(metadata.clone());
        }
        self.answer_everything
            .then(|| json!({"volumeInfo": {"title": format!("Book {}", identifier)}}))
    }
}
