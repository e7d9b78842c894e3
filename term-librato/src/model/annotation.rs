//! Annotation events attached to named streams.

use serde::{Deserialize, Serialize};

use crate::error::LibratoResult;
use crate::model::validation;

/// A timestamped event (a deploy, an outage) shown on metric timelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Short summary, e.g. `v45 Deployment`. Required.
    pub title: String,

    /// Originating member of a population, e.g. a hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// References to related resources (CI builds, changesets).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,

    /// Epoch seconds. The service uses the receive time when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl Annotation {
    /// Creates an annotation with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the originating source, e.g. a hostname.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets a longer free-form description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a link to a related resource.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    /// Sets the start time in epoch seconds.
    pub fn with_start_time(mut self, epoch_secs: i64) -> Self {
        self.start_time = Some(epoch_secs);
        self
    }

    /// Sets the end time in epoch seconds.
    pub fn with_end_time(mut self, epoch_secs: i64) -> Self {
        self.end_time = Some(epoch_secs);
        self
    }

    /// Checks that the title is present.
    pub fn validate(&self) -> LibratoResult<()> {
        validation::validate_annotation(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_wire_format() {
        let annotation = Annotation::new("Deploy v31")
            .with_source("server123")
            .with_description("Revision: abcd1234")
            .with_link("https://build-service.com/build/31")
            .with_link("https://git-repo.com/commit/abcd1234")
            .with_start_time(1_700_000_000);

        let json = serde_json::to_value(&annotation).unwrap();

        assert_eq!(json["title"], "Deploy v31");
        assert_eq!(json["source"], "server123");
        assert_eq!(json["description"], "Revision: abcd1234");
        assert_eq!(json["links"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["links"][0], "https://build-service.com/build/31");
        assert_eq!(json["start_time"], 1_700_000_000);
        assert!(json.get("end_time").is_none());
    }

    #[test]
    fn test_minimal_annotation() {
        let json = serde_json::to_string(&Annotation::new("test")).unwrap();
        assert_eq!(json, r#"{"title":"test"}"#);
    }
}
