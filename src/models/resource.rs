//! Resource model
//!
//! A resource is a learning material (book, video or course) the user is
//! working through. Progress is tracked as completed units out of an
//! optional known total (chapters, videos, modules).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of learning material. Closed enumeration; stored as its
/// uppercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceType {
    Book,
    Video,
    Course,
}

impl ResourceType {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Book => "BOOK",
            ResourceType::Video => "VIDEO",
            ResourceType::Course => "COURSE",
        }
    }

    /// Parse the stored representation. Returns None for anything
    /// outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOOK" => Some(ResourceType::Book),
            "VIDEO" => Some(ResourceType::Video),
            "COURSE" => Some(ResourceType::Course),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource entity representing a tracked learning material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Unique identifier
    pub id: i64,
    /// Resource title
    pub title: String,
    /// Kind of material (book/video/course)
    pub kind: ResourceType,
    /// Optional external link
    pub url: Option<String>,
    /// Total number of units (chapters/videos/modules); None means unknown
    pub total_units: Option<i64>,
    /// Units completed so far
    pub completed_units: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Create a new Resource with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(
        title: String,
        kind: ResourceType,
        url: Option<String>,
        total_units: Option<i64>,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            title,
            kind,
            url,
            total_units,
            completed_units: 0,
            created_at: Utc::now(),
        }
    }

    /// Completion percentage, when the total is known.
    pub fn progress_percent(&self) -> Option<u8> {
        match self.total_units {
            Some(total) if total > 0 => {
                let pct = (self.completed_units as f64 / total as f64 * 100.0).round();
                Some(pct.clamp(0.0, 100.0) as u8)
            }
            _ => None,
        }
    }
}

/// Resource annotated with the number of study sessions linked to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceWithSessionCount {
    /// The resource itself
    #[serde(flatten)]
    pub resource: Resource,
    /// Number of study sessions referencing this resource
    pub session_count: i64,
}

/// Input for creating a new resource
#[derive(Debug, Clone)]
pub struct CreateResourceInput {
    /// Resource title
    pub title: String,
    /// Kind of material
    pub kind: ResourceType,
    /// Optional external link
    pub url: Option<String>,
    /// Total number of units, if known
    pub total_units: Option<i64>,
}
