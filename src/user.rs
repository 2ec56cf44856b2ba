//! The user record as consumed by scope resolution

use serde::{Deserialize, Serialize};

/// A study reference on a user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// The subset of a user profile that scope resolution reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub studies: Vec<StudyRef>,
    #[serde(default)]
    pub data_commons: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        User { id: id.into(), role: role.into(), ..Default::default() }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_studies<I, S>(mut self, studies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.studies = studies.into_iter().map(|id| StudyRef { id: id.into() }).collect();
        self
    }

    pub fn with_data_commons<I, S>(mut self, data_commons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_commons = data_commons.into_iter().map(Into::into).collect();
        self
    }

    /// Study ids from the profile, in profile order
    pub fn study_ids(&self) -> Vec<String> {
        self.studies.iter().map(|s| s.id.clone()).collect()
    }
}
