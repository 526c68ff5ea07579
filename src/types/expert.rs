use serde::{Deserialize, Serialize};

/// Image shown when an expert has no photo of their own.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// Maximum number of keywords rendered for an expert card.
pub const MAX_KEYWORDS: usize = 5;

/// One expert record, the unit every directory operation works on.
///
/// Field names follow the JSON the dashboard is fed with (camelCase). Only
/// `id`, the full name and the institution name are required; everything
/// else is optional and simply not shown when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    pub id: String,
    pub personal_info: PersonalInfo,
    pub institution: Institution,
    #[serde(default)]
    pub current_role: CurrentRole,
    #[serde(default)]
    pub expertise: Expertise,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_metrics: Option<AcademicMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Profiles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expertise {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcademicMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publications: Option<Publications>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Publications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl Expert {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            personal_info: PersonalInfo {
                full_name: full_name.into(),
                ..Default::default()
            },
            institution: Institution {
                name: institution.into(),
                ..Default::default()
            },
            current_role: CurrentRole::default(),
            expertise: Expertise::default(),
            academic_metrics: None,
            tags: None,
            profiles: None,
            source: None,
        }
    }

    pub fn with_primary_expertise(mut self, primary: Vec<String>) -> Self {
        self.expertise.primary = primary;
        self
    }

    pub fn with_role_title(mut self, title: impl Into<String>) -> Self {
        self.current_role.title = Some(title.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_publications(mut self, total: u64) -> Self {
        self.academic_metrics = Some(AcademicMetrics {
            publications: Some(Publications { total: Some(total) }),
        });
        self
    }

    pub fn with_linkedin(mut self, url: impl Into<String>) -> Self {
        self.profiles = Some(Profiles {
            linkedin: Some(url.into()),
        });
        self
    }

    pub fn full_name(&self) -> &str {
        &self.personal_info.full_name
    }

    pub fn institution_name(&self) -> &str {
        &self.institution.name
    }

    /// Current role title, or an empty string when the record has none.
    pub fn role_title(&self) -> &str {
        self.current_role.title.as_deref().unwrap_or_default()
    }

    pub fn primary_expertise(&self) -> &[String] {
        &self.expertise.primary
    }

    pub fn image_or_default(&self) -> &str {
        self.personal_info.image.as_deref().unwrap_or(DEFAULT_AVATAR)
    }

    pub fn publication_count(&self) -> Option<u64> {
        self.academic_metrics
            .as_ref()
            .and_then(|metrics| metrics.publications.as_ref())
            .and_then(|publications| publications.total)
    }

    pub fn linkedin_url(&self) -> Option<&str> {
        self.profiles.as_ref().and_then(|p| p.linkedin.as_deref())
    }

    /// Keywords for card display: the first word of each of the first five
    /// tags. Blank tags still count toward the five.
    pub fn keywords(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .iter()
            .take(MAX_KEYWORDS)
            .filter_map(|tag| tag.split_whitespace().next())
            .collect()
    }
}
