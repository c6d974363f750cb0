//! Profile Models
//! Mission: Define the profile document, its sub-records and request bodies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Social links; rebuilt wholesale on every profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Stored profile document (owner lives in its own column)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub experience: Vec<Experience>, // newest first
    #[serde(default)]
    pub education: Vec<Education>, // newest first
    #[serde(default)]
    pub social: Social,
    pub date: String,
}

impl Profile {
    /// Fresh profile from a create request
    pub fn create(req: &ProfileRequest, date: String) -> Self {
        let mut profile = Self {
            id: Uuid::new_v4().to_string(),
            company: None,
            website: None,
            location: None,
            status: String::new(),
            skills: Vec::new(),
            bio: None,
            githubusername: None,
            experience: Vec::new(),
            education: Vec::new(),
            social: Social::default(),
            date,
        };
        profile.apply(req);
        profile
    }

    /// Overwrite the fields present in `req`. Absent optional fields keep
    /// their stored value; social links are replaced as a whole.
    pub fn apply(&mut self, req: &ProfileRequest) {
        set_if_present(&mut self.company, &req.company);
        set_if_present(&mut self.website, &req.website);
        set_if_present(&mut self.location, &req.location);
        set_if_present(&mut self.bio, &req.bio);
        set_if_present(&mut self.githubusername, &req.githubusername);

        if !req.status.trim().is_empty() {
            self.status = req.status.trim().to_string();
        }

        let skills = req.skills.to_list();
        if !skills.is_empty() {
            self.skills = skills;
        }

        self.social = Social {
            youtube: non_empty(&req.youtube),
            twitter: non_empty(&req.twitter),
            facebook: non_empty(&req.facebook),
            linkedin: non_empty(&req.linkedin),
            instagram: non_empty(&req.instagram),
        };
    }

    /// Remove an experience entry; false if the id is unknown
    pub fn remove_experience(&mut self, exp_id: &str) -> bool {
        match self.experience.iter().position(|e| e.id == exp_id) {
            Some(idx) => {
                self.experience.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove an education entry; false if the id is unknown
    pub fn remove_education(&mut self, edu_id: &str) -> bool {
        match self.education.iter().position(|e| e.id == edu_id) {
            Some(idx) => {
                self.education.remove(idx);
                true
            }
            None => false,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn set_if_present(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = non_empty(value) {
        *field = Some(v);
    }
}

/// Public owner info joined onto every profile read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileOwner {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

/// Profile as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileView {
    pub user: ProfileOwner,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Skills arrive as `"rust, go"` from forms or as a JSON array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for SkillsInput {
    fn default() -> Self {
        SkillsInput::Csv(String::new())
    }
}

impl SkillsInput {
    pub fn to_list(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            SkillsInput::List(items) => items.iter().map(String::as_str).collect(),
            SkillsInput::Csv(s) => s.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Create/update profile body
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub skills: SkillsInput,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// Add-experience body
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub location: Option<String>,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl ExperienceRequest {
    pub fn into_entry(self) -> Experience {
        Experience {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            company: self.company,
            location: non_empty(&self.location),
            from: self.from,
            to: non_empty(&self.to),
            current: self.current,
            description: non_empty(&self.description),
        }
    }
}

/// Add-education body
#[derive(Debug, Default, Deserialize)]
pub struct EducationRequest {
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub fieldofstudy: String,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl EducationRequest {
    pub fn into_entry(self) -> Education {
        Education {
            id: Uuid::new_v4().to_string(),
            school: self.school,
            degree: self.degree,
            fieldofstudy: self.fieldofstudy,
            from: self.from,
            to: non_empty(&self.to),
            current: self.current,
            description: non_empty(&self.description),
        }
    }
}
