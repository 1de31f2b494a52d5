//! Domain types for the family relationship graph.
//!
//! Records follow the persisted wire shape: camelCase field names, the scope
//! serialized as `familyTree`, and partner edges as
//! `{ partner, relationship, startDate, endDate }`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a person's name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a biography, in characters.
pub const MAX_BIO_LENGTH: usize = 10_000;

/// Unique identifier for a person
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub String);

impl PersonId {
    /// Create a new person ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a family tree, the boundary within which edges are valid
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub String);

impl ScopeId {
    /// Create a new scope ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Gender of a person
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other or unspecified
    #[default]
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Kind of partner relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Married couple
    Married,
    /// Formerly married
    Divorced,
    /// Engaged to be married
    Engaged,
    /// Unmarried partners
    Partners,
    /// Anything else
    Other,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationshipKind::Married => "married",
            RelationshipKind::Divorced => "divorced",
            RelationshipKind::Engaged => "engaged",
            RelationshipKind::Partners => "partners",
            RelationshipKind::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Start and end dates of a partner relationship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartnerDates {
    /// When the relationship began
    pub start: Option<NaiveDate>,
    /// When the relationship ended
    pub end: Option<NaiveDate>,
}

impl PartnerDates {
    /// Check that the relationship does not end before it starts.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && end < start
        {
            return Err(format!(
                "Relationship end date {end} precedes start date {start}"
            ));
        }
        Ok(())
    }
}

/// One side of a partner relationship, stored on each endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerEdge {
    /// The other person
    pub partner: PersonId,

    /// Kind of relationship
    pub relationship: RelationshipKind,

    /// Start date (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// End date (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl PartnerEdge {
    /// Build the edge pointing at `partner`.
    pub fn new(partner: PersonId, relationship: RelationshipKind, dates: PartnerDates) -> Self {
        Self {
            partner,
            relationship,
            start_date: dates.start,
            end_date: dates.end,
        }
    }

    /// Whether `other` describes the same relationship (kind and dates),
    /// ignoring which endpoint it points at.
    pub fn same_terms(&self, other: &PartnerEdge) -> bool {
        self.relationship == other.relationship
            && self.start_date == other.start_date
            && self.end_date == other.end_date
    }
}

/// A member of a family tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique identifier
    #[serde(alias = "_id")]
    pub id: PersonId,

    /// Display name
    pub name: String,

    /// Gender
    #[serde(default)]
    pub gender: Gender,

    /// Date of birth (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,

    /// Date of death (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,

    /// Biography (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Photo reference (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Parents, without duplicates, in the order they were linked
    #[serde(default)]
    pub parents: Vec<PersonId>,

    /// Children, without duplicates, in the order they were linked
    #[serde(default)]
    pub children: Vec<PersonId>,

    /// Partner edges in the order they were linked
    #[serde(default)]
    pub partners: Vec<PartnerEdge>,

    /// Family tree this person belongs to
    #[serde(rename = "familyTree")]
    pub scope: ScopeId,
}

impl Person {
    /// Create a record with no edges and default attributes.
    pub fn new(id: PersonId, scope: ScopeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gender: Gender::default(),
            date_of_birth: None,
            date_of_death: None,
            bio: None,
            photo: None,
            parents: Vec::new(),
            children: Vec::new(),
            partners: Vec::new(),
            scope,
        }
    }

    /// Whether `id` is listed as a parent
    pub fn has_parent(&self, id: &PersonId) -> bool {
        self.parents.contains(id)
    }

    /// Whether `id` is listed as a child
    pub fn has_child(&self, id: &PersonId) -> bool {
        self.children.contains(id)
    }

    /// The partner edge pointing at `id`, if any
    pub fn partner_edge(&self, id: &PersonId) -> Option<&PartnerEdge> {
        self.partners.iter().find(|edge| edge.partner == *id)
    }

    /// Every id this record references through any edge kind, deduplicated,
    /// in parents, children, partners order.
    pub fn neighbors(&self) -> Vec<PersonId> {
        let mut out: Vec<PersonId> = Vec::new();
        let edges = self
            .parents
            .iter()
            .chain(self.children.iter())
            .chain(self.partners.iter().map(|edge| &edge.partner));
        for id in edges {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }

    /// Validate scalar fields.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_lifespan(self.date_of_birth, self.date_of_death)?;
        validate_bio(self.bio.as_deref())
    }
}

/// Data for creating a new person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    /// Display name (required)
    pub name: String,

    /// Gender
    pub gender: Gender,

    /// Family tree to create the person in
    pub scope: ScopeId,

    /// Date of birth (optional)
    pub date_of_birth: Option<NaiveDate>,

    /// Date of death (optional)
    pub date_of_death: Option<NaiveDate>,

    /// Biography (optional)
    pub bio: Option<String>,

    /// Photo reference (optional)
    pub photo: Option<String>,
}

impl NewPerson {
    /// Minimal new person with only a name and scope.
    pub fn new(name: impl Into<String>, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            gender: Gender::default(),
            scope,
            date_of_birth: None,
            date_of_death: None,
            bio: None,
            photo: None,
        }
    }

    /// Set the gender.
    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Validate the new person data.
    ///
    /// The name is checked after trimming; the stored name is trimmed too.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_lifespan(self.date_of_birth, self.date_of_death)?;
        validate_bio(self.bio.as_deref())
    }
}

/// Scalar updates for an existing person. Edges are never touched.
#[derive(Debug, Clone, Default)]
pub struct PersonUpdate {
    /// New name (if updating)
    pub name: Option<String>,

    /// New gender (if updating)
    pub gender: Option<Gender>,

    /// New date of birth (if updating, None to clear)
    pub date_of_birth: Option<Option<NaiveDate>>,

    /// New date of death (if updating, None to clear)
    pub date_of_death: Option<Option<NaiveDate>>,

    /// New biography (if updating, None to clear)
    pub bio: Option<Option<String>>,

    /// New photo reference (if updating, None to clear)
    pub photo: Option<Option<String>>,
}

impl PersonUpdate {
    /// Apply the updates to `person` in place.
    pub fn apply_to(self, person: &mut Person) {
        if let Some(name) = self.name {
            person.name = name.trim().to_string();
        }
        if let Some(gender) = self.gender {
            person.gender = gender;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            person.date_of_birth = date_of_birth;
        }
        if let Some(date_of_death) = self.date_of_death {
            person.date_of_death = date_of_death;
        }
        if let Some(bio) = self.bio {
            person.bio = bio;
        }
        if let Some(photo) = self.photo {
            person.photo = photo;
        }
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_lifespan(born: Option<NaiveDate>, died: Option<NaiveDate>) -> Result<(), String> {
    if let (Some(born), Some(died)) = (born, died)
        && died < born
    {
        return Err(format!("Date of death {died} precedes date of birth {born}"));
    }
    Ok(())
}

fn validate_bio(bio: Option<&str>) -> Result<(), String> {
    if let Some(bio) = bio
        && bio.chars().count() > MAX_BIO_LENGTH
    {
        return Err(format!("Bio cannot exceed {MAX_BIO_LENGTH} characters"));
    }
    Ok(())
}
