//! Wire models shared by the REST client and the state slice

use serde::{Deserialize, Deserializer, Serialize};

/// A user account as exchanged with the admin REST API.
///
/// The default value is the blank form model: empty strings, no
/// authorities, `activated = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default = "activated_default")]
    pub activated: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lang_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authorities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_modified_by: String,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            login: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            activated: true,
            lang_key: String::new(),
            authorities: Vec::new(),
            created_by: String::new(),
            created_date: None,
            last_modified_by: String::new(),
            last_modified_date: None,
            password: None,
        }
    }
}

fn activated_default() -> bool {
    true
}

/// The backend sends `null` for unset strings and lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pagination parameters for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Query parameters for the request.
    ///
    /// Pagination is only sent together with a sort order; an unsorted
    /// request asks for the server's default page.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match &self.sort {
            Some(sort) => vec![
                ("page", self.page.to_string()),
                ("size", self.size.to_string()),
                ("sort", sort.clone()),
            ],
            None => Vec::new(),
        }
    }
}

/// Response headers, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of the header with this name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of the last header whose lowercased name ends with `suffix`.
    ///
    /// Application headers carry a per-app prefix (`x-myapp-alert`), so
    /// they are matched by suffix.
    pub fn find_suffix(&self, suffix: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k.to_ascii_lowercase().ends_with(suffix))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&reqwest::header::HeaderMap> for Headers {
    fn from(map: &reqwest::header::HeaderMap) -> Self {
        Self(
            map.iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
        )
    }
}
