//! User records as served by the remote API, plus the flat edit projection.
//!
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// A single user. `id` is the identity; everything else is display data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub company: Company,
}

impl User {
    /// Minimal constructor used by tests and seeds.
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            username: String::new(),
            email: email.into(),
            address: Address { city: city.into(), ..Address::default() },
            phone: String::new(),
            website: String::new(),
            company: Company::default(),
        }
    }

    pub fn city(&self) -> &str {
        &self.address.city
    }
}

/// Fields exposed by the edit dialog. `city` is flat here but nested on [`User`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFormData {
    pub name: String,
    pub email: String,
    pub city: String,
}

impl UserFormData {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            city: user.address.city.clone(),
        }
    }
}
