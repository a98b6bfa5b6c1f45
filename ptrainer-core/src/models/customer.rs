use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::Resource;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub streetaddress: String,
    pub postcode: String,
    pub city: String,
}

impl Customer {
    pub fn new(firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            ..Self::default()
        }
    }

    pub fn with_contact(mut self, email: impl Into<String>, phone: impl Into<String>) -> Self {
        self.email = email.into();
        self.phone = phone.into();
        self
    }

    pub fn with_address(
        mut self,
        streetaddress: impl Into<String>,
        postcode: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.streetaddress = streetaddress.into();
        self.postcode = postcode.into();
        self.city = city.into();
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Names of the fields that must be non-empty before saving.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("email", &self.email),
            ("phone", &self.phone),
            ("streetaddress", &self.streetaddress),
            ("postcode", &self.postcode),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl Resource for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.full_name();
        writeln!(f, "{}", name)?;
        writeln!(f, "{}", "=".repeat(name.chars().count()))?;
        writeln!(f, "Email: {}", self.email)?;
        writeln!(f, "Phone: {}", self.phone)?;

        let mut address = self.streetaddress.clone();
        for part in [&self.postcode, &self.city] {
            if !part.is_empty() {
                address.push_str(", ");
                address.push_str(part);
            }
        }
        if !address.is_empty() {
            writeln!(f, "Address: {}", address)?;
        }

        Ok(())
    }
}
