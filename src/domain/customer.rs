use serde::{Deserialize, Serialize};

use super::common::{check_length, Displayable, DomainError};

/// Customer identifiers are short integers.
pub type CustomerId = i16;

pub const MAX_CUSTOMER_NAME_LENGTH: usize = 20;
pub const MAX_CUSTOMER_CITY_LENGTH: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub city: String,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
        }
    }
}

impl Displayable for Customer {
    fn display_label(&self) -> String {
        format!("{} ({}, {})", self.id, self.name, self.city)
    }
}

pub fn validate_name(name: &str) -> Result<(), DomainError> {
    check_length("Customer's new name", name, MAX_CUSTOMER_NAME_LENGTH)
}

pub fn validate_city(city: &str) -> Result<(), DomainError> {
    check_length("Customer's new city", city, MAX_CUSTOMER_CITY_LENGTH)
}
