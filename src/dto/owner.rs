use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO for the address of an owner, used in both directions
#[derive(Serialize, Deserialize, Validate, ToSchema, Default)]
#[cfg_attr(test, derive(PartialEq, Eq, Debug, Clone))]
#[serde(default)]
pub struct Address {
    #[validate(length(max = 100))]
    #[schema(example = "Hannoversche Str")]
    pub street: String,
    #[validate(length(max = 100))]
    #[schema(example = "1a")]
    pub number: String,
    #[validate(length(max = 100))]
    #[schema(example = "29221")]
    pub zip: String,
    #[validate(length(max = 100))]
    #[schema(example = "Celle")]
    pub city: String,
}

impl From<domain::owner::Address> for Address {
    fn from(value: domain::owner::Address) -> Self {
        Address {
            street: value.street,
            number: value.number,
            zip: value.zip,
            city: value.city,
        }
    }
}

impl From<Address> for domain::owner::Address {
    fn from(value: Address) -> Self {
        domain::owner::Address {
            street: value.street,
            number: value.number,
            zip: value.zip,
            city: value.city,
        }
    }
}

/// DTO for an owner returned by the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct Owner {
    #[schema(example = "5f2b7c1e-3a4d-4e8f-9b0a-1c2d3e4f5a6b")]
    pub id: Uuid,
    #[schema(example = "Erika")]
    pub first_name: String,
    #[schema(example = "Meier")]
    pub last_name: String,
    #[schema(example = "erika.meier@t-online.de")]
    pub email: String,
    #[schema(example = "05141 12345")]
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl From<domain::owner::Owner> for Owner {
    fn from(value: domain::owner::Owner) -> Self {
        Owner {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            address: value.address.map(Address::from),
        }
    }
}

/// DTO for the content of an owner sent to the API
#[derive(Deserialize, Display, Validate, ToSchema, Default)]
#[display("{} {}", first_name, last_name)]
#[cfg_attr(test, derive(Serialize, Clone))]
#[serde(default)]
pub struct OwnerContent {
    pub id: Option<Uuid>,
    #[validate(length(max = 50))]
    #[schema(example = "Erika")]
    pub first_name: String,
    #[validate(length(max = 50))]
    #[schema(example = "Meier")]
    pub last_name: String,
    #[validate(email)]
    #[schema(example = "erika.meier@t-online.de")]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate]
    pub address: Option<Address>,
}

impl From<OwnerContent> for domain::owner::OwnerData {
    fn from(value: OwnerContent) -> Self {
        domain::owner::OwnerData {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            address: value.address.map(domain::owner::Address::from),
        }
    }
}
