use serde::{Deserialize, Serialize};

use crate::countries::dto::GetCountryDto;
use crate::hotels::repo::Hotel;
use crate::repository::{FromEntity, IntoEntity, MergeInto};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHotelDto {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub rating: Option<f64>,
    pub country_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHotelDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub country_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHotelDetailsDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub country: GetCountryDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHotelDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub rating: Option<f64>,
    pub country_id: i32,
}

impl IntoEntity<Hotel> for CreateHotelDto {
    fn into_entity(self) -> Hotel {
        Hotel {
            id: 0,
            name: self.name,
            address: self.address,
            rating: self.rating,
            country_id: self.country_id,
        }
    }
}

impl FromEntity<Hotel> for GetHotelDto {
    fn from_entity(entity: &Hotel) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            address: entity.address.clone(),
            rating: entity.rating,
            country_id: entity.country_id,
        }
    }
}

impl MergeInto<Hotel> for UpdateHotelDto {
    fn merge_into(self, entity: &mut Hotel) {
        entity.name = self.name;
        entity.address = self.address;
        entity.rating = self.rating;
        entity.country_id = self.country_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dto_round_trips_non_key_fields() {
        let dto = CreateHotelDto {
            name: "Sandals Resort and Spa".into(),
            address: "Negril".into(),
            rating: Some(4.5),
            country_id: 1,
        };
        let hotel = dto.into_entity();
        assert_eq!(hotel.id, 0);

        let projected = GetHotelDto::from_entity(&hotel);
        assert_eq!(projected.name, "Sandals Resort and Spa");
        assert_eq!(projected.address, "Negril");
        assert_eq!(projected.rating, Some(4.5));
        assert_eq!(projected.country_id, 1);
    }

    #[test]
    fn merge_keeps_the_key() {
        let mut hotel = Hotel {
            id: 3,
            name: "Old".into(),
            address: "Somewhere".into(),
            rating: None,
            country_id: 1,
        };
        let dto = UpdateHotelDto {
            id: 12,
            name: "Comfort Suites".into(),
            address: "George Town".into(),
            rating: Some(4.3),
            country_id: 2,
        };
        dto.merge_into(&mut hotel);
        assert_eq!(hotel.id, 3);
        assert_eq!(hotel.name, "Comfort Suites");
        assert_eq!(hotel.country_id, 2);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let dto: CreateHotelDto = serde_json::from_str(
            r#"{"name": "Grand Palladium", "address": "Buenavista", "countryId": 2}"#,
        )
        .unwrap();
        assert_eq!(dto.country_id, 2);
        assert_eq!(dto.rating, None);
    }
}
