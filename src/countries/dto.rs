use serde::{Deserialize, Serialize};

use crate::countries::repo::Country;
use crate::hotels::dto::GetHotelDto;
use crate::repository::{FromEntity, IntoEntity, MergeInto};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCountryDto {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCountryDto {
    pub id: i32,
    pub name: String,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCountryDetailsDto {
    pub id: i32,
    pub name: String,
    pub short_name: Option<String>,
    pub hotels: Vec<GetHotelDto>,
}

/// Carries its own id so the handler can reject a path/body mismatch before
/// touching the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCountryDto {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

impl IntoEntity<Country> for CreateCountryDto {
    fn into_entity(self) -> Country {
        Country {
            id: 0,
            name: self.name,
            short_name: self.short_name,
        }
    }
}

impl FromEntity<Country> for GetCountryDto {
    fn from_entity(entity: &Country) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            short_name: entity.short_name.clone(),
        }
    }
}

impl MergeInto<Country> for UpdateCountryDto {
    fn merge_into(self, entity: &mut Country) {
        entity.name = self.name;
        entity.short_name = self.short_name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dto_maps_to_entity_without_key() {
        let dto = CreateCountryDto {
            name: "Jamaica".into(),
            short_name: Some("JM".into()),
        };
        let country = dto.into_entity();
        assert_eq!(country.id, 0);
        assert_eq!(country.name, "Jamaica");
        assert_eq!(country.short_name.as_deref(), Some("JM"));
    }

    #[test]
    fn get_dto_projects_all_fields() {
        let country = Country {
            id: 7,
            name: "Cuba".into(),
            short_name: Some("CU".into()),
        };
        let dto = GetCountryDto::from_entity(&country);
        assert_eq!(dto.id, 7);
        assert_eq!(dto.name, "Cuba");
        assert_eq!(dto.short_name.as_deref(), Some("CU"));
    }

    #[test]
    fn merge_keeps_the_key() {
        let mut country = Country {
            id: 5,
            name: "Old".into(),
            short_name: Some("OL".into()),
        };
        let dto = UpdateCountryDto {
            id: 99,
            name: "New".into(),
            short_name: None,
        };
        dto.merge_into(&mut country);
        assert_eq!(country.id, 5);
        assert_eq!(country.name, "New");
        assert_eq!(country.short_name, None);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let dto: UpdateCountryDto =
            serde_json::from_str(r#"{"id": 1, "name": "Jamaica", "shortName": "JM"}"#).unwrap();
        assert_eq!(dto.short_name.as_deref(), Some("JM"));

        let json = serde_json::to_string(&GetCountryDto {
            id: 1,
            name: "Jamaica".into(),
            short_name: Some("JM".into()),
        })
        .unwrap();
        assert!(json.contains("shortName"));
    }
}
