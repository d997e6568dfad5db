use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full metadata row for one plant, as scraped from the botanical reference site.
///
/// Fields that could not be extracted from the source page hold the literal
/// string `"None"` rather than NULL, matching what the scraper writes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Plant {
    pub plant_name: String,
    pub common_names: String,
    pub plant_type: String,
    pub family: String,
    pub zones: String,
    pub native_range: String,
    pub heights: String,
    pub spreads: String,
    pub bloom_times: String,
    pub bloom_description: String,
    pub sunlight: String,
    pub watering: String,
    pub maintenance: String,
    pub flowers: String,
    pub leafs: String,
    pub fruits: String,
}

impl Plant {
    /// Common names are stored comma-joined; render them with a separating
    /// space for display.
    pub fn common_names_display(&self) -> String {
        self.common_names.replace(',', ", ")
    }
}

/// Where a plant's image lives and which site it was taken from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PlantImage {
    pub plant_name: String,
    pub file_path: String,
    pub website: String,
}

/// Everything the presentation layer needs to render one plant card.
#[derive(Debug, Clone, Serialize)]
pub struct PlantDetails {
    #[serde(flatten)]
    pub plant: Plant,
    pub common_names_display: String,
    pub image: Option<PlantImage>,
    pub reference_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plant() -> Plant {
        Plant {
            plant_name: "Monstera deliciosa".to_string(),
            common_names: "Swiss cheese plant,split-leaf philodendron".to_string(),
            plant_type: "Vine".to_string(),
            family: "Araceae".to_string(),
            zones: "10 to 12".to_string(),
            native_range: "Central America".to_string(),
            heights: "10.00 to 15.00 feet".to_string(),
            spreads: "6.00 to 8.00 feet".to_string(),
            bloom_times: "Seasonal bloomer".to_string(),
            bloom_description: "Creamy white".to_string(),
            sunlight: "Part shade".to_string(),
            watering: "Medium".to_string(),
            maintenance: "Low".to_string(),
            flowers: "Showy".to_string(),
            leafs: "Evergreen".to_string(),
            fruits: "Showy".to_string(),
        }
    }

    #[test]
    fn test_common_names_display() {
        let plant = sample_plant();
        assert_eq!(
            plant.common_names_display(),
            "Swiss cheese plant, split-leaf philodendron"
        );
    }

    #[test]
    fn test_plant_serde_round_trip() {
        let plant = sample_plant();
        let json = serde_json::to_string(&plant).unwrap();
        let back: Plant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plant);
    }

    #[test]
    fn test_details_flattens_plant_fields() {
        let plant = sample_plant();
        let details = PlantDetails {
            common_names_display: plant.common_names_display(),
            plant,
            image: None,
            reference_url: Some("https://example.org/monstera".to_string()),
        };

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["plant_name"], "Monstera deliciosa");
        assert_eq!(value["watering"], "Medium");
        assert_eq!(value["reference_url"], "https://example.org/monstera");
        assert!(value["image"].is_null());
    }
}
