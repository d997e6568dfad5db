use scraper::{Html, Selector};

use crate::{
    error::{AppError, AppResult},
    models::Plant,
};

/// Value recorded when a field is absent from the source page.
const MISSING: &str = "None";

/// Everything extracted from one plant-detail page on the botanical
/// reference site.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPlant {
    pub common_names: Vec<String>,
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

impl ScrapedPlant {
    /// Converts into a storable row; common names are comma-joined the way
    /// the details view expects them.
    pub fn into_plant(self, plant_name: String) -> Plant {
        Plant {
            plant_name,
            common_names: self.common_names.join(","),
            plant_type: self.plant_type,
            family: self.family,
            zones: self.zones,
            native_range: self.native_range,
            heights: self.heights,
            spreads: self.spreads,
            bloom_times: self.bloom_times,
            bloom_description: self.bloom_description,
            sunlight: self.sunlight,
            watering: self.watering,
            maintenance: self.maintenance,
            flowers: self.flowers,
            leafs: self.leafs,
            fruits: self.fruits,
        }
    }
}

/// Parses one plant-detail page.
///
/// Most features live in rows with stable element ids; three (flower, leaf,
/// fruit) have no usable id and are found by matching their label text.
/// Anything the page does not carry comes back as `"None"` so one sparse
/// page never sinks a whole scrape run.
pub fn parse_plant_page(html: &str) -> ScrapedPlant {
    let document = Html::parse_document(html);

    ScrapedPlant {
        common_names: extract_common_names(&document),
        plant_type: field_by_id(&document, "MainContentPlaceHolder_TypeRow"),
        family: field_by_id(&document, "MainContentPlaceHolder_FamilyRow"),
        zones: field_by_id(&document, "MainContentPlaceHolder_ZoneRow"),
        native_range: field_by_id(&document, "MainContentPlaceHolder_NativeRangeRow"),
        heights: field_by_id(&document, "MainContentPlaceHolder_HeightRow"),
        spreads: field_by_id(&document, "MainContentPlaceHolder_SpreadRow"),
        bloom_times: field_by_id(&document, "MainContentPlaceHolder_BloomTimeRow"),
        bloom_description: field_by_id(&document, "MainContentPlaceHolder_ColorTextRow"),
        sunlight: field_by_id(&document, "MainContentPlaceHolder_SunRow"),
        watering: field_by_id(&document, "MainContentPlaceHolder_WaterRow"),
        maintenance: field_by_id(&document, "MainContentPlaceHolder_MaintenanceRow"),
        flowers: field_by_label(&document, "Flower: "),
        leafs: field_by_label(&document, "Leaf: "),
        fruits: field_by_label(&document, "Fruit: "),
    }
}

/// Fetches a plant-detail page and parses it.
pub async fn fetch_plant_page(client: &reqwest::Client, url: &str) -> AppResult<ScrapedPlant> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(AppError::ExternalApi(format!(
            "reference site returned status {} for {}",
            response.status(),
            url
        )));
    }

    let html = response.text().await?;
    Ok(parse_plant_page(&html))
}

/// Reads a labelled row by its element id: the first text node looks like
/// `"Type: Vine"` and the part after the label is the value.
fn field_by_id(document: &Html, id: &str) -> String {
    let selector = Selector::parse(&format!("div#{}", id)).unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|element| element.text().next())
        .and_then(|text| {
            text.trim()
                .split_once(": ")
                .map(|(_, value)| value.trim().to_string())
        })
        .unwrap_or_else(|| MISSING.to_string())
}

/// Fallback for rows without a specific id: scan row text for the label.
fn field_by_label(document: &Html, label: &str) -> String {
    let selector = Selector::parse("div.row").unwrap();

    for row in document.select(&selector) {
        for text in row.text() {
            if let Some(value) = text.trim().strip_prefix(label) {
                return value.trim().to_string();
            }
        }
    }

    MISSING.to_string()
}

/// Extracts the common names.
///
/// Plants with several common names list them inside a disclaimer widget,
/// separated by line breaks or bullets, with the disclaimer text (which
/// contains a quote) trailing the list. Plants with a single common name
/// carry it in a plain labelled row instead.
fn extract_common_names(document: &Html) -> Vec<String> {
    let selector =
        Selector::parse("a#MainContentPlaceHolder_CommonNamesInfo_DisclaimerLink").unwrap();

    let mut names = Vec::new();

    if let Some(widget) = document.select(&selector).next() {
        let normalized = widget
            .inner_html()
            .replace("<br/>", "<br>")
            .replace("<br />", "<br>")
            .replace("&bull;", "<br>")
            .replace('\u{2022}', "<br>");

        for piece in normalized.split("<br>") {
            let text = fragment_text(piece);
            if text.contains('"') {
                // disclaimer text follows the name list
                break;
            }
            if !text.is_empty() {
                names.push(text);
            }
        }
    }

    if names.is_empty() {
        names.push(field_by_id(document, "MainContentPlaceHolder_CommonNameRow"));
    }

    names
}

/// Text content of an HTML snippet, tags stripped.
fn fragment_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
