use scraper::{Html, Selector};

use crate::error::{AppError, AppResult};

/// Extracts scientific plant names from a retailer product-listing page.
///
/// Product cards carry the name in a paragraph whose generated class name
/// contains `ScientificName`; matching on the substring survives the
/// retailer regenerating its CSS hashes. The same species shows up on
/// several cards, so names are deduplicated, and the sorted order gives
/// every run the same result for the same page.
pub fn parse_scientific_names(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"p[class*="ScientificName"]"#).unwrap();

    let mut names: Vec<String> = document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    names.sort_unstable();
    names.dedup();
    names
}

/// Fetches a product-listing page and extracts its scientific names.
pub async fn fetch_scientific_names(
    client: &reqwest::Client,
    url: &str,
) -> AppResult<Vec<String>> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(AppError::ExternalApi(format!(
            "retailer returned status {} for {}",
            response.status(),
            url
        )));
    }

    let html = response.text().await?;
    let names = parse_scientific_names(&html);

    if names.is_empty() {
        return Err(AppError::Scrape(format!(
            "no scientific names found on {}; page layout may have changed",
            url
        )));
    }

    Ok(names)
}
