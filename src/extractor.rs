use scraper::{ElementRef, Html, Selector};

use crate::config::ExtractorConfig;
use crate::models::{Product, MISSING_URL};
use crate::utils::error::{AppError, Result};

/// Turns the rendered product container into an ordered product list.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    card: Selector,
    name: Selector,
    link: Selector,
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::parse(format!("Invalid CSS selector '{}': {:?}", selector, e)))
}

impl ProductExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            card: compile(&config.card_selector)?,
            name: compile(&config.name_selector)?,
            link: compile(&config.link_selector)?,
        })
    }

    /// Products in document order. Cards without a link get `MISSING_URL`.
    pub fn extract(&self, html: &str) -> Result<Vec<Product>> {
        if html.trim().is_empty() {
            return Err(AppError::parse("empty product container"));
        }

        let fragment = Html::parse_fragment(html);
        let products = fragment
            .select(&self.card)
            .map(|card| Product {
                name: self.card_name(card),
                url: self.card_link(card),
            })
            .collect::<Vec<_>>();

        tracing::debug!("Extracted {} products from {} bytes of markup", products.len(), html.len());
        Ok(products)
    }

    fn card_name(&self, card: ElementRef<'_>) -> String {
        let text = card
            .select(&self.name)
            .flat_map(|el| el.text())
            .collect::<String>();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn card_link(&self, card: ElementRef<'_>) -> String {
        card.select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
            .unwrap_or_else(|| MISSING_URL.to_string())
    }
}
