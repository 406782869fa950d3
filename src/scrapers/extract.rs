//! Parses the rendered results page into [`ResultRecord`]s.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::models::{ResultRecord, Source};

/// Marker of one bidding announcement in the results page.
pub const CARD_SELECTOR: &str = "div.contratacao-item";

const TITLE_SELECTOR: &str = "p.contratacao-item-titulo";
const ORGAN_SELECTOR: &str = "p.contratacao-item-orgao";
const MODALITY_SELECTOR: &str = "span.contratacao-item-modalidade";
const DATE_SELECTOR: &str = "span.contratacao-item-data";
const REGION_SELECTOR: &str = "span.contratacao-item-local";
const LINK_SELECTOR: &str = "a[href]";

#[derive(Clone)]
struct CardSelectors {
    card: Selector,
    title: Selector,
    organ: Selector,
    modality: Selector,
    date: Selector,
    region: Selector,
    link: Selector,
}

impl CardSelectors {
    fn new() -> Self {
        Self {
            card: parse(CARD_SELECTOR),
            title: parse(TITLE_SELECTOR),
            organ: parse(ORGAN_SELECTOR),
            modality: parse(MODALITY_SELECTOR),
            date: parse(DATE_SELECTOR),
            region: parse(REGION_SELECTOR),
            link: parse(LINK_SELECTOR),
        }
    }
}

/// Selectors are compile-time constants; a parse failure is a programming error.
fn parse(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {}: {:?}", selector, e))
}

#[derive(Clone)]
pub struct ResultExtractor {
    origin: Url,
    selectors: CardSelectors,
}

impl ResultExtractor {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            selectors: CardSelectors::new(),
        }
    }

    /// Extract every complete card in document order. Incomplete cards are
    /// skipped.
    pub fn extract(&self, markup: &str) -> Vec<ResultRecord> {
        let document = Html::parse_document(markup);
        let cards: Vec<_> = document.select(&self.selectors.card).collect();
        info!("Found {} result cards on the page", cards.len());

        let records: Vec<ResultRecord> = cards
            .iter()
            .enumerate()
            .filter_map(|(idx, card)| {
                let record = self.extract_card(card);
                if record.is_none() {
                    debug!("Skipped incomplete card {}", idx);
                }
                record
            })
            .collect();

        info!("Extracted {} complete records", records.len());
        records
    }

    fn extract_card(&self, card: &ElementRef<'_>) -> Option<ResultRecord> {
        let s = &self.selectors;
        let href = card
            .select(&s.link)
            .next()
            .and_then(|a| a.value().attr("href"))?;

        Some(ResultRecord {
            source: Source::Pncp,
            object_description: text_of(card, &s.title)?,
            organ_entity: text_of(card, &s.organ)?,
            modality: text_of(card, &s.modality)?,
            opening_date_text: text_of(card, &s.date)?,
            detail_url: self.resolve(href)?,
            region_label: text_of(card, &s.region)?,
        })
    }

    /// Resolve `href` against the portal origin. Relative links always stay
    /// on the portal host, including scheme-relative ones (`//host/path`).
    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        let is_absolute = Url::parse(href).is_ok();
        let resolved = self.origin.join(href).and_then(|url| {
            if is_absolute || url.origin() == self.origin.origin() {
                Ok(url)
            } else {
                Url::parse(&format!("{}{}", self.origin.as_str().trim_end_matches('/'), href))
            }
        });

        match resolved {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!("Unusable link '{}': {}", href, e);
                None
            }
        }
    }
}

/// Text of the first match with runs of whitespace collapsed, `None` when
/// the element is absent.
fn text_of(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).next().map(|el| {
        let text: String = el.text().collect();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    })
}
