//! Episode titles out of page markup.

use anyhow::Result;
use scraper::{Html, Selector};

pub struct TitleExtractor {
    selector: Selector,
}

impl TitleExtractor {
    /// Match `<a>` elements carrying `marker_class`.
    pub fn new(marker_class: &str) -> Result<Self> {
        let css = format!("a.{}", marker_class.trim());
        let selector = Selector::parse(&css)
            .map_err(|e| anyhow::anyhow!("invalid marker class {:?}: {}", marker_class, e))?;
        Ok(Self { selector })
    }

    /// Trimmed text of every matching anchor, in document order. Markup the
    /// parser cannot make sense of simply yields nothing.
    pub fn extract(&self, markup: &str) -> Vec<String> {
        let document = Html::parse_document(markup);
        document
            .select(&self.selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    }
}
