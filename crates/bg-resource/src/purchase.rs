//! Where and for how much a part can be bought.

use bg_core::Usd;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub price: Usd,
    pub url: String,
}

/// Purchase options for a component or connector, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseData {
    items: Vec<PurchaseItem>,
}

impl PurchaseData {
    pub fn new(items: Vec<PurchaseItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[PurchaseItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cheapest and most expensive offer, or `None` with no offers.
    pub fn price_range(&self) -> Option<(Usd, Usd)> {
        let min = self.items.iter().map(|i| i.price).min()?;
        let max = self.items.iter().map(|i| i.price).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_price_text_and_reports_range() {
        let data: PurchaseData = serde_json::from_str(
            r#"[
                {"price": "$0.12", "url": "https://example.com/a"},
                {"price": "9c", "url": "https://example.com/b"},
                {"price": 1.5, "url": "https://example.com/c"}
            ]"#,
        )
        .unwrap();
        assert_eq!(data.items().len(), 3);
        assert_eq!(data.price_range(), Usd::new(0, 9).zip(Usd::new(1, 50)));
    }

    #[test]
    fn empty_data_has_no_range() {
        assert_eq!(PurchaseData::default().price_range(), None);
        assert!(serde_json::from_str::<PurchaseData>(r#"[{"url": "x"}]"#).is_err());
    }
}
