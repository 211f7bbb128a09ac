use scraper::{Html, Selector};

use crate::domain::value_objects::price::Price;

/// CSS selectors commonly used for price display, in priority order.
///
/// The first selector whose first matching element yields a parseable number
/// wins; the list is a priority order, not an exhaustive search.
const PRICE_SELECTORS: &[&str] = &[
    ".price",
    ".current-price",
    ".sale-price",
    r#"[data-testid="price"]"#,
    ".price-now",
    ".price-current",
];

/// Extracts a best-effort numeric price from unstructured product markup.
///
/// Pure: no network or persistence side effects.
#[derive(Debug, Default)]
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn extract(&self, html: &str) -> Option<Price> {
        let document = Html::parse_document(html);

        for sel_str in PRICE_SELECTORS {
            if let Ok(selector) = Selector::parse(sel_str) {
                if let Some(element) = document.select(&selector).next() {
                    let text: String = element.text().collect::<Vec<_>>().join(" ");
                    if let Some(price) = parse_price(&text) {
                        return Some(price);
                    }
                }
            }
        }

        None
    }
}

/// Parse a price out of display text such as `"$1,299.99"` or `"EUR 45"`.
///
/// Thousands separators are stripped, at most one decimal point is kept, and
/// anything before the first digit (currency symbols, whitespace) is skipped.
/// Returns `None` when no digit sequence parses.
pub fn parse_price(text: &str) -> Option<Price> {
    let cleaned = text.replace(',', "");

    let mut digits = String::new();
    let mut seen_dot = false;
    for c in cleaned.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c == '.' && !digits.is_empty() && !seen_dot {
            digits.push(c);
            seen_dot = true;
        } else if !digits.is_empty() {
            break;
        }
    }

    digits
        .parse::<f64>()
        .ok()
        .and_then(|value| Price::new(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("19.99").unwrap().value(), 19.99);
    }

    #[test]
    fn test_parse_price_ignores_currency_and_whitespace() {
        assert_eq!(parse_price("  $ 19.99 ").unwrap().value(), 19.99);
        assert_eq!(parse_price("EUR 45").unwrap().value(), 45.0);
        assert_eq!(parse_price("£89.50 inc. VAT").unwrap().value(), 89.5);
    }

    #[test]
    fn test_parse_price_strips_thousands_separators() {
        assert_eq!(parse_price("$1,299.99").unwrap().value(), 1299.99);
        assert_eq!(parse_price("2,000").unwrap().value(), 2000.0);
    }

    #[test]
    fn test_parse_price_keeps_one_decimal_point() {
        // Second dot ends the number instead of corrupting it
        assert_eq!(parse_price("1.2.3").unwrap().value(), 1.2);
    }

    #[test]
    fn test_parse_price_no_digits() {
        assert!(parse_price("call for price").is_none());
        assert!(parse_price("").is_none());
    }

    #[test]
    fn test_parse_price_trailing_dot() {
        assert_eq!(parse_price("99.").unwrap().value(), 99.0);
    }

    #[test]
    fn test_extract_first_selector_wins() {
        let extractor = PriceExtractor::default();
        let html = r#"
            <html><body>
                <span class="price">$49.99</span>
                <span class="sale-price">$39.99</span>
            </body></html>
        "#;
        assert_eq!(extractor.extract(html).unwrap().value(), 49.99);
    }

    #[test]
    fn test_extract_falls_through_unparseable_selector() {
        let extractor = PriceExtractor::default();
        let html = r#"
            <html><body>
                <span class="price">See below</span>
                <div class="price-now">$129.00</div>
            </body></html>
        "#;
        assert_eq!(extractor.extract(html).unwrap().value(), 129.0);
    }

    #[test]
    fn test_extract_attribute_selector() {
        let extractor = PriceExtractor::default();
        let html = r#"<div data-testid="price">1,050.75</div>"#;
        assert_eq!(extractor.extract(html).unwrap().value(), 1050.75);
    }

    #[test]
    fn test_extract_no_price_markup() {
        let extractor = PriceExtractor::default();
        let html = "<html><body><h1>Out of stock</h1></body></html>";
        assert!(extractor.extract(html).is_none());
    }

    #[test]
    fn test_extract_nested_text() {
        let extractor = PriceExtractor::default();
        let html = r#"<p class="current-price"><b>Now:</b> <span>$15</span></p>"#;
        assert_eq!(extractor.extract(html).unwrap().value(), 15.0);
    }
}
