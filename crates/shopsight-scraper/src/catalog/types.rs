//! Wire shapes of the public catalog feed.
//!
//! The feed is loosely typed in the wild: identifiers arrive as numbers or
//! strings, tags as an array or a comma-separated string. Custom
//! deserializers absorb both forms.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub products: Vec<FeedProduct>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedProduct {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "tags_as_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<FeedVariant>,
    #[serde(default)]
    pub images: Vec<FeedImage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedVariant {
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedImage {
    #[serde(default)]
    pub src: Option<String>,
}

/// Numeric feed identifiers become strings so precision never degrades.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Tags arrive as `["a", "b"]` or `"a, b"`.
fn tags_as_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => {
                    let s = s.trim().to_owned();
                    (!s.is_empty()).then_some(s)
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_is_carried_as_string() {
        let page: CatalogPage =
            serde_json::from_str(r#"{"products": [{"id": 7890123456789, "title": "Soap"}]}"#)
                .unwrap();
        assert_eq!(page.products[0].id.as_deref(), Some("7890123456789"));
    }

    #[test]
    fn string_id_passes_through() {
        let page: CatalogPage =
            serde_json::from_str(r#"{"products": [{"id": "abc-1", "title": "Soap"}]}"#).unwrap();
        assert_eq!(page.products[0].id.as_deref(), Some("abc-1"));
    }

    #[test]
    fn tags_accept_string_and_array_forms() {
        let page: CatalogPage = serde_json::from_str(
            r#"{"products": [
                {"title": "A", "tags": "vegan, unscented , "},
                {"title": "B", "tags": ["gift", "  ", "new"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.products[0].tags, vec!["vegan", "unscented"]);
        assert_eq!(page.products[1].tags, vec!["gift", "new"]);
    }

    #[test]
    fn missing_fields_default() {
        let page: CatalogPage =
            serde_json::from_str(r#"{"products": [{"title": "Bare"}]}"#).unwrap();
        let p = &page.products[0];
        assert!(p.id.is_none());
        assert!(p.variants.is_empty());
        assert!(p.images.is_empty());
    }
}
