//! GetItems response schema and the item normalizer.
//!
//! Every upstream field below is optional. The response is decoded once at the
//! boundary ([`decode_get_items`]); [`normalize_item`] is then a pure mapping
//! from a decoded item to a [`NormalizedItem`].
//!
//! Extraction policy:
//!
//! | Field | Source |
//! |-------|--------|
//! | `imageUrl` | first of primary Large, Medium, Small URL, else `""` |
//! | `price` / `currency` | first listing's display amount and its currency |
//! | `brand` | Brand, else first Author contributor, else Manufacturer |
//! | `inStock` | at least one listing exists |
//! | `showPrice` | price and currency both present |
//! | `showRating` | always false |
//!
//! `brand` extends the author-or-manufacturer rule: the byline's own `Brand`
//! display value, when present, wins over both.

use serde::{Deserialize, Serialize};

use crate::{Asin, NormalizedItem, UpstreamError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemsResponse {
    #[serde(default)]
    pub items_result: Option<ItemsResult>,
    #[serde(default)]
    pub errors: Vec<UpstreamErrorEntry>,
}

impl GetItemsResponse {
    pub fn items(&self) -> &[UpstreamItem] {
        self.items_result
            .as_ref()
            .map(|result| result.items.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResult {
    #[serde(default)]
    pub items: Vec<UpstreamItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpstreamErrorEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpstreamItem {
    #[serde(rename = "ASIN")]
    pub asin: Asin,
    #[serde(rename = "DetailPageURL", default)]
    pub detail_page_url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub item_info: Option<ItemInfo>,
    #[serde(default)]
    pub offers: Option<Offers>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Images {
    #[serde(default)]
    pub primary: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageSet {
    #[serde(default)]
    pub large: Option<ImageRef>,
    #[serde(default)]
    pub medium: Option<ImageRef>,
    #[serde(default)]
    pub small: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemInfo {
    #[serde(default)]
    pub title: Option<DisplayValue>,
    #[serde(default)]
    pub by_line_info: Option<ByLineInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValue {
    #[serde(default)]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ByLineInfo {
    #[serde(default)]
    pub brand: Option<DisplayValue>,
    #[serde(default)]
    pub manufacturer: Option<DisplayValue>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contributor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offers {
    #[serde(default)]
    pub listings: Vec<Listing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
    #[serde(default)]
    pub price: Option<ListingPrice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingPrice {
    #[serde(default)]
    pub display_amount: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Decode a GetItems response body.
pub fn decode_get_items(body: &str) -> Result<GetItemsResponse, UpstreamError> {
    serde_json::from_str(body).map_err(|error| UpstreamError::Malformed(error.to_string()))
}

/// Map one decoded upstream item onto the display record.
pub fn normalize_item(item: &UpstreamItem) -> NormalizedItem {
    let info = item.item_info.as_ref();
    let listings = item
        .offers
        .as_ref()
        .map(|offers| offers.listings.as_slice())
        .unwrap_or(&[]);
    let first_price = listings.first().and_then(|listing| listing.price.as_ref());

    let price = first_price.and_then(|price| present(price.display_amount.as_deref()));
    let currency = first_price.and_then(|price| present(price.currency.as_deref()));
    let show_price = price.is_some() && currency.is_some();

    NormalizedItem {
        asin: item.asin.clone(),
        title: info
            .and_then(|info| info.title.as_ref())
            .and_then(|title| title.display_value.clone())
            .unwrap_or_default(),
        image_url: image_url(item).unwrap_or_default(),
        affiliate_url: item.detail_page_url.clone().unwrap_or_default(),
        brand: info
            .and_then(|info| info.by_line_info.as_ref())
            .and_then(brand),
        price,
        currency,
        in_stock: !listings.is_empty(),
        rating_value: None,
        review_count: None,
        show_price,
        show_rating: false,
    }
}

fn image_url(item: &UpstreamItem) -> Option<String> {
    let primary = item.images.as_ref()?.primary.as_ref()?;
    [&primary.large, &primary.medium, &primary.small]
        .into_iter()
        .filter_map(|image| image.as_ref())
        .find_map(|image| present(image.url.as_deref()))
}

fn brand(by_line: &ByLineInfo) -> Option<String> {
    let display = |value: &Option<DisplayValue>| {
        value
            .as_ref()
            .and_then(|value| present(value.display_value.as_deref()))
    };

    display(&by_line.brand)
        .or_else(|| {
            by_line
                .contributors
                .iter()
                .filter(|contributor| {
                    contributor
                        .role
                        .as_deref()
                        .is_some_and(|role| role.eq_ignore_ascii_case("author"))
                })
                .find_map(|contributor| present(contributor.name.as_deref()))
        })
        .or_else(|| display(&by_line.manufacturer))
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
