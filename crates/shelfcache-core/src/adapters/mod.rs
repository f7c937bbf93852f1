//! Upstream catalog adapters.

mod paapi;

pub use paapi::{
    CatalogSource, GetItemsRequest, PaApiClient, GET_ITEMS_PATH, GET_ITEMS_RESOURCES,
    GET_ITEMS_TARGET, MAX_ITEM_IDS, SERVICE_NAME,
};
