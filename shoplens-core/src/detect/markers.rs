//! Shopify marker checks, separated from transport so they stay pure.
//!
//! Matching is case-sensitive substring search, the same discipline the
//! rest of the ecosystem applies to these markers: storefront pages embed
//! `myshopify`/`cdn.shopify.com` verbatim, and the checkout edge answers
//! with an `x-shopid` header or `Server: Shopify`.

use reqwest::header::HeaderMap;

const SHOP_ID_HEADER: &str = "x-shopid";
const SERVER_HEADER_MARKER: &str = "Shopify";

/// Marker found in a landing-page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    MyshopifyReference,
    CdnReference,
}

impl PageMarker {
    pub fn reason(&self) -> &'static str {
        match self {
            PageMarker::MyshopifyReference => {
                "Found 'myshopify' in page content"
            }
            PageMarker::CdnReference => {
                "Found 'cdn.shopify.com' in page content"
            }
        }
    }
}

/// Marker found in the checkout-host response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutMarker {
    ShopId(String),
    ServerHeader,
}

impl CheckoutMarker {
    pub fn reason(&self) -> &'static str {
        match self {
            CheckoutMarker::ShopId(_) => {
                "Found 'x-shopid' header in checkout page response"
            }
            CheckoutMarker::ServerHeader => {
                "Found 'Shopify' in Server header of checkout page"
            }
        }
    }
}

pub fn scan_page(body: &str) -> Option<PageMarker> {
    if body.contains("myshopify") {
        Some(PageMarker::MyshopifyReference)
    } else if body.contains("cdn.shopify.com") {
        Some(PageMarker::CdnReference)
    } else {
        None
    }
}

pub fn scan_checkout(headers: &HeaderMap) -> Option<CheckoutMarker> {
    if let Some(shop_id) = headers
        .get(SHOP_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        return Some(CheckoutMarker::ShopId(shop_id.to_owned()));
    }

    let server_says_shopify = headers
        .get(reqwest::header::SERVER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains(SERVER_HEADER_MARKER));
    if server_says_shopify {
        return Some(CheckoutMarker::ServerHeader);
    }

    None
}
