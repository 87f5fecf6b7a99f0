//! Page sources: where a single page of users comes from.

use futures::future::{select, Either, LocalBoxFuture};
use futures::pin_mut;
use gloo_timers::future::TimeoutFuture;
use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use log::debug;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Request, RequestInit, Response};

use crate::error::FetchError;
use crate::model::User;
use crate::utils::page_url;

pub trait PageSource {
    fn fetch_page(&self, page: u32) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>>;
}

impl<T: PageSource + ?Sized> PageSource for Rc<T> {
    fn fetch_page(&self, page: u32) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>> {
        (**self).fetch_page(page)
    }
}

// Bound to the global `fetch`, which exists on both `Window` and
// `WorkerGlobalScope`.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = fetch)]
    fn global_fetch(input: &Request) -> Promise;
}

/// Fetches pages over HTTP with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    base_url: String,
    page_size: u32,
    timeout_ms: u32,
}

impl HttpPageSource {
    pub fn new(base_url: impl Into<String>, page_size: u32, timeout_ms: u32) -> Self {
        Self {
            base_url: base_url.into(),
            page_size,
            timeout_ms,
        }
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, page: u32) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>> {
        let url = page_url(&self.base_url, self.page_size, page);
        let timeout_ms = self.timeout_ms;
        Box::pin(async move {
            let controller = AbortController::new().map_err(network_error)?;
            let request = request_json(&url, controller.signal());
            let timeout = TimeoutFuture::new(timeout_ms);
            pin_mut!(request, timeout);

            match select(request, timeout).await {
                Either::Left((result, _)) => {
                    if let Ok(users) = &result {
                        debug!("Page {} returned {} users", page, users.len());
                    }
                    result
                }
                Either::Right(_) => {
                    controller.abort();
                    Err(FetchError::Timeout { ms: timeout_ms })
                }
            }
        })
    }
}

async fn request_json(url: &str, signal: AbortSignal) -> Result<Vec<User>, FetchError> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_signal(Some(&signal));
    let request = Request::new_with_str_and_init(url, &init).map_err(network_error)?;

    let response: Response = JsFuture::from(global_fetch(&request))
        .await
        .map_err(network_error)?
        .dyn_into()
        .map_err(|_| FetchError::Decode("fetch did not resolve to a Response".to_string()))?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }

    let body = JsFuture::from(response.json().map_err(decode_error)?)
        .await
        .map_err(decode_error)?;
    body.into_serde::<Vec<User>>()
        .map_err(|e| FetchError::Decode(e.to_string()))
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn network_error(value: JsValue) -> FetchError {
    FetchError::Network(describe(&value))
}

fn decode_error(value: JsValue) -> FetchError {
    FetchError::Decode(describe(&value))
}
