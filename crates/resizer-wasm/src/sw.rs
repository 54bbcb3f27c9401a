//! Service-worker bindings for the offline asset cache.
//!
//! # Example
//!
//! ```typescript
//! // sw.js
//! import init, { AssetWorker } from './resizer_wasm.js';
//!
//! let worker;
//! const ready = init().then(() => (worker = new AssetWorker({ version: 3 })));
//! self.addEventListener('install', (e) => e.waitUntil(ready.then((w) => w.install())));
//! self.addEventListener('activate', (e) => e.waitUntil(ready.then((w) => w.activate())));
//! self.addEventListener('message', (e) => ready.then((w) => w.handle_message(e.data)));
//! self.addEventListener('fetch', (e) => {
//!   const answer = worker && worker.route(e.request);
//!   if (answer) e.respondWith(answer);
//! });
//! ```

use std::rc::Rc;

use js_sys::{Array, Promise, Reflect, Uint8Array};
use resizer_core::cache::{
    AssetCacheManager, AssetRequest, AssetResponse, CacheConfig, CacheError, CacheHandle,
    CacheStorage, Destination, LifecycleState, Network, Routed,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};
use web_sys::{Headers, Request, Response, ResponseInit, ServiceWorkerGlobalScope};

use crate::console;
use crate::types::{js_error_message, to_js_error};

fn storage_error(e: JsValue) -> CacheError {
    CacheError::Storage(js_error_message(&e))
}

/// The browser's `caches` registry.
pub struct WebCacheStorage {
    inner: web_sys::CacheStorage,
}

impl CacheStorage for WebCacheStorage {
    type Handle = WebCache;

    async fn open(&self, name: &str) -> Result<WebCache, CacheError> {
        let cache = JsFuture::from(self.inner.open(name))
            .await
            .map_err(storage_error)?;
        let inner = cache.dyn_into().map_err(storage_error)?;
        Ok(WebCache { inner })
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let keys = JsFuture::from(self.inner.keys())
            .await
            .map_err(storage_error)?;
        Ok(Array::from(&keys)
            .iter()
            .filter_map(|key| key.as_string())
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let existed = JsFuture::from(self.inner.delete(name))
            .await
            .map_err(storage_error)?;
        Ok(existed.as_bool().unwrap_or(false))
    }
}

pub struct WebCache {
    inner: web_sys::Cache,
}

impl CacheHandle for WebCache {
    async fn lookup(&self, key: &str) -> Result<Option<AssetResponse>, CacheError> {
        let found = JsFuture::from(self.inner.match_with_str(key))
            .await
            .map_err(storage_error)?;
        if found.is_undefined() {
            return Ok(None);
        }
        let response: Response = found.dyn_into().map_err(storage_error)?;
        read_response(&response).await.map(Some).map_err(storage_error)
    }

    async fn put(&self, key: &str, response: &AssetResponse) -> Result<(), CacheError> {
        let response = to_web_response(response).map_err(storage_error)?;
        JsFuture::from(self.inner.put_with_str(key, &response))
            .await
            .map(|_| ())
            .map_err(storage_error)
    }
}

/// `fetch()` from the worker scope.
pub struct WebNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl Network for WebNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, CacheError> {
        let network_error = |e: JsValue| CacheError::Network(js_error_message(&e));
        let response = JsFuture::from(self.scope.fetch_with_str(request.url.as_str()))
            .await
            .map_err(network_error)?;
        let response: Response = response.dyn_into().map_err(network_error)?;
        read_response(&response).await.map_err(network_error)
    }
}

fn read_headers(headers: &Headers) -> Result<Vec<(String, String)>, JsValue> {
    let Some(entries) = js_sys::try_iter(headers)? else {
        return Ok(Vec::new());
    };
    let mut pairs = Vec::new();
    for entry in entries {
        let entry = Array::from(&entry?);
        if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
            pairs.push((name, value));
        }
    }
    Ok(pairs)
}

async fn read_response(response: &Response) -> Result<AssetResponse, JsValue> {
    let headers = read_headers(&response.headers())?;
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(AssetResponse {
        status: response.status(),
        headers,
        body: Uint8Array::new(&buffer).to_vec(),
    })
}

/// Rebuild a browser `Response`. Null-body statuses get no body at all, as
/// the constructor throws when given one.
fn to_web_response(response: &AssetResponse) -> Result<Response, JsValue> {
    let headers = Headers::new()?;
    for (name, value) in &response.headers {
        headers.append(name, value)?;
    }
    let init = ResponseInit::new();
    init.set_status(response.status);
    init.set_headers(&headers);
    if response.has_null_body_status() {
        return Response::new_with_opt_buffer_source_and_init(None, &init);
    }
    let body = Uint8Array::from(response.body.as_slice());
    Response::new_with_opt_buffer_source_and_init(Some(&body), &init)
}

fn to_asset_request(request: &Request) -> Result<AssetRequest, CacheError> {
    let destination = Reflect::get(request, &JsValue::from_str("destination"))
        .ok()
        .and_then(|d| d.as_string())
        .unwrap_or_default();
    AssetRequest::new(
        &request.url(),
        &request.method(),
        Destination::from_fetch(&destination),
    )
}

/// Whether the browser restarted this worker after it had been promoted.
/// Uses `self.serviceWorker.state` where available, otherwise infers it from
/// the registration having an active worker and nothing pending.
fn already_activated(scope: &ServiceWorkerGlobalScope) -> bool {
    let prop = |target: &JsValue, name: &str| {
        Reflect::get(target, &JsValue::from_str(name))
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    };
    let scope: &JsValue = scope;
    if let Some(own) = prop(scope, "serviceWorker") {
        return prop(&own, "state").and_then(|s| s.as_string()).as_deref() == Some("activated");
    }
    let Some(registration) = prop(scope, "registration") else {
        return false;
    };
    prop(&registration, "active").is_some()
        && prop(&registration, "installing").is_none()
        && prop(&registration, "waiting").is_none()
}

type WebManager = AssetCacheManager<WebCacheStorage, WebNetwork>;

/// One cache generation, driven by the service worker's events.
#[wasm_bindgen]
pub struct AssetWorker {
    manager: Rc<WebManager>,
    scope: ServiceWorkerGlobalScope,
}

#[wasm_bindgen]
impl AssetWorker {
    /// `config` is a partial `CacheConfig`; `undefined` takes every default.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AssetWorker, JsValue> {
        let config: CacheConfig = if config.is_undefined() || config.is_null() {
            CacheConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
        let storage = WebCacheStorage {
            inner: scope.caches()?,
        };
        let network = WebNetwork {
            scope: scope.clone(),
        };
        let origin = scope.location().origin();
        let manager =
            AssetCacheManager::new(&config, &origin, storage, network).map_err(to_js_error)?;
        if already_activated(&scope) {
            manager.resume().map_err(to_js_error)?;
        }
        Ok(AssetWorker {
            manager: Rc::new(manager),
            scope,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn cache_name(&self) -> String {
        self.manager.generation().name.clone()
    }

    /// For the `install` event's `waitUntil`. Rejecting makes the browser
    /// discard this worker and keep the current generation.
    pub fn install(&self) -> Promise {
        let manager = Rc::clone(&self.manager);
        let scope = self.scope.clone();
        future_to_promise(async move {
            if let Err(e) = manager.install().await {
                console::error(&e.to_string());
                return Err(to_js_error(e));
            }
            if manager.ready_to_activate(true) {
                JsFuture::from(scope.skip_waiting()?).await?;
            }
            Ok(JsValue::UNDEFINED)
        })
    }

    /// For the `activate` event's `waitUntil`. Resolves to the names of the
    /// deleted caches.
    ///
    /// A worker the browser restarted while it was waiting never saw its
    /// `install` event in this run; its cache is checked and adopted first.
    pub fn activate(&self) -> Promise {
        let manager = Rc::clone(&self.manager);
        let scope = self.scope.clone();
        future_to_promise(async move {
            if manager.state() == LifecycleState::Parsed {
                manager.resume_installed().await.map_err(to_js_error)?;
            }
            let deleted = manager.activate().await.map_err(to_js_error)?;
            JsFuture::from(scope.clients().claim()).await?;
            console::info(&format!(
                "{} active, removed {} old cache(s)",
                manager.generation().name,
                deleted.len()
            ));
            Ok(deleted
                .into_iter()
                .map(JsValue::from)
                .collect::<Array>()
                .into())
        })
    }

    /// Handle a posted message; `"SKIP_WAITING"` promotes a waiting worker.
    pub fn handle_message(&self, data: JsValue) -> Promise {
        let understood = data
            .as_string()
            .is_some_and(|message| self.manager.handle_message(&message));
        let scope = self.scope.clone();
        future_to_promise(async move {
            if understood {
                JsFuture::from(scope.skip_waiting()?).await?;
            }
            Ok(JsValue::from_bool(understood))
        })
    }

    /// For the `fetch` event. Returns `undefined` for requests this worker
    /// does not answer, otherwise a promise for the `Response`.
    pub fn route(&self, request: &Request) -> Option<Promise> {
        let request = match to_asset_request(request) {
            Ok(request) => request,
            Err(e) => {
                console::warn(&e.to_string());
                return None;
            }
        };
        if !self.manager.handles(&request) {
            return None;
        }

        let manager = Rc::clone(&self.manager);
        Some(future_to_promise(async move {
            match manager.route(&request).await.map_err(to_js_error)? {
                Routed::Passthrough => Err(JsValue::from_str("request not handled")),
                Routed::Respond {
                    response,
                    write_back,
                } => {
                    if let Some(pending) = write_back {
                        spawn_local(pending.commit());
                    }
                    Ok(to_web_response(&response)?.into())
                }
            }
        }))
    }
}
