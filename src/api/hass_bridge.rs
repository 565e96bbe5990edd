//! [`MediaHost`] on top of the `hass` object Home Assistant hands to cards.
//!
//! The custom element shim forwards every `hass` and config assignment to
//! [`set_hass`] and [`set_config`]; the card polls [`HassBridge::revision`] to
//! notice new state objects.

use futures_util::future::LocalBoxFuture;
use js_sys::{Function, Promise, Reflect, JSON};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::cell::{Cell, RefCell};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::host::{HostError, MediaHost};
use super::models::{decode_host_states, DirectoryListing, HostStates, ResolvedMedia};
use crate::card::CardConfig;

thread_local! {
    static HASS: RefCell<Option<JsValue>> = const { RefCell::new(None) };
    static REVISION: Cell<u64> = const { Cell::new(0) };
    static CONFIG: RefCell<Option<CardConfig>> = const { RefCell::new(None) };
    static CONFIG_REVISION: Cell<u64> = const { Cell::new(0) };
}

#[wasm_bindgen(js_name = setHass)]
pub fn set_hass(hass: JsValue) {
    HASS.with(|slot| *slot.borrow_mut() = Some(hass));
    REVISION.with(|revision| revision.set(revision.get().wrapping_add(1)));
}

#[wasm_bindgen(js_name = setConfig)]
pub fn set_config(config: JsValue) -> Result<(), JsValue> {
    let config: CardConfig = from_js("setConfig", &config)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    CONFIG.with(|slot| *slot.borrow_mut() = Some(config));
    CONFIG_REVISION.with(|revision| revision.set(revision.get().wrapping_add(1)));
    Ok(())
}

#[wasm_bindgen(js_name = getCardSize)]
pub fn card_size() -> u32 {
    current_config().card_size
}

#[wasm_bindgen(js_name = getStubConfig)]
pub fn stub_config() -> Result<JsValue, JsValue> {
    let stub = serde_json::to_value(CardConfig::stub())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    to_js("getStubConfig", &stub).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Config handed over by the shim, or defaults when none arrived yet.
pub fn current_config() -> CardConfig {
    CONFIG.with(|slot| slot.borrow().clone()).unwrap_or_default()
}

pub fn config_revision() -> u64 {
    CONFIG_REVISION.with(Cell::get)
}

fn current_hass() -> Result<JsValue, HostError> {
    HASS.with(|slot| slot.borrow().clone())
        .ok_or(HostError::Unavailable)
}

fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn from_js<T: DeserializeOwned>(method: &str, value: &JsValue) -> Result<T, HostError> {
    let text = JSON::stringify(value)
        .map_err(|err| HostError::rejected(method, js_message(&err)))?
        .as_string()
        .unwrap_or_else(|| "null".to_string());
    serde_json::from_str(&text).map_err(|err| HostError::decode(method, err))
}

fn to_js(method: &str, value: &serde_json::Value) -> Result<JsValue, HostError> {
    JSON::parse(&value.to_string()).map_err(|err| HostError::rejected(method, js_message(&err)))
}

fn hass_function(hass: &JsValue, name: &str) -> Result<Function, HostError> {
    Reflect::get(hass, &name.into())
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or(HostError::Unavailable)
}

async fn await_promise(method: &str, value: JsValue) -> Result<JsValue, HostError> {
    let promise = value
        .dyn_into::<Promise>()
        .map_err(|_| HostError::rejected(method, "host did not return a promise"))?;
    JsFuture::from(promise)
        .await
        .map_err(|err| HostError::rejected(method, js_message(&err)))
}

async fn call_ws<T: DeserializeOwned>(message: serde_json::Value) -> Result<T, HostError> {
    let method = message["type"].as_str().unwrap_or("callWS").to_string();
    let hass = current_hass()?;
    let call = hass_function(&hass, "callWS")?;
    let payload = to_js(&method, &message)?;
    let pending = call
        .call1(&hass, &payload)
        .map_err(|err| HostError::rejected(&method, js_message(&err)))?;
    let response = await_promise(&method, pending).await?;
    from_js(&method, &response)
}

async fn call_service(
    domain: &str,
    service: &str,
    data: serde_json::Value,
) -> Result<(), HostError> {
    let method = format!("{domain}.{service}");
    let hass = current_hass()?;
    let call = hass_function(&hass, "callService")?;
    let payload = to_js(&method, &data)?;
    let pending = call
        .call3(&hass, &domain.into(), &service.into(), &payload)
        .map_err(|err| HostError::rejected(&method, js_message(&err)))?;
    await_promise(&method, pending).await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HassBridge;

impl MediaHost for HassBridge {
    fn browse_media<'a>(
        &'a self,
        content_id: Option<&'a str>,
    ) -> LocalBoxFuture<'a, Result<DirectoryListing, HostError>> {
        Box::pin(async move {
            let mut message = json!({ "type": "media_source/browse_media" });
            if let Some(content_id) = content_id {
                message["media_content_id"] = json!(content_id);
            }
            call_ws(message).await
        })
    }

    fn resolve_media<'a>(
        &'a self,
        content_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<ResolvedMedia, HostError>> {
        Box::pin(async move {
            call_ws(json!({
                "type": "media_source/resolve_media",
                "media_content_id": content_id,
            }))
            .await
        })
    }

    fn play_media<'a>(
        &'a self,
        target_id: &'a str,
        content_id: &'a str,
        content_type: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), HostError>> {
        Box::pin(call_service(
            "media_player",
            "play_media",
            json!({
                "entity_id": target_id,
                "media_content_id": content_id,
                "media_content_type": content_type,
            }),
        ))
    }

    fn seek<'a>(
        &'a self,
        target_id: &'a str,
        position_secs: f64,
    ) -> LocalBoxFuture<'a, Result<(), HostError>> {
        Box::pin(call_service(
            "media_player",
            "media_seek",
            json!({
                "entity_id": target_id,
                "seek_position": position_secs,
            }),
        ))
    }

    fn states(&self) -> Result<HostStates, HostError> {
        let hass = current_hass()?;
        let states = Reflect::get(&hass, &"states".into())
            .map_err(|err| HostError::rejected("states", js_message(&err)))?;
        Ok(decode_host_states(from_js("states", &states)?))
    }

    fn revision(&self) -> u64 {
        REVISION.with(Cell::get)
    }
}

/// Opens a resolved media URL in a new tab.
pub fn open_in_new_tab(url: &str) -> Result<(), HostError> {
    let window = web_sys::window().ok_or(HostError::Unavailable)?;
    window
        .open_with_url_and_target(url, "_blank")
        .map_err(|err| HostError::rejected("window.open", js_message(&err)))?;
    Ok(())
}
