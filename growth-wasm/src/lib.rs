//! Framework-neutral WASM <-> JavaScript bridge for the pivot engine.

use growth_core::{
    DashboardQuery, GrowthError, IdentityPolicy, MeasurementRecord, Month, PivotConfig,
};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsPivotConfig {
    #[serde(default)]
    max_age_years: Option<u32>,
    #[serde(default)]
    identity: Option<IdentityPolicy>,
}

impl From<JsPivotConfig> for PivotConfig {
    fn from(cfg: JsPivotConfig) -> Self {
        let mut base = PivotConfig::default();
        if let Some(years) = cfg.max_age_years {
            base.max_age_years = years;
        }
        if let Some(identity) = cfg.identity {
            base.identity = identity;
        }
        base
    }
}

/// All dashboard views for one filter selection.
#[wasm_bindgen]
pub fn build_dashboard(
    records: JsValue,
    query: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let records = read_records(records)?;
    let query = match query {
        Some(js_query) if !js_query.is_undefined() && !js_query.is_null() => {
            from_value::<DashboardQuery>(js_query)
                .map_err(|err| JsValue::from_str(&format!("Could not read query: {err}")))?
        }
        _ => DashboardQuery::default(),
    };
    let config = read_config(config)?;

    serialize(&growth_pivot::build_dashboard(&records, &query, &config))
}

#[wasm_bindgen]
pub fn count_by_village(records: JsValue) -> Result<JsValue, JsValue> {
    serialize(&growth_pivot::count_by_village(&read_records(records)?))
}

#[wasm_bindgen]
pub fn status_by_month(records: JsValue) -> Result<JsValue, JsValue> {
    serialize(&growth_pivot::status_by_month(&read_records(records)?))
}

#[wasm_bindgen]
pub fn status_by_posyandu(records: JsValue) -> Result<JsValue, JsValue> {
    serialize(&growth_pivot::status_by_posyandu(&read_records(records)?))
}

/// `month` must be a register month name such as `"April"`.
#[wasm_bindgen]
pub fn weight_stagnation(records: JsValue, village: &str, month: &str) -> Result<JsValue, JsValue> {
    let month: Month = month
        .parse()
        .map_err(|err: GrowthError| JsValue::from_str(&format_growth_error(err)))?;
    let records = read_records(records)?;
    serialize(&growth_pivot::detect_weight_stagnation(
        &records,
        village,
        month.name(),
    ))
}

#[wasm_bindgen]
pub fn deduplicate_by_name(records: JsValue) -> Result<JsValue, JsValue> {
    serialize(&growth_pivot::deduplicate_by_name(&read_records(records)?))
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_records(records: JsValue) -> Result<Vec<MeasurementRecord>, JsValue> {
    init_panic_hook();
    let value = from_value::<serde_json::Value>(records)
        .map_err(|err| JsValue::from_str(&format!("Could not read records: {err}")))?;
    growth_pivot::records_from_json_value(&value)
        .map_err(|err| JsValue::from_str(&format_growth_error(err)))
}

fn read_config(config: Option<JsValue>) -> Result<PivotConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsPivotConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(PivotConfig::from(cfg))
        }
        _ => Ok(PivotConfig::default()),
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

fn format_growth_error(err: GrowthError) -> String {
    format!("Growth pivot error: {err}")
}
