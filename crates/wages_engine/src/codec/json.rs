use serde_json::Value;
use wages_core::{Document, Sector, WageError};

pub fn encode_document(document: &Document) -> Result<String, WageError> {
    serde_json::to_string_pretty(document)
        .map_err(|err| WageError::format(format!("cannot encode document: {err}")))
}

pub fn decode_document(raw: &str) -> Result<Document, WageError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| WageError::format(format!("invalid JSON: {err}")))?;
    decode_value(value)
}

/// Decodes an already parsed payload. `regions` must be an array and every
/// rate must name a known sector.
pub fn decode_value(value: Value) -> Result<Document, WageError> {
    let regions = value
        .get("regions")
        .and_then(Value::as_array)
        .ok_or_else(|| WageError::format("`regions` must be an array"))?;
    check_rate_types(regions)?;

    serde_json::from_value(value).map_err(|err| WageError::format(err.to_string()))
}

fn check_rate_types(regions: &[Value]) -> Result<(), WageError> {
    for (index, region) in regions.iter().enumerate() {
        let label = region
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{index}"));
        let Some(rates) = region.get("rates").and_then(Value::as_array) else {
            continue;
        };
        for rate in rates {
            match rate.get("type").and_then(Value::as_str) {
                Some(kind) if Sector::from_label(kind).is_some() => {}
                Some(kind) => {
                    return Err(WageError::validation(format!(
                        "region `{label}` has a rate of unknown type `{kind}`"
                    )))
                }
                None => {
                    return Err(WageError::validation(format!(
                        "region `{label}` has a rate without `type`"
                    )))
                }
            }
        }
    }
    Ok(())
}
