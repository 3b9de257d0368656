//! Operation dispatch: turning `(resource, operation, parameter-bag)`
//! tuples into backend calls and folding the answers into an
//! item-indexed output stream.
//!
//! Batch items run strictly one at a time, in input order. Failures
//! either abort the batch or - under continue-on-failure - become
//! item-tagged error records, a policy chosen once per batch.

use serde_json::{Map, Value, json};
use tracing::warn;

use clarity_bridge_core::filter::{self, FilterValue};
use clarity_bridge_core::model::DEFAULT_LIST_LIMIT;
use clarity_bridge_core::plan::{self, OperationPlan, fill_endpoint};
use clarity_bridge_core::response::ApiResponse;
use clarity_bridge_core::validate;
use clarity_bridge_core::{Operation, Params, RequestDescriptor, Resource, TimesheetStatus};

use crate::client::ClarityClient;
use crate::error::BridgeError;
use crate::transport::Transport;

/// One batch of work: a resource/operation pair applied to each item's
/// parameter bag.
#[derive(Debug, Clone)]
pub struct Batch {
    pub resource: Resource,
    pub operation: Operation,
    pub items: Vec<Params>,

    /// When set, a failing item becomes an `{"error": ...}` record and
    /// the batch continues; otherwise the first failure aborts.
    pub continue_on_fail: bool,
}

impl Batch {
    /// Single-item convenience constructor.
    pub fn single(resource: Resource, operation: Operation, params: Params) -> Self {
        Self {
            resource,
            operation,
            items: vec![params],
            continue_on_fail: false,
        }
    }
}

/// One output record, tagged with the batch index of the item that
/// produced it so input/output correlation survives fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    pub item: usize,
    pub json: Value,
}

/// Run a batch against the client.
///
/// Items are processed sequentially in input order. A list response
/// fans out into one [`ItemResult`] per record, all tagged with the
/// originating index.
pub async fn run_batch<T: Transport>(
    client: &ClarityClient<T>,
    batch: &Batch,
) -> Result<Vec<ItemResult>, BridgeError> {
    let mut output = Vec::new();

    for (index, item) in batch.items.iter().enumerate() {
        match execute_item(client, batch.resource, batch.operation, item).await {
            Ok(Some(records)) => {
                output.extend(records.into_iter().map(|json| ItemResult { item: index, json }));
            }
            Ok(None) => {}
            Err(err) if batch.continue_on_fail => {
                output.push(ItemResult {
                    item: index,
                    json: json!({ "error": err.message() }),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(output)
}

/// Resolve and execute one item.
///
/// Returns `Ok(None)` for resource/operation pairs outside the plan
/// table: a caller configuration error that produces no records rather
/// than failing the batch.
async fn execute_item<T: Transport>(
    client: &ClarityClient<T>,
    resource: Resource,
    operation: Operation,
    params: &Params,
) -> Result<Option<Vec<Value>>, BridgeError> {
    let Some(plan) = plan::lookup(resource, operation) else {
        warn!(resource = %resource, operation = %operation, "no plan for resource/operation pair");
        return Ok(None);
    };

    validate::required_fields(params.as_map(), plan.required, operation.as_str())?;
    let path = fill_endpoint(plan.endpoint, params, operation.as_str())?;

    let mut request = RequestDescriptor::new(plan.method, path);

    match operation {
        Operation::Create => request.body = create_body(resource, plan, params)?,
        Operation::Update => request.body = update_body(resource, params)?,
        Operation::Submit => request.body = status_body(TimesheetStatus::Submitted),
        Operation::Approve => request.body = status_body(TimesheetStatus::Approved),
        Operation::Get => request.query = option_query(plan, &params.section("options")),
        Operation::GetMany | Operation::GetValues => {
            request.query = option_query(plan, &params.section("options"));
            if let Some(expression) = list_filter(resource, plan, params)? {
                request.query.insert("filter".to_string(), json!(expression));
            }
        }
        Operation::Delete => {}
    }

    if plan.list {
        let records = if params.boolean("returnAll").unwrap_or(false) {
            client.fetch_all(request).await?
        } else {
            let limit = params.unsigned("limit").unwrap_or(DEFAULT_LIST_LIMIT);
            request.query.insert("limit".to_string(), limit.into());
            match ApiResponse::classify(client.execute(request).await?) {
                ApiResponse::Page { results, .. } => results,
                ApiResponse::Single(record) => vec![record],
            }
        };
        return Ok(Some(records));
    }

    let response = client.execute(request).await?;
    Ok(Some(to_records(response)))
}

/// Fan a response out into records: arrays flatten, anything else is a
/// single record.
fn to_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Fixed-body status transition for submit/approve.
fn status_body(status: TimesheetStatus) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("status".to_string(), json!(status.code()));
    body
}

/// Assemble a create body: required fields first, then the
/// `additionalFields` bag merged over them (bag values win). The
/// integration resource instead takes a raw JSON object string.
fn create_body(
    resource: Resource,
    plan: &OperationPlan,
    params: &Params,
) -> Result<Map<String, Value>, BridgeError> {
    if resource == Resource::Integration {
        return raw_json_body(params, "integrationData");
    }

    let mut body = Map::new();
    for field in plan.body_fields {
        if let Some(value) = params.get(field) {
            body.insert(field.to_string(), value.clone());
        }
    }
    for (key, value) in params.section("additionalFields").into_map() {
        body.insert(key, value);
    }

    Ok(body)
}

/// Assemble an update body from the `updateFields` bag, or the raw JSON
/// string for the integration resource.
fn update_body(resource: Resource, params: &Params) -> Result<Map<String, Value>, BridgeError> {
    if resource == Resource::Integration {
        return raw_json_body(params, "updateData");
    }

    Ok(params.section("updateFields").into_map())
}

/// Parse a caller-supplied JSON object string into a body map.
fn raw_json_body(params: &Params, name: &str) -> Result<Map<String, Value>, BridgeError> {
    let raw = params.string(name).unwrap_or("{}");
    let parsed: Value = serde_json::from_str(raw).map_err(|e| BridgeError::Parameter {
        name: name.to_string(),
        message: format!("not valid JSON: {}", e),
    })?;
    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(BridgeError::Parameter {
            name: name.to_string(),
            message: "expected a JSON object".to_string(),
        }),
    }
}

/// Build the query map from the options the plan supports.
///
/// `expand` sub-resource lists render wrapped in parentheses; `links` is
/// sent only when enabled; empty option strings send nothing.
fn option_query(plan: &OperationPlan, options: &Params) -> Map<String, Value> {
    let mut query = Map::new();

    for key in plan.options {
        match *key {
            "fields" => {
                if let Some(fields) = options.string("fields").filter(|s| !s.is_empty()) {
                    query.insert("fields".to_string(), json!(fields));
                }
            }
            "expand" => {
                if let Some(expand) = options.string("expand").filter(|s| !s.is_empty()) {
                    query.insert("expand".to_string(), json!(format!("({})", expand)));
                }
            }
            "links" => {
                if options.boolean("links").unwrap_or(false) {
                    query.insert("links".to_string(), json!(true));
                }
            }
            "sort" => {
                if let Some(sort) = options.string("sort").filter(|s| !s.is_empty()) {
                    query.insert("sort".to_string(), json!(sort));
                }
            }
            _ => {}
        }
    }

    query
}

/// Build the filter expression for a list operation.
///
/// A caller-supplied raw expression and a built expression are mutually
/// exclusive; the raw expression wins. Resources with a mandatory scope
/// (cost plans, benefit plans) always emit their scope clause and append
/// the raw expression to it instead.
fn list_filter(
    resource: Resource,
    plan: &OperationPlan,
    params: &Params,
) -> Result<Option<String>, BridgeError> {
    match resource {
        Resource::CostPlan => {
            let filters = params.section("filters");
            let mut parts = vec![scope_clause(params, "investmentIdFilter", "investmentId")?];

            if let Some(value) = filters.get("planType").and_then(FilterValue::from_json) {
                parts.push(filter::clause("planType", &value));
            }
            if let Some(value) = filters.get("isPlanOfRecord").and_then(FilterValue::from_json) {
                parts.push(filter::clause("isPlanOfRecord", &value));
            }
            if let Some(raw) = filters.string("filter").filter(|s| !s.is_empty()) {
                parts.push(raw.to_string());
            }

            Ok(Some(parts.join(" and ")))
        }
        Resource::BenefitPlan => {
            let options = params.section("options");
            let mut expression = scope_clause(params, "investmentId", "investmentId")?;

            if let Some(raw) = options.string("filter").filter(|s| !s.is_empty()) {
                expression = format!("{} and {}", expression, raw);
            }

            Ok(Some(expression))
        }
        Resource::Lookup => {
            let options = params.section("options");
            let mut expression = options
                .get("isActive")
                .and_then(FilterValue::from_json)
                .map(|value| filter::clause("isActive", &value));

            if let Some(raw) = options.string("filter").filter(|s| !s.is_empty()) {
                expression = Some(match expression {
                    Some(built) => format!("{} and {}", built, raw),
                    None => raw.to_string(),
                });
            }

            Ok(expression)
        }
        Resource::Integration => {
            Ok(params
                .section("options")
                .string("filter")
                .filter(|s| !s.is_empty())
                .map(str::to_string))
        }
        _ => {
            let filters = params.section("filters");

            if let Some(raw) = filters.string("filter").filter(|s| !s.is_empty()) {
                return Ok(Some(raw.to_string()));
            }

            let entries = plan.filter_keys.iter().filter_map(|key| {
                filters
                    .get(key)
                    .and_then(FilterValue::from_json)
                    .map(|value| (*key, value))
            });
            let expression = filter::build_expression(entries);

            Ok((!expression.is_empty()).then_some(expression))
        }
    }
}

/// Render the mandatory investment-scope clause from a top-level
/// parameter.
fn scope_clause(params: &Params, param: &str, field: &str) -> Result<String, BridgeError> {
    let value = params
        .get(param)
        .and_then(FilterValue::from_json)
        .ok_or_else(|| BridgeError::Parameter {
            name: param.to_string(),
            message: "expected a scalar value".to_string(),
        })?;
    Ok(filter::clause(field, &value))
}
