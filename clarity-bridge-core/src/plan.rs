//! Static request-plan table.
//!
//! Every supported `(resource, operation)` pair maps to one
//! [`OperationPlan`]: the HTTP method, the endpoint template, the
//! parameters that must be present before a request is built, and the
//! query features the endpoint understands. The table is immutable for
//! the process lifetime; pairs without an entry are caller configuration
//! errors and have no runtime behavior.

use serde_json::Value;
use std::fmt;

use crate::error::ValidationError;
use crate::model::{Method, Params};

/// Backend resource kinds exposed by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Project,
    Task,
    Timesheet,
    Resource,
    Roadmap,
    Team,
    CostPlan,
    BenefitPlan,
    Lookup,
    Integration,
    UserProfile,
}

impl Resource {
    /// All resource kinds, in display order.
    pub const ALL: [Resource; 11] = [
        Self::Project,
        Self::Task,
        Self::Timesheet,
        Self::Resource,
        Self::Roadmap,
        Self::Team,
        Self::CostPlan,
        Self::BenefitPlan,
        Self::Lookup,
        Self::Integration,
        Self::UserProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Timesheet => "timesheet",
            Self::Resource => "resource",
            Self::Roadmap => "roadmap",
            Self::Team => "team",
            Self::CostPlan => "costPlan",
            Self::BenefitPlan => "benefitPlan",
            Self::Lookup => "lookup",
            Self::Integration => "integration",
            Self::UserProfile => "userProfile",
        }
    }

    /// Parse a host-supplied resource selector.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operations a resource may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    GetMany,
    Update,
    Delete,
    Submit,
    Approve,
    GetValues,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Self::Create,
        Self::Get,
        Self::GetMany,
        Self::Update,
        Self::Delete,
        Self::Submit,
        Self::Approve,
        Self::GetValues,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::GetMany => "getMany",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::GetValues => "getValues",
        }
    }

    /// Parse a host-supplied operation selector.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the request-plan table.
pub struct OperationPlan {
    pub resource: Resource,
    pub operation: Operation,
    pub method: Method,

    /// Endpoint template relative to the REST base; `{name}` segments are
    /// filled from the parameter bag.
    pub endpoint: &'static str,

    /// Parameters that must be present before a request is built: path
    /// IDs plus required body fields.
    pub required: &'static [&'static str],

    /// Required parameters copied into the request body.
    pub body_fields: &'static [&'static str],

    /// Query option keys the endpoint understands.
    pub options: &'static [&'static str],

    /// Per-resource keys the built filter expression draws from, in
    /// clause order.
    pub filter_keys: &'static [&'static str],

    /// Whether the operation lists records and participates in
    /// pagination / `returnAll`.
    pub list: bool,
}

const NONE: &[&str] = &[];
const GET_OPTIONS: &[&str] = &["fields", "expand", "links"];
const LIST_OPTIONS: &[&str] = &["fields", "expand", "links", "sort"];
const FLAT_GET_OPTIONS: &[&str] = &["fields", "links"];
const FLAT_LIST_OPTIONS: &[&str] = &["fields", "links", "sort"];

macro_rules! plan {
    ($resource:ident, $operation:ident, $method:ident, $endpoint:expr,
     req: $required:expr, body: $body:expr, opts: $options:expr,
     filters: $filters:expr, list: $list:expr) => {
        OperationPlan {
            resource: Resource::$resource,
            operation: Operation::$operation,
            method: Method::$method,
            endpoint: $endpoint,
            required: $required,
            body_fields: $body,
            options: $options,
            filter_keys: $filters,
            list: $list,
        }
    };
}

/// The full table: 11 resources, 41 defined pairs.
pub const OPERATION_PLANS: &[OperationPlan] = &[
    // project
    plan!(Project, Create, Post, "/projects",
        req: &["code", "name"], body: &["code", "name"], opts: NONE, filters: NONE, list: false),
    plan!(Project, Get, Get, "/projects/{projectId}",
        req: &["projectId"], body: NONE, opts: GET_OPTIONS, filters: NONE, list: false),
    plan!(Project, GetMany, Get, "/projects",
        req: NONE, body: NONE, opts: LIST_OPTIONS,
        filters: &["isActive", "manager", "status"], list: true),
    plan!(Project, Update, Patch, "/projects/{projectId}",
        req: &["projectId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Project, Delete, Delete, "/projects/{projectId}",
        req: &["projectId"], body: NONE, opts: NONE, filters: NONE, list: false),
    // task (always scoped to a project)
    plan!(Task, Create, Post, "/projects/{projectId}/tasks",
        req: &["projectId", "name"], body: &["name"], opts: NONE, filters: NONE, list: false),
    plan!(Task, Get, Get, "/projects/{projectId}/tasks/{taskId}",
        req: &["projectId", "taskId"], body: NONE, opts: FLAT_GET_OPTIONS, filters: NONE, list: false),
    plan!(Task, GetMany, Get, "/projects/{projectId}/tasks",
        req: &["projectId"], body: NONE, opts: FLAT_LIST_OPTIONS,
        filters: &["milestone", "status"], list: true),
    plan!(Task, Update, Patch, "/projects/{projectId}/tasks/{taskId}",
        req: &["projectId", "taskId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Task, Delete, Delete, "/projects/{projectId}/tasks/{taskId}",
        req: &["projectId", "taskId"], body: NONE, opts: NONE, filters: NONE, list: false),
    // timesheet (update and the status transitions use PUT)
    plan!(Timesheet, Create, Post, "/timesheets",
        req: &["resourceId", "periodStart", "periodFinish"],
        body: &["resourceId", "periodStart", "periodFinish"],
        opts: NONE, filters: NONE, list: false),
    plan!(Timesheet, Get, Get, "/timesheets/{timesheetId}",
        req: &["timesheetId"], body: NONE, opts: GET_OPTIONS, filters: NONE, list: false),
    plan!(Timesheet, GetMany, Get, "/timesheets",
        req: NONE, body: NONE, opts: LIST_OPTIONS,
        filters: &["resourceId", "status"], list: true),
    plan!(Timesheet, Update, Put, "/timesheets/{timesheetId}",
        req: &["timesheetId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Timesheet, Delete, Delete, "/timesheets/{timesheetId}",
        req: &["timesheetId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Timesheet, Submit, Put, "/timesheets/{timesheetId}",
        req: &["timesheetId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Timesheet, Approve, Put, "/timesheets/{timesheetId}",
        req: &["timesheetId"], body: NONE, opts: NONE, filters: NONE, list: false),
    // resource (read-only)
    plan!(Resource, Get, Get, "/resources/{resourceId}",
        req: &["resourceId"], body: NONE, opts: FLAT_GET_OPTIONS, filters: NONE, list: false),
    plan!(Resource, GetMany, Get, "/resources",
        req: NONE, body: NONE, opts: FLAT_LIST_OPTIONS,
        filters: &["isActive", "firstName", "lastName", "email", "resourceType"], list: true),
    // roadmap (no delete on the backend surface)
    plan!(Roadmap, Create, Post, "/roadmaps",
        req: &["code", "name"], body: &["code", "name"], opts: NONE, filters: NONE, list: false),
    plan!(Roadmap, Get, Get, "/roadmaps/{roadmapId}",
        req: &["roadmapId"], body: NONE, opts: GET_OPTIONS, filters: NONE, list: false),
    plan!(Roadmap, GetMany, Get, "/roadmaps",
        req: NONE, body: NONE, opts: LIST_OPTIONS,
        filters: &["status", "type", "author"], list: true),
    plan!(Roadmap, Update, Patch, "/roadmaps/{roadmapId}",
        req: &["roadmapId"], body: NONE, opts: NONE, filters: NONE, list: false),
    // team
    plan!(Team, Create, Post, "/teams",
        req: &["name"], body: &["name"], opts: NONE, filters: NONE, list: false),
    plan!(Team, Get, Get, "/teams/{teamId}",
        req: &["teamId"], body: NONE, opts: GET_OPTIONS, filters: NONE, list: false),
    plan!(Team, GetMany, Get, "/teams",
        req: NONE, body: NONE, opts: LIST_OPTIONS,
        filters: &["isActive", "name"], list: true),
    plan!(Team, Update, Patch, "/teams/{teamId}",
        req: &["teamId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Team, Delete, Delete, "/teams/{teamId}",
        req: &["teamId"], body: NONE, opts: NONE, filters: NONE, list: false),
    // costPlan (getMany requires an investment scope)
    plan!(CostPlan, Create, Post, "/costPlans",
        req: &["name", "investmentId", "planType"],
        body: &["name", "investmentId", "planType"],
        opts: NONE, filters: NONE, list: false),
    plan!(CostPlan, Get, Get, "/costPlans/{costPlanId}",
        req: &["costPlanId"], body: NONE, opts: GET_OPTIONS, filters: NONE, list: false),
    plan!(CostPlan, GetMany, Get, "/costPlans",
        req: &["investmentIdFilter"], body: NONE, opts: LIST_OPTIONS, filters: NONE, list: true),
    plan!(CostPlan, Update, Patch, "/costPlans/{costPlanId}",
        req: &["costPlanId"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(CostPlan, Delete, Delete, "/costPlans/{costPlanId}",
        req: &["costPlanId"], body: NONE, opts: NONE, filters: NONE, list: false),
    // benefitPlan (read-only, getMany requires an investment scope)
    plan!(BenefitPlan, Get, Get, "/benefitPlans/{benefitPlanId}",
        req: &["benefitPlanId"], body: NONE, opts: FLAT_GET_OPTIONS, filters: NONE, list: false),
    plan!(BenefitPlan, GetMany, Get, "/benefitPlans",
        req: &["investmentId"], body: NONE, opts: FLAT_LIST_OPTIONS, filters: NONE, list: true),
    // lookup
    plan!(Lookup, GetValues, Get, "/lookups/{lookupCode}/lookupValues",
        req: &["lookupCode"], body: NONE, opts: &["fields", "sort"], filters: NONE, list: true),
    // integration (raw JSON bodies supplied by the caller)
    plan!(Integration, Create, Post, "/integration",
        req: &["integrationData"], body: NONE, opts: NONE, filters: NONE, list: false),
    plan!(Integration, Get, Get, "/integration/{integrationId}",
        req: &["integrationId"], body: NONE, opts: &["fields"], filters: NONE, list: false),
    plan!(Integration, GetMany, Get, "/integration",
        req: NONE, body: NONE, opts: &["fields", "sort"], filters: NONE, list: true),
    plan!(Integration, Update, Patch, "/integration/{integrationId}",
        req: &["integrationId", "updateData"], body: NONE, opts: NONE, filters: NONE, list: false),
    // userProfile (virtual, read-only, no parameters)
    plan!(UserProfile, Get, Get, "/virtual/userProfile",
        req: NONE, body: NONE, opts: NONE, filters: NONE, list: false),
];

/// Look up the plan for a `(resource, operation)` pair.
pub fn lookup(resource: Resource, operation: Operation) -> Option<&'static OperationPlan> {
    OPERATION_PLANS
        .iter()
        .find(|plan| plan.resource == resource && plan.operation == operation)
}

/// Fill an endpoint template's `{name}` segments from a parameter bag.
///
/// String values insert verbatim; numbers insert in decimal. Template
/// variables are always part of the plan's required list, so a missing
/// value here still reports as a validation failure.
pub fn fill_endpoint(
    template: &str,
    params: &Params,
    operation: &str,
) -> Result<String, ValidationError> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        path.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').unwrap_or(after.len());
        let name = &after[..end];

        let segment = params.get(name).and_then(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        match segment {
            Some(segment) => path.push_str(&segment),
            None => {
                return Err(ValidationError {
                    operation: operation.to_string(),
                    missing: vec![name.to_string()],
                });
            }
        }
        rest = &after[(end + 1).min(after.len())..];
    }
    path.push_str(rest);

    Ok(path)
}
