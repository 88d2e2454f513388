//! Batch requests and per-step results.
//!
//! An [`OperationRequest`] is the loose record a client sends; it is turned
//! into a [`CategoryOperation`] before anything touches the store. Requests
//! that cannot be turned into an operation (missing field, unknown action,
//! foreign company) become failed steps without calling a handler.

use serde::{Deserialize, Serialize};

use crate::{Category, EngineError, ErrorKind, ResultEngine};

/// One entry of a batch as it arrives on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub action: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub category_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

/// The six category mutations a batch can carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryOperation {
    Create {
        name: String,
        category_type: String,
    },
    Rename {
        old_name: String,
        new_name: String,
    },
    ChangeType {
        name: String,
        new_type: String,
    },
    Delete {
        name: String,
    },
    AssignParent {
        child_name: String,
        parent_name: String,
    },
    /// `parent_name: None` detaches the category and makes it a root.
    ReassignParent {
        child_name: String,
        parent_name: Option<String>,
    },
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn required(
    action: &str,
    field: &'static str,
    value: Option<&str>,
) -> ResultEngine<String> {
    present(value).ok_or_else(|| EngineError::MissingField {
        action: action.to_string(),
        field,
    })
}

impl CategoryOperation {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Rename { .. } => "rename",
            Self::ChangeType { .. } => "change_type",
            Self::Delete { .. } => "delete",
            Self::AssignParent { .. } => "assign_parent",
            Self::ReassignParent { .. } => "reassign_parent",
        }
    }

    /// Whether the operation can change the set of categories, so that a
    /// snapshot taken before it no longer lists every category.
    pub fn invalidates_snapshot(&self) -> bool {
        matches!(self, Self::Create { .. })
    }

    /// Validate a wire request for a batch scoped to `company_id`.
    pub fn parse(request: &OperationRequest, company_id: &str) -> ResultEngine<Self> {
        if let Some(requested) = present(request.company_id.as_deref())
            && requested != company_id
        {
            return Err(EngineError::CompanyMismatch(requested));
        }

        let action = request.action.trim();
        let name = || required(action, "name", Some(request.name.as_str()));
        match action {
            "create" => Ok(Self::Create {
                name: name()?,
                category_type: required(action, "type", request.category_type.as_deref())?,
            }),
            "rename" => Ok(Self::Rename {
                old_name: name()?,
                new_name: required(action, "newName", request.new_name.as_deref())?,
            }),
            "change_type" => Ok(Self::ChangeType {
                name: name()?,
                new_type: required(action, "newType", request.new_type.as_deref())?,
            }),
            "delete" => Ok(Self::Delete { name: name()? }),
            "assign_parent" => Ok(Self::AssignParent {
                child_name: name()?,
                parent_name: required(action, "parentName", request.parent_name.as_deref())?,
            }),
            // Only an absent or null parentName detaches; a blank one is an error.
            "reassign_parent" => Ok(Self::ReassignParent {
                child_name: name()?,
                parent_name: match request.parent_name.as_deref() {
                    None => None,
                    value => Some(required(action, "parentName", value)?),
                },
            }),
            other => Err(EngineError::UnknownAction(other.to_string())),
        }
    }
}

/// Result of one operation: `{ success, error?, category?, categories? }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

impl OperationOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
            error_kind: None,
            category: None,
            categories: None,
        }
    }

    pub fn with_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::succeeded()
        }
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories: Some(categories),
            ..Self::succeeded()
        }
    }

    pub fn failed(err: &EngineError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            category: None,
            categories: None,
        }
    }
}

impl From<ResultEngine<Category>> for OperationOutcome {
    fn from(result: ResultEngine<Category>) -> Self {
        match result {
            Ok(category) => Self::with_category(category),
            Err(err) => Self::failed(&err),
        }
    }
}

impl From<ResultEngine<Vec<Category>>> for OperationOutcome {
    fn from(result: ResultEngine<Vec<Category>>) -> Self {
        match result {
            Ok(categories) => Self::with_categories(categories),
            Err(err) => Self::failed(&err),
        }
    }
}

/// One entry of a batch response, in request order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchStep {
    pub action: String,
    pub name: String,
    pub result: OperationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: &str, name: &str) -> OperationRequest {
        OperationRequest {
            action: action.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn deserializes_camel_case_records() {
        let raw = r#"[
            {"action": "create", "name": "Travel", "type": "Expense"},
            {"action": "assign_parent", "name": "Flights", "parentName": "Travel"},
            {"action": "reassign_parent", "name": "Flights", "parentName": null}
        ]"#;
        let requests: Vec<OperationRequest> = serde_json::from_str(raw).unwrap();

        assert_eq!(requests[0].category_type.as_deref(), Some("Expense"));
        assert_eq!(requests[1].parent_name.as_deref(), Some("Travel"));
        assert_eq!(requests[2].parent_name, None);
    }

    #[test]
    fn create_without_type_is_missing_field() {
        let err = CategoryOperation::parse(&request("create", "Travel"), "acme").unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingField {
                action: "create".to_string(),
                field: "type",
            }
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn assign_parent_requires_parent_name() {
        let mut req = request("assign_parent", "Flights");
        req.parent_name = Some("  ".to_string());
        let err = CategoryOperation::parse(&req, "acme").unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required field 'parentName' for action 'assign_parent'"
        );
    }

    #[test]
    fn reassign_parent_without_parent_detaches() {
        let op = CategoryOperation::parse(&request("reassign_parent", "Flights"), "acme").unwrap();
        assert_eq!(
            op,
            CategoryOperation::ReassignParent {
                child_name: "Flights".to_string(),
                parent_name: None,
            }
        );
    }

    #[test]
    fn reassign_parent_with_blank_parent_is_missing_field() {
        for blank in ["", "   "] {
            let mut req = request("reassign_parent", "Flights");
            req.parent_name = Some(blank.to_string());
            let err = CategoryOperation::parse(&req, "acme").unwrap_err();
            assert_eq!(
                err,
                EngineError::MissingField {
                    action: "reassign_parent".to_string(),
                    field: "parentName",
                }
            );
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = CategoryOperation::parse(&request("merge", "Travel"), "acme").unwrap_err();
        assert_eq!(err, EngineError::UnknownAction("merge".to_string()));
    }

    #[test]
    fn foreign_company_is_rejected() {
        let mut req = request("delete", "Travel");
        req.company_id = Some("globex".to_string());
        let err = CategoryOperation::parse(&req, "acme").unwrap_err();
        assert_eq!(err, EngineError::CompanyMismatch("globex".to_string()));

        req.company_id = Some("acme".to_string());
        assert!(CategoryOperation::parse(&req, "acme").is_ok());
    }

    #[test]
    fn only_create_invalidates_snapshot() {
        let create = CategoryOperation::Create {
            name: "Travel".to_string(),
            category_type: "Expense".to_string(),
        };
        let delete = CategoryOperation::Delete {
            name: "Travel".to_string(),
        };
        assert!(create.invalidates_snapshot());
        assert!(!delete.invalidates_snapshot());
        assert_eq!(create.action(), "create");
    }

    #[test]
    fn failed_outcome_serializes_without_payload() {
        let outcome = OperationOutcome::failed(&EngineError::UnknownAction("merge".to_string()));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "unknown action 'merge'"})
        );
    }
}
