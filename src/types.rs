/// Shared types used across the codebase

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// Actions a caller can attempt against a resource
/// Used by both the authorization policy and the resource dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    PartialUpdate,
    Delete,
}

impl Action {
    /// Reads never change state
    pub fn is_safe(&self) -> bool {
        matches!(self, Action::Read)
    }

    pub fn is_mutating(&self) -> bool {
        !self.is_safe()
    }
}

/// Shape of the request path: the collection or a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    Collection,
    Item,
}

/// Named operations of the generic records interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
}

impl Operation {
    /// Map an HTTP verb on a path shape to an operation.
    /// Returns None for combinations the records interface does not serve.
    pub fn resolve(method: &Method, shape: PathShape) -> Option<Self> {
        match (shape, method.as_str()) {
            (PathShape::Collection, "GET") => Some(Operation::List),
            (PathShape::Collection, "POST") => Some(Operation::Create),
            (PathShape::Item, "GET") => Some(Operation::Retrieve),
            (PathShape::Item, "PUT") => Some(Operation::Update),
            (PathShape::Item, "PATCH") => Some(Operation::PartialUpdate),
            (PathShape::Item, "DELETE") => Some(Operation::Destroy),
            _ => None,
        }
    }

    /// The policy action this operation performs
    pub fn action(&self) -> Action {
        match self {
            Operation::List | Operation::Retrieve => Action::Read,
            Operation::Create => Action::Create,
            Operation::Update => Action::Update,
            Operation::PartialUpdate => Action::PartialUpdate,
            Operation::Destroy => Action::Delete,
        }
    }
}
