//! # Branches
//!
//! Every candidate, vote and answer lives under exactly one branch. A branch is
//! not stored anywhere, it only selects which collection a request touches.
//!
//! - `senate` -> `voting.senate`
//! - `treasury` -> `voting.treasury`
//!
//! The `{branch}` path segment is checked once by [`branch_ctx`] before any
//! handler runs. Handlers then take the parsed [`Branch`] as an
//! `Extension<Branch>` instead of re-reading the path.
use std::{collections::HashMap, fmt, str::FromStr};

use axum::{
    extract::{Path, Request, rejection::PathRejection},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;

pub const BRANCH_PARAM: &str = "branch";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
    Senate,
    Treasury,
}

impl Branch {
    pub const ALL: [Branch; 2] = [Branch::Senate, Branch::Treasury];

    /// Collection name backing this branch.
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Senate => "senate",
            Branch::Treasury => "treasury",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(r#"Invalid branch "{0}"; must be either "senate" or "treasury""#)]
pub struct InvalidBranch(pub String);

impl FromStr for Branch {
    type Err = InvalidBranch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Branch::ALL
            .into_iter()
            .find(|branch| branch.as_str() == s)
            .ok_or_else(|| InvalidBranch(s.to_string()))
    }
}

/// Rejects unknown branches with a fail envelope, otherwise attaches the
/// parsed [`Branch`] to the request and hands it to the route.
pub async fn branch_ctx(
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let raw = params
        .ok()
        .and_then(|Path(mut params)| params.remove(BRANCH_PARAM))
        .unwrap_or_default();

    match raw.parse::<Branch>() {
        Ok(branch) => {
            request.extensions_mut().insert(branch);
            next.run(request).await
        }
        Err(e) => {
            debug!("Rejected request: {e}");
            AppError::from(e).into_response()
        }
    }
}
