//! Implements a transaction store backed by a remote HTTP API.

use std::time::Duration;

use reqwest::{StatusCode, Url, blocking};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    models::{DatabaseId, Transaction, TransactionDraft, TransactionKind, iso_date},
    session::Session,
    stores::TransactionStore,
};

/// How long to wait for the server before giving up on a call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stores transactions on a remote server, one HTTP call per operation.
///
/// Every call except [login](RemoteStore::login) requires a [Session]; calls
/// without one fail with [Error::Unauthenticated] before any network traffic
/// happens. The server stores amounts signed, so `list` re-derives the kind
/// from the sign the same way the SQLite backend does.
///
/// There is no bulk-delete endpoint, so `clear` keeps the trait's no-op
/// default.
#[derive(Debug)]
pub struct RemoteStore {
    base_url: Url,
    http: blocking::Client,
    session: Option<Session>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user_id: i64,
    currency: String,
}

/// An operation as the server returns it: the amount is signed and there is
/// no kind field.
#[derive(Deserialize)]
struct RemoteOperation {
    entry_id: DatabaseId,
    #[serde(with = "iso_date")]
    entry_date: Date,
    #[serde(default)]
    description: String,
    amount: f64,
    #[serde(default)]
    category: String,
}

#[derive(Serialize)]
struct AddOperationRequest<'a> {
    #[serde(with = "iso_date")]
    entry_date: Date,
    description: &'a str,
    amount: f64,
    category: &'a str,
}

#[derive(Deserialize)]
struct RemoteCategory {
    category_name: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

impl RemoteStore {
    /// Create a store for the API at `base_url`, with no session yet.
    ///
    /// # Errors
    /// Returns [Error::Config] if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)
            .map_err(|error| Error::Config(format!("invalid api_url '{base_url}': {error}")))?;

        let http = blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            http,
            session: None,
        })
    }

    /// Attach a previously saved session, e.g. one loaded from disk.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Authenticate against the server and start a session.
    ///
    /// Returns the new session so the caller can persist it.
    ///
    /// # Errors
    /// Returns [Error::Unauthenticated] if the server rejects the
    /// credentials and [Error::Unavailable] if it cannot be reached.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Session, Error> {
        let endpoint = self.endpoint("auth/login")?;

        let response = self
            .http
            .post(endpoint)
            .json(&LoginRequest { email, password })
            .send()?;

        let response = check(response)?;
        let login: LoginResponse = response.json()?;

        let session = Session {
            access_token: login.access_token,
            user_id: login.user_id,
            currency: login.currency,
        };
        self.session = Some(session.clone());

        Ok(session)
    }

    /// Drop the current session. Later calls fail with
    /// [Error::Unauthenticated] until the next login.
    pub fn logout(&mut self) {
        self.session = None;
    }

    fn authenticated(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or(Error::Unauthenticated)
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|error| Error::Config(format!("invalid endpoint '{path}': {error}")))
    }
}

/// Turn an HTTP error status into the matching storage error.
fn classify_status(status: StatusCode, body: String) -> Error {
    match status.as_u16() {
        401 | 403 => Error::Unauthenticated,
        404 => Error::NotFound,
        400 | 422 => Error::Validation(body),
        _ => Error::Unavailable(format!("the server returned {status}: {body}")),
    }
}

/// Pass a successful response through, or read the error body and map the
/// status onto the storage error taxonomy.
fn check(response: blocking::Response) -> Result<blocking::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .json::<ErrorResponse>()
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    Err(classify_status(status, body))
}

fn operation_to_transaction(operation: RemoteOperation) -> Transaction {
    let kind = if operation.amount < 0.0 {
        TransactionKind::Expense
    } else {
        TransactionKind::Income
    };

    Transaction {
        id: operation.entry_id,
        date: operation.entry_date,
        description: operation.description,
        amount: operation.amount.abs(),
        kind,
        category: operation.category,
    }
}

impl TransactionStore for RemoteStore {
    fn list(&self) -> Result<Vec<Transaction>, Error> {
        let session = self.authenticated()?;
        let endpoint = self.endpoint(&format!("balance/{}/my-operations", session.user_id))?;

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&session.access_token)
            .send()?;

        let operations: Vec<RemoteOperation> = check(response)?.json()?;

        Ok(operations.into_iter().map(operation_to_transaction).collect())
    }

    fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        let session = self.authenticated()?;

        let path = match draft.kind {
            TransactionKind::Income => format!("operations/{}/add-income", session.user_id),
            TransactionKind::Expense => format!("operations/{}/add-expense", session.user_id),
        };
        let endpoint = self.endpoint(&path)?;

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&session.access_token)
            .json(&AddOperationRequest {
                entry_date: draft.date,
                description: &draft.description,
                amount: draft.amount,
                category: &draft.category,
            })
            .send()?;

        let created: RemoteOperation = check(response)?.json()?;

        Ok(operation_to_transaction(created))
    }

    fn remove(&mut self, id: DatabaseId) -> Result<(), Error> {
        let session = self.authenticated()?;
        let endpoint = self.endpoint(&format!(
            "operations/{}/delete-operation/{id}",
            session.user_id
        ))?;

        let response = self
            .http
            .delete(endpoint)
            .bearer_auth(&session.access_token)
            .send()?;

        check(response)?;

        Ok(())
    }

    fn categories(&self) -> Result<Vec<String>, Error> {
        let session = self.authenticated()?;
        let endpoint = self.endpoint("categories/all")?;

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&session.access_token)
            .send()?;

        let categories: Vec<RemoteCategory> = check(response)?.json()?;

        Ok(categories
            .into_iter()
            .map(|category| category.category_name)
            .collect())
    }
}
