//! An in-memory stand-in for the remote expense API, served over real HTTP.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

use crate::api::{DATE_FORMAT, ExpenseDraft, TransactionType};

type Reply = (StatusCode, Json<Value>);

struct FakeExpense {
    id: String,
    draft: ExpenseDraft,
}

impl FakeExpense {
    fn to_json(&self) -> Value {
        let date = self
            .draft
            .date
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| self.draft.date.to_string());

        json!({
            "_id": self.id,
            "title": self.draft.title,
            "amount": self.draft.amount,
            "category": self.draft.category.as_str(),
            "date": format!("{date}T00:00:00.000Z"),
            "description": self.draft.description,
            "transactionType": self.draft.transaction_type.as_str(),
        })
    }
}

#[derive(Default)]
struct FakeState {
    /// Username to password.
    users: HashMap<String, String>,
    /// Session token to username.
    sessions: HashMap<String, String>,
    /// Username to that user's expenses in insertion order.
    expenses: HashMap<String, Vec<FakeExpense>>,
    next_id: u64,
    fail_metrics: bool,
    fail_expenses: bool,
    /// Every request as "METHOD /path?query".
    requests: Vec<String>,
}

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;

        self.sessions.get(token).cloned()
    }
}

type SharedState = Arc<Mutex<FakeState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Builder for a fake expense API.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: FakeState,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a user that can log in with `password`.
    pub(crate) fn with_user(mut self, username: &str, password: &str) -> Self {
        self.state
            .users
            .insert(username.to_owned(), password.to_owned());
        self
    }

    /// Add an expense owned by `username`.
    pub(crate) fn with_expense(mut self, username: &str, draft: ExpenseDraft) -> Self {
        let id = format!("expense-{}", self.state.next_id());
        self.state
            .expenses
            .entry(username.to_owned())
            .or_default()
            .push(FakeExpense { id, draft });
        self
    }

    /// Make the metrics endpoint answer with a server error.
    pub(crate) fn with_failing_metrics(mut self) -> Self {
        self.state.fail_metrics = true;
        self
    }

    /// Make the expense list endpoint answer with a server error.
    pub(crate) fn with_failing_expenses(mut self) -> Self {
        self.state.fail_expenses = true;
        self
    }

    /// Serve the fake API on an ephemeral loopback port.
    pub(crate) async fn spawn(self) -> FakeApiHandle {
        let state = Arc::new(Mutex::new(self.state));

        let app = Router::new()
            .route("/user/login", post(log_in))
            .route("/user/register", post(register))
            .route("/user/logout", post(log_out))
            .route("/expense/view", get(list_expenses))
            .route("/expense/metrics", get(spending_metrics))
            .route("/expense/add", post(add_expense))
            .route("/expense/update/{id}", put(update_expense))
            .route("/expense/delete/{id}", delete(delete_expense))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind fake API listener");
        let address = listener
            .local_addr()
            .expect("Could not get fake API address");
        let task = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app).await {
                tracing::error!("fake API stopped: {error}");
            }
        });

        FakeApiHandle {
            address,
            state,
            task,
        }
    }
}

/// A running fake API. The server stops when the handle is dropped.
pub(crate) struct FakeApiHandle {
    address: SocketAddr,
    state: SharedState,
    task: JoinHandle<()>,
}

impl FakeApiHandle {
    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// The requests received so far, formatted as "METHOD /path?query".
    pub(crate) fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    /// Whether `token` still refers to a live session.
    pub(crate) fn is_session_active(&self, token: &str) -> bool {
        lock(&self.state).sessions.contains_key(token)
    }

    /// The number of expenses owned by `username`.
    pub(crate) fn expense_count(&self, username: &str) -> usize {
        lock(&self.state)
            .expenses
            .get(username)
            .map_or(0, Vec::len)
    }

    /// Start a session for `username` without going through the log-in endpoint.
    pub(crate) fn issue_token(&self, username: &str) -> String {
        let mut state = lock(&self.state);
        let token = format!("token-{}", state.next_id());
        state.sessions.insert(token.clone(), username.to_owned());
        token
    }
}

impl Drop for FakeApiHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn record_request(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let line = format!(
        "{} {}",
        request.method(),
        request
            .uri()
            .path_and_query()
            .map(|path| path.as_str())
            .unwrap_or_else(|| request.uri().path())
    );
    lock(&state).requests.push(line);

    next.run(request).await
}

fn message(status: StatusCode, success: bool, message: &str) -> Reply {
    (status, Json(json!({ "success": success, "message": message })))
}

fn unauthorized() -> Reply {
    message(StatusCode::UNAUTHORIZED, false, "Not authorized")
}

async fn log_in(State(state): State<SharedState>, Json(body): Json<Value>) -> Reply {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let mut state = lock(&state);

    if state.users.get(username).map(String::as_str) != Some(password) || password.is_empty() {
        return message(StatusCode::OK, false, "Invalid username or password");
    }

    let token = format!("token-{}", state.next_id());
    state.sessions.insert(token.clone(), username.to_owned());

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!("Welcome back {username}"),
            "user": { "_id": username, "username": username },
            "token": token,
        })),
    )
}

async fn register(State(state): State<SharedState>, Json(body): Json<Value>) -> Reply {
    let username = body["username"]
        .as_str()
        .or_else(|| body["email"].as_str())
        .unwrap_or_default()
        .to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();
    let mut state = lock(&state);

    if username.is_empty() || password.is_empty() {
        return message(StatusCode::BAD_REQUEST, false, "All fields are required");
    }

    if state.users.contains_key(&username) {
        return message(StatusCode::BAD_REQUEST, false, "User already exists");
    }

    state.users.insert(username.clone(), password);

    let name = body["name"]
        .as_str()
        .or_else(|| body["firstname"].as_str())
        .unwrap_or_default();

    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "user": { "_id": username, "username": username, "name": name },
        })),
    )
}

async fn log_out(State(state): State<SharedState>, headers: HeaderMap) -> Reply {
    let mut state = lock(&state);

    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
    else {
        return unauthorized();
    };

    match state.sessions.remove(token) {
        Some(_) => message(StatusCode::OK, true, "Logged out"),
        None => unauthorized(),
    }
}

async fn list_expenses(State(state): State<SharedState>, headers: HeaderMap) -> Reply {
    let state = lock(&state);

    let Some(username) = state.user_for(&headers) else {
        return unauthorized();
    };

    if state.fail_expenses {
        return message(StatusCode::INTERNAL_SERVER_ERROR, false, "Database offline");
    }

    let expenses = state
        .expenses
        .get(&username)
        .map(|expenses| expenses.iter().map(FakeExpense::to_json).collect::<Vec<_>>())
        .unwrap_or_default();

    (StatusCode::OK, Json(json!({ "expenses": expenses })))
}

async fn spending_metrics(State(state): State<SharedState>, headers: HeaderMap) -> Reply {
    let state = lock(&state);

    let Some(username) = state.user_for(&headers) else {
        return unauthorized();
    };

    if state.fail_metrics {
        return message(StatusCode::INTERNAL_SERVER_ERROR, false, "Metrics unavailable");
    }

    let mut totals: Vec<(String, f64)> = Vec::new();

    for expense in state.expenses.get(&username).into_iter().flatten() {
        if expense.draft.transaction_type != TransactionType::Expense {
            continue;
        }

        let category = expense.draft.category.as_str();
        match totals.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += expense.draft.amount,
            None => totals.push((category.to_owned(), expense.draft.amount)),
        }
    }

    let spending = totals
        .into_iter()
        .map(|(category, total)| json!({ "category": category, "total": total }))
        .collect::<Vec<_>>();

    (StatusCode::OK, Json(json!({ "spending": spending })))
}

async fn add_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);

    let Some(username) = state.user_for(&headers) else {
        return unauthorized();
    };

    let draft: ExpenseDraft = match serde_json::from_value(body) {
        Ok(draft) => draft,
        Err(error) => {
            return message(StatusCode::BAD_REQUEST, false, &format!("Invalid expense: {error}"));
        }
    };

    let id = format!("expense-{}", state.next_id());
    state
        .expenses
        .entry(username)
        .or_default()
        .push(FakeExpense { id, draft });

    message(StatusCode::CREATED, true, "Expense added")
}

async fn update_expense(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);

    let Some(username) = state.user_for(&headers) else {
        return unauthorized();
    };

    let draft: ExpenseDraft = match serde_json::from_value(body) {
        Ok(draft) => draft,
        Err(error) => {
            return message(StatusCode::BAD_REQUEST, false, &format!("Invalid expense: {error}"));
        }
    };

    let expense = state
        .expenses
        .get_mut(&username)
        .and_then(|expenses| expenses.iter_mut().find(|expense| expense.id == id));

    match expense {
        Some(expense) => {
            expense.draft = draft;
            message(StatusCode::OK, true, "Expense updated")
        }
        None => message(StatusCode::NOT_FOUND, false, "Expense not found"),
    }
}

async fn delete_expense(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    let mut state = lock(&state);

    let Some(username) = state.user_for(&headers) else {
        return unauthorized();
    };

    let Some(expenses) = state.expenses.get_mut(&username) else {
        return message(StatusCode::NOT_FOUND, false, "Expense not found");
    };

    match expenses.iter().position(|expense| expense.id == id) {
        Some(index) => {
            expenses.remove(index);
            message(StatusCode::OK, true, "Expense deleted")
        }
        None => message(StatusCode::NOT_FOUND, false, "Expense not found"),
    }
}
