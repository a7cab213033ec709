use actix_cors::Cors;
use actix_web::{
    delete, get, http::StatusCode, middleware, post, put, web, App, HttpResponse, HttpServer,
    ResponseError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use splitbook::{
    Expense, ExpenseId, Ledger, LedgerError, MemberName, Money, NewExpense, ReferenceError,
    SplitEdit,
};

mod config;

struct Group {
    name: String,
    ledger: Ledger,
}

type Groups = Mutex<HashMap<String, Group>>;

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Couldn't find the desired group")]
    GroupNotFound,
    #[error("Group {0} already exists")]
    GroupExists(String),
}

impl From<ReferenceError> for ApiError {
    fn from(err: ReferenceError) -> Self {
        ApiError::Ledger(err.into())
    }
}

#[derive(Serialize)]
struct ErrorJson {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::Reference(ReferenceError::NoEditInProgress(_))) => {
                StatusCode::CONFLICT
            }
            ApiError::Ledger(LedgerError::Reference(_)) | ApiError::GroupNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::GroupExists(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        warn!(status = %self.status_code(), error = %self, "request rejected");
        HttpResponse::build(self.status_code()).json(ErrorJson {
            error: self.to_string(),
        })
    }
}

/// Takes the lock even if a previous request panicked while holding it.
/// Ledger operations validate before they mutate, so the map is still
/// consistent.
fn lock_groups(groups: &Groups) -> MutexGuard<'_, HashMap<String, Group>> {
    groups.lock().unwrap_or_else(|poisoned| {
        warn!("recovering group state after a panicked request");
        PoisonError::into_inner(poisoned)
    })
}

/// Runs `f` on one group while holding the lock, so every request sees a
/// consistent set of members and expenses.
fn with_group<T>(
    groups: &Groups,
    id: &str,
    f: impl FnOnce(&mut Group) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut groups = lock_groups(groups);
    let group = groups.get_mut(id).ok_or(ApiError::GroupNotFound)?;
    f(group)
}

#[derive(Deserialize, Serialize)]
struct GroupNameJson {
    name: String,
}

#[derive(Deserialize, Serialize)]
struct MemberJson {
    name: String,
}

#[derive(Deserialize, Serialize)]
struct SplitAmountJson {
    amount: String,
}

#[derive(Serialize)]
struct GroupJson<'a> {
    id: &'a str,
    name: &'a str,
    members: &'a [MemberName],
    expenses: &'a [Expense],
}

#[derive(Serialize)]
struct DraftJson<'a> {
    expense: &'a Expense,
    remaining: Money,
}

impl<'a> From<&'a SplitEdit> for DraftJson<'a> {
    fn from(edit: &'a SplitEdit) -> Self {
        DraftJson {
            expense: edit.draft(),
            remaining: edit.remaining_amount(),
        }
    }
}

#[put("/groups/{id}")]
async fn add_group(
    groups: web::Data<Groups>,
    id: web::Path<String>,
    json: web::Json<GroupNameJson>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let mut groups = lock_groups(&groups);
    if groups.contains_key(&id) {
        return Err(ApiError::GroupExists(id));
    }
    info!(group = %id, "adding group");
    groups.insert(
        id,
        Group {
            name: json.into_inner().name,
            ledger: Ledger::new(),
        },
    );
    Ok(HttpResponse::Ok().body("Group added"))
}

#[get("/groups/{id}")]
async fn get_group(
    groups: web::Data<Groups>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    with_group(&groups, &id, |group| {
        Ok(HttpResponse::Ok().json(GroupJson {
            id: &id,
            name: &group.name,
            members: group.ledger.members(),
            expenses: group.ledger.expenses(),
        }))
    })
}

#[post("/groups/{id}/members")]
async fn add_member(
    groups: web::Data<Groups>,
    id: web::Path<String>,
    json: web::Json<MemberJson>,
) -> Result<HttpResponse, ApiError> {
    with_group(&groups, &id, |group| {
        group
            .ledger
            .add_member(&json.name)
            .map_err(LedgerError::from)?;
        Ok(HttpResponse::Ok().json(group.ledger.members()))
    })
}

#[delete("/groups/{id}/members/{name}")]
async fn remove_member(
    groups: web::Data<Groups>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, name) = path.into_inner();
    with_group(&groups, &id, |group| {
        let removed = group.ledger.remove_member(&name)?;
        Ok(HttpResponse::Ok().json(removed))
    })
}

#[post("/groups/{id}/expenses")]
async fn add_expense(
    groups: web::Data<Groups>,
    id: web::Path<String>,
    expense: web::Json<NewExpense>,
) -> Result<HttpResponse, ApiError> {
    with_group(&groups, &id, |group| {
        let expense = group.ledger.add_expense(expense.into_inner())?;
        Ok(HttpResponse::Created().json(expense))
    })
}

#[post("/groups/{id}/expenses/{expense}/edit")]
async fn begin_split_edit(
    groups: web::Data<Groups>,
    path: web::Path<(String, u64)>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense) = path.into_inner();
    with_group(&groups, &id, |group| {
        let edit = group.ledger.begin_split_edit(ExpenseId(expense))?;
        Ok(HttpResponse::Ok().json(DraftJson::from(edit)))
    })
}

#[delete("/groups/{id}/expenses/{expense}/edit")]
async fn cancel_split_edit(
    groups: web::Data<Groups>,
    path: web::Path<(String, u64)>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense) = path.into_inner();
    with_group(&groups, &id, |group| {
        group.ledger.cancel_split_edit(ExpenseId(expense))?;
        Ok(HttpResponse::Ok().body("Edit cancelled"))
    })
}

#[put("/groups/{id}/expenses/{expense}/splits/{member}")]
async fn set_participant_split(
    groups: web::Data<Groups>,
    path: web::Path<(String, u64, String)>,
    json: web::Json<SplitAmountJson>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense, member) = path.into_inner();
    with_group(&groups, &id, |group| {
        let edit = group
            .ledger
            .set_participant_split(ExpenseId(expense), &member, &json.amount)?;
        Ok(HttpResponse::Ok().json(DraftJson::from(edit)))
    })
}

#[post("/groups/{id}/expenses/{expense}/commit")]
async fn commit_split_edit(
    groups: web::Data<Groups>,
    path: web::Path<(String, u64)>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense) = path.into_inner();
    with_group(&groups, &id, |group| {
        let expense = group.ledger.commit_split_edit(ExpenseId(expense))?;
        Ok(HttpResponse::Ok().json(expense))
    })
}

#[get("/groups/{id}/balance")]
async fn get_balance(
    groups: web::Data<Groups>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    with_group(&groups, &id, |group| {
        Ok(HttpResponse::Ok().json(group.ledger.balances()))
    })
}

#[get("/groups/{id}/summary")]
async fn get_summary(
    groups: web::Data<Groups>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    with_group(&groups, &id, |group| {
        Ok(HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(group.ledger.summary()))
    })
}

#[get("/groups/{id}/exchanges")]
async fn get_exchanges(
    groups: web::Data<Groups>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    with_group(&groups, &id, |group| {
        Ok(HttpResponse::Ok().json(group.ledger.transfers()))
    })
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_group)
        .service(get_group)
        .service(add_member)
        .service(remove_member)
        .service(add_expense)
        .service(begin_split_edit)
        .service(cancel_split_edit)
        .service(set_participant_split)
        .service(commit_split_edit)
        .service(get_balance)
        .service(get_summary)
        .service(get_exchanges);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::Config::from_env()?;
    info!(host = %config.host, port = config.port, "starting splitbook");

    let groups: web::Data<Groups> = web::Data::new(Mutex::new(HashMap::new()));

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(groups.clone())
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
