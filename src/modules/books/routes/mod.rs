//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiResponse, AppError};
use serde_json::json;

use super::error::BookError;
use super::models::BookPayload;
use super::service::BookService;

/// Operation a failure is reported for; each has its own wording.
#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl Action {
    fn prefix(self) -> &'static str {
        match self {
            Action::Create => "Gagal menambahkan buku.",
            Action::Update => "Gagal memperbarui buku.",
            Action::List | Action::Get => "Gagal menampilkan buku.",
            Action::Delete => "Buku gagal dihapus.",
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Action::Update => "Gagal memperbarui buku. Id tidak ditemukan",
            Action::Delete => "Buku gagal dihapus. Id tidak ditemukan",
            Action::Create | Action::List | Action::Get => "Buku tidak ditemukan",
        }
    }

    fn into_app_error(self, err: BookError) -> AppError {
        match err {
            BookError::MissingName => {
                AppError::validation(format!("{} Mohon isi nama buku", self.prefix()))
            }
            BookError::ReadPageExceedsPageCount { .. } => AppError::validation(format!(
                "{} readPage tidak boleh lebih besar dari pageCount",
                self.prefix()
            )),
            BookError::NotFound(_) => AppError::not_found(self.not_found()),
            BookError::Internal(err) => AppError::Internal(err),
        }
    }

    fn rejected(self, rejection: JsonRejection) -> AppError {
        AppError::bad_request(format!("{} {}", self.prefix(), rejection.body_text()))
    }
}

/// Routes relative to the module mount point.
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{bookId}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|rejection| Action::Create.rejected(rejection))?;

    let book_id = service
        .create(payload)
        .map_err(|err| Action::Create.into_app_error(err))?;

    let mut response = ApiResponse::message_with_data(
        "Buku berhasil ditambahkan",
        json!({ "bookId": book_id }),
    )
    .with_status(StatusCode::CREATED)
    .into_response();
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    Ok(response)
}

async fn list_books(State(service): State<Arc<BookService>>) -> Result<ApiResponse, AppError> {
    let books = service
        .list()
        .map_err(|err| Action::List.into_app_error(err))?;
    Ok(ApiResponse::data(json!({ "books": books })))
}

async fn get_book(
    State(service): State<Arc<BookService>>,
    Path(book_id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let book = service
        .get(&book_id)
        .map_err(|err| Action::Get.into_app_error(err))?;
    Ok(ApiResponse::data(json!({ "book": book })))
}

async fn update_book(
    State(service): State<Arc<BookService>>,
    Path(book_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| Action::Update.rejected(rejection))?;

    service
        .update(&book_id, payload)
        .map_err(|err| Action::Update.into_app_error(err))?;

    Ok(ApiResponse::message("Buku berhasil diperbarui"))
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    Path(book_id): Path<String>,
) -> Result<ApiResponse, AppError> {
    service
        .delete(&book_id)
        .map_err(|err| Action::Delete.into_app_error(err))?;

    Ok(ApiResponse::message("Buku berhasil dihapus"))
}
