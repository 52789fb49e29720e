use axum::{
    http::header,
    response::{IntoResponse, Response},
};

static FAVICON: &[u8] = include_bytes!("../../assets/favicon.png");

pub async fn favicon() -> Response {
    ([(header::CONTENT_TYPE, "image/png")], FAVICON).into_response()
}
