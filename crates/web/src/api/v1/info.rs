use axum::{
    routing::{get, on, post},
    Json, Router,
};
use model::{
    info::{decode_info, encode_info, InfoParts},
    links::scan_target,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{route_not_found, schema, METHOD_FILTER_ALL};

/// The packed form of a row's `info` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub(crate) struct PackedInfo {
    info: String,
}

/// Text read from a QR code.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct ScannedText {
    text: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub(crate) struct ScanTarget {
    target: String,
}

pub(crate) fn routes() -> Router {
    Router::new()
        .route("/schema", get(schema::<InfoParts>))
        .route("/decode", post(decode))
        .route("/encode", post(encode))
        .route("/scan", post(scan))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn decode(Json(packed): Json<PackedInfo>) -> Json<InfoParts> {
    Json(decode_info(&packed.info))
}

async fn encode(Json(parts): Json<InfoParts>) -> Json<PackedInfo> {
    Json(PackedInfo {
        info: encode_info(&parts),
    })
}

async fn scan(Json(scanned): Json<ScannedText>) -> Json<ScanTarget> {
    Json(ScanTarget {
        target: scan_target(scanned.text.trim()),
    })
}
