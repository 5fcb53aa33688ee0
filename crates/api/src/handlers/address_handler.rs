//! Address enrichment handler.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use common::{AppError, AppResult};

use crate::clients::normalize_cep;
use crate::state::AppState;

/// Optional house number to sharpen geocoding
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    pub numero: Option<String>,
}

/// Address resolved from a CEP, with coordinates when geocoding succeeded
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    #[schema(example = "01001-000")]
    pub cep: String,
    pub endereco: String,
    pub cidade: String,
    pub estado: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Create address routes
pub fn address_routes() -> Router<AppState> {
    Router::new().route("/address/:cep", get(lookup_address))
}

/// Look up a CEP and geocode it
#[utoipa::path(
    get,
    path = "/usuarios/address/{cep}",
    tag = "Address",
    params(
        ("cep" = String, Path, description = "Postal code, masked or bare"),
        AddressQuery
    ),
    responses(
        (status = 200, description = "Resolved address", body = AddressResponse),
        (status = 404, description = "CEP not found")
    )
)]
pub async fn lookup_address(
    State(state): State<AppState>,
    Path(cep): Path<String>,
    Query(query): Query<AddressQuery>,
) -> AppResult<Json<AddressResponse>> {
    let cep = normalize_cep(&cep).ok_or_else(|| AppError::not_found("CEP"))?;

    let address = match state.address_lookup.postal_code(&cep).await {
        Ok(Some(address)) => address,
        Ok(None) => return Err(AppError::not_found("CEP")),
        Err(e) => {
            warn!(cep = %cep, error = ?e, "Postal code lookup failed");
            return Err(AppError::not_found("CEP"));
        }
    };

    let query = address.geocoding_query(query.numero.as_deref());
    let coordinates = match state.address_lookup.geocode(&query).await {
        Ok(coordinates) => coordinates,
        Err(e) => {
            warn!(cep = %cep, error = ?e, "Geocoding failed");
            None
        }
    };

    let (latitude, longitude) = match coordinates {
        Some(c) => (Some(c.latitude), Some(c.longitude)),
        None => (None, None),
    };

    Ok(Json(AddressResponse {
        cep: address.cep,
        endereco: address.street,
        cidade: address.city,
        estado: address.state,
        latitude,
        longitude,
    }))
}
