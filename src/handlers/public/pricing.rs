use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Pricing;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /pricing - list every pricing plan, cheapest first
pub async fn pricing_get(State(state): State<AppState>) -> ApiResult<Vec<Pricing>> {
    let plans = state.store.list_pricing().await?;
    Ok(ApiResponse::success(
        "Pricing details fetched successfully",
        plans,
    ))
}
