//! Provider catalog endpoints.
//!
//! - GET /api/providers?category= - List the provider catalog
//!
//! The catalog is seeded idempotently on read: a fresh count check
//! short-circuits when the seed providers are already present.

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use carebook_core::{ensure_providers, Provider};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for the provider listing.
#[derive(Debug, Deserialize)]
pub struct ProvidersQuery {
    /// Optional category filter
    pub category: Option<String>,
}

/// One provider in the catalog view.
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    /// Provider id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Title/role
    pub title: String,
    /// Catalog category
    pub category: String,
    /// Specialty tags
    pub specialties: Vec<String>,
    /// Years of experience
    pub experience_years: i32,
    /// Average rating
    pub rating: f64,
    /// Review count
    pub review_count: i32,
    /// Consultation fee in minor currency units
    pub fee: i32,
    /// Languages spoken
    pub languages: Vec<String>,
    /// Free-text bio
    pub bio: String,
    /// Education summary
    pub education: String,
    /// Current position
    pub current_work: String,
    /// Image reference
    pub image: String,
    /// Identity-verified flag
    pub verified: bool,
}

impl From<Provider> for ProviderResponse {
    fn from(p: Provider) -> Self {
        Self {
            id: *p.id.as_uuid(),
            name: p.name,
            title: p.title,
            category: p.category,
            specialties: p.specialties,
            experience_years: p.experience_years,
            rating: p.rating,
            review_count: p.review_count,
            fee: p.fee,
            languages: p.languages,
            bio: p.bio,
            education: p.education,
            current_work: p.current_work,
            image: p.image,
            verified: p.verified,
        }
    }
}

/// Response for the provider listing.
#[derive(Debug, Serialize)]
pub struct ListProvidersResponse {
    /// Providers, name ascending
    pub providers: Vec<ProviderResponse>,
    /// Count
    pub total: usize,
}

/// List the provider catalog, optionally filtered by category.
///
/// # Errors
///
/// Returns 500 for storage failures.
pub async fn list_providers(
    State(state): State<AppState>,
    Query(query): Query<ProvidersQuery>,
) -> Result<Json<ListProvidersResponse>, AppError> {
    ensure_providers(state.providers.as_ref())
        .await
        .map_err(carebook_core::BookingError::from)?;

    let providers = state
        .providers
        .list(query.category)
        .await
        .map_err(carebook_core::BookingError::from)?;

    let providers: Vec<ProviderResponse> =
        providers.into_iter().map(ProviderResponse::from).collect();
    let total = providers.len();

    Ok(Json(ListProvidersResponse { providers, total }))
}
