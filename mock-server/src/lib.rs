use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const BASE_PATH: &str = "/daa-api/v1";
/// Request body cap. Payloads carry logos inline as base64, so this sits
/// well above the client's 4 MB source-image limit.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Fabricante {
    pub id: String,
    pub nombre: String,
    pub tipo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cerveza {
    pub id: String,
    /// Owning manufacturer; stored, never sent over the wire.
    #[serde(skip)]
    pub id_fabricante: String,
    pub nombre: String,
    pub tipo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub descripcion: String,
    pub grados: f32,
    pub kcal: f32,
    pub is_fav: bool,
}

#[derive(Deserialize)]
pub struct CreateFabricante {
    pub nombre: String,
    #[serde(default)]
    pub logo: String,
    pub tipo: String,
}

#[derive(Deserialize)]
pub struct CreateCerveza {
    pub id_fabricante: String,
    pub nombre: String,
    pub tipo: String,
    #[serde(default)]
    pub logo: String,
    pub descripcion: String,
    pub grados: f32,
    pub kcal: f32,
}

#[derive(Deserialize)]
pub struct UpdateCerveza {
    pub id_cerveza: String,
    pub nombre: String,
    pub tipo: String,
    #[serde(default)]
    pub logo: String,
    pub descripcion: String,
    pub grados: f32,
    pub kcal: f32,
}

#[derive(Deserialize)]
pub struct CervezaId {
    pub id_cerveza: String,
}

#[derive(Deserialize)]
pub struct FabricanteId {
    pub id_fabricante: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FabricantesResponse {
    pub fabricantes: Vec<Fabricante>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CervezasResponse {
    pub cervezas: Option<Vec<Cerveza>>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// In-memory backend data, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Store {
    pub fabricantes: Vec<Fabricante>,
    pub cervezas: Vec<Cerveza>,
}

impl Store {
    fn cervezas_of(&self, id_fabricante: &str) -> Option<Vec<Cerveza>> {
        let list: Vec<Cerveza> = self
            .cervezas
            .iter()
            .filter(|c| c.id_fabricante == id_fabricante)
            .cloned()
            .collect();
        if list.is_empty() {
            None
        } else {
            Some(list)
        }
    }

    fn has_fabricante(&self, id: &str) -> bool {
        self.fabricantes.iter().any(|f| f.id == id)
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub api_key: Arc<str>,
}

type Rejection = (StatusCode, Json<MessageResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

pub fn app(api_key: &str) -> Router {
    app_with_store(api_key, Store::default())
}

/// Router over a pre-populated store.
pub fn app_with_store(api_key: &str, store: Store) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(store)),
        api_key: Arc::from(api_key),
    };
    Router::new()
        .route("/fabricante/getFabricantes", get(list_fabricantes))
        .route("/fabricante/addFabricante", post(add_fabricante))
        .route("/fabricante/deleteFabricante", delete(delete_fabricante))
        .route("/cerveza/getCervezas", get(list_cervezas))
        .route("/cerveza/addCerveza", post(add_cerveza))
        .route("/cerveza/updateCerveza", put(update_cerveza))
        .route("/cerveza/deleteCerveza", delete(delete_cerveza))
        .route("/cerveza/favCerveza", put(fav_cerveza))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

/// Serve the backend under `BASE_PATH`, as the production host does.
pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    run_with_store(listener, api_key, Store::default()).await
}

pub async fn run_with_store(listener: TcpListener, api_key: &str, store: Store) -> Result<(), std::io::Error> {
    let router = Router::new().nest(BASE_PATH, app_with_store(api_key, store));
    axum::serve(listener, router).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(&*state.api_key) {
        tracing::warn!(path = %request.uri().path(), "rejected request without a valid API key");
        return reject(StatusCode::UNAUTHORIZED, "API key inválida").into_response();
    }
    next.run(request).await
}

async fn list_fabricantes(State(state): State<AppState>) -> Json<FabricantesResponse> {
    let store = state.db.read().await;
    Json(FabricantesResponse {
        fabricantes: store.fabricantes.clone(),
        message: "Fabricantes obtenidos".to_string(),
    })
}

async fn add_fabricante(
    State(state): State<AppState>,
    Json(input): Json<CreateFabricante>,
) -> Result<Json<FabricantesResponse>, Rejection> {
    if input.nombre.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "nombre es obligatorio"));
    }
    let fabricante = Fabricante {
        id: Uuid::new_v4().to_string(),
        nombre: input.nombre,
        tipo: input.tipo,
        logo: non_empty(Some(input.logo)),
    };
    tracing::info!(id = %fabricante.id, nombre = %fabricante.nombre, "fabricante added");
    let mut store = state.db.write().await;
    store.fabricantes.push(fabricante);
    Ok(Json(FabricantesResponse {
        fabricantes: store.fabricantes.clone(),
        message: "Fabricante añadido".to_string(),
    }))
}

async fn delete_fabricante(
    State(state): State<AppState>,
    Query(query): Query<FabricanteId>,
) -> Result<Json<MessageResponse>, Rejection> {
    let mut store = state.db.write().await;
    let pos = store
        .fabricantes
        .iter()
        .position(|f| f.id == query.id_fabricante)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Fabricante no encontrado"))?;
    store.fabricantes.remove(pos);
    store.cervezas.retain(|c| c.id_fabricante != query.id_fabricante);
    tracing::info!(id = %query.id_fabricante, "fabricante deleted");
    Ok(Json(MessageResponse {
        message: "Fabricante eliminado".to_string(),
    }))
}

async fn list_cervezas(
    State(state): State<AppState>,
    Query(query): Query<FabricanteId>,
) -> Result<Json<CervezasResponse>, Rejection> {
    let store = state.db.read().await;
    if !store.has_fabricante(&query.id_fabricante) {
        return Err(reject(StatusCode::NOT_FOUND, "Fabricante no encontrado"));
    }
    Ok(Json(CervezasResponse {
        cervezas: store.cervezas_of(&query.id_fabricante),
        message: "Cervezas obtenidas".to_string(),
    }))
}

async fn add_cerveza(
    State(state): State<AppState>,
    Json(input): Json<CreateCerveza>,
) -> Result<Json<MessageResponse>, Rejection> {
    let mut store = state.db.write().await;
    if !store.has_fabricante(&input.id_fabricante) {
        return Err(reject(StatusCode::NOT_FOUND, "Fabricante no encontrado"));
    }
    let cerveza = Cerveza {
        id: Uuid::new_v4().to_string(),
        id_fabricante: input.id_fabricante,
        nombre: input.nombre,
        tipo: input.tipo,
        logo: non_empty(Some(input.logo)),
        descripcion: input.descripcion,
        grados: input.grados,
        kcal: input.kcal,
        is_fav: false,
    };
    tracing::info!(id = %cerveza.id, fabricante = %cerveza.id_fabricante, "cerveza added");
    store.cervezas.push(cerveza);
    Ok(Json(MessageResponse {
        message: "Cerveza añadida".to_string(),
    }))
}

async fn update_cerveza(
    State(state): State<AppState>,
    Json(input): Json<UpdateCerveza>,
) -> Result<Json<CervezasResponse>, Rejection> {
    let mut store = state.db.write().await;
    let cerveza = store
        .cervezas
        .iter_mut()
        .find(|c| c.id == input.id_cerveza)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Cerveza no encontrada"))?;
    cerveza.nombre = input.nombre;
    cerveza.tipo = input.tipo;
    cerveza.logo = non_empty(Some(input.logo));
    cerveza.descripcion = input.descripcion;
    cerveza.grados = input.grados;
    cerveza.kcal = input.kcal;
    let id_fabricante = cerveza.id_fabricante.clone();
    Ok(Json(CervezasResponse {
        cervezas: store.cervezas_of(&id_fabricante),
        message: "Cerveza actualizada".to_string(),
    }))
}

async fn delete_cerveza(
    State(state): State<AppState>,
    Query(query): Query<CervezaId>,
) -> Result<Json<MessageResponse>, Rejection> {
    let mut store = state.db.write().await;
    let pos = store
        .cervezas
        .iter()
        .position(|c| c.id == query.id_cerveza)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Cerveza no encontrada"))?;
    store.cervezas.remove(pos);
    Ok(Json(MessageResponse {
        message: "Cerveza eliminada".to_string(),
    }))
}

async fn fav_cerveza(
    State(state): State<AppState>,
    Json(input): Json<CervezaId>,
) -> Result<Json<CervezasResponse>, Rejection> {
    let mut store = state.db.write().await;
    let cerveza = store
        .cervezas
        .iter_mut()
        .find(|c| c.id == input.id_cerveza)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Cerveza no encontrada"))?;
    cerveza.is_fav = !cerveza.is_fav;
    let id_fabricante = cerveza.id_fabricante.clone();
    Ok(Json(CervezasResponse {
        cervezas: store.cervezas_of(&id_fabricante),
        message: "Favorito actualizado".to_string(),
    }))
}
