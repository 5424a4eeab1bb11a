//! Pitchforge Server
//!
//! Axum server that embeds the presentation page and exposes the deck API:
//! catalog lookups, a generate endpoint that spawns the pipeline, a status
//! snapshot, an SSE event stream, reset, and credential settings. Also a
//! CLI mode that runs the pipeline without a server.

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode, Uri},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use futures::stream::{self, Stream};
use pitchforge_core::catalog::{Language, PitchTemplate, VisualStyle};
use pitchforge_core::coordinator::{DeckCoordinator, DeckSlot};
use pitchforge_core::deck::BrandIdentity;
use pitchforge_core::events::{DeckEvent, DeckEventKind};
use pitchforge_core::gemini::{CredentialStore, GeminiClient, GenerationBackend};
use pitchforge_core::models::{DeckRequest, ModelConfig};
use pitchforge_core::pipeline::{invalidate_runs, DeckStage, PipelineState, RunGeneration};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::atomic::AtomicU64, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc, RwLock},
};
use utoipa::{OpenApi, ToSchema};

/// Embedded presentation page
#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// Application state
struct AppState {
    backend: Arc<GeminiClient>,
    credentials: CredentialStore,
    /// Working deck for the current run; the filler mutates it in place
    deck: DeckSlot,
    /// Observable pipeline snapshot, folded from the event stream
    status: RwLock<PipelineState>,
    event_tx: broadcast::Sender<DeckEvent>,
    /// Bumped on reset so superseded runs go silent
    run_generation: RunGeneration,
}

type SharedState = Arc<AppState>;

// === API Types ===

#[derive(Serialize, ToSchema)]
struct ApiResponse {
    success: bool,
    message: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    idea: String,
    template: String,
    style: String,
    #[serde(default)]
    language: Option<String>,
    #[schema(value_type = Option<Object>)]
    #[serde(default)]
    brand: Option<BrandIdentity>,
    #[serde(default)]
    custom_style: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct TemplateInfo {
    id: String,
    name: String,
    description: String,
    slide_count: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct StyleInfo {
    id: String,
    name: String,
    description: String,
}

#[derive(Serialize, ToSchema)]
struct LanguageInfo {
    id: String,
    name: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CredentialsResponse {
    has_key: bool,
}

#[derive(Deserialize, ToSchema)]
struct ApiKeyRequest {
    key: String,
}

// === CLI ===

#[derive(Parser, Clone)]
#[command(author, version, about = "Pitchforge - AI pitch deck generator")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the Pitchforge server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Generate a deck from the command line (no server)
    Run {
        /// The startup idea to pitch
        idea: String,
        /// Framework id (e.g. sequoia, yc, kawasaki)
        #[arg(short, long, default_value = "sequoia")]
        template: String,
        /// Visual style id (e.g. corporate, tech_minimal)
        #[arg(short, long, default_value = "corporate")]
        style: String,
        /// Output language id (e.g. en, de)
        #[arg(short, long, default_value = "en")]
        language: String,
        /// Free-text style modifier (required when --style custom)
        #[arg(long)]
        custom_style: Option<String>,
    },
}

// === OpenAPI ===

#[derive(OpenApi)]
#[openapi(
    paths(
        get_status,
        generate_deck,
        reset_deck,
        get_deck,
        list_templates,
        list_styles,
        list_languages,
        get_credentials,
        save_api_key
    ),
    components(schemas(
        ApiResponse,
        GenerateRequest,
        TemplateInfo,
        StyleInfo,
        LanguageInfo,
        CredentialsResponse,
        ApiKeyRequest
    )),
    tags(
        (name = "deck", description = "Deck generation pipeline"),
        (name = "catalog", description = "Frameworks, styles, languages"),
        (name = "settings", description = "Credential management")
    )
)]
struct ApiDoc;

// === Catalog Handlers ===

/// List pitch frameworks
#[utoipa::path(
    get,
    path = "/api/v1/catalog/templates",
    tag = "catalog",
    responses((status = 200, description = "Available pitch frameworks", body = [TemplateInfo]))
)]
async fn list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        PitchTemplate::all()
            .into_iter()
            .map(|t| TemplateInfo {
                id: t.id().to_string(),
                name: t.name().to_string(),
                description: t.description().to_string(),
                slide_count: t.slide_count(),
            })
            .collect(),
    )
}

/// List visual styles
#[utoipa::path(
    get,
    path = "/api/v1/catalog/styles",
    tag = "catalog",
    responses((status = 200, description = "Available visual styles", body = [StyleInfo]))
)]
async fn list_styles() -> Json<Vec<StyleInfo>> {
    Json(
        VisualStyle::all()
            .into_iter()
            .map(|s| StyleInfo {
                id: s.id().to_string(),
                name: s.name().to_string(),
                description: s.description().to_string(),
            })
            .collect(),
    )
}

/// List output languages
#[utoipa::path(
    get,
    path = "/api/v1/catalog/languages",
    tag = "catalog",
    responses((status = 200, description = "Available output languages", body = [LanguageInfo]))
)]
async fn list_languages() -> Json<Vec<LanguageInfo>> {
    Json(
        Language::all()
            .into_iter()
            .map(|l| LanguageInfo {
                id: l.id().to_string(),
                name: l.display_name().to_string(),
            })
            .collect(),
    )
}

// === Deck Handlers ===

fn parse_template(id: &str) -> Option<PitchTemplate> {
    PitchTemplate::all().into_iter().find(|t| t.id() == id)
}

fn parse_style(id: &str) -> Option<VisualStyle> {
    VisualStyle::all().into_iter().find(|s| s.id() == id)
}

fn parse_language(id: &str) -> Option<Language> {
    Language::all().into_iter().find(|l| l.id() == id)
}

/// Get the current pipeline state snapshot
#[utoipa::path(
    get,
    path = "/api/v1/deck/status",
    tag = "deck",
    responses((status = 200, description = "Current pipeline state"))
)]
async fn get_status(State(state): State<SharedState>) -> Json<PipelineState> {
    let mut snapshot = state.status.read().await.clone();
    snapshot.deck = state.deck.read().await.clone();
    Json(snapshot)
}

/// Get the current deck (404 until refinement completes)
#[utoipa::path(
    get,
    path = "/api/v1/deck/current",
    tag = "deck",
    responses(
        (status = 200, description = "The working deck"),
        (status = 404, description = "No deck generated yet")
    )
)]
async fn get_deck(State(state): State<SharedState>) -> impl IntoResponse {
    match state.deck.read().await.clone() {
        Some(deck) => (
            StatusCode::OK,
            Json(serde_json::to_value(&deck).unwrap_or_default()),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no deck generated yet" })),
        ),
    }
}

/// Fold one pipeline event into the observable status snapshot.
async fn apply_event(state: &SharedState, event: &DeckEvent) {
    let mut status = state.status.write().await;
    match event.kind {
        DeckEventKind::StageChanged => {
            status.stage = event.stage;
        }
        DeckEventKind::ImageProgress => {
            if let Some(percent) = event.data.as_ref().and_then(|d| d["percent"].as_f64()) {
                status.progress = percent as f32;
            }
        }
        DeckEventKind::PipelineCompleted => {
            status.stage = DeckStage::Complete;
            status.progress = 100.0;
        }
        DeckEventKind::PipelineFailed => {
            status.stage = DeckStage::Idle;
            status.progress = 0.0;
            status.error = event
                .data
                .as_ref()
                .and_then(|d| d["error"].as_str())
                .map(String::from);
        }
        _ => {}
    }
}

/// Start a deck generation run
#[utoipa::path(
    post,
    path = "/api/v1/deck/generate",
    tag = "deck",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Run started", body = ApiResponse),
        (status = 400, description = "Invalid submission", body = ApiResponse),
        (status = 409, description = "A run is already in progress", body = ApiResponse)
    )
)]
async fn generate_deck(
    State(state): State<SharedState>,
    Json(req): Json<GenerateRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let reject = |message: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                success: false,
                message,
            }),
        )
    };

    let Some(template) = parse_template(&req.template) else {
        return reject(format!("Unknown template '{}'", req.template));
    };
    let Some(style) = parse_style(&req.style) else {
        return reject(format!("Unknown style '{}'", req.style));
    };
    let language = match req.language.as_deref() {
        None => Language::En,
        Some(id) => match parse_language(id) {
            Some(language) => language,
            None => return reject(format!("Unknown language '{id}'")),
        },
    };

    let request = DeckRequest {
        idea: req.idea,
        template,
        style,
        language,
        brand: req.brand.unwrap_or_default(),
        custom_style: req.custom_style,
    };
    // Unusable submissions are rejected here, before any network call.
    if let Err(message) = request.validate() {
        return reject(message);
    }

    {
        let status = state.status.read().await;
        if !matches!(status.stage, DeckStage::Idle | DeckStage::Complete) {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse {
                    success: false,
                    message: "A generation run is already in progress".to_string(),
                }),
            );
        }
    }

    // Claim the pipeline and clear the previous run's working state.
    {
        let mut status = state.status.write().await;
        status.stage = DeckStage::CheckingCredentials;
        status.idea = request.idea.clone();
        status.error = None;
        status.progress = 0.0;
    }
    *state.deck.write().await = None;

    let (event_tx, mut event_rx) = mpsc::channel::<DeckEvent>(100);

    // Bridge events to broadcast, folding each into the status snapshot.
    let broadcast_tx = state.event_tx.clone();
    let state_fold = Arc::clone(&state);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            apply_event(&state_fold, &event).await;
            let _ = broadcast_tx.send(event);
        }
    });

    // Run the coordinator.
    let backend = Arc::clone(&state.backend) as Arc<dyn GenerationBackend>;
    let mut coordinator = DeckCoordinator::new(backend, &state.run_generation)
        .with_event_channel(event_tx)
        .with_deck_slot(Arc::clone(&state.deck));
    let idea = request.idea.clone();
    tokio::spawn(async move {
        match coordinator.run(request).await {
            Ok(deck) => {
                tracing::info!(slides = deck.slides.len(), "deck run complete");
            }
            Err(e) => {
                tracing::warn!("deck run failed: {e}");
            }
        }
    });

    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            message: format!("Deck generation started for: {idea}"),
        }),
    )
}

/// Reset the pipeline to idle, discarding the current deck
#[utoipa::path(
    post,
    path = "/api/v1/deck/reset",
    tag = "deck",
    responses((status = 200, description = "Pipeline reset", body = ApiResponse))
)]
async fn reset_deck(State(state): State<SharedState>) -> Json<ApiResponse> {
    // Invalidate run tokens first so anything in flight settles silently.
    invalidate_runs(&state.run_generation);
    *state.deck.write().await = None;
    *state.status.write().await = PipelineState::default();

    Json(ApiResponse {
        success: true,
        message: "Pipeline reset".to_string(),
    })
}

/// SSE endpoint for real-time events with heartbeat
async fn deck_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        let timeout = tokio::time::timeout(std::time::Duration::from_secs(15), rx.recv()).await;
        match timeout {
            Ok(Ok(event)) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Ok(Err(_)) => None, // Channel closed
            Err(_) => {
                // Timeout - send heartbeat comment
                Some((Ok(Event::default().comment("heartbeat")), rx))
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// === Settings Handlers ===

/// Probe for a credential session
#[utoipa::path(
    get,
    path = "/api/v1/credentials",
    tag = "settings",
    responses((status = 200, description = "Credential presence", body = CredentialsResponse))
)]
async fn get_credentials(State(state): State<SharedState>) -> Json<CredentialsResponse> {
    Json(CredentialsResponse {
        has_key: state.credentials.has_key().await,
    })
}

/// Save the API key to .pitchforge/.env and the live credential store
#[utoipa::path(
    post,
    path = "/api/v1/settings/api-key",
    tag = "settings",
    request_body = ApiKeyRequest,
    responses((status = 200, description = "API key saved", body = ApiResponse))
)]
async fn save_api_key(
    State(state): State<SharedState>,
    Json(req): Json<ApiKeyRequest>,
) -> Json<ApiResponse> {
    use std::fs;
    use std::path::Path;

    let key = req.key.trim();
    if key.is_empty() {
        return Json(ApiResponse {
            success: false,
            message: "API key is empty".to_string(),
        });
    }

    let dir = Path::new(".pitchforge");
    if let Err(e) = fs::create_dir_all(dir) {
        return Json(ApiResponse {
            success: false,
            message: format!("Failed to create .pitchforge directory: {e}"),
        });
    }
    // Keep the key out of version control.
    let _ = fs::write(dir.join(".gitignore"), "*\n");
    if let Err(e) = fs::write(dir.join(".env"), format!("GEMINI_API_KEY={key}\n")) {
        return Json(ApiResponse {
            success: false,
            message: format!("Failed to write key file: {e}"),
        });
    }

    state.credentials.set_key(key).await;
    Json(ApiResponse {
        success: true,
        message: "API key saved".to_string(),
    })
}

// === Static Assets ===

async fn serve_openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn serve_static(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if let Some(file) = Assets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime.as_ref())
            .body(Body::from(file.data.to_vec()))
            .unwrap();
    }

    // SPA fallback
    if let Some(file) = Assets::get("index.html") {
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html")
            .body(Body::from(file.data.to_vec()))
            .unwrap();
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("Not Found"))
        .unwrap()
}

// === Server Entry ===

pub async fn run_server(port: u16) -> anyhow::Result<()> {
    let (event_tx, _) = broadcast::channel::<DeckEvent>(100);
    let credentials = CredentialStore::from_env();
    let backend = Arc::new(GeminiClient::new(credentials.clone(), ModelConfig::default()));

    let state: SharedState = Arc::new(AppState {
        backend,
        credentials,
        deck: Arc::new(RwLock::new(None)),
        status: RwLock::new(PipelineState::default()),
        event_tx,
        run_generation: Arc::new(AtomicU64::new(0)),
    });

    let catalog_routes = Router::new()
        .route("/templates", get(list_templates))
        .route("/styles", get(list_styles))
        .route("/languages", get(list_languages));

    let deck_routes = Router::new()
        .route("/status", get(get_status))
        .route("/generate", post(generate_deck))
        .route("/reset", post(reset_deck))
        .route("/current", get(get_deck))
        .route("/events", get(deck_events));

    let settings_routes = Router::new().route("/api-key", post(save_api_key));

    let app = Router::new()
        .nest("/api/v1/catalog", catalog_routes)
        .nest("/api/v1/deck", deck_routes)
        .nest("/api/v1/settings", settings_routes)
        .route("/api/v1/credentials", get(get_credentials))
        .route("/api/v1/openapi.json", get(serve_openapi))
        .fallback(get(serve_static))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("🚀 Pitchforge running at http://{}", addr);
    println!("   Deck:     /api/v1/deck/generate, /status, /events, /reset");
    println!("   Catalog:  /api/v1/catalog/templates, /styles, /languages");
    println!("   Settings: /api/v1/settings/api-key");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === CLI Entry ===

fn stage_label(stage: DeckStage) -> &'static str {
    match stage {
        DeckStage::Idle => "idle",
        DeckStage::CheckingCredentials => "checking credentials",
        DeckStage::Drafting => "drafting initial pitch",
        DeckStage::Critiquing => "adversarial review",
        DeckStage::Refining => "rebuilding stronger",
        DeckStage::GeneratingImages => "generating slide imagery",
        DeckStage::Complete => "complete",
    }
}

async fn run_cli(
    idea: String,
    template: String,
    style: String,
    language: String,
    custom_style: Option<String>,
) -> anyhow::Result<()> {
    let template = parse_template(&template)
        .ok_or_else(|| anyhow::anyhow!("unknown template '{template}'"))?;
    let style = parse_style(&style).ok_or_else(|| anyhow::anyhow!("unknown style '{style}'"))?;
    let language = parse_language(&language)
        .ok_or_else(|| anyhow::anyhow!("unknown language '{language}'"))?;

    let request = DeckRequest {
        idea,
        template,
        style,
        language,
        brand: BrandIdentity::default(),
        custom_style,
    };
    request.validate().map_err(|message| anyhow::anyhow!(message))?;

    let credentials = CredentialStore::from_env();
    let backend: Arc<dyn GenerationBackend> =
        Arc::new(GeminiClient::new(credentials, ModelConfig::default()));

    let (event_tx, mut event_rx) = mpsc::channel::<DeckEvent>(100);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event.kind {
                DeckEventKind::StageChanged => eprintln!("▶ {}", stage_label(event.stage)),
                DeckEventKind::CritiqueReady => {
                    if let Some(preview) = event.data.as_ref().and_then(|d| d["preview"].as_str())
                    {
                        eprintln!("  critique: {preview}...");
                    }
                }
                DeckEventKind::ImageProgress => {
                    if let Some(percent) = event.data.as_ref().and_then(|d| d["percent"].as_f64())
                    {
                        eprintln!("  images: {percent:.0}%");
                    }
                }
                DeckEventKind::PipelineFailed => {
                    if let Some(error) = event.data.as_ref().and_then(|d| d["error"].as_str()) {
                        eprintln!("✗ {error}");
                    }
                }
                _ => {}
            }
        }
    });

    let generation: RunGeneration = Arc::new(AtomicU64::new(0));
    let mut coordinator = DeckCoordinator::new(backend, &generation).with_event_channel(event_tx);
    let deck = coordinator.run(request).await?;
    drop(coordinator);
    let _ = printer.await;

    println!("{}", serde_json::to_string_pretty(&deck)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A key saved via the settings endpoint lands in .pitchforge/.env.
    let _ = dotenvy::from_path(".pitchforge/.env");
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Run {
            idea,
            template,
            style,
            language,
            custom_style,
        }) => run_cli(idea, template, style, language, custom_style).await,
        Some(CliCommand::Serve { port }) => run_server(port).await,
        None => run_server(8080).await,
    }
}
