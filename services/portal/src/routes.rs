//! Portal routes

use askama::Template;
use axum::{
    Json, Router,
    extract::{Form, Query, State},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use common::{
    cms::{AgentContent, SiteLabels},
    storage::StorageScope,
};
use serde::Deserialize;
use tower_cookies::{CookieManagerLayer, Cookies};
use tracing::{info, warn};

use crate::{
    credentials::{AuthError, sign_in},
    error::PortalResult,
    middleware::{HOME_ROUTE, require_session, safe_redirect},
    nav::{Shell, sign_out},
    reset_flow::ResetState,
    search::{SearchCriteria, SearchForm, SubmitOutcome, available_examples},
    state::AppState,
    templates::{
        AgentTemplate, ExampleView, FormView, HomeTemplate, LoginTemplate, STYLESHEET, ToastView,
        render_reset,
    },
};

const AGENT_ROUTE: &str = "/agente";

/// Login form submission
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Present when "remember me" is checked
    pub remember: Option<String>,
    pub redirect: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RedirectQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ResetQuery {
    pub code: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct EmailForm {
    pub email: String,
}

/// New password submission
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ConfirmForm {
    pub code: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct ExampleForm {
    pub index: usize,
}

/// Create the router for the portal
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(HOME_ROUTE, get(home))
        .route(AGENT_ROUTE, get(agent_page))
        .route("/agente/search", post(submit_search))
        .route("/agente/example", post(fill_example))
        .route("/agente/clear", post(clear_search))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(protected)
        .route("/health", get(health_check))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/reset-password", get(reset_page).post(request_reset))
        .route("/reset-password/resend", post(resend_reset))
        .route("/reset-password/confirm", get(reset_page).post(confirm_reset))
        .route("/static/portal.css", get(stylesheet))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "portal"
    }))
}

pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}

/// Login page; signed-in users go straight to their destination
pub async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<RedirectQuery>,
) -> PortalResult<Response> {
    let redirect = safe_redirect(query.redirect.as_deref());

    if let Some(session) = state.session_store(cookies).load() {
        info!("Already signed in: {}", session.profile.email);
        return Ok(Redirect::to(&redirect).into_response());
    }

    let page = LoginTemplate {
        email: String::new(),
        error: None,
        redirect,
        remember: true,
    };

    Ok(Html(page.render()?).into_response())
}

/// Login form submission
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> PortalResult<Response> {
    let remember = form.remember.is_some();
    let scope = if remember {
        StorageScope::Persistent
    } else {
        StorageScope::Tab
    };
    let redirect = safe_redirect(form.redirect.as_deref());

    let store = state.session_store(cookies);
    match sign_in(state.auth.as_ref(), &store, &form.email, &form.password, scope).await {
        Ok(session) => {
            info!("User signed in: {}", session.profile.email);
            Ok(Redirect::to(&redirect).into_response())
        }
        Err(e) => {
            let status = match e {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::Rejected(_) => StatusCode::UNAUTHORIZED,
                AuthError::Unavailable => StatusCode::BAD_GATEWAY,
                AuthError::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            };

            let page = LoginTemplate {
                email: form.email.trim().to_string(),
                error: Some(e.to_string()),
                redirect,
                remember,
            };

            Ok((status, Html(page.render()?)).into_response())
        }
    }
}

/// Clear the session and return to the login page
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let next = sign_out(&state.session_store(cookies));
    Redirect::to(next)
}

/// Reset page: the email form, or the new-password form when the link carries a code
pub async fn reset_page(Query(query): Query<ResetQuery>) -> PortalResult<Html<String>> {
    let state = ResetState::initial(query.code.as_deref());
    Ok(Html(render_reset(&state)?))
}

pub async fn request_reset(
    State(state): State<AppState>,
    Form(form): Form<EmailForm>,
) -> PortalResult<Html<String>> {
    let next = ResetState::initial(None)
        .request_reset(state.auth.as_ref(), &form.email)
        .await;
    Ok(Html(render_reset(&next)?))
}

/// "Try again" from the confirmation screen
pub async fn resend_reset(Form(form): Form<EmailForm>) -> PortalResult<Html<String>> {
    let next = ResetState::RequestSent { email: form.email }.resend();
    Ok(Html(render_reset(&next)?))
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    Form(form): Form<ConfirmForm>,
) -> PortalResult<Html<String>> {
    let next = ResetState::initial(Some(&form.code))
        .confirm(
            state.auth.as_ref(),
            &form.password,
            &form.password_confirmation,
        )
        .await;

    if !next.is_completed() {
        info!(
            "Password reset not completed: {}",
            next.error().unwrap_or("missing reset code")
        );
    }

    Ok(Html(render_reset(&next)?))
}

/// Welcome page
pub async fn home(State(state): State<AppState>, cookies: Cookies) -> PortalResult<Html<String>> {
    let shell = Shell::load(&state.session_store(cookies), HOME_ROUTE);
    let labels = load_labels(&state).await;

    let page = HomeTemplate {
        shell,
        title: labels.text_or("welcomeTitle", "Bem-vindo ao Dealer Space"),
        subtitle: labels.text_or(
            "welcomeSubtitle",
            "Selecione uma ferramenta no menu lateral para começar.",
        ),
    };

    Ok(Html(page.render()?))
}

pub async fn agent_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> PortalResult<Html<String>> {
    render_agent(&state, cookies, &SearchForm::new()).await
}

pub async fn submit_search(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(criteria): Form<SearchCriteria>,
) -> PortalResult<Response> {
    let mut form = SearchForm::with_criteria(criteria);
    let status = match form.submit(state.webhook.as_ref()).await {
        SubmitOutcome::Sent => StatusCode::OK,
        SubmitOutcome::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Failed => StatusCode::BAD_GATEWAY,
    };

    let page = render_agent(&state, cookies, &form).await?;
    Ok((status, page).into_response())
}

/// Autofill the form with one of the offered examples
pub async fn fill_example(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(choice): Form<ExampleForm>,
) -> PortalResult<Html<String>> {
    let agent = load_agent_content(&state).await;
    let examples = examples_for(agent.as_ref());

    let mut form = SearchForm::new();
    match examples.get(choice.index) {
        Some(example) => form.fill_example(example),
        None => warn!("Unknown example index: {}", choice.index),
    }

    render_agent_with(&state, cookies, &form, agent).await
}

pub async fn clear_search(
    State(state): State<AppState>,
    cookies: Cookies,
) -> PortalResult<Html<String>> {
    let mut form = SearchForm::new();
    form.clear();
    render_agent(&state, cookies, &form).await
}

async fn render_agent(
    state: &AppState,
    cookies: Cookies,
    form: &SearchForm,
) -> PortalResult<Html<String>> {
    let agent = load_agent_content(state).await;
    render_agent_with(state, cookies, form, agent).await
}

async fn render_agent_with(
    state: &AppState,
    cookies: Cookies,
    form: &SearchForm,
    agent: Option<AgentContent>,
) -> PortalResult<Html<String>> {
    let shell = Shell::load(&state.session_store(cookies), AGENT_ROUTE);
    let labels = load_labels(state).await;

    let subtitle = agent
        .as_ref()
        .and_then(AgentContent::subtitle)
        .or_else(|| labels.get("siteSubtitle"))
        .unwrap_or_default()
        .to_string();

    let page = AgentTemplate {
        shell,
        title: labels.text_or("headerTitle", "Agentes DealerSpace"),
        subtitle,
        content_available: agent.is_some(),
        how_it_works: agent
            .as_ref()
            .and_then(AgentContent::how_it_works)
            .map(str::to_string),
        form: FormView::from_form(form),
        examples: ExampleView::list(&examples_for(agent.as_ref())),
        toasts: form.toasts().iter().map(ToastView::from).collect(),
    };

    Ok(Html(page.render()?))
}

fn examples_for(agent: Option<&AgentContent>) -> Vec<SearchCriteria> {
    available_examples(agent.map(AgentContent::quick_examples).unwrap_or_default())
}

/// Site labels, or none when the CMS is unreachable
async fn load_labels(state: &AppState) -> SiteLabels {
    state.content.site_labels().await.unwrap_or_else(|e| {
        warn!("Site labels unavailable, using defaults: {}", e);
        SiteLabels::default()
    })
}

async fn load_agent_content(state: &AppState) -> Option<AgentContent> {
    match state.content.agent_content().await {
        Ok(content) => content,
        Err(e) => {
            warn!("Agent content unavailable: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cookies::{CookieSettings, cookie_name},
        credentials::AuthResponse,
        session::{PROFILE_KEY, TOKEN_KEY},
        testing::{FakeAuthApi, RecordingWebhook, StaticContent},
    };
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SESSION_COOKIE: &str = "ds_persist_strapi_jwt=jwt-token";

    fn app_state(auth: Arc<FakeAuthApi>, webhook: Arc<RecordingWebhook>) -> AppState {
        AppState {
            auth,
            content: Arc::new(StaticContent::default()),
            webhook,
            cookie_settings: CookieSettings::default(),
        }
    }

    fn app() -> Router {
        create_router(app_state(
            Arc::new(FakeAuthApi::default()),
            Arc::new(RecordingWebhook::accepting()),
        ))
    }

    fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app().oneshot(get_request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_page_redirects_without_session() {
        let response = app().oneshot(get_request("/agente", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?redirect=%2Fagente");
    }

    #[tokio::test]
    async fn test_protected_page_renders_with_session() {
        let response = app()
            .oneshot(get_request("/agente", Some(SESSION_COOKIE)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Agentes DealerSpace"));
        assert!(html.contains("Conteúdo do agente não disponível"));
        assert!(html.contains("action=\"/logout\""));
    }

    #[tokio::test]
    async fn test_login_sets_persistent_session_cookie() {
        let auth = FakeAuthApi::with_login(Ok(serde_json::from_value::<AuthResponse>(json!({
            "jwt": "jwt-token",
            "user": { "username": "maria", "email": "maria@dealerspace.com" }
        }))
        .unwrap()));
        let app = create_router(app_state(Arc::new(auth), Arc::new(RecordingWebhook::accepting())));

        let response = app
            .oneshot(form_post(
                "/login",
                "email=maria%40dealerspace.com&password=secret1&remember=on&redirect=%2Fagente",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/agente");

        let token_cookie = format!("{}=jwt-token", cookie_name(StorageScope::Persistent, TOKEN_KEY));
        assert!(
            set_cookies(&response)
                .iter()
                .any(|c| c.starts_with(&token_cookie) && c.contains("Max-Age"))
        );
    }

    #[tokio::test]
    async fn test_login_without_remember_uses_tab_scope() {
        let auth = FakeAuthApi::with_login(Ok(serde_json::from_value::<AuthResponse>(json!({
            "jwt": "jwt-token"
        }))
        .unwrap()));
        let app = create_router(app_state(Arc::new(auth), Arc::new(RecordingWebhook::accepting())));

        let response = app
            .oneshot(form_post("/login", "email=a%40b.com&password=secret1", None))
            .await
            .unwrap();

        let token_cookie = format!("{}=jwt-token", cookie_name(StorageScope::Tab, TOKEN_KEY));
        let cookies = set_cookies(&response);
        let cookie = cookies.iter().find(|c| c.starts_with(&token_cookie)).unwrap();
        assert!(!cookie.contains("Max-Age"));
    }

    #[tokio::test]
    async fn test_rejected_login_shows_message() {
        let auth = FakeAuthApi::with_login(Ok(serde_json::from_value::<AuthResponse>(json!({
            "error": { "message": "Invalid identifier or password" }
        }))
        .unwrap()));
        let app = create_router(app_state(Arc::new(auth), Arc::new(RecordingWebhook::accepting())));

        let response = app
            .oneshot(form_post("/login", "email=a%40b.com&password=wrong", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response).is_empty());
        assert!(body_text(response).await.contains("Invalid identifier or password"));
    }

    #[tokio::test]
    async fn test_empty_search_field_is_flagged_without_webhook_call() {
        let webhook = Arc::new(RecordingWebhook::accepting());
        let app = create_router(app_state(Arc::new(FakeAuthApi::default()), webhook.clone()));

        let response = app
            .oneshot(form_post(
                "/agente/search",
                "grupo=Startups&marca=iFood&cidade=&estado=PR",
                Some(SESSION_COOKIE),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Campo obrigatório"));
        assert!(html.contains("class=\"field field-invalid\""));
        assert!(html.contains("classList.remove(\"field-invalid\")"));
        assert_eq!(webhook.calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_search_reaches_webhook() {
        let webhook = Arc::new(RecordingWebhook::accepting());
        let app = create_router(app_state(Arc::new(FakeAuthApi::default()), webhook.clone()));

        let response = app
            .oneshot(form_post(
                "/agente/search",
                "grupo=Startups&marca=iFood&cidade=Curitiba&estado=PR",
                Some(SESSION_COOKIE),
            ))
            .await
            .unwrap();

        assert!(body_text(response).await.contains("Busca enviada com sucesso!"));
        assert_eq!(
            webhook.submitted(),
            vec![SearchCriteria::new("Startups", "iFood", "Curitiba", "PR")]
        );
    }

    #[tokio::test]
    async fn test_example_uses_cms_entries() {
        let agent = AgentContent::from_entry(json!({
            "AgentITFolksContent": [{ "subITFolks": "Encontre leads" }],
            "quickExample": [
                { "grupo": "Concessionárias", "marca": "Fiat", "cidade": "Betim", "estado": "MG" }
            ]
        }));
        let state = AppState {
            content: Arc::new(StaticContent { labels: None, agent }),
            ..app_state(Arc::new(FakeAuthApi::default()), Arc::new(RecordingWebhook::accepting()))
        };

        let response = create_router(state)
            .oneshot(form_post("/agente/example", "index=0", Some(SESSION_COOKIE)))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("value=\"Concessionárias\""));
        assert!(html.contains("Encontre leads"));
        assert!(html.contains("Exemplo preenchido!"));
    }

    #[tokio::test]
    async fn test_logout_removes_session_cookies_in_both_scopes() {
        let cookie = "ds_persist_strapi_jwt=jwt-token; ds_persist_user=%7B%7D; \
                      ds_tab_strapi_jwt=jwt-token; ds_tab_user=%7B%7D";
        let response = app()
            .oneshot(form_post("/logout", "", Some(cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let removals = set_cookies(&response);
        for scope in StorageScope::ALL {
            for key in [TOKEN_KEY, PROFILE_KEY] {
                let prefix = format!("{}=;", cookie_name(scope, key));
                assert!(
                    removals
                        .iter()
                        .any(|c| c.starts_with(&prefix) && c.contains("Max-Age=0")),
                    "no removal for {}",
                    prefix
                );
            }
        }
    }

    #[tokio::test]
    async fn test_login_redirect_with_control_characters_goes_home() {
        let auth = FakeAuthApi::with_login(Ok(serde_json::from_value::<AuthResponse>(json!({
            "jwt": "jwt-token"
        }))
        .unwrap()));
        let app = create_router(app_state(Arc::new(auth), Arc::new(RecordingWebhook::accepting())));

        let response = app
            .oneshot(form_post(
                "/login",
                "email=a%40b.com&password=secret1&redirect=%2Fa%0Ab",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_signed_in_login_page_refuses_tab_redirect() {
        let response = app()
            .oneshot(get_request(
                "/login?redirect=%2F%09%2Fevil.example",
                Some(SESSION_COOKIE),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_reset_link_opens_new_password_form() {
        let response = app()
            .oneshot(get_request("/reset-password/confirm?code=abc123", None))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("name=\"code\" value=\"abc123\""));
    }

    #[tokio::test]
    async fn test_short_new_password_is_blocked() {
        let auth = Arc::new(FakeAuthApi::default());
        let app = create_router(app_state(auth.clone(), Arc::new(RecordingWebhook::accepting())));

        let response = app
            .oneshot(form_post(
                "/reset-password/confirm",
                "code=abc123&password=12345&password_confirmation=12345",
                None,
            ))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("A senha deve ter pelo menos 6 caracteres."));
        assert!(html.contains("name=\"code\" value=\"abc123\""));
        assert_eq!(auth.reset_calls(), 0);
    }

    #[tokio::test]
    async fn test_reset_request_shows_confirmation() {
        let auth = Arc::new(FakeAuthApi::with_forgot(Ok(())));
        let app = create_router(app_state(auth.clone(), Arc::new(RecordingWebhook::accepting())));

        let response = app
            .oneshot(form_post("/reset-password", "email=maria%40dealerspace.com", None))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("maria@dealerspace.com"));
        assert!(html.contains("action=\"/reset-password/resend\""));
        assert_eq!(auth.forgot_calls(), 1);
    }
}
