//! HTML templates and the view models they render

use askama::Template;

use crate::{
    nav::Shell,
    reset_flow::ResetState,
    search::{BRAZILIAN_STATES, Field, SearchCriteria, SearchForm, Toast, state_name},
    validation::MIN_SECRET_LEN,
};

/// Stylesheet served at `/static/portal.css`
pub const STYLESHEET: &str = include_str!("../static/portal.css");

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub redirect: String,
    pub remember: bool,
}

#[derive(Template)]
#[template(path = "reset_request.html")]
pub struct ResetRequestTemplate<'a> {
    pub email: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "reset_sent.html")]
pub struct ResetSentTemplate<'a> {
    pub email: &'a str,
}

#[derive(Template)]
#[template(path = "reset_new_secret.html")]
pub struct NewSecretTemplate<'a> {
    pub code: &'a str,
    pub error: Option<&'a str>,
    pub min_len: usize,
}

#[derive(Template)]
#[template(path = "reset_done.html")]
pub struct ResetDoneTemplate;

/// Render the page for the current reset state
pub fn render_reset(state: &ResetState) -> askama::Result<String> {
    match state {
        ResetState::Idle { email, error } => ResetRequestTemplate {
            email,
            error: error.as_deref(),
        }
        .render(),
        ResetState::RequestSent { email } => ResetSentTemplate { email }.render(),
        ResetState::AwaitingNewSecret { code, error } => NewSecretTemplate {
            code,
            error: error.as_deref(),
            min_len: MIN_SECRET_LEN,
        }
        .render(),
        ResetState::Completed => ResetDoneTemplate.render(),
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub title: String,
    pub subtitle: String,
}

#[derive(Template)]
#[template(path = "agent.html")]
pub struct AgentTemplate {
    pub shell: Shell,
    pub title: String,
    pub subtitle: String,
    /// False when the CMS has no agent content published
    pub content_available: bool,
    pub how_it_works: Option<String>,
    pub form: FormView,
    pub examples: Vec<ExampleView>,
    pub toasts: Vec<ToastView>,
}

/// Text input as rendered
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub value: String,
    pub error: Option<&'static str>,
}

pub struct StateOption {
    pub code: &'static str,
    pub name: &'static str,
    pub selected: bool,
}

/// Search form as rendered
pub struct FormView {
    pub text_fields: Vec<FieldView>,
    pub state_field: FieldView,
    pub state_options: Vec<StateOption>,
    pub completion: u8,
    pub complete: bool,
    /// Values carried by the retry action
    pub criteria: SearchCriteria,
}

impl FormView {
    pub fn from_form(form: &SearchForm) -> Self {
        let field_view = |field: Field| FieldView {
            name: field.name(),
            label: field.label(),
            placeholder: field.placeholder(),
            value: form.criteria().get(field).to_string(),
            error: form.error(field),
        };

        let selected = form.criteria().state_code.as_str();

        Self {
            text_fields: [Field::Group, Field::Brand, Field::City]
                .into_iter()
                .map(field_view)
                .collect(),
            state_field: field_view(Field::State),
            state_options: BRAZILIAN_STATES
                .iter()
                .map(|s| StateOption {
                    code: s.code,
                    name: s.name,
                    selected: s.code == selected,
                })
                .collect(),
            completion: form.completion_percentage(),
            complete: form.is_complete(),
            criteria: form.criteria().clone(),
        }
    }
}

/// Autofill button
pub struct ExampleView {
    pub index: usize,
    pub group: String,
    pub summary: String,
}

impl ExampleView {
    pub fn list(examples: &[SearchCriteria]) -> Vec<Self> {
        examples
            .iter()
            .enumerate()
            .map(|(index, example)| ExampleView {
                index,
                group: example.group.clone(),
                summary: format!(
                    "{} · {}, {}",
                    example.brand,
                    example.city,
                    state_name(&example.state_code).unwrap_or(&example.state_code)
                ),
            })
            .collect()
    }
}

pub struct ToastView {
    pub kind: &'static str,
    pub title: String,
    pub description: Option<String>,
    pub retry: bool,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            kind: toast.kind.as_str(),
            title: toast.title.clone(),
            description: toast.description.clone(),
            retry: toast.retry,
        }
    }
}
