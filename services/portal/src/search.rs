//! Lead-search form
//!
//! Holds the four search criteria, their validation errors and the toast
//! notifications produced by the last action. The webhook is only called
//! once every field is filled.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::{
    validation::is_present,
    webhook::{LeadWebhook, describe_failure},
};

/// Error attached to an empty required field
pub const REQUIRED: &str = "Campo obrigatório";

/// One of the four search fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Group,
    Brand,
    City,
    State,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Group, Field::Brand, Field::City, Field::State];

    /// Form and wire name
    pub fn name(&self) -> &'static str {
        match self {
            Field::Group => "grupo",
            Field::Brand => "marca",
            Field::City => "cidade",
            Field::State => "estado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Group => "Grupo ou Segmento",
            Field::Brand => "Marca ou Empresa",
            Field::City => "Cidade",
            Field::State => "Estado",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Group => "Ex: Empresas de tecnologia, Startups, Bancos...",
            Field::Brand => "Ex: Microsoft, Google, Nubank...",
            Field::City => "Ex: São Paulo, Rio de Janeiro...",
            Field::State => "Selecione o estado",
        }
    }
}

/// Criteria posted to the lead-search webhook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    #[serde(rename = "grupo")]
    pub group: String,
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state_code: String,
}

impl SearchCriteria {
    pub fn new(group: &str, brand: &str, city: &str, state_code: &str) -> Self {
        Self {
            group: group.to_string(),
            brand: brand.to_string(),
            city: city.to_string(),
            state_code: state_code.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Group => &self.group,
            Field::Brand => &self.brand,
            Field::City => &self.city,
            Field::State => &self.state_code,
        }
    }

    /// Number of non-blank fields; whitespace-only counts as blank
    pub fn filled_count(&self) -> usize {
        Field::ALL.iter().filter(|f| is_present(self.get(**f))).count()
    }

    /// Criteria from a CMS quick-example entry, when it is complete
    pub fn from_cms_example(value: &Value) -> Option<Self> {
        fn text<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        }

        let state_code = text(value, "estado")?.to_ascii_uppercase();
        state_name(&state_code)?;

        Some(Self::new(
            text(value, "grupo")?,
            text(value, "marca")?,
            text(value, "cidade")?,
            &state_code,
        ))
    }
}

/// Required-field errors, keyed by field
pub type FieldErrors = BTreeMap<Field, &'static str>;

/// Errors for every blank field; empty when the criteria are complete
pub fn validate(criteria: &SearchCriteria) -> FieldErrors {
    Field::ALL
        .into_iter()
        .filter(|field| !is_present(criteria.get(*field)))
        .map(|field| (field, REQUIRED))
        .collect()
}

/// A Brazilian federative unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrazilianState {
    pub code: &'static str,
    pub name: &'static str,
}

const fn uf(code: &'static str, name: &'static str) -> BrazilianState {
    BrazilianState { code, name }
}

/// States offered in the state selector
pub const BRAZILIAN_STATES: [BrazilianState; 27] = [
    uf("AC", "Acre"),
    uf("AL", "Alagoas"),
    uf("AP", "Amapá"),
    uf("AM", "Amazonas"),
    uf("BA", "Bahia"),
    uf("CE", "Ceará"),
    uf("DF", "Distrito Federal"),
    uf("ES", "Espírito Santo"),
    uf("GO", "Goiás"),
    uf("MA", "Maranhão"),
    uf("MT", "Mato Grosso"),
    uf("MS", "Mato Grosso do Sul"),
    uf("MG", "Minas Gerais"),
    uf("PA", "Pará"),
    uf("PB", "Paraíba"),
    uf("PR", "Paraná"),
    uf("PE", "Pernambuco"),
    uf("PI", "Piauí"),
    uf("RJ", "Rio de Janeiro"),
    uf("RN", "Rio Grande do Norte"),
    uf("RS", "Rio Grande do Sul"),
    uf("RO", "Rondônia"),
    uf("RR", "Roraima"),
    uf("SC", "Santa Catarina"),
    uf("SP", "São Paulo"),
    uf("SE", "Sergipe"),
    uf("TO", "Tocantins"),
];

pub fn state_name(code: &str) -> Option<&'static str> {
    BRAZILIAN_STATES
        .iter()
        .find(|s| s.code == code)
        .map(|s| s.name)
}

/// Built-in examples offered for autofill
pub fn builtin_examples() -> Vec<SearchCriteria> {
    vec![
        SearchCriteria::new("Empresas de tecnologia", "Microsoft", "São Paulo", "SP"),
        SearchCriteria::new("Bancos digitais", "Nubank", "Rio de Janeiro", "RJ"),
        SearchCriteria::new("E-commerce", "Mercado Livre", "Belo Horizonte", "MG"),
        SearchCriteria::new("Startups", "iFood", "Curitiba", "PR"),
    ]
}

/// CMS examples when any is complete, otherwise the built-in ones
pub fn available_examples(cms_examples: &[Value]) -> Vec<SearchCriteria> {
    let from_cms: Vec<SearchCriteria> = cms_examples
        .iter()
        .filter_map(SearchCriteria::from_cms_example)
        .collect();

    if from_cms.is_empty() {
        builtin_examples()
    } else {
        from_cms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Loading => "loading",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }
}

/// Transient notification shown after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    /// Whether the toast offers to resubmit the same criteria
    pub retry: bool,
}

impl Toast {
    fn new(kind: ToastKind, title: &str, description: Option<&str>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.map(str::to_string),
            retry: false,
        }
    }
}

/// Result of a submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked by validation, nothing sent
    Invalid,
    Sent,
    Failed,
}

/// State of the lead-search form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    criteria: SearchCriteria,
    errors: FieldErrors,
    toasts: Vec<Toast>,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Recompute the error map; true when every field is filled
    pub fn validate(&mut self) -> bool {
        self.errors = validate(&self.criteria);
        self.errors.is_empty()
    }

    /// Replace all four fields with an example and clear every error
    pub fn fill_example(&mut self, example: &SearchCriteria) {
        self.criteria = example.clone();
        self.errors.clear();
        self.toasts.push(Toast::new(
            ToastKind::Success,
            "Exemplo preenchido!",
            Some("Você pode editar os campos conforme necessário."),
        ));
    }

    /// Empty every field and clear every error
    pub fn clear(&mut self) {
        self.criteria = SearchCriteria::default();
        self.errors.clear();
        self.toasts.push(Toast::new(ToastKind::Info, "Formulário limpo", None));
    }

    /// Validate, then post the criteria to the webhook
    pub async fn submit<W>(&mut self, webhook: &W) -> SubmitOutcome
    where
        W: LeadWebhook + ?Sized,
    {
        if !self.validate() {
            self.toasts.push(Toast::new(
                ToastKind::Error,
                "Preencha todos os campos obrigatórios",
                Some("Verifique os campos destacados em vermelho."),
            ));
            return SubmitOutcome::Invalid;
        }

        self.toasts.push(Toast::new(
            ToastKind::Loading,
            "Enviando sua busca...",
            Some("Processando dados e conectando com o sistema."),
        ));

        let result = webhook.submit(&self.criteria).await;

        self.toasts.retain(|t| t.kind != ToastKind::Loading);

        match result {
            Ok(()) => {
                info!("Lead search submitted");
                self.toasts.push(Toast::new(
                    ToastKind::Success,
                    "Busca enviada com sucesso!",
                    Some("Verifique seu dashboard em alguns minutos para ver os resultados."),
                ));
                self.criteria = SearchCriteria::default();
                SubmitOutcome::Sent
            }
            Err(e) => {
                let description = describe_failure(&e);
                self.toasts.push(Toast {
                    retry: true,
                    ..Toast::new(ToastKind::Error, "Erro ao enviar busca", Some(description.as_str()))
                });
                SubmitOutcome::Failed
            }
        }
    }

    /// 25% per filled field
    pub fn completion_percentage(&self) -> u8 {
        (self.criteria.filled_count() * 25) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.criteria.filled_count() == Field::ALL.len()
    }
}
