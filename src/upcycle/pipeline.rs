use crate::error::{ParseError, ProviderError, ValidationError, WarnCode};
use crate::upcycle::carbon;
use crate::upcycle::config::ProviderConfig;
use crate::upcycle::fallback;
use crate::upcycle::model::{Analysis, CarbonResult, MaterialRequest, SuggestionSet};
use crate::upcycle::normalize::normalize;
use crate::upcycle::parser::{self, RawSuggestionArray};
use crate::upcycle::prompt::{
    CATEGORY_OPTIONS, MAX_CATEGORIES, MIN_CATEGORIES, SUGGESTION_OPTIONS, build_category_prompt,
    build_suggestion_prompt,
};
use crate::upcycle::provider::{SuggestionProvider, build_provider, resolve_remote_config};
use crate::upcycle::warn;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Disabled,
    ProviderError,
    ParseError,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::ProviderError => "provider_error",
            Self::ParseError => "parse_error",
        }
    }
}

/// Where a result came from: `provider:<label>` or `fallback:<reason>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Provider(&'static str),
    Fallback(FallbackReason),
}

impl SuggestionSource {
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(label) => write!(f, "provider:{label}"),
            Self::Fallback(reason) => write!(f, "fallback:{}", reason.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PipelineState {
    Idle,
    Requesting { prompt: String },
    Parsing { provider: &'static str, raw: String },
    Normalizing { provider: &'static str, raw: RawSuggestionArray },
    Fallback { reason: FallbackReason },
    Done { suggestions: SuggestionSet, source: SuggestionSource },
}

impl PipelineState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting { .. } => "requesting",
            Self::Parsing { .. } => "parsing",
            Self::Normalizing { .. } => "normalizing",
            Self::Fallback { .. } => "fallback",
            Self::Done { .. } => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub analysis: Analysis,
    pub carbon: CarbonResult,
    pub source: SuggestionSource,
    pub trace: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutcome {
    pub categories: Vec<String>,
    pub source: SuggestionSource,
}

pub struct Pipeline {
    provider: Option<Box<dyn SuggestionProvider>>,
}

fn warn_provider(stage: &str, provider: &str, err: &ProviderError) {
    warn::emit(
        WarnCode::for_provider_error(err),
        stage,
        provider,
        "fallback",
        &err.to_string(),
    );
}

fn warn_parse(stage: &str, provider: &str, err: &ParseError) {
    warn::emit(WarnCode::U003ParseFailed, stage, provider, "fallback", &err.to_string());
}

impl Pipeline {
    pub fn new(provider: Option<Box<dyn SuggestionProvider>>) -> Self {
        Self { provider }
    }

    /// Resolve a backend from config and the process environment.
    pub fn from_config(cfg: &ProviderConfig) -> Self {
        Self::new(resolve_remote_config(cfg).map(|remote| build_provider(&remote)))
    }

    pub fn provider_label(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.label())
    }

    fn step(&self, state: PipelineState, request: &MaterialRequest) -> PipelineState {
        match state {
            PipelineState::Idle => match self.provider {
                Some(_) => PipelineState::Requesting {
                    prompt: build_suggestion_prompt(
                        request.material(),
                        request.category(),
                        request.quantity(),
                        request.unit(),
                    ),
                },
                None => PipelineState::Fallback {
                    reason: FallbackReason::Disabled,
                },
            },
            PipelineState::Requesting { prompt } => {
                let Some(provider) = self.provider.as_ref() else {
                    return PipelineState::Fallback {
                        reason: FallbackReason::Disabled,
                    };
                };
                match provider.generate(&prompt, &SUGGESTION_OPTIONS) {
                    Ok(raw) => PipelineState::Parsing {
                        provider: provider.label(),
                        raw,
                    },
                    Err(err) => {
                        warn_provider("requesting", provider.label(), &err);
                        PipelineState::Fallback {
                            reason: FallbackReason::ProviderError,
                        }
                    }
                }
            }
            PipelineState::Parsing { provider, raw } => match parser::parse_suggestions(&raw) {
                Ok(raw) => PipelineState::Normalizing { provider, raw },
                Err(err) => {
                    warn_parse("parsing", provider, &err);
                    PipelineState::Fallback {
                        reason: FallbackReason::ParseError,
                    }
                }
            },
            PipelineState::Normalizing { provider, raw } => PipelineState::Done {
                suggestions: normalize(&raw),
                source: SuggestionSource::Provider(provider),
            },
            PipelineState::Fallback { reason } => PipelineState::Done {
                suggestions: fallback::synthesize(
                    request.material(),
                    request.category(),
                    request.quantity(),
                    request.unit(),
                ),
                source: SuggestionSource::Fallback(reason),
            },
            done @ PipelineState::Done { .. } => done,
        }
    }

    /// Never fails: every provider or parse failure lands on the local
    /// fallback, so the outcome always carries three valid suggestions.
    pub fn run(&self, request: &MaterialRequest) -> AnalysisOutcome {
        let carbon = carbon::compute(request.material(), request.quantity(), request.unit());

        let mut trace = Vec::new();
        let mut state = PipelineState::Idle;
        let (suggestions, source) = loop {
            trace.push(state.name());
            match state {
                PipelineState::Done {
                    suggestions,
                    source,
                } => break (suggestions, source),
                other => state = self.step(other, request),
            }
        };

        AnalysisOutcome {
            analysis: Analysis {
                carbon_footprint: carbon.if_wasted,
                carbon_savings: carbon.if_upcycled,
                suggestions,
            },
            carbon,
            source,
            trace,
        }
    }

    pub fn suggest_categories(&self, material: &str) -> Result<CategoryOutcome, ValidationError> {
        let material = material.trim();
        if material.is_empty() {
            return Err(ValidationError::EmptyMaterial);
        }

        let from_table = |reason| CategoryOutcome {
            categories: fallback::default_categories(material),
            source: SuggestionSource::Fallback(reason),
        };

        let Some(provider) = self.provider.as_ref() else {
            return Ok(from_table(FallbackReason::Disabled));
        };
        let label = provider.label();

        let raw = match provider.generate(&build_category_prompt(material), &CATEGORY_OPTIONS) {
            Ok(raw) => raw,
            Err(err) => {
                warn_provider("categories", label, &err);
                return Ok(from_table(FallbackReason::ProviderError));
            }
        };
        let parsed = match parser::parse_categories(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn_parse("categories", label, &err);
                return Ok(from_table(FallbackReason::ParseError));
            }
        };

        let categories = clean_categories(parsed);
        if categories.len() < MIN_CATEGORIES {
            warn::emit(
                WarnCode::U003ParseFailed,
                "categories",
                label,
                "fallback",
                &format!("only {} usable categories", categories.len()),
            );
            return Ok(from_table(FallbackReason::ParseError));
        }

        Ok(CategoryOutcome {
            categories,
            source: SuggestionSource::Provider(label),
        })
    }
}

fn clean_categories(raw: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_lowercase()))
        .take(MAX_CATEGORIES)
        .collect()
}
