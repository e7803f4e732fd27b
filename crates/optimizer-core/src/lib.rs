pub mod view;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// --- Request parameters (the form) ---

/// Valid range for the latency budget, in milliseconds.
pub const LATENCY_RANGE_MS: RangeInclusive<u32> = 100..=60_000;
/// Valid range for the token budget.
pub const TOKEN_BUDGET_RANGE: RangeInclusive<u32> = 1..=1_000_000;

pub const DEFAULT_TARGET_MODEL: &str = "Gemini 2.5 Pro";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}', expected one of: {expected}")]
pub struct InvalidChoice {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_choice<T: Copy>(
    field: &'static str,
    value: &str,
    all: &[T],
    names: impl Fn(T) -> &'static [&'static str],
) -> Result<T, InvalidChoice> {
    let wanted = value.trim().to_lowercase();
    all.iter()
        .copied()
        .find(|c| names(*c).iter().any(|n| *n == wanted))
        .ok_or_else(|| InvalidChoice {
            field,
            value: value.to_string(),
            expected: all
                .iter()
                .map(|c| names(*c)[0])
                .collect::<Vec<_>>()
                .join(", "),
        })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Spanish, Language::English, Language::French];

    pub fn as_str(self) -> &'static str {
        self.names()[0]
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Language::Spanish => &["es", "spanish", "español"],
            Language::English => &["en", "english"],
            Language::French => &["fr", "french", "français"],
        }
    }
}

impl FromStr for Language {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("language", s, &Language::ALL, Language::names)
    }
}

/// Tone of the optimized prompt. Wire values are the ones the instruction
/// document is written against (`técnico`, `cercano`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "técnico")]
    Technical,
    #[serde(rename = "cercano")]
    Close,
    #[serde(rename = "formal")]
    Formal,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Neutral, Tone::Technical, Tone::Close, Tone::Formal];

    pub fn as_str(self) -> &'static str {
        self.names()[0]
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Tone::Neutral => &["neutral"],
            Tone::Technical => &["técnico", "tecnico", "technical"],
            Tone::Close => &["cercano", "close"],
            Tone::Formal => &["formal"],
        }
    }
}

impl FromStr for Tone {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("tone", s, &Tone::ALL, Tone::names)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Length {
    #[serde(rename = "corta")]
    Short,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "larga")]
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn as_str(self) -> &'static str {
        self.names()[0]
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Length::Short => &["corta", "short"],
            Length::Medium => &["media", "medium"],
            Length::Long => &["larga", "long"],
        }
    }
}

impl FromStr for Length {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("length", s, &Length::ALL, Length::names)
    }
}

/// Output format the optimized prompt should ask for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    Json,
    Xml,
    Yaml,
    #[default]
    Natural,
}

impl ContextMode {
    pub const ALL: [ContextMode; 4] = [
        ContextMode::Json,
        ContextMode::Xml,
        ContextMode::Yaml,
        ContextMode::Natural,
    ];

    pub fn as_str(self) -> &'static str {
        self.names()[0]
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            ContextMode::Json => &["json"],
            ContextMode::Xml => &["xml"],
            ContextMode::Yaml => &["yaml", "yml"],
            ContextMode::Natural => &["natural"],
        }
    }
}

impl FromStr for ContextMode {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("context mode", s, &ContextMode::ALL, ContextMode::names)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Multimodal {
    #[default]
    None,
    ImageAnalyze,
    ImageGenerate,
    Audio,
}

impl Multimodal {
    pub const ALL: [Multimodal; 4] = [
        Multimodal::None,
        Multimodal::ImageAnalyze,
        Multimodal::ImageGenerate,
        Multimodal::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        self.names()[0]
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Multimodal::None => &["none"],
            Multimodal::ImageAnalyze => &["image_analyze", "image-analyze"],
            Multimodal::ImageGenerate => &["image_generate", "image-generate"],
            Multimodal::Audio => &["audio"],
        }
    }
}

impl FromStr for Multimodal {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("multimodal mode", s, &Multimodal::ALL, Multimodal::names)
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Language, Tone, Length, ContextMode, Multimodal);

/// Everything the user configures before submitting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub input_prompt: String,
    pub target_model: String,
    pub language: Language,
    pub tone: Tone,
    pub length: Length,
    pub context_mode: ContextMode,
    pub multimodal: Multimodal,
    pub guardrails_extra: String,
    pub requires_fresh_data: bool,
    pub latency_max_ms: u32,
    pub token_budget: u32,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            input_prompt: String::new(),
            target_model: DEFAULT_TARGET_MODEL.to_string(),
            language: Language::default(),
            tone: Tone::default(),
            length: Length::default(),
            context_mode: ContextMode::default(),
            multimodal: Multimodal::default(),
            guardrails_extra: String::new(),
            requires_fresh_data: false,
            latency_max_ms: 2500,
            token_budget: 2000,
        }
    }
}

impl RequestParameters {
    /// The original prompt is the only required field.
    pub fn is_complete(&self) -> bool {
        !self.input_prompt.trim().is_empty()
    }
}

// --- Structured result (the response) ---

/// Detail key whose value is shown as a copyable block.
pub const CODE_KEY: &str = "code";
/// Action type bound to the copy control.
pub const COPY_ACTION: &str = "copy";
/// Separator between bullets in an item description.
pub const BULLET: char = '•';

/// Outcome label reported by the model. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultStatus {
    Ok,
    NeedsInput,
    Error,
    Other(String),
}

impl From<String> for ResultStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ok" => ResultStatus::Ok,
            "needs_input" => ResultStatus::NeedsInput,
            "error" => ResultStatus::Error,
            _ => ResultStatus::Other(s),
        }
    }
}

impl From<ResultStatus> for String {
    fn from(s: ResultStatus) -> Self {
        match s {
            ResultStatus::Ok => "ok".to_string(),
            ResultStatus::NeedsInput => "needs_input".to_string(),
            ResultStatus::Error => "error".to_string(),
            ResultStatus::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    #[serde(default)]
    pub kv_pairs: Vec<KvPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ItemDetails>,
}

impl ResultItem {
    /// Value of the first `code` detail pair, if any.
    pub fn code(&self) -> Option<&str> {
        self.details
            .as_ref()?
            .kv_pairs
            .iter()
            .find(|p| p.key == CODE_KEY)
            .map(|p| p.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DebugInfo {
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub status: ResultStatus,
    pub summary: String,
    pub items: Vec<ResultItem>,
    pub actions: Vec<SuggestedAction>,
    pub debug: DebugInfo,
}

impl StructuredResult {
    /// Whether any item renders as a copyable code block.
    pub fn has_code_block(&self) -> bool {
        self.items.iter().any(|i| i.code().is_some())
    }

    /// Payload of the first copy action. An empty payload counts as none.
    pub fn copy_payload(&self) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.kind == COPY_ACTION)
            .map(|a| a.payload.as_str())
            .filter(|p| !p.is_empty())
    }
}

// --- AI Settings ---

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";
/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
        }
    }
}

/// Resolve the config directory (~/.prompt-optimizer/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".prompt-optimizer")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

/// Missing file means defaults; a corrupt file is logged and ignored.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    let parsed = fs::read_to_string(path)
        .map_err(SettingsError::from)
        .and_then(|s| serde_json::from_str(&s).map_err(SettingsError::from));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            AiSettings::default()
        }
    }
}

pub fn write_settings(settings: &AiSettings) -> Result<(), SettingsError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

/// Stored settings with the process-wide key override applied.
/// Called at generation time so key changes apply to the next submission.
pub fn resolve_settings() -> AiSettings {
    with_key_override(read_settings(), std::env::var(API_KEY_ENV).ok())
}

pub fn with_key_override(mut settings: AiSettings, key: Option<String>) -> AiSettings {
    if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
        settings.api_key = key;
    }
    settings
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_form() {
        let p = RequestParameters::default();
        assert_eq!(p.target_model, "Gemini 2.5 Pro");
        assert_eq!(p.language.as_str(), "es");
        assert_eq!(p.tone.as_str(), "neutral");
        assert_eq!(p.length.as_str(), "media");
        assert_eq!(p.context_mode.as_str(), "natural");
        assert_eq!(p.multimodal.as_str(), "none");
        assert_eq!(p.latency_max_ms, 2500);
        assert_eq!(p.token_budget, 2000);
        assert!(!p.requires_fresh_data);
        assert!(LATENCY_RANGE_MS.contains(&p.latency_max_ms));
        assert!(TOKEN_BUDGET_RANGE.contains(&p.token_budget));
    }

    #[test]
    fn blank_prompt_is_incomplete() {
        let mut p = RequestParameters::default();
        assert!(!p.is_complete());
        p.input_prompt = "   \n".to_string();
        assert!(!p.is_complete());
        p.input_prompt = "write a haiku".to_string();
        assert!(p.is_complete());
    }

    #[test]
    fn choices_accept_wire_values_and_english_aliases() {
        assert_eq!("técnico".parse::<Tone>().unwrap(), Tone::Technical);
        assert_eq!("Technical".parse::<Tone>().unwrap(), Tone::Technical);
        assert_eq!("close".parse::<Tone>().unwrap(), Tone::Close);
        assert_eq!("long".parse::<Length>().unwrap(), Length::Long);
        assert_eq!("image-analyze".parse::<Multimodal>().unwrap(), Multimodal::ImageAnalyze);
        assert_eq!(Multimodal::ImageGenerate.as_str(), "image_generate");
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);

        let err = "klingon".parse::<Language>().unwrap_err();
        assert_eq!(err.expected, "es, en, fr");
    }

    #[test]
    fn enums_serialize_to_wire_values() {
        assert_eq!(serde_json::to_string(&Tone::Close).unwrap(), "\"cercano\"");
        assert_eq!(serde_json::to_string(&ContextMode::Yaml).unwrap(), "\"yaml\"");
        assert_eq!(
            serde_json::to_string(&Multimodal::ImageAnalyze).unwrap(),
            "\"image_analyze\""
        );
    }

    fn sample_result() -> StructuredResult {
        serde_json::from_str(
            r#"{
                "status": "ok",
                "summary": "s",
                "items": [
                    {"title": "Prompt", "description": "d",
                     "details": {"kv_pairs": [{"key": "notes", "value": "n"}, {"key": "code", "value": "PROMPT"}]}},
                    {"title": "Tests", "description": "a • b"}
                ],
                "actions": [
                    {"label": "Open", "type": "link", "payload": "x"},
                    {"label": "Copy", "type": "copy", "payload": "PROMPT"},
                    {"label": "Copy again", "type": "copy", "payload": "OTHER"}
                ],
                "debug": {"notes": ""}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn code_and_copy_payload_lookups() {
        let r = sample_result();
        assert_eq!(r.items[0].code(), Some("PROMPT"));
        assert_eq!(r.items[1].code(), None);
        assert_eq!(r.copy_payload(), Some("PROMPT"));
    }

    #[test]
    fn empty_copy_payload_is_ignored() {
        let mut r = sample_result();
        r.actions[1].payload.clear();
        assert_eq!(r.copy_payload(), None);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let s: ResultStatus = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(s, ResultStatus::Other("partial".to_string()));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"partial\"");
        let s: ResultStatus = serde_json::from_str("\"needs_input\"").unwrap();
        assert_eq!(s, ResultStatus::NeedsInput);
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        assert_eq!(read_settings_from(&path), AiSettings::default());

        let settings = AiSettings {
            provider: "openai".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
        };
        write_settings_to(&path, &settings).unwrap();
        assert_eq!(read_settings_from(&path), settings);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"apiKey\""));
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(read_settings_from(&path), AiSettings::default());
    }

    #[test]
    fn key_override_and_configured_check() {
        let base = AiSettings::default();
        assert!(!ai_configured(&base));

        let same = with_key_override(base.clone(), Some("  ".to_string()));
        assert!(same.api_key.is_empty());

        let keyed = with_key_override(base, Some("abc".to_string()));
        assert_eq!(keyed.api_key, "abc");
        assert!(ai_configured(&keyed));

        let local = AiSettings {
            provider: "ollama".to_string(),
            api_key: String::new(),
            model: "llama3".to_string(),
        };
        assert!(ai_configured(&local));
    }
}
