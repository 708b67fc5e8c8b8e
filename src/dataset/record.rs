//! Article records shared by every pipeline stage.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A summarization method whose output is stored on each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryModel {
    Extractive,
    ChatGpt,
    Gemini,
    Claude,
}

impl SummaryModel {
    /// All models in scorecard order.
    pub const ALL: [SummaryModel; 4] = [
        SummaryModel::Extractive,
        SummaryModel::ChatGpt,
        SummaryModel::Gemini,
        SummaryModel::Claude,
    ];

    /// Name of the record field holding this model's summary.
    pub fn field_name(self) -> &'static str {
        match self {
            SummaryModel::Extractive => "ekstraktivna_sumarizacija",
            SummaryModel::ChatGpt => "chatgpt_sumarizacija",
            SummaryModel::Gemini => "gemini_sumarizacija",
            SummaryModel::Claude => "claude_sumarizacija",
        }
    }

    /// Label written to the `Model` column of the scorecard.
    pub fn label(self) -> &'static str {
        match self {
            SummaryModel::Extractive => "Ekstraktivna_sumarizacija",
            SummaryModel::ChatGpt => "ChatGPT",
            SummaryModel::Gemini => "Gemini",
            SummaryModel::Claude => "Claude",
        }
    }
}

/// One article segment with its reference and candidate summaries.
///
/// Every field defaults to an empty string when it is missing or `null`, and
/// numeric or boolean scalars are stringified, so a sparse record never fails
/// to load. Serialization keeps the dataset's column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub portal: String,
    #[serde(rename = "kategorija", default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(rename = "datum", default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "naslov", default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "tekst", default, deserialize_with = "lenient_string")]
    pub original_text: String,
    #[serde(
        rename = "ekstraktivna_sumarizacija",
        default,
        deserialize_with = "lenient_string"
    )]
    pub extractive_summary: String,
    #[serde(
        rename = "apstraktivna_sumarizacija",
        default,
        deserialize_with = "lenient_string"
    )]
    pub reference_summary: String,
    #[serde(
        rename = "chatgpt_sumarizacija",
        default,
        deserialize_with = "lenient_string"
    )]
    pub chatgpt_summary: String,
    #[serde(
        rename = "gemini_sumarizacija",
        default,
        deserialize_with = "lenient_string"
    )]
    pub gemini_summary: String,
    #[serde(
        rename = "claude_sumarizacija",
        default,
        deserialize_with = "lenient_string"
    )]
    pub claude_summary: String,
}

impl ArticleRecord {
    /// The candidate summary produced by `model`, possibly empty.
    pub fn candidate(&self, model: SummaryModel) -> &str {
        match model {
            SummaryModel::Extractive => &self.extractive_summary,
            SummaryModel::ChatGpt => &self.chatgpt_summary,
            SummaryModel::Gemini => &self.gemini_summary,
            SummaryModel::Claude => &self.claude_summary,
        }
    }

    /// Replaces the candidate summary for `model`.
    pub fn set_candidate(&mut self, model: SummaryModel, summary: String) {
        let slot = match model {
            SummaryModel::Extractive => &mut self.extractive_summary,
            SummaryModel::ChatGpt => &mut self.chatgpt_summary,
            SummaryModel::Gemini => &mut self.gemini_summary,
            SummaryModel::Claude => &mut self.claude_summary,
        };
        *slot = summary;
    }

    /// Candidate summaries in scorecard order, including empty ones.
    pub fn candidates(&self) -> impl Iterator<Item = (SummaryModel, &str)> + '_ {
        SummaryModel::ALL
            .into_iter()
            .map(move |model| (model, self.candidate(model)))
    }

    /// Applies `f` to every string field, in column order.
    pub fn map_fields(&mut self, mut f: impl FnMut(&str) -> String) {
        for field in [
            &mut self.portal,
            &mut self.category,
            &mut self.id,
            &mut self.url,
            &mut self.date,
            &mut self.title,
            &mut self.original_text,
            &mut self.extractive_summary,
            &mut self.reference_summary,
            &mut self.chatgpt_summary,
            &mut self.gemini_summary,
            &mut self.claude_summary,
        ] {
            *field = f(field);
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
