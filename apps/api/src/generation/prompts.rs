// Prompt templates for every registered task.
// Placeholders are `{paramName}`; generation::prompt_builder fills them in a
// single pass. Structured tasks list their record fields here and the builder
// turns them into the JSON output contract, so the field list is the source of
// truth for what the extractor and the typed records expect.

use serde::Serialize;

use crate::generation::tasks::{
    AD_COPY, BUSINESS_NAMES, MEME_CONCEPTS, PARAGRAPH, PRODUCT_DESCRIPTION, SEO_KEYWORDS, SLOGANS,
    SUMMARIZE, TRANSLATE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Boolean,
    StringArray,
}

impl FieldKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::StringArray => "array of strings",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromptTemplate {
    pub task_id: &'static str,
    /// Role framing, first line of the system message.
    pub persona: &'static str,
    /// Domain constraints (counts, lengths, enums). May hold placeholders.
    pub rules: &'static str,
    /// Record fields for JSON tasks; empty for text tasks.
    pub fields: &'static [FieldSpec],
    pub user_template: &'static str,
    pub required: &'static [&'static str],
    pub defaults: &'static [(&'static str, &'static str)],
}

const fn field(name: &'static str, kind: FieldKind, description: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        description,
    }
}

pub static TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        task_id: BUSINESS_NAMES,
        persona: "You are a branding expert who invents memorable, brandable business names.",
        rules: "Generate exactly {count} names. \
            Each tagline must be under 60 characters. \
            Set \"available\" to true only when the name is unlikely to be used by a well-known company.",
        fields: &[
            field("name", FieldKind::String, "the business name"),
            field("tagline", FieldKind::String, "a short tagline for the name"),
            field("available", FieldKind::Boolean, "whether the name is likely unclaimed"),
        ],
        user_template: "Suggest {count} {style} business names for a company in the {industry} industry. \
            Keywords to draw from: {keywords}.",
        required: &["industry"],
        defaults: &[("count", "10"), ("style", "modern"), ("keywords", "none")],
    },
    PromptTemplate {
        task_id: SLOGANS,
        persona: "You are an award-winning advertising copywriter.",
        rules: "Write exactly {count} slogans of at most 8 words each.",
        fields: &[
            field("slogan", FieldKind::String, "the slogan"),
            field("explanation", FieldKind::String, "one sentence on why it works"),
        ],
        user_template: "Write {count} {tone} slogans for {brand}. What they offer: {product}.",
        required: &["brand"],
        defaults: &[("count", "8"), ("tone", "catchy"), ("product", "not specified")],
    },
    PromptTemplate {
        task_id: AD_COPY,
        persona: "You are a direct-response copywriter who writes high-converting ads.",
        rules: "Write exactly {count} ad variations for {platform}. \
            Headlines must be at most 40 characters. \
            Each body must be at most {maxLength} characters.",
        fields: &[
            field("headline", FieldKind::String, "the ad headline"),
            field("body", FieldKind::String, "the ad body text"),
            field("callToAction", FieldKind::String, "a short call to action"),
        ],
        user_template: "Write {count} {tone} ads for {product}, aimed at {audience}.",
        required: &["product", "audience"],
        defaults: &[
            ("count", "3"),
            ("platform", "Facebook"),
            ("tone", "persuasive"),
            ("maxLength", "150"),
        ],
    },
    PromptTemplate {
        task_id: SEO_KEYWORDS,
        persona: "You are an SEO strategist who researches search keywords.",
        rules: "Return exactly {count} keywords. \
            \"searchVolume\" and \"difficulty\" must each be one of \"High\", \"Medium\" or \"Low\". \
            \"intent\" must be one of \"informational\", \"navigational\", \"commercial\" or \"transactional\".",
        fields: &[
            field("keyword", FieldKind::String, "the search phrase"),
            field("searchVolume", FieldKind::String, "estimated search volume"),
            field("difficulty", FieldKind::String, "estimated ranking difficulty"),
            field("intent", FieldKind::String, "the searcher's intent"),
        ],
        user_template: "Research {count} SEO keywords for the topic: {topic}. Target audience: {audience}.",
        required: &["topic"],
        defaults: &[("count", "15"), ("audience", "general")],
    },
    PromptTemplate {
        task_id: MEME_CONCEPTS,
        persona: "You are a comedy writer who knows popular meme formats.",
        rules: "Produce exactly {count} concepts. \
            Use well-known meme templates by their common names. \
            Keep each caption under 12 words and avoid offensive content.",
        fields: &[
            field("template", FieldKind::String, "the meme template name"),
            field("topText", FieldKind::String, "caption for the top of the image"),
            field("bottomText", FieldKind::String, "caption for the bottom of the image"),
        ],
        user_template: "Create {count} {humor} meme ideas about {topic}.",
        required: &["topic"],
        defaults: &[("count", "5"), ("humor", "witty")],
    },
    PromptTemplate {
        task_id: PRODUCT_DESCRIPTION,
        persona: "You are an e-commerce copywriter.",
        rules: "The description must be at most {maxLength} characters. \
            Provide 3 to 5 highlights, each under 10 words.",
        fields: &[
            field("title", FieldKind::String, "a product title"),
            field("description", FieldKind::String, "the product description"),
            field("highlights", FieldKind::StringArray, "short selling points"),
        ],
        user_template: "Write a {tone} product description for {product}. Key features: {features}.",
        required: &["product"],
        defaults: &[
            ("tone", "persuasive"),
            ("features", "not specified"),
            ("maxLength", "600"),
        ],
    },
    PromptTemplate {
        task_id: SUMMARIZE,
        persona: "You are a careful editor who writes faithful summaries.",
        rules: "Write a {length} summary. Do not add facts that are not in the source text.",
        fields: &[],
        user_template: "Summarize the following text:\n\n{text}",
        required: &["text"],
        defaults: &[("length", "short")],
    },
    PromptTemplate {
        task_id: PARAGRAPH,
        persona: "You are a skilled writer.",
        rules: "Write a single paragraph of about {wordCount} words in a {tone} tone.",
        fields: &[],
        user_template: "Write a paragraph about: {topic}",
        required: &["topic"],
        defaults: &[("wordCount", "150"), ("tone", "informative")],
    },
    PromptTemplate {
        task_id: TRANSLATE,
        persona: "You are a professional translator.",
        rules: "Source language: {sourceLanguage}. Target language: {targetLanguage}. \
            Preserve meaning, tone and formatting.",
        fields: &[],
        user_template: "Translate this text into {targetLanguage}:\n\n{text}",
        required: &["text", "targetLanguage"],
        defaults: &[("sourceLanguage", "detect automatically")],
    },
];

pub fn template_for(task_id: &str) -> Option<&'static PromptTemplate> {
    TEMPLATES.iter().find(|t| t.task_id == task_id)
}
