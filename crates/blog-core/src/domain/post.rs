use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Bounds enforced on author input before it reaches a [`BlogPost`].
pub mod limits {
    pub const TITLE_MAX_CHARS: usize = 200;
    pub const INTRODUCTION_MAX_CHARS: usize = 2_000;
    pub const MAX_SECTIONS: usize = 100;
    pub const HEADING_MAX_CHARS: usize = 200;
    pub const CONTENT_MAX_CHARS: usize = 20_000;
    pub const MAX_EXAMPLES_PER_SECTION: usize = 50;
    pub const EXAMPLE_MAX_CHARS: usize = 2_000;
}

/// One titled block of a post. Sections are displayed in the order they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub content: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Section {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
            examples: Vec::new(),
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}

/// Post entity - a blog article owned by the admin who wrote it.
///
/// `published_at` is a first-publish marker: it is set the first time the post is
/// published and never changes afterwards. `author_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub introduction: String,
    pub sections: Vec<Section>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Create a new unpublished post authored by `author_id`.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            introduction: draft.introduction,
            sections: draft.sections,
            is_published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace title, introduction and the whole section list in one step.
    ///
    /// Identity, authorship and publication fields are left alone.
    pub fn replace_content(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.introduction = draft.introduction;
        self.sections = draft.sections;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Validated author input for a post's content.
///
/// The only way to build one is [`PostDraft::new`], so every draft that reaches the
/// domain already satisfies the bounds in [`limits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    introduction: String,
    sections: Vec<Section>,
}

impl PostDraft {
    /// Trim and validate raw input. All violations are reported together.
    pub fn new(
        title: impl Into<String>,
        introduction: impl Into<String>,
        sections: Vec<Section>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        let introduction = introduction.into().trim().to_string();
        let sections: Vec<Section> = sections
            .into_iter()
            .map(|s| Section {
                heading: s.heading.trim().to_string(),
                ..s
            })
            .collect();

        let mut errors = Vec::new();
        check_text(&mut errors, "title", &title, limits::TITLE_MAX_CHARS, true);
        check_text(
            &mut errors,
            "introduction",
            &introduction,
            limits::INTRODUCTION_MAX_CHARS,
            true,
        );

        if sections.len() > limits::MAX_SECTIONS {
            errors.push(format!(
                "sections: at most {} sections are allowed",
                limits::MAX_SECTIONS
            ));
        }

        for (i, section) in sections.iter().enumerate() {
            check_text(
                &mut errors,
                &format!("sections[{i}].heading"),
                &section.heading,
                limits::HEADING_MAX_CHARS,
                true,
            );
            check_text(
                &mut errors,
                &format!("sections[{i}].content"),
                &section.content,
                limits::CONTENT_MAX_CHARS,
                false,
            );
            if section.examples.len() > limits::MAX_EXAMPLES_PER_SECTION {
                errors.push(format!(
                    "sections[{i}].examples: at most {} examples are allowed",
                    limits::MAX_EXAMPLES_PER_SECTION
                ));
            }
            for (j, example) in section.examples.iter().enumerate() {
                check_text(
                    &mut errors,
                    &format!("sections[{i}].examples[{j}]"),
                    example,
                    limits::EXAMPLE_MAX_CHARS,
                    false,
                );
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(Self {
            title,
            introduction,
            sections,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn introduction(&self) -> &str {
        &self.introduction
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

fn check_text(errors: &mut Vec<String>, field: &str, value: &str, max: usize, required: bool) {
    if required && value.is_empty() {
        errors.push(format!("{field}: must not be empty"));
    }
    if value.chars().count() > max {
        errors.push(format!("{field}: must be at most {max} characters"));
    }
}
