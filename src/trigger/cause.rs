//! Causes attached to scheduled builds. They explain why a build was started and are exposed
//! to pipeline scripts by attribute name.
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCause {
    pub comment_url: String,
    pub comment_author: String,
    pub comment_body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCause {
    pub label_url: String,
    pub labelling_author: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCause {
    pub review_author: String,
    pub pull_request_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCause {
    pub update_author: String,
    pub pull_request_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BuildCause {
    Comment(CommentCause),
    Label(LabelCause),
    Review(ReviewCause),
    Update(UpdateCause),
}

impl BuildCause {
    pub fn short_description(&self) -> String {
        match self {
            BuildCause::Comment(_) => "GitHub pull request comment".to_string(),
            BuildCause::Label(cause) => format!(
                r#"GitHub pull request label "{}" by {}"#,
                cause.label, cause.labelling_author
            ),
            BuildCause::Review(_) => "GitHub pull request review".to_string(),
            BuildCause::Update(_) => "GitHub pull request update".to_string(),
        }
    }

    /// Attributes of the cause, keyed by the name under which downstream tooling reads them.
    pub fn attributes(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            BuildCause::Comment(cause) => vec![
                ("commentUrl", Some(cause.comment_url.as_str())),
                ("commentAuthor", Some(cause.comment_author.as_str())),
                ("commentBody", cause.comment_body.as_deref()),
            ],
            BuildCause::Label(cause) => vec![
                ("labelUrl", Some(cause.label_url.as_str())),
                ("labellingAuthor", Some(cause.labelling_author.as_str())),
                ("label", Some(cause.label.as_str())),
            ],
            BuildCause::Review(cause) => vec![
                ("reviewAuthor", Some(cause.review_author.as_str())),
                ("pullRequestUrl", Some(cause.pull_request_url.as_str())),
            ],
            BuildCause::Update(cause) => vec![
                ("updateAuthor", Some(cause.update_author.as_str())),
                ("pullRequestUrl", Some(cause.pull_request_url.as_str())),
            ],
        }
    }

    /// Looks up a single attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .into_iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value)
    }
}
