//! Outgoing message model and its translation into the Resend payload.

use serde::{Deserialize, Serialize};

/// One address or an ordered list of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Recipients::Many(Vec::new())
    }
}

impl Recipients {
    /// Flattens into an ordered list. No validation, no deduplication.
    /// A single empty address counts as no address.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Recipients::One(address) if address.is_empty() => Vec::new(),
            Recipients::One(address) => vec![address.clone()],
            Recipients::Many(addresses) => addresses.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Recipients::One(address) => address.is_empty(),
            Recipients::Many(addresses) => addresses.is_empty(),
        }
    }
}

impl From<String> for Recipients {
    fn from(s: String) -> Self {
        Recipients::One(s)
    }
}

impl From<&str> for Recipients {
    fn from(s: &str) -> Self {
        Recipients::One(s.to_string())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(v: Vec<String>) -> Self {
        Recipients::Many(v)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(v: Vec<&str>) -> Self {
        Recipients::Many(v.into_iter().map(str::to_string).collect())
    }
}

/// Subtype of a single-part body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subtype {
    #[default]
    Plain,
    Html,
}

/// One representation of the body in a multipart message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub content: String,
    pub mime_type: String,
}

impl Alternative {
    pub fn new(content: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Body {
    Simple {
        content: String,
        #[serde(default)]
        subtype: Subtype,
    },
    /// `content` is the plain-text fallback used when no `text/plain`
    /// alternative is present.
    Multipart {
        content: String,
        alternatives: Vec<Alternative>,
    },
}

impl Default for Body {
    fn default() -> Self {
        Body::Simple {
            content: String::new(),
            subtype: Subtype::Plain,
        }
    }
}

/// One logical email as produced by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Overrides the configured default sender when set.
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub to: Recipients,
    #[serde(default)]
    pub cc: Recipients,
    #[serde(default)]
    pub bcc: Recipients,
    #[serde(default)]
    pub reply_to: Recipients,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: Body,
}

impl OutgoingMessage {
    /// A plain-text message with no recipients yet.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: Body::Simple {
                content: body.into(),
                subtype: Subtype::Plain,
            },
            ..Self::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from_email = Some(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<Recipients>) -> Self {
        self.to = to.into();
        self
    }

    pub fn with_cc(mut self, cc: impl Into<Recipients>) -> Self {
        self.cc = cc.into();
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<Recipients>) -> Self {
        self.bcc = bcc.into();
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<Recipients>) -> Self {
        self.reply_to = reply_to.into();
        self
    }

    /// Marks a single-part body as HTML. No effect on multipart bodies.
    pub fn as_html(mut self) -> Self {
        if let Body::Simple { ref mut subtype, .. } = self.body {
            *subtype = Subtype::Html;
        }
        self
    }

    /// Attaches an alternative representation, turning the message into a
    /// multipart one whose current body becomes the plain-text fallback.
    pub fn with_alternative(mut self, content: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let alternative = Alternative::new(content, mime_type);
        self.body = match std::mem::take(&mut self.body) {
            Body::Simple { content, .. } => Body::Multipart {
                content,
                alternatives: vec![alternative],
            },
            Body::Multipart {
                content,
                mut alternatives,
            } => {
                alternatives.push(alternative);
                Body::Multipart {
                    content,
                    alternatives,
                }
            }
        };
        self
    }

    /// The sender to use: the message override if non-empty, else `default`.
    pub fn effective_from<'a>(&'a self, default: &'a str) -> &'a str {
        self.from_email
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(default)
    }
}

/// JSON body of a `POST /emails` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Builds the provider payload for `message`, sent as `from`.
///
/// Never fails: a message whose body yields neither `html` nor `text` is
/// passed through with an empty body and left for the provider to reject.
pub fn normalize(message: &OutgoingMessage, from: &str) -> Payload {
    let (html, text) = negotiate_content(&message.body);
    Payload {
        from: from.to_string(),
        to: message.to.to_vec(),
        subject: message.subject.clone(),
        cc: message.cc.to_vec(),
        bcc: message.bcc.to_vec(),
        reply_to: message.reply_to.to_vec(),
        html,
        text,
    }
}

/// Picks the `(html, text)` pair to send.
fn negotiate_content(body: &Body) -> (Option<String>, Option<String>) {
    match body {
        Body::Simple { content, subtype } => match subtype {
            Subtype::Html => (Some(content.clone()), None),
            Subtype::Plain => (None, Some(content.clone())),
        },
        Body::Multipart {
            content,
            alternatives,
        } => {
            let mut html = None;
            let mut text = None;
            for alternative in alternatives {
                match alternative.mime_type.as_str() {
                    "text/html" => html = Some(&alternative.content),
                    "text/plain" => text = Some(&alternative.content),
                    _ => {}
                }
            }
            let text = text.filter(|t| !t.is_empty()).unwrap_or(content);
            let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
            (html.and_then(non_empty), non_empty(text))
        }
    }
}
