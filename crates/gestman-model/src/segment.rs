// SPDX-License-Identifier: Apache-2.0

use crate::{PartMetadata, SparePartId};
use serde::{Deserialize, Serialize};

/// One contiguous run of an input text, classified by the resolver.
///
/// Concatenating the `content` of a segmentation result in order reproduces
/// the input byte-for-byte; `reassemble` is the canonical way to check that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text {
        content: String,
    },
    Reference {
        content: String,
        id: SparePartId,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<PartMetadata>,
    },
}

impl Segment {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn reference(id: SparePartId, metadata: Option<PartMetadata>) -> Self {
        Self::Reference {
            content: id.as_str().to_string(),
            id,
            metadata,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Text { content } | Self::Reference { content, .. } => content,
        }
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }
}

/// Concatenates segment contents back into the original text.
#[must_use]
pub fn reassemble(segments: &[Segment]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.content().len()).sum());
    for segment in segments {
        out.push_str(segment.content());
    }
    out
}
