//! Parsing of raw model output into typed artifact bodies.
//!
//! Models frequently wrap structured payloads in prose or markdown fences.
//! The extractors here recover the JSON payload and deserialize it into the
//! body type for the requested kind; failures come back as
//! `GenerateError::Unparseable`, never as a raw deserialization panic.

use serde::de::DeserializeOwned;

use crate::domain::{ArtifactBody, CaseStudy, ContentKind, Flashcard, QuizQuestion, VideoScript};

use super::GenerateError;

/// Turn raw model text into the body shape for `kind`
pub fn parse_body(kind: ContentKind, raw: &str) -> Result<ArtifactBody, GenerateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::EmptyOutput);
    }

    match kind {
        ContentKind::Summary | ContentKind::ShortLecture | ContentKind::AudioTrack => {
            Ok(ArtifactBody::Text(trimmed.to_string()))
        }
        ContentKind::Quiz => {
            let questions: Vec<QuizQuestion> = parse_json(trimmed, Bracket::Array)?;
            if questions.is_empty() {
                return Err(GenerateError::unparseable("quiz has no questions"));
            }
            Ok(ArtifactBody::Quiz(questions))
        }
        ContentKind::Flashcards => {
            let cards: Vec<Flashcard> = parse_json(trimmed, Bracket::Array)?;
            if cards.is_empty() {
                return Err(GenerateError::unparseable("flashcard deck is empty"));
            }
            Ok(ArtifactBody::Flashcards(cards))
        }
        ContentKind::CaseStudy => {
            let case_study: CaseStudy = parse_json(trimmed, Bracket::Object)?;
            Ok(ArtifactBody::CaseStudy(case_study))
        }
        ContentKind::VideoScript => {
            let script: VideoScript = parse_json(trimmed, Bracket::Object)?;
            Ok(ArtifactBody::VideoScript(script))
        }
    }
}

enum Bracket {
    Array,
    Object,
}

fn parse_json<T: DeserializeOwned>(raw: &str, bracket: Bracket) -> Result<T, GenerateError> {
    let payload = extract_payload(raw, bracket)?;
    serde_json::from_str(payload).map_err(|e| GenerateError::unparseable(e.to_string()))
}

/// Locate the JSON payload inside possibly-noisy model output.
///
/// Prefers a fenced code block; otherwise falls back to the outermost
/// bracket pair of the expected shape.
fn extract_payload(raw: &str, bracket: Bracket) -> Result<&str, GenerateError> {
    if let Some(fenced) = extract_fenced(raw) {
        return Ok(fenced);
    }

    let (open, close) = match bracket {
        Bracket::Array => ('[', ']'),
        Bracket::Object => ('{', '}'),
    };

    let start = raw
        .find(open)
        .ok_or_else(|| GenerateError::unparseable(format!("no '{}' found in output", open)))?;
    let end = raw
        .rfind(close)
        .ok_or_else(|| GenerateError::unparseable(format!("no '{}' found in output", close)))?;

    if end < start {
        return Err(GenerateError::unparseable("mismatched JSON brackets"));
    }

    Ok(&raw[start..=end])
}

fn extract_fenced(raw: &str) -> Option<&str> {
    let fence_start = raw.find("```")?;
    let after_fence = &raw[fence_start + 3..];
    // Skip an optional language tag on the fence line
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let fence_end = body.find("```")?;
    let inner = body[..fence_end].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_kinds_pass_through() {
        let body = parse_body(ContentKind::Summary, "  A summary.\n").unwrap();
        match body {
            ArtifactBody::Text(text) => assert_eq!(text, "A summary."),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_output_rejected() {
        let err = parse_body(ContentKind::Summary, "   \n").unwrap_err();
        assert!(matches!(err, GenerateError::EmptyOutput));
    }

    #[test]
    fn test_quiz_from_bare_json() {
        let raw = r#"[
            {"question": "Q1", "options": ["a", "b"], "answer_index": 1},
            {"question": "Q2", "options": ["c", "d"], "answer_index": 0,
             "explanation": "because"}
        ]"#;

        let body = parse_body(ContentKind::Quiz, raw).unwrap();
        match body {
            ArtifactBody::Quiz(questions) => {
                assert_eq!(questions.len(), 2);
                assert_eq!(questions[1].explanation.as_deref(), Some("because"));
            }
            other => panic!("expected quiz, got {:?}", other),
        }
    }

    #[test]
    fn test_quiz_wrapped_in_prose() {
        let raw = "Here are your questions:\n\n[{\"question\": \"Q\", \"options\": [\"x\", \"y\"], \"answer_index\": 0}]\n\nGood luck!";
        let body = parse_body(ContentKind::Quiz, raw).unwrap();
        assert!(matches!(body, ArtifactBody::Quiz(q) if q.len() == 1));
    }

    #[test]
    fn test_fenced_code_block() {
        let raw = "Sure!\n```json\n[{\"front\": \"f\", \"back\": \"b\"}]\n```\n";
        let body = parse_body(ContentKind::Flashcards, raw).unwrap();
        assert!(matches!(body, ArtifactBody::Flashcards(c) if c.len() == 1));
    }

    #[test]
    fn test_case_study_object() {
        let raw = r#"{"background": "A startup", "challenge": "Scale", "questions": ["How?"]}"#;
        let body = parse_body(ContentKind::CaseStudy, raw).unwrap();
        match body {
            ArtifactBody::CaseStudy(cs) => {
                assert_eq!(cs.challenge, "Scale");
                assert_eq!(cs.questions.len(), 1);
            }
            other => panic!("expected case study, got {:?}", other),
        }
    }

    #[test]
    fn test_video_script_object() {
        let raw = r#"{"hook": "Watch this", "scenes": [{"heading": "Intro", "narration": "Hello"}]}"#;
        let body = parse_body(ContentKind::VideoScript, raw).unwrap();
        assert!(matches!(body, ArtifactBody::VideoScript(s) if s.scenes.len() == 1));
    }

    #[test]
    fn test_malformed_json_is_unparseable() {
        let raw = "[{\"question\": \"unclosed\"";
        let err = parse_body(ContentKind::Quiz, raw).unwrap_err();
        assert!(matches!(err, GenerateError::Unparseable { .. }));
    }

    #[test]
    fn test_empty_quiz_rejected() {
        let err = parse_body(ContentKind::Quiz, "[]").unwrap_err();
        assert!(matches!(err, GenerateError::Unparseable { .. }));
    }

    #[test]
    fn test_missing_brackets_is_unparseable() {
        let err = parse_body(ContentKind::Quiz, "no json here at all").unwrap_err();
        assert!(matches!(err, GenerateError::Unparseable { .. }));
    }
}
