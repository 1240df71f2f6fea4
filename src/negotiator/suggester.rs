//! The suggestion-service seam.

use std::collections::VecDeque;

use thiserror::Error;

use crate::game::SideId;

/// One call to the suggestion service.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRequest<'a> {
    /// Rules summary and reply grammar.
    pub system: &'a str,
    /// Description of the current position.
    pub prompt: &'a str,
    /// Side the suggestion is for.
    pub side: SideId,
    /// 1-based attempt number within the negotiation.
    pub attempt: u32,
    /// Why the previous attempt was rejected, if it was.
    pub feedback: Option<&'a str>,
}

/// Why the suggestion service produced no reply text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
    /// The request exceeded the client timeout.
    #[error("suggestion request timed out")]
    Timeout,
    /// Connection or protocol failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },
    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Response(String),
    /// The response carried no reply text.
    #[error("empty reply from suggestion service")]
    Empty,
}

impl SuggestError {
    /// Timeouts and transport failures; retrying them is unlikely to help
    /// within one turn.
    #[must_use]
    pub const fn is_hard_failure(&self) -> bool {
        matches!(self, SuggestError::Timeout | SuggestError::Transport(_))
    }
}

/// Source of free-text move suggestions.
pub trait Suggester {
    /// Ask for one suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if no reply text could be obtained.
    fn suggest(&mut self, request: &SuggestionRequest<'_>) -> Result<String, SuggestError>;
}

impl<S: Suggester + ?Sized> Suggester for &mut S {
    fn suggest(&mut self, request: &SuggestionRequest<'_>) -> Result<String, SuggestError> {
        (**self).suggest(request)
    }
}

impl<S: Suggester + ?Sized> Suggester for Box<S> {
    fn suggest(&mut self, request: &SuggestionRequest<'_>) -> Result<String, SuggestError> {
        (**self).suggest(request)
    }
}

/// Replays canned replies in order; used by tests and offline play.
///
/// Once the script is exhausted every call fails with
/// [`SuggestError::Empty`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedSuggester {
    replies: VecDeque<Result<String, SuggestError>>,
    calls: u32,
    feedback: Vec<Option<String>>,
}

impl ScriptedSuggester {
    /// Script of successful replies.
    pub fn new<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::from_results(replies.into_iter().map(|reply| Ok(reply.into())))
    }

    /// Script mixing replies and failures.
    pub fn from_results(results: impl IntoIterator<Item = Result<String, SuggestError>>) -> Self {
        Self {
            replies: results.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of requests received.
    #[must_use]
    pub const fn calls(&self) -> u32 {
        self.calls
    }

    /// Feedback carried by each request, in order.
    #[must_use]
    pub fn feedback(&self) -> &[Option<String>] {
        &self.feedback
    }

    /// Replies not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Suggester for ScriptedSuggester {
    fn suggest(&mut self, request: &SuggestionRequest<'_>) -> Result<String, SuggestError> {
        self.calls += 1;
        self.feedback.push(request.feedback.map(str::to_string));
        self.replies.pop_front().unwrap_or(Err(SuggestError::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(attempt: u32) -> SuggestionRequest<'static> {
        SuggestionRequest {
            system: "rules",
            prompt: "board",
            side: SideId::A,
            attempt,
            feedback: None,
        }
    }

    #[test]
    fn test_hard_failures() {
        assert!(SuggestError::Timeout.is_hard_failure());
        assert!(SuggestError::Transport("refused".into()).is_hard_failure());
        assert!(!SuggestError::Empty.is_hard_failure());
        assert!(
            !SuggestError::Api {
                status: 500,
                body: String::new()
            }
            .is_hard_failure()
        );
    }

    #[test]
    fn test_scripted_suggester_replays_then_runs_dry() {
        let mut suggester = ScriptedSuggester::new(["EXPAND: A2", "ATTACK: B1"]);
        assert_eq!(suggester.suggest(&request(1)).unwrap(), "EXPAND: A2");
        assert_eq!(suggester.suggest(&request(2)).unwrap(), "ATTACK: B1");
        assert_eq!(suggester.suggest(&request(3)), Err(SuggestError::Empty));
        assert_eq!(suggester.calls(), 3);
        assert_eq!(suggester.remaining(), 0);
    }

    #[test]
    fn test_scripted_suggester_through_reference() {
        fn ask<S: Suggester>(mut suggester: S) -> Result<String, SuggestError> {
            suggester.suggest(&request(1))
        }

        let mut suggester = ScriptedSuggester::from_results([Err(SuggestError::Timeout)]);
        assert_eq!(ask(&mut suggester), Err(SuggestError::Timeout));
        assert_eq!(suggester.calls(), 1);
    }
}
