use time::OffsetDateTime;
use crate::lifecycle::ends_at_from_countdown;
use crate::models::PollRequest;

pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question is required")]
    MissingQuestion,
    #[error("At least {MIN_OPTIONS} options are required")]
    TooFewOptions,
    #[error("Empty option text")]
    EmptyOption,
    #[error("Countdown must be a positive number of minutes")]
    InvalidCountdown(i32),
    #[error("Missing optionId")]
    MissingOptionId,
}

/// A validated poll body, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct PollDraft {
    pub question: String,
    pub options: Vec<String>,
    pub ends_at: Option<OffsetDateTime>,
    pub countdown_minutes: Option<i32>,
}

pub fn validate_poll_request(request: &PollRequest, now: OffsetDateTime) -> Result<PollDraft, ValidationError> {
    let question = request.question.trim();
    if question.is_empty() { return Err(ValidationError::MissingQuestion); }

    if request.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }

    let options: Vec<String> = request.options.iter().map(|opt| opt.trim().to_string()).collect();
    if options.iter().any(|opt| opt.is_empty()) { return Err(ValidationError::EmptyOption); }

    // Zero means no countdown.
    let countdown_minutes = request.countdown_minutes.filter(|&minutes| minutes != 0);
    if let Some(minutes) = countdown_minutes {
        if minutes < 0 {
            return Err(ValidationError::InvalidCountdown(minutes));
        }
    }

    // A countdown wins over a client-computed end time.
    let ends_at = match countdown_minutes {
        Some(_) => ends_at_from_countdown(now, countdown_minutes),
        None => request.ends_at,
    };

    Ok(PollDraft {
        question: question.to_string(),
        options,
        ends_at,
        countdown_minutes,
    })
}
