#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration, OffsetDateTime};
    use uuid::Uuid;
    use crate::lifecycle::*;
    use crate::models::{ActivePoll, OptionTally, Poll, PollRequest, VoteRequest};
    use crate::validation::*;

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:00:00 UTC);

    fn request(question: &str, options: &[&str]) -> PollRequest {
        PollRequest {
            question: question.into(),
            options: options.iter().map(|opt| opt.to_string()).collect(),
            ..Default::default()
        }
    }

    fn tally(text: &str, votes: i64) -> OptionTally {
        OptionTally { id: Uuid::new_v4(), text: text.into(), votes }
    }

    #[test]
    fn test_question_required() {
        assert_eq!(validate_poll_request(&request("", &["A", "B"]), NOW), Err(ValidationError::MissingQuestion));
        assert_eq!(validate_poll_request(&request("   ", &["A", "B"]), NOW), Err(ValidationError::MissingQuestion));
    }

    #[test]
    fn test_option_count_minimum() {
        assert_eq!(validate_poll_request(&request("Q?", &[]), NOW), Err(ValidationError::TooFewOptions));
        assert_eq!(validate_poll_request(&request("Q?", &["Only"]), NOW), Err(ValidationError::TooFewOptions));
    }

    #[test]
    fn test_large_polls_accepted() {
        let many: Vec<String> = (0..50).map(|i| format!("opt {i}")).collect();
        let long_question = "x".repeat(1_000);
        let req = PollRequest { question: long_question.clone(), options: many, ..Default::default() };
        let draft = validate_poll_request(&req, NOW).unwrap();
        assert_eq!(draft.options.len(), 50);
        assert_eq!(draft.question, long_question);
    }

    #[test]
    fn test_option_text_checked() {
        assert_eq!(validate_poll_request(&request("Q?", &["A", " "]), NOW), Err(ValidationError::EmptyOption));
    }

    #[test]
    fn test_valid_request_is_trimmed_and_ordered() {
        let draft = validate_poll_request(&request("  Color? ", &[" Red", "Blue ", "Green"]), NOW).unwrap();
        assert_eq!(draft.question, "Color?");
        assert_eq!(draft.options, vec!["Red", "Blue", "Green"]);
        assert_eq!(draft.ends_at, None);
        assert_eq!(draft.countdown_minutes, None);
    }

    #[test]
    fn test_countdown_sets_end_time() {
        let mut req = request("Q?", &["A", "B"]);
        req.countdown_minutes = Some(5);
        req.ends_at = Some(NOW + Duration::hours(3));
        let draft = validate_poll_request(&req, NOW).unwrap();
        assert_eq!(draft.ends_at, Some(NOW + Duration::minutes(5)));
        assert_eq!(draft.countdown_minutes, Some(5));
    }

    #[test]
    fn test_explicit_end_time_kept_without_countdown() {
        let mut req = request("Q?", &["A", "B"]);
        req.ends_at = Some(NOW + Duration::hours(3));
        let draft = validate_poll_request(&req, NOW).unwrap();
        assert_eq!(draft.ends_at, Some(NOW + Duration::hours(3)));
    }

    #[test]
    fn test_negative_countdown_rejected() {
        let mut req = request("Q?", &["A", "B"]);
        req.countdown_minutes = Some(-5);
        assert_eq!(validate_poll_request(&req, NOW), Err(ValidationError::InvalidCountdown(-5)));
        req.countdown_minutes = Some(3 * 24 * 60);
        assert_eq!(validate_poll_request(&req, NOW).unwrap().ends_at, Some(NOW + Duration::days(3)));
    }

    #[test]
    fn test_zero_countdown_means_none() {
        let mut req = request("Q?", &["A", "B"]);
        req.countdown_minutes = Some(0);
        let draft = validate_poll_request(&req, NOW).unwrap();
        assert_eq!(draft.countdown_minutes, None);
        assert_eq!(draft.ends_at, None);

        req.ends_at = Some(NOW + Duration::hours(1));
        let draft = validate_poll_request(&req, NOW).unwrap();
        assert_eq!(draft.countdown_minutes, None);
        assert_eq!(draft.ends_at, Some(NOW + Duration::hours(1)));
    }

    #[test]
    fn test_ends_at_from_countdown() {
        assert_eq!(ends_at_from_countdown(NOW, Some(3)), Some(NOW + Duration::minutes(3)));
        assert_eq!(ends_at_from_countdown(NOW, Some(0)), None);
        assert_eq!(ends_at_from_countdown(NOW, None), None);
    }

    #[test]
    fn test_editability() {
        assert!(ensure_editable(false, 0).is_ok());
        assert_eq!(ensure_editable(true, 0), Err(LifecycleError::NotEditable));
        assert_eq!(ensure_editable(false, 1), Err(LifecycleError::NotEditable));
    }

    #[test]
    fn test_time_left() {
        assert_eq!(seconds_left(None, NOW), None);
        assert_eq!(seconds_left(Some(NOW + Duration::seconds(125)), NOW), Some(125));
        assert_eq!(seconds_left(Some(NOW - Duration::seconds(10)), NOW), Some(0));

        assert_eq!(format_time_left(125), "02:05");
        assert_eq!(format_time_left(0), "00:00");
        assert_eq!(format_time_left(-4), "00:00");
        assert_eq!(format_time_left(3600), "60:00");
    }

    #[test]
    fn test_countdown_reconstructed_for_edit() {
        assert_eq!(countdown_from_ends_at(Some(NOW + Duration::seconds(290)), NOW), Some(5));
        assert_eq!(countdown_from_ends_at(Some(NOW + Duration::seconds(20)), NOW), None);
        assert_eq!(countdown_from_ends_at(Some(NOW - Duration::minutes(2)), NOW), None);
        assert_eq!(countdown_from_ends_at(None, NOW), None);
    }

    #[test]
    fn test_vote_share() {
        let options = [tally("Red", 3), tally("Blue", 1)];
        let total = total_votes(&options);
        assert_eq!(total, 4);
        assert_eq!(format_share(options[0].votes, total), "75.0");
        assert_eq!(format_share(options[1].votes, total), "25.0");
        assert_eq!(format_share(0, 0), "0.0");
        assert_eq!(format_share(1, 3), "33.3");
    }

    #[test]
    fn test_poll_end_check() {
        let poll = Poll {
            id: Uuid::new_v4(),
            question: "Q?".into(),
            is_active: true,
            created_at: NOW,
            ends_at: Some(NOW + Duration::minutes(1)),
            countdown_minutes: Some(1),
            options: Vec::new(),
        };
        assert!(!poll.is_ended(NOW));
        assert!(poll.is_ended(NOW + Duration::minutes(1)));
        assert!(!Poll { ends_at: None, ..poll }.is_ended(NOW + Duration::days(1)));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let poll = ActivePoll {
            id: Uuid::nil(),
            question: "Color?".into(),
            created_at: NOW,
            ends_at: None,
            countdown_minutes: Some(5),
            total_votes: 0,
            options: vec![tally("Red", 0)],
        };
        let json = serde_json::to_value(&poll).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
        assert_eq!(json["countdownMinutes"], 5);
        assert_eq!(json["totalVotes"], 0);
        assert!(json["endsAt"].is_null());

        let vote: VoteRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(vote.option_id, None);

        let req: PollRequest = serde_json::from_str(
            r#"{"question":"Q?","options":["A","B"],"endsAt":"2024-05-01T12:05:00.000Z"}"#
        ).unwrap();
        assert_eq!(req.ends_at, Some(NOW + Duration::minutes(5)));
    }

    #[test]
    fn test_ended_countdown_wins_over_recorded_vote() {
        assert_eq!(ballot_status(Some(0), true), BallotStatus::Ended);
        assert_eq!(ballot_status(Some(0), false), BallotStatus::Ended);
        assert_eq!(ballot_status(Some(30), true), BallotStatus::Voted);
        assert_eq!(ballot_status(None, true), BallotStatus::Voted);
        assert_eq!(ballot_status(Some(30), false), BallotStatus::Open);
        assert_eq!(ballot_status(None, false), BallotStatus::Open);
    }
}
