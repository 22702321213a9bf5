//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::backend::ChatResponse;
use crate::model::{Message, Role, SocialEvent};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_chat_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::Idle),
        (0u64..4).prop_map(|generation| ChatState::Sending { generation }),
        (0u64..4).prop_map(|generation| ChatState::Resetting { generation }),
    ]
}

/// States reachable from the default state: the busy phase always carries
/// the current generation
fn arb_state() -> impl Strategy<Value = SessionState> {
    (arb_chat_state(), any::<bool>()).prop_map(|(chat, completed)| {
        let generation = match chat {
            ChatState::Idle => 0,
            ChatState::Sending { generation } | ChatState::Resetting { generation } => generation,
        };
        SessionState {
            chat,
            generation,
            completed,
        }
    })
}

fn arb_event_card() -> impl Strategy<Value = SocialEvent> {
    ("[A-Za-z ]{1,20}", "[A-Za-z]{3}").prop_map(|(title, date)| SocialEvent {
        title,
        date,
        ..SocialEvent::default()
    })
}

fn arb_reply() -> impl Strategy<Value = ChatResponse> {
    (
        "[a-zA-Z !?]{0,40}",
        proptest::collection::vec(arb_event_card(), 0..3),
        any::<bool>(),
        proptest::option::of("[a-zA-Z .]{0,30}"),
    )
        .prop_map(|(text, events, mission_complete, new_vibe)| ChatResponse {
            text,
            events,
            mission_complete,
            new_vibe,
        })
}

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,5}"
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(|text| Event::UserSend { text }),
        proptest::option::of("[A-Z][a-z]{1,8}").prop_map(|user_name| Event::Reset { user_name }),
        ((0u64..5), arb_reply()).prop_map(|(generation, reply)| Event::ChatReply {
            generation,
            reply
        }),
        (0u64..5).prop_map(|generation| Event::ChatFailed { generation }),
        (0u64..5).prop_map(|generation| Event::ChatAbandoned { generation }),
        (0u64..5).prop_map(|generation| Event::ResetSettled { generation }),
    ]
}

fn appended(effects: &[Effect]) -> Vec<&Message> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendMessage(m) => Some(m),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn blank_input_never_changes_anything(state in arb_state(), text in arb_blank_text()) {
        let result = transition(&state, Event::UserSend { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
    }

    #[test]
    fn chat_request_only_leaves_idle(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            let requests = result
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::RequestChat { .. }))
                .count();
            if requests > 0 {
                prop_assert_eq!(requests, 1);
                prop_assert_eq!(state.chat, ChatState::Idle);
                prop_assert!(result.new_state.chat.is_sending());
                // The user message is appended before the request goes out
                prop_assert!(matches!(
                    result.effects.first(),
                    Some(Effect::AppendMessage(m)) if m.role == Role::User
                ));
            }
        }
    }

    #[test]
    fn reset_always_starts_clean(state in arb_state(), user_name in proptest::option::of("[A-Z][a-z]{1,8}")) {
        let result = transition(&state, Event::Reset { user_name: user_name.clone() }).unwrap();

        prop_assert_eq!(result.new_state.generation, state.generation + 1);
        prop_assert!(!result.new_state.completed);
        prop_assert_eq!(
            result.new_state.chat,
            ChatState::Resetting { generation: state.generation + 1 }
        );
        let seeded: Vec<_> = result
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::ReplaceLog(messages) => Some(messages.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(seeded, vec![vec![Message::greeting(user_name.as_deref())]]);
    }

    #[test]
    fn stale_replies_are_inert(state in arb_state(), reply in arb_reply(), offset in 1u64..3) {
        prop_assume!(state.generation >= offset);
        let stale = state.generation - offset;
        let result = transition(&state, Event::ChatReply { generation: stale, reply }).unwrap();

        prop_assert_eq!(result.new_state, state);
        prop_assert!(appended(&result.effects).is_empty());
        prop_assert_eq!(result.effects, vec![Effect::DiscardStale { generation: stale }]);
    }

    #[test]
    fn completed_only_moves_on_signal_or_reset(state in arb_state(), event in arb_event()) {
        let is_reset = matches!(event, Event::Reset { .. });
        let signals_complete = matches!(
            &event,
            Event::ChatReply { reply, .. } if reply.mission_complete
        );

        if let Ok(result) = transition(&state, event) {
            if state.completed && !result.new_state.completed {
                prop_assert!(is_reset, "completed cleared by a non-reset event");
            }
            if !state.completed && result.new_state.completed {
                prop_assert!(signals_complete, "completed set without backend signal");
            }
        }
    }

    #[test]
    fn sequences_keep_at_most_one_request_in_flight(events in proptest::collection::vec(arb_event(), 1..40)) {
        let mut state = SessionState::default();
        let mut in_flight: Option<u64> = None;

        for event in events {
            let before = state;
            let Ok(result) = transition(&state, event) else {
                continue;
            };
            state = result.new_state;

            prop_assert!(state.generation >= before.generation);

            for effect in &result.effects {
                if let Effect::RequestChat { generation, .. } = effect {
                    prop_assert!(!before.is_busy());
                    prop_assert_eq!(*generation, state.generation);
                    in_flight = Some(*generation);
                }
            }

            match state.chat {
                ChatState::Sending { generation } => {
                    prop_assert_eq!(Some(generation), in_flight);
                }
                ChatState::Idle | ChatState::Resetting { .. } => in_flight = None,
            }
        }
    }

    #[test]
    fn at_most_one_message_appended_per_event(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            prop_assert!(appended(&result.effects).len() <= 1);
        }
    }
}
