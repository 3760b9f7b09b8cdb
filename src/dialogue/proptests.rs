//! Property-based tests for the dialogue engine
//!
//! These tests verify that every turn is total and that re-prompts and
//! cancellations behave the same for any input.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::engine::MAX_QUANTITY;
use super::*;

fn arb_state() -> impl Strategy<Value = State> {
    prop_oneof![
        Just(State::Waiting),
        Just(State::AskingProduct),
        Just(State::AskingQuantity),
        Just(State::Confirming),
    ]
}

fn arb_session() -> impl Strategy<Value = Session> {
    (arb_state(), "[a-zA-Z ]{0,20}", 0u32..=50).prop_map(|(state, product, quantity)| {
        Session {
            state,
            order: PendingOrder { product, quantity },
        }
    })
}

proptest! {
    #[test]
    fn turn_always_replies(session in arb_session(), input in "\\PC{0,40}", seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let turn = handle(&session, &input, &mut rng);
        prop_assert!(!turn.reply.is_empty());
    }

    #[test]
    fn waiting_results_have_empty_order(session in arb_session(), input in "\\PC{0,40}") {
        let mut rng = StdRng::seed_from_u64(0);
        let turn = handle(&session, &input, &mut rng);
        if turn.session.state == State::Waiting {
            prop_assert!(turn.session.order.is_empty());
        }
    }

    #[test]
    fn non_numeric_quantity_stays(product in "[A-Z][a-z]{1,10}", input in "[a-z ]{0,20}") {
        let session = Session {
            state: State::AskingQuantity,
            order: PendingOrder { product, quantity: 0 },
        };
        let mut rng = StdRng::seed_from_u64(0);
        let first = handle(&session, &input, &mut rng);
        let second = handle(&first.session, &input, &mut rng);
        prop_assert_eq!(&first.session, &session);
        prop_assert_eq!(&second.session, &session);
    }

    #[test]
    fn valid_quantity_confirms(quantity in 1u32..=MAX_QUANTITY) {
        let session = Session {
            state: State::AskingQuantity,
            order: PendingOrder { product: "Pizza".into(), quantity: 0 },
        };
        let mut rng = StdRng::seed_from_u64(0);
        let turn = handle(&session, &quantity.to_string(), &mut rng);
        prop_assert_eq!(turn.session.state, State::Confirming);
        prop_assert_eq!(turn.session.order.quantity, quantity);
    }

    #[test]
    fn cancel_always_resets(state in prop_oneof![Just(State::AskingProduct), Just(State::Confirming)],
                            prefix in "[a-z ]{0,10}",
                            word in prop::sample::select(intents::Intent::Cancel.keywords())) {
        let session = Session {
            state,
            order: PendingOrder { product: "Pizza".into(), quantity: 2 },
        };
        let mut rng = StdRng::seed_from_u64(0);
        let turn = handle(&session, &format!("{prefix} {word}"), &mut rng);
        // A random prefix may contain a confirm word, which wins in Confirming
        if state == State::AskingProduct || !intents::Intent::Confirm.matches(&normalize::normalize(&prefix)) {
            prop_assert_eq!(turn.session, Session::new());
        }
    }
}
