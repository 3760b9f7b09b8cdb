//! Order dialogue state machine
//!
//! Handles transitions between Waiting, AskingProduct, AskingQuantity and
//! Confirming based on keyword matching of each utterance. A turn is a pure
//! function of the session, the utterance and the random source.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::OrderEvent;

use super::intents::{self, Intent, CONFIRMING_INTENTS, WAITING_INTENTS};
use super::normalize::{format_product_name, normalize, parse_quantity, QuantityInput};
use super::random;

/// Largest quantity accepted in a single order
pub const MAX_QUANTITY: u32 = 50;

/// Largest image accepted for acknowledgement (5 MiB)
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// The four possible states of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// No order in progress
    #[default]
    Waiting,
    /// Waiting for the product name
    AskingProduct,
    /// Waiting for the number of units
    AskingQuantity,
    /// Waiting for a yes/no on the summary
    Confirming,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Waiting => write!(f, "Waiting"),
            State::AskingProduct => write!(f, "AskingProduct"),
            State::AskingQuantity => write!(f, "AskingQuantity"),
            State::Confirming => write!(f, "Confirming"),
        }
    }
}

/// Order being assembled across turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub product: String,
    pub quantity: u32,
}

impl PendingOrder {
    pub fn is_empty(&self) -> bool {
        self.product.is_empty() && self.quantity == 0
    }
}

/// Per-conversation state threaded through every turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: State,
    pub order: PendingOrder,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(state: State, order: PendingOrder) -> Self {
        Self { state, order }
    }
}

/// Result of processing one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Text to show the user
    pub reply: String,
    /// Session to use for the next turn
    pub session: Session,
    /// Order lifecycle change caused by this turn, if any
    pub event: Option<OrderEvent>,
}

impl Turn {
    fn new(reply: impl Into<String>, session: Session) -> Self {
        Self {
            reply: reply.into(),
            session,
            event: None,
        }
    }

    fn with_event(mut self, event: OrderEvent) -> Self {
        self.event = Some(event);
        self
    }
}

/// Process one utterance against a session
///
/// Never fails: unrecognized or invalid input re-prompts and keeps the
/// session where it was.
pub fn handle<R: Rng + ?Sized>(session: &Session, utterance: &str, rng: &mut R) -> Turn {
    let normalized = normalize(utterance);
    debug!(state = %session.state, input = %normalized, "handling utterance");

    let turn = match session.state {
        State::Waiting => handle_waiting(&normalized, rng),
        State::AskingProduct => handle_product(session, utterance, &normalized),
        State::AskingQuantity => handle_quantity(session, &normalized),
        State::Confirming => handle_confirming(session, &normalized, rng),
    };

    debug_assert!(turn.session.state != State::Waiting || turn.session.order.is_empty());

    if turn.session.state != session.state {
        info!(from = %session.state, to = %turn.session.state, "dialogue transition");
    }

    turn
}

/// Acknowledge an uploaded image without touching the dialogue state
pub fn acknowledge_image<R: Rng + ?Sized>(size_bytes: u64, rng: &mut R) -> String {
    if size_bytes > MAX_IMAGE_BYTES {
        intents::IMAGE_TOO_LARGE.to_string()
    } else {
        random::pick(intents::IMAGE_REPLIES, rng).to_string()
    }
}

fn handle_waiting<R: Rng + ?Sized>(normalized: &str, rng: &mut R) -> Turn {
    let waiting = Session::new();

    match Intent::first_match(normalized, WAITING_INTENTS) {
        Some(Intent::Menu) => Turn::new(random::pick(intents::MENU_REPLIES, rng), waiting),
        Some(Intent::Help) => Turn::new(random::pick(intents::HELP_REPLIES, rng), waiting),
        Some(Intent::OrderStart) => Turn::new(
            intents::ASK_PRODUCT,
            Session::with(State::AskingProduct, PendingOrder::default()),
        )
        .with_event(OrderEvent::OrderStarted),
        Some(Intent::Greeting) => {
            Turn::new(random::pick(intents::GREETING_REPLIES, rng), waiting)
        }
        // Anything else is treated as the start of an order
        _ => Turn::new(
            intents::GENERIC_PROMPT,
            Session::with(State::AskingProduct, PendingOrder::default()),
        ),
    }
}

fn handle_product(session: &Session, utterance: &str, normalized: &str) -> Turn {
    if Intent::Cancel.matches(normalized) {
        return Turn::new(intents::PRODUCT_CANCELLED, Session::new())
            .with_event(OrderEvent::OrderCancelled);
    }

    let product = format_product_name(utterance);
    let reply = intents::product_chosen(&product);
    let order = PendingOrder {
        product: product.clone(),
        quantity: session.order.quantity,
    };

    Turn::new(reply, Session::with(State::AskingQuantity, order))
        .with_event(OrderEvent::ProductChosen { product })
}

fn handle_quantity(session: &Session, normalized: &str) -> Turn {
    match parse_quantity(normalized, MAX_QUANTITY) {
        QuantityInput::Valid(quantity) => {
            let order = PendingOrder {
                product: session.order.product.clone(),
                quantity,
            };
            let reply = intents::order_summary(&order.product, quantity);
            Turn::new(reply, Session::with(State::Confirming, order))
                .with_event(OrderEvent::QuantitySet { quantity })
        }
        QuantityInput::TooLarge => Turn::new(intents::QUANTITY_TOO_LARGE, session.clone()),
        QuantityInput::Invalid => Turn::new(intents::INVALID_QUANTITY, session.clone()),
    }
}

fn handle_confirming<R: Rng + ?Sized>(session: &Session, normalized: &str, rng: &mut R) -> Turn {
    match Intent::first_match(normalized, CONFIRMING_INTENTS) {
        Some(Intent::Confirm) => {
            let order_id = random::order_id(rng);
            info!(
                %order_id,
                product = %session.order.product,
                quantity = session.order.quantity,
                "order confirmed"
            );
            Turn::new(intents::order_confirmed(&order_id), Session::new()).with_event(
                OrderEvent::OrderConfirmed {
                    order_id,
                    product: session.order.product.clone(),
                    quantity: session.order.quantity,
                },
            )
        }
        Some(_) => Turn::new(intents::ORDER_CANCELLED, Session::new())
            .with_event(OrderEvent::OrderCancelled),
        None => Turn::new(intents::CONFIRM_REPROMPT, session.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn session(state: State, product: &str, quantity: u32) -> Session {
        Session::with(
            state,
            PendingOrder {
                product: product.to_string(),
                quantity,
            },
        )
    }

    /// Extract the id following '#' in a confirmation reply
    fn order_id_in(reply: &str) -> &str {
        let start = reply.find('#').expect("reply has no order number") + 1;
        let rest = &reply[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        &rest[..end]
    }

    #[test]
    fn test_initial_state() {
        let s = Session::new();
        assert_eq!(s.state, State::Waiting);
        assert!(s.order.is_empty());
    }

    #[test]
    fn test_full_order_flow() {
        let mut rng = rng();
        let s = Session::new();

        let t = handle(&s, "quiero pedir", &mut rng);
        assert_eq!(t.session.state, State::AskingProduct);
        assert_eq!(t.event, Some(OrderEvent::OrderStarted));

        let t = handle(&t.session, "pizza", &mut rng);
        assert_eq!(t.session.state, State::AskingQuantity);
        assert_eq!(t.session.order.product, "Pizza");

        let t = handle(&t.session, "3", &mut rng);
        assert_eq!(t.session.state, State::Confirming);
        assert_eq!(t.session.order, PendingOrder { product: "Pizza".into(), quantity: 3 });
        assert!(t.reply.contains("Pizza"));
        assert!(t.reply.contains("3 unidades"));

        let t = handle(&t.session, "si", &mut rng);
        assert_eq!(t.session.state, State::Waiting);
        assert!(t.session.order.is_empty());
        let id = order_id_in(&t.reply);
        assert!(random::is_order_id(id), "bad order id {id:?}");
        match t.event {
            Some(OrderEvent::OrderConfirmed { order_id, product, quantity }) => {
                assert_eq!(order_id, id);
                assert_eq!(product, "Pizza");
                assert_eq!(quantity, 3);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_waiting_menu_help_greeting_stay_waiting() {
        let mut rng = rng();
        let s = Session::new();

        let t = handle(&s, "Muéstrame la carta", &mut rng);
        assert_eq!(t.session.state, State::Waiting);
        assert!(intents::MENU_REPLIES.contains(&t.reply.as_str()));

        let t = handle(&s, "ayuda", &mut rng);
        assert_eq!(t.session.state, State::Waiting);
        assert!(intents::HELP_REPLIES.contains(&t.reply.as_str()));

        let t = handle(&s, "Hola", &mut rng);
        assert_eq!(t.session.state, State::Waiting);
        assert!(intents::GREETING_REPLIES.contains(&t.reply.as_str()));
        assert_eq!(t.event, None);
    }

    #[test]
    fn test_waiting_unmatched_moves_to_asking_product() {
        let t = handle(&Session::new(), "xyz", &mut rng());
        assert_eq!(t.session.state, State::AskingProduct);
        assert_eq!(t.reply, intents::GENERIC_PROMPT);
    }

    #[test]
    fn test_injected_source_gives_exact_reply() {
        let mut zero = StepRng::new(0, 0);
        let t = handle(&Session::new(), "hola", &mut zero);
        assert_eq!(t.reply, intents::GREETING_REPLIES[0]);

        let s = session(State::Confirming, "Pizza", 2);
        let t = handle(&s, "ok", &mut zero);
        assert!(t.reply.contains("#000000000"));
    }

    #[test]
    fn test_same_seed_same_replies() {
        let inputs = ["hola", "menu", "ayuda", "hola"];
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            inputs
                .iter()
                .map(|i| handle(&Session::new(), i, &mut rng).reply)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_product_capitalization() {
        let s = session(State::AskingProduct, "", 0);
        let t = handle(&s, "tacos mexicanos", &mut rng());
        assert_eq!(t.session.order.product, "Tacos mexicanos");
        assert_eq!(
            t.event,
            Some(OrderEvent::ProductChosen { product: "Tacos mexicanos".into() })
        );
    }

    #[test]
    fn test_cancel_from_asking_product() {
        for word in ["cancelar", "Salir", "no quiero nada", "atras", "atrás"] {
            let s = session(State::AskingProduct, "", 0);
            let t = handle(&s, word, &mut rng());
            assert_eq!(t.session, Session::new(), "input {word:?}");
            assert_eq!(t.reply, intents::PRODUCT_CANCELLED);
            assert_eq!(t.event, Some(OrderEvent::OrderCancelled));
        }
    }

    #[test]
    fn test_cancel_from_confirming() {
        let words = ["no", "quiero cambiar"]
            .into_iter()
            .chain(Intent::Cancel.keywords().iter().copied());
        for word in words {
            let s = session(State::Confirming, "Pizza", 4);
            let t = handle(&s, word, &mut rng());
            assert_eq!(t.session, Session::new(), "input {word:?}");
            assert_eq!(t.reply, intents::ORDER_CANCELLED);
            assert_eq!(t.event, Some(OrderEvent::OrderCancelled));
        }
    }

    #[test]
    fn test_salir_and_atras_cancel_confirmation() {
        for word in ["salir", "Atrás", "atras"] {
            let s = session(State::Confirming, "Pizza", 2);
            let t = handle(&s, word, &mut rng());
            assert_eq!(t.session.state, State::Waiting, "input {word:?}");
            assert!(t.session.order.is_empty());
        }
    }

    #[test]
    fn test_quantity_boundaries() {
        let s = session(State::AskingQuantity, "Pizza", 0);

        let t = handle(&s, "50", &mut rng());
        assert_eq!(t.session.state, State::Confirming);
        assert_eq!(t.session.order.quantity, 50);

        let t = handle(&s, "51", &mut rng());
        assert_eq!(t.session, s);
        assert_eq!(t.reply, intents::QUANTITY_TOO_LARGE);

        for bad in ["0", "abc", "-2", ""] {
            let t = handle(&s, bad, &mut rng());
            assert_eq!(t.session, s, "input {bad:?}");
            assert_eq!(t.reply, intents::INVALID_QUANTITY);
        }
    }

    #[test]
    fn test_single_unit_summary() {
        let s = session(State::AskingQuantity, "Pizza", 0);
        let t = handle(&s, "1", &mut rng());
        assert!(t.reply.contains("1 unidad\n"));
    }

    #[test]
    fn test_invalid_quantity_reprompt_is_idempotent() {
        let s = session(State::AskingQuantity, "Pizza", 0);
        let first = handle(&s, "muchas", &mut rng());
        let second = handle(&first.session, "muchas", &mut rng());
        assert_eq!(first.session.state, State::AskingQuantity);
        assert_eq!(second.session.state, State::AskingQuantity);
        assert_eq!(first.reply, second.reply);
    }

    #[test]
    fn test_confirm_with_and_without_accent() {
        for word in ["sí", "si", "Sí, claro"] {
            let s = session(State::Confirming, "Pizza", 1);
            let t = handle(&s, word, &mut rng());
            assert_eq!(t.session.state, State::Waiting, "input {word:?}");
            assert!(matches!(t.event, Some(OrderEvent::OrderConfirmed { .. })));
        }
    }

    #[test]
    fn test_confirming_unrecognized_reprompts() {
        let s = session(State::Confirming, "Pizza", 2);
        let t = handle(&s, "tal vez", &mut rng());
        assert_eq!(t.session, s);
        assert_eq!(t.reply, intents::CONFIRM_REPROMPT);
        assert_eq!(t.event, None);
    }

    #[test]
    fn test_acknowledge_image() {
        let mut zero = StepRng::new(0, 0);
        assert_eq!(acknowledge_image(1024, &mut zero), intents::IMAGE_REPLIES[0]);
        assert_eq!(acknowledge_image(MAX_IMAGE_BYTES, &mut zero), intents::IMAGE_REPLIES[0]);
        assert_eq!(
            acknowledge_image(MAX_IMAGE_BYTES + 1, &mut zero),
            intents::IMAGE_TOO_LARGE
        );
    }
}
