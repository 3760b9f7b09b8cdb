//! Keyword table and canned replies
//!
//! Intents are recognized by plain keyword containment on normalized text.
//! Adding a locale or an intent means adding a row here, not a branch in the
//! engine.

use serde::{Deserialize, Serialize};

use super::normalize::contains_any;

/// Coarse classification of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Menu,
    Help,
    OrderStart,
    Cancel,
    Confirm,
    Deny,
}

impl Intent {
    /// Keywords that trigger this intent
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Intent::Greeting => &["hola", "buenas", "hello", "hi"],
            Intent::Menu => &["menú", "menu", "carta", "opciones", "ver"],
            Intent::Help => &["ayuda", "help", "que puedes", "como funciona"],
            Intent::OrderStart => &["pedido", "pedir", "ordenar", "quiero", "comprar"],
            Intent::Cancel => &["cancelar", "salir", "no quiero", "atrás"],
            Intent::Confirm => &["sí", "si", "yes", "confirmo", "correcto", "ok"],
            Intent::Deny => &["no", "cancelar", "cambiar"],
        }
    }

    /// True if the already-normalized text triggers this intent
    pub fn matches(self, normalized: &str) -> bool {
        contains_any(normalized, self.keywords())
    }

    /// First intent in `order` matched by the text
    pub fn first_match(normalized: &str, order: &[Intent]) -> Option<Intent> {
        order.iter().copied().find(|intent| intent.matches(normalized))
    }
}

/// Intents recognized while waiting, in priority order
pub const WAITING_INTENTS: &[Intent] = &[
    Intent::Menu,
    Intent::Help,
    Intent::OrderStart,
    Intent::Greeting,
];

/// Intents recognized while confirming, in priority order
pub const CONFIRMING_INTENTS: &[Intent] = &[Intent::Confirm, Intent::Deny, Intent::Cancel];

pub const GREETING_REPLIES: &[&str] = &[
    "¡Hola! Soy FoodBot, tu asistente culinario personal. ¿En qué puedo ayudarte hoy?",
    "¡Bienvenido! Estoy aquí para ayudarte con tus pedidos de comida. ¿Qué te gustaría ordenar?",
    "¡Hola! ¿Listo para descubrir deliciosas opciones? ¿Qué puedo preparar para ti?",
];

pub const MENU_REPLIES: &[&str] = &[
    "🍕 Pizza Margherita - $12.99\n🍔 Hamburguesa Clásica - $9.99\n🥗 Ensalada César - $8.50\n🍝 Pasta Carbonara - $11.50\n🌮 Tacos Mexicanos - $10.99\n\n¿Qué te llama la atención?",
    "Aquí tienes nuestro menú destacado:\n\n🍕 Pizzas artesanales\n🍔 Hamburguesas gourmet\n🥗 Ensaladas frescas\n🍝 Pastas caseras\n🌮 Comida mexicana\n🍣 Sushi fresco\n\n¿Sobre qué categoría quieres saber más?",
];

pub const HELP_REPLIES: &[&str] = &[
    "Puedo ayudarte con:\n• 📋 Ver nuestro menú completo\n• 🛒 Realizar pedidos paso a paso\n• 📷 Analizar imágenes de comida\n• ❓ Responder dudas sobre ingredientes\n• 🚚 Información de delivery\n\n¿En qué te puedo asistir?",
    "Estoy aquí para hacer tu experiencia más fácil:\n\n✨ Recomendaciones personalizadas\n🔍 Búsqueda por ingredientes\n⏱️ Tiempos de preparación\n💰 Información de precios\n📍 Zonas de entrega\n\n¿Qué necesitas saber?",
];

pub const IMAGE_REPLIES: &[&str] = &[
    "¡Imagen recibida! Se ve delicioso. ¿Te gustaría pedir algo similar?",
    "¡Excelente foto! ¿Quieres que te recomiende algo parecido de nuestro menú?",
    "Me encanta lo que veo en la imagen. ¿Puedo sugerirte algunas opciones similares?",
];

pub const ASK_PRODUCT: &str =
    "¡Perfecto! ¿Qué producto te gustaría pedir? Puedes decirme el nombre o elegir del menú.";
pub const GENERIC_PROMPT: &str =
    "¡Hola! ¿Te gustaría ver nuestro menú, hacer un pedido o necesitas ayuda con algo más?";
pub const PRODUCT_CANCELLED: &str = "Pedido cancelado. ¿Hay algo más en lo que pueda ayudarte?";
pub const INVALID_QUANTITY: &str =
    "Por favor, ingresa un número válido mayor que cero. Ejemplo: 2, 5, 10";
pub const QUANTITY_TOO_LARGE: &str = "Para pedidos de más de 50 unidades, por favor contacta directamente con nosotros. ¿Quieres ajustar la cantidad?";
pub const ORDER_CANCELLED: &str = "Pedido cancelado. ¿Te gustaría hacer un nuevo pedido o hay algo más en lo que pueda ayudarte?";
pub const CONFIRM_REPROMPT: &str =
    "Por favor, responde \"sí\" para confirmar o \"no\" para cancelar el pedido.";
pub const IMAGE_TOO_LARGE: &str =
    "La imagen es muy grande. Por favor, sube una imagen menor a 5MB.";

pub fn product_chosen(product: &str) -> String {
    format!(
        "Excelente elección: \"{product}\" 👌\n\n¿Cuántas unidades deseas? Por favor, ingresa solo el número."
    )
}

pub fn order_summary(product: &str, quantity: u32) -> String {
    let unit = if quantity == 1 { "unidad" } else { "unidades" };
    format!(
        "📋 Resumen de tu pedido:\n• Producto: {product}\n• Cantidad: {quantity} {unit}\n\n¿Confirmas este pedido? (Responde: sí/no)"
    )
}

pub fn order_confirmed(order_id: &str) -> String {
    format!(
        "🎉 ¡Pedido confirmado exitosamente!\n\n📦 Número de orden: #{order_id}\n⏱️ Tiempo estimado: 25-35 minutos\n💰 Total estimado: Consultar al recibir\n\n¿Te gustaría pedir algo más?"
    )
}
