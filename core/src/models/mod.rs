// core/src/models/mod.rs
pub mod line_item;
pub mod order;
pub mod product;
pub mod profile;

pub use line_item::LineItem;
pub use order::{Order, OrderDetails, OrderStatus, PaymentDetails, StatusTransition, UnknownStatus};
pub use product::{Product, ProductDraft};
pub use profile::Profile;

/// Renders cents as Brazilian reais, e.g. `R$ 1.234,50`.
pub fn format_brl(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  let reais = (abs / 100).to_string();
  let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
  for (idx, ch) in reais.chars().enumerate() {
    if idx > 0 && (reais.len() - idx) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(ch);
  }
  format!("{sign}R$ {grouped},{:02}", abs % 100)
}
