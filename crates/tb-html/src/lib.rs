mod attribute;
mod entity;

pub use attribute::{attribute_value, extract_attributes, AttributeKey, Selector, Window};
pub use entity::{escape, reencode, unescape};
