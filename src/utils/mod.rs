// Shared helpers

pub mod i18n;

pub use i18n::{BuiltinTexts, TextSource};
