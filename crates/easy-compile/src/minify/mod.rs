mod css;
mod js;

pub use css::{minify_css, CssMinifier};
pub use js::JsMinifier;
