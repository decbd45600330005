//! # hypewriter-markup
//!
//! The HTML wire format chapters are stored in, built on [Logos] and
//! [html-escape].
//!
//! [Logos]: https://docs.rs/logos
//! [html-escape]: https://docs.rs/html-escape
//!
//! ## Format
//!
//! A chapter is a flat run of block elements:
//!
//! ```text
//! <p style="margin-left: 4em">…</p>           paragraph, indent 2
//! <h1>…</h1> … <h6>…</h6>                     heading
//! <div data-type="bubble" data-position="left" class="bubble bubble-left">…</div>
//! <blockquote data-type="line" class="blockquote blockquote-line">…</blockquote>
//! <hr data-type="solid">
//! ```
//!
//! Indent is written as `margin-left` in em, `level * indent_size`, and only
//! when the level is non-zero.
//!
//! ## Pipeline
//!
//! ```text
//! HTML → Lexer → Tokens → Parser → Vec<Node> → Document
//!        (Logos)                               (hypewriter-engine)
//! Document → Renderer → HTML
//! ```
//!
//! Loading is forgiving: inline markup is flattened into plain text,
//! unknown elements and comments are dropped and stray text becomes a
//! paragraph. Saving then loading a document gives the same document.
//!
//! ```
//! use hypewriter_engine::editing::IndentOptions;
//! use hypewriter_markup::{parse_html, to_html};
//!
//! let options = IndentOptions::default();
//! let html = r#"<p>Hi</p><div data-type="bubble" data-position="right">Hello</div>"#;
//! let doc = parse_html(html, &options).unwrap();
//! assert_eq!(
//!     to_html(&doc, &options),
//!     r#"<p>Hi</p><div data-type="bubble" data-position="right" class="bubble bubble-right">Hello</div>"#
//! );
//! ```

pub mod lexer;
pub mod parser;
pub mod render;

pub use parser::{parse_html, parse_nodes};
pub use render::to_html;
