pub mod path;
pub mod state;

pub use path::*;
pub use state::*;

use html_escape::decode_html_entities;

/// Turn the retailer's `<li>` marketing copy into plain bulleted text.
pub fn clean_description(desc: &str) -> String {
    let bulleted = desc.replace("<li>", "• ").replace("</li>", "\n");
    decode_html_entities(&bulleted).trim().to_string()
}
