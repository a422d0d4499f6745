//! Display reference construction against the static sprite host.
//!
//! The core never fetches these; they are handed to the presentation layer
//! as-is, templated by entity id or item name.

const SPRITE_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites";

pub fn sprite_url(id: u16) -> String {
    format!("{SPRITE_BASE}/pokemon/{id}.png")
}

pub fn official_artwork_url(id: u16) -> String {
    format!("{SPRITE_BASE}/pokemon/other/official-artwork/{id}.png")
}

pub fn item_sprite_url(name: &str) -> String {
    format!("{SPRITE_BASE}/items/{name}.png")
}
