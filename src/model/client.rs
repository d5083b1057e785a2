use serde::{Deserialize, Serialize};

/// Gradient palette for new client cards. `Client::new` rotates through it.
pub const CLIENT_GRADIENTS: [&str; 5] = [
    "linear-gradient(90deg,rgba(255,150,0,.95),rgba(255,80,0,.75),rgba(255,210,140,.90))",
    "linear-gradient(90deg,rgba(0,200,255,.95),rgba(0,255,170,.70),rgba(110,80,255,.92))",
    "linear-gradient(90deg,rgba(180,0,255,.95),rgba(255,0,140,.70),rgba(255,220,0,.80))",
    "linear-gradient(90deg,rgba(0,255,120,.90),rgba(0,180,255,.80),rgba(180,0,255,.70))",
    "linear-gradient(90deg,rgba(255,60,120,.95),rgba(255,160,0,.80),rgba(255,220,120,.85))",
];

pub const DEFAULT_EMOJI: &str = "👤";

/// A client that tasks can be filed under. Owned by the consumer; the core
/// reads `id`/`name`/`slug` for `@mention` resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Store-assigned ID like `C-003`, immutable
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub color_gradient: String,
    /// Lookup key: name lowercased with non-alphanumerics stripped
    pub slug: String,
}

impl Client {
    /// Build a new client, picking a gradient by rotating through the palette.
    pub fn new(id: String, name: &str, palette_index: usize) -> Client {
        Client {
            id,
            name: name.trim().to_string(),
            emoji: DEFAULT_EMOJI.to_string(),
            color_gradient: CLIENT_GRADIENTS[palette_index % CLIENT_GRADIENTS.len()].to_string(),
            slug: slugify(name),
        }
    }
}

/// Normalize a client name to its lookup key: lowercase, non-alphanumerics
/// stripped. `"Acme Corp"` → `"acmecorp"`.
pub fn slugify(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Result of resolving an `@mention` token against the known clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionMatch<'a> {
    /// The token's slug equals an existing client's slug
    Exact(&'a Client),
    /// One or more clients whose name or slug starts with the token
    Prefix(Vec<&'a Client>),
    /// Nothing matched; the consumer may offer to create a client
    None,
}

/// Resolve a mention token (the part after `@`) against the client list.
/// Matching is case-insensitive; an exact slug match wins outright.
pub fn match_mention<'a, I>(clients: I, token: &str) -> MentionMatch<'a>
where
    I: IntoIterator<Item = &'a Client>,
{
    let token_slug = slugify(token);
    if token_slug.is_empty() {
        return MentionMatch::None;
    }
    let token_lower = token.to_lowercase();

    let mut prefix_hits = Vec::new();
    for client in clients {
        if client.slug == token_slug {
            return MentionMatch::Exact(client);
        }
        if client.slug.starts_with(&token_slug)
            || client.name.to_lowercase().starts_with(&token_lower)
        {
            prefix_hits.push(client);
        }
    }

    if prefix_hits.is_empty() {
        MentionMatch::None
    } else {
        MentionMatch::Prefix(prefix_hits)
    }
}
