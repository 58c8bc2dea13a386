use serde::{Deserialize, Serialize};

/// A meme template discovered from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub url: String,
    pub source: String,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Served when every source fails or returns nothing.
pub fn static_fallback() -> Vec<Candidate> {
    vec![
        Candidate::new(
            "61579",
            "One Does Not Simply",
            "https://i.imgflip.com/1bij.jpg",
            "fallback",
        ),
        Candidate::new(
            "112126428",
            "Distracted Boyfriend",
            "https://i.imgflip.com/1ur9b0.jpg",
            "fallback",
        ),
        Candidate::new(
            "181913649",
            "Drake Hotline Bling",
            "https://i.imgflip.com/30b1gx.jpg",
            "fallback",
        ),
    ]
}
